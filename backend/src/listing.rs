use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use url::Url;

use crate::error::{AppError, FieldErrors};
use crate::flow::FlowState;
use crate::format::locale_number;
use crate::models::{ListingForm, PropertyListing};
use crate::store::ListingStore;
use crate::wallet::WalletSession;

const AUTH_REQUIRED: &str = "Please connect your wallet to create a listing.";
const CANCELLED: &str = "Signature was cancelled. Please try again.";
const FAILED: &str = "Failed to create listing. Please try again.";

/// Form input that passed validation, trimmed and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidListing {
    pub name: String,
    pub description: String,
    pub photo: String,
    pub total_price: f64,
    pub shares: u64,
}

impl ValidListing {
    pub fn price_per_share(&self) -> f64 {
        self.total_price / self.shares as f64
    }

    /// The text the owner signs to authorize the listing.
    pub fn attestation_message(&self) -> String {
        format!(
            "I am creating a new property listing:\n      \n\
             Property: {}\n\
             Description: {}\n\
             Total Price: ${}\n\
             Shares: {}\n\
             Price per Share: ${}\n\n\
             This signature proves I am the owner of this wallet and authorized to create this listing.",
            self.name,
            self.description,
            locale_number(self.total_price),
            self.shares,
            locale_number(self.price_per_share()),
        )
    }

    /// Builds the stored record; the id is the creation time in milliseconds.
    pub fn into_listing(self, now: DateTime<Utc>) -> PropertyListing {
        let price_per_share = self.price_per_share();
        PropertyListing {
            id: now.timestamp_millis().to_string(),
            name: self.name,
            description: self.description,
            photo: self.photo,
            total_price: self.total_price,
            shares: self.shares,
            price_per_share,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Checks every field and reports all problems at once.
pub fn validate(form: &ListingForm) -> Result<ValidListing, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = form.name.trim();
    if name.is_empty() {
        errors.insert("name", "Property name is required");
    }

    let description = form.description.trim();
    if description.is_empty() {
        errors.insert("description", "Description is required");
    }

    let photo = form.photo.trim();
    if photo.is_empty() {
        errors.insert("photo", "Photo URL is required");
    } else if Url::parse(photo).is_err() {
        errors.insert("photo", "Please enter a valid URL");
    }

    let total_price = parse_number(&form.total_price);
    if form.total_price.trim().is_empty() {
        errors.insert("totalPrice", "Total price is required");
    } else if !matches!(total_price, Some(price) if price > 0.0) {
        errors.insert("totalPrice", "Please enter a valid total price");
    }

    let shares = parse_number(&form.shares)
        .filter(|n| *n >= 1.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64);
    if form.shares.trim().is_empty() {
        errors.insert("shares", "Number of shares is required");
    } else if shares.is_none() {
        errors.insert("shares", "Please enter a valid number of shares");
    }

    match (total_price, shares) {
        (Some(total_price), Some(shares)) if errors.is_empty() => Ok(ValidListing {
            name: name.to_string(),
            description: description.to_string(),
            photo: photo.to_string(),
            total_price,
            shares,
        }),
        _ => Err(errors),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Creation form: validate, get the owner's signature, store the listing.
pub struct ListingFlow {
    store: Arc<ListingStore>,
    wallet: Arc<WalletSession>,
    state: FlowState,
}

impl ListingFlow {
    pub fn new(store: Arc<ListingStore>, wallet: Arc<WalletSession>) -> Self {
        Self {
            store,
            wallet,
            state: FlowState::new(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub async fn submit(&self, form: &ListingForm) -> Result<PropertyListing, AppError> {
        let valid = validate(form).map_err(AppError::Validation)?;
        let address = self
            .wallet
            .connected_address()
            .ok_or(AppError::AuthenticationRequired(AUTH_REQUIRED))?;

        let guard = self.state.begin()?;
        let message = valid.attestation_message();
        let signature = self
            .wallet
            .sign(&message, &address)
            .await
            .map_err(|e| AppError::from_wallet(e, CANCELLED, FAILED))?;
        if signature.is_empty() {
            log::error!("Error creating listing: Signature was cancelled or failed");
            return Err(AppError::WalletFailed(FAILED));
        }

        guard.processing();
        let listing = self.store.append(valid.into_listing(Utc::now())).await?;
        log::info!("Listing {} created by {}", listing.id, address);
        Ok(listing)
    }
}
