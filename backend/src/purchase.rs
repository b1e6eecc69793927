use std::sync::Arc;

use crate::error::AppError;
use crate::flow::FlowState;
use crate::format::locale_number;
use crate::models::{PropertyListing, Receipt};
use crate::store::ListingStore;
use crate::wallet::WalletSession;

const AUTH_REQUIRED: &str = "Please connect your wallet to buy shares.";
const INVALID_QUANTITY: &str = "Please enter a valid number of shares to buy.";
const CANCELLED: &str = "Purchase was cancelled. Please try again.";
const FAILED: &str = "Failed to purchase shares. Please try again.";

pub fn total_cost(listing: &PropertyListing, quantity: u64) -> f64 {
    quantity as f64 * listing.price_per_share
}

pub fn attestation_message(listing: &PropertyListing, quantity: u64) -> String {
    format!(
        "I am purchasing shares in this property:\n      \n\
         Property: {name}\n\
         Shares to Buy: {quantity}\n\
         Price per Share: ${price}\n\
         Total Cost: ${total}\n\n\
         This signature confirms my purchase of {quantity} shares in {name}.",
        name = listing.name,
        quantity = quantity,
        price = locale_number(listing.price_per_share),
        total = locale_number(total_cost(listing, quantity)),
    )
}

/// Share purchase. Settlement is simulated: a signed attestation is the whole
/// effect, and the listing's share supply is left as it is.
pub struct PurchaseFlow {
    store: Arc<ListingStore>,
    wallet: Arc<WalletSession>,
    state: FlowState,
}

impl PurchaseFlow {
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

    pub async fn buy_by_id(&self, id: &str, quantity: i64) -> Result<Receipt, AppError> {
        let listing = self.store.find(id).await?;
        self.buy(&listing, quantity).await
    }

    pub async fn buy(&self, listing: &PropertyListing, quantity: i64) -> Result<Receipt, AppError> {
        let address = self
            .wallet
            .connected_address()
            .ok_or(AppError::AuthenticationRequired(AUTH_REQUIRED))?;
        let quantity = u64::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(AppError::InvalidInput(INVALID_QUANTITY))?;

        let guard = self.state.begin()?;
        let message = attestation_message(listing, quantity);
        let signature = self
            .wallet
            .sign(&message, &address)
            .await
            .map_err(|e| AppError::from_wallet(e, CANCELLED, FAILED))?;
        if signature.is_empty() {
            log::error!("Error buying shares: Signature was cancelled or failed");
            return Err(AppError::WalletFailed(FAILED));
        }
        guard.processing();

        let total = total_cost(listing, quantity);
        log::info!(
            "{} signed for {} shares of {} ({})",
            address,
            quantity,
            listing.id,
            locale_number(total)
        );
        Ok(Receipt {
            property_id: listing.id.clone(),
            property_name: listing.name.clone(),
            quantity,
            price_per_share: listing.price_per_share,
            total_cost: total,
            signature,
            notice: format!(
                "Successfully purchased {} shares in {} for ${}!",
                quantity,
                listing.name,
                locale_number(total)
            ),
            message,
        })
    }
}
