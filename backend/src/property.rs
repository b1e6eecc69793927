use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::format::{format_date, format_price};
use crate::models::PropertyListing;
use crate::AppState;

/// A listing as shown in the catalog grid.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub photo: String,
    pub total_price: String,
    pub price_per_share: String,
    pub shares: u64,
    pub listed_on: String,
}

impl From<&PropertyListing> for PropertyCard {
    fn from(listing: &PropertyListing) -> Self {
        Self {
            id: listing.id.clone(),
            name: listing.name.clone(),
            description: listing.description.clone(),
            photo: listing.photo.clone(),
            total_price: format_price(listing.total_price),
            price_per_share: format_price(listing.price_per_share),
            shares: listing.shares,
            listed_on: format_date(&listing.created_at),
        }
    }
}

/// Catalog grid with the property count.
pub async fn catalog(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let listings = state.store.load().await?;
    let cards: Vec<PropertyCard> = listings.iter().map(PropertyCard::from).collect();
    Ok(Json(json!({ "count": cards.len(), "properties": cards })))
}

/// Fetches all properties in stored order
pub async fn get_properties(
    State(state): State<AppState>,
) -> Result<Json<Vec<PropertyListing>>, AppError> {
    let listings = state.store.load().await?;
    log::info!("Fetched {} properties", listings.len());
    Ok(Json(listings))
}

/// Fetches a specific property by its ID, with display values for the
/// purchase panel
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    log::info!("Fetching property with ID: {}", id);
    let listing = state.store.find(&id).await?;
    let card = PropertyCard::from(&listing);
    Ok(Json(json!({
        "property": listing,
        "display": card,
        "maxShares": listing.shares,
    })))
}
