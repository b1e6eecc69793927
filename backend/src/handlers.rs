use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::format::format_address;
use crate::models::{ListingForm, PropertyListing, PurchaseRequest, Receipt};
use crate::wallet::WalletError;
use crate::AppState;

pub async fn create_property(
    State(state): State<AppState>,
    payload: Result<Json<ListingForm>, JsonRejection>,
) -> Result<(StatusCode, Json<PropertyListing>), AppError> {
    let Json(form) = payload?;
    let listing = state.listings.submit(&form).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn buy_shares(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<Json<Receipt>, AppError> {
    let Json(request) = payload?;
    let receipt = state.purchases.buy_by_id(&id, request.quantity).await?;
    Ok(Json(receipt))
}

fn wallet_view(state: &AppState) -> Value {
    let wallet = state.wallet.state();
    let short = wallet.address.as_deref().map(format_address);
    json!({
        "wallet": wallet,
        "display": short,
        "providerAvailable": state.wallet.has_provider(),
    })
}

pub async fn get_wallet(State(state): State<AppState>) -> Json<Value> {
    Json(wallet_view(&state))
}

pub async fn connect_wallet(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    match state.wallet.connect().await {
        Ok(_) => Ok(Json(wallet_view(&state))),
        Err(WalletError::NoProvider) => Err(AppError::NoProvider),
        Err(e) => Err(AppError::from_wallet(
            e,
            "Wallet connection was cancelled.",
            "Failed to connect wallet. Please try again.",
        )),
    }
}

pub async fn disconnect_wallet(State(state): State<AppState>) -> Json<Value> {
    state.wallet.disconnect();
    Json(wallet_view(&state))
}

/// Busy indicators for the two submit controls.
pub async fn flow_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "createListing": state.listings.state().status(),
        "buyShares": state.purchases.state().status(),
    }))
}
