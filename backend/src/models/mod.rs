use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One tokenized property, stored exactly in this shape under the listing key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub photo: String,
    pub total_price: f64,
    pub shares: u64,
    pub price_per_share: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub is_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

/// Raw field values as entered on the creation form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingForm {
    pub name: String,
    pub description: String,
    pub photo: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total_price: String,
    #[serde(deserialize_with = "string_or_number")]
    pub shares: String,
}

/// Numeric inputs arrive as text from forms but as numbers from JSON clients.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected a number or numeric string, found {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub quantity: i64,
}

/// Outcome of a simulated purchase. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub property_id: String,
    pub property_name: String,
    pub quantity: u64,
    pub price_per_share: f64,
    pub total_cost: f64,
    pub signature: String,
    pub message: String,
    pub notice: String,
}
