use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{Provider, ProviderError};

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Wallet reached over HTTP JSON-RPC 2.0, e.g. a local signer or dev node.
pub struct JsonRpcProvider {
    client: reqwest::Client,
    url: String,
    chain_id: Option<String>,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(url: impl Into<String>, chain_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            chain_id,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Provider for JsonRpcProvider {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        log::debug!("Wallet RPC #{} {}", id, method);

        let response = self
            .client
            .post(&self.url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("Wallet RPC unreachable: {}", e)))?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(format!("Malformed wallet RPC response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(ProviderError {
                code: Some(error.code),
                message: error.message,
            });
        }
        Ok(body.result.unwrap_or(Value::Null))
    }

    fn chain_id(&self) -> Option<String> {
        self.chain_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::json;

    async fn fake_wallet(Json(request): Json<Value>) -> Json<Value> {
        let id = request["id"].clone();
        let reply = match request["method"].as_str() {
            Some("eth_requestAccounts") => json!({ "jsonrpc": "2.0", "id": id, "result": ["0xabc0000000000000000000000000000000000001"] }),
            Some("personal_sign") if request["params"][0].as_str() == Some("refuse") => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": 4001, "message": "User rejected the request." }
            }),
            Some("personal_sign") => json!({ "jsonrpc": "2.0", "id": id, "result": "0xdeadbeef" }),
            _ => json!({ "jsonrpc": "2.0", "id": id, "error": { "code": -32601, "message": "Method not found" } }),
        };
        Json(reply)
    }

    async fn spawn_wallet() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/", post(fake_wallet));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn requests_accounts_and_signatures() {
        let provider = JsonRpcProvider::new(spawn_wallet().await, Some("0x89".to_string()));

        let accounts = provider.request("eth_requestAccounts", Vec::new()).await.unwrap();
        assert_eq!(accounts, json!(["0xabc0000000000000000000000000000000000001"]));

        let signature = provider
            .request("personal_sign", vec![json!("hello"), json!("0xabc")])
            .await
            .unwrap();
        assert_eq!(signature, json!("0xdeadbeef"));
        assert_eq!(provider.chain_id().as_deref(), Some("0x89"));
    }

    #[tokio::test]
    async fn rpc_errors_become_provider_errors() {
        let provider = JsonRpcProvider::new(spawn_wallet().await, None);
        let err = provider
            .request("personal_sign", vec![json!("refuse"), json!("0xabc")])
            .await
            .unwrap_err();
        assert_eq!(err.code, Some(4001));
        assert_eq!(err.message, "User rejected the request.");
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails() {
        let provider = JsonRpcProvider::new("http://127.0.0.1:1/", None);
        let err = provider.request("eth_requestAccounts", Vec::new()).await.unwrap_err();
        assert!(err.code.is_none());
        assert!(err.message.starts_with("Wallet RPC unreachable"));
    }
}
