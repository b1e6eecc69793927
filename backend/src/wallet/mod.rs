use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

use crate::models::WalletState;

pub mod rpc;

pub use rpc::JsonRpcProvider;

/// Error reported by the provider itself, e.g. `User rejected the request.`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

/// An EIP-1193 style wallet: a single `request` entry point plus the chain id
/// property.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError>;

    /// Hex-encoded chain id, if the provider exposes one.
    fn chain_id(&self) -> Option<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Please install MetaMask or another Web3 wallet to connect.")]
    NoProvider,
    #[error("Wallet connection failed: {0}")]
    Connect(ProviderError),
    #[error("Wallet returned no accounts")]
    NoAccounts,
    #[error("Signing failed: {0}")]
    Sign(ProviderError),
}

impl WalletError {
    /// The user dismissed the wallet prompt, as opposed to anything else going wrong.
    pub fn is_user_rejection(&self) -> bool {
        match self {
            WalletError::Connect(e) | WalletError::Sign(e) => e.message.contains("User rejected"),
            _ => false,
        }
    }
}

/// The single wallet connection shared by every route. Consumers that need to
/// follow changes hold a receiver from [`WalletSession::subscribe`].
pub struct WalletSession {
    provider: Option<Arc<dyn Provider>>,
    state: watch::Sender<WalletState>,
}

impl WalletSession {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        let (state, _) = watch::channel(WalletState::default());
        Self { provider, state }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn state(&self) -> WalletState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    pub fn connected_address(&self) -> Option<String> {
        let state = self.state.borrow();
        if state.is_connected {
            state.address.clone()
        } else {
            None
        }
    }

    /// Asks the provider for account access and adopts the first account.
    pub async fn connect(&self) -> Result<String, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::NoProvider)?;

        let response = provider
            .request("eth_requestAccounts", Vec::new())
            .await
            .map_err(|e| {
                log::error!("Failed to connect wallet: {} (code {:?})", e, e.code);
                WalletError::Connect(e)
            })?;

        let address = match response {
            Value::Array(accounts) => accounts
                .into_iter()
                .find_map(|account| account.as_str().map(str::to_string)),
            _ => None,
        }
        .ok_or(WalletError::NoAccounts)?;

        let chain_id = provider.chain_id().and_then(|hex| parse_chain_id(&hex));
        self.state.send_replace(WalletState {
            is_connected: true,
            address: Some(address.clone()),
            chain_id,
        });
        log::info!("Wallet connected: {} (chain {:?})", address, chain_id);
        Ok(address)
    }

    /// Requests a `personal_sign` over `message`. The returned value is passed
    /// through unchecked.
    pub async fn sign(&self, message: &str, address: &str) -> Result<String, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::NoProvider)?;

        let params = vec![Value::from(message), Value::from(address)];
        let signature = provider
            .request("personal_sign", params)
            .await
            .map_err(|e| {
                log::error!("Failed to sign message: {} (code {:?})", e, e.code);
                WalletError::Sign(e)
            })?;

        Ok(match signature {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn disconnect(&self) {
        self.state.send_replace(WalletState::default());
        log::info!("Wallet disconnected");
    }
}

/// `0x1` → 1. Malformed ids are dropped rather than rejected.
fn parse_chain_id(hex: &str) -> Option<u64> {
    let digits = hex
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u64::from_str_radix(digits, 16).ok()
}
