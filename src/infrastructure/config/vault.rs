//! Vault connection configuration.

use serde::Deserialize;

/// `[vault]` section. The signing key comes from the environment only.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Deployed vault contract address; required for live runs.
    #[serde(default)]
    pub address: String,

    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Loaded from `WALLET_PRIVATE_KEY` (or `PRIVATE_KEY`) at runtime.
    #[serde(skip)]
    pub private_key: Option<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            address: String::new(),
            chain_id: default_chain_id(),
            private_key: None,
        }
    }
}

fn default_rpc_url() -> String {
    "https://arb1.arbitrum.io/rpc".into()
}

const fn default_chain_id() -> u64 {
    42161
}
