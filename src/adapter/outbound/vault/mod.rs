//! Vault adapters implementing [`VaultWrite`](crate::port::outbound::vault::VaultWrite).

pub mod paper;
#[cfg(feature = "onchain")]
pub mod stability;

pub use paper::PaperVault;
#[cfg(feature = "onchain")]
pub use stability::StabilityVault;
