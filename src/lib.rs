//! # Seal-Custody: Key Lifecycle and Authenticated Encryption
//!
//! `seal-custody` manages the lifecycle of keys held by an external secure key
//! custodian and mediates authenticated encryption on top of them.
//!
//! The custodian (a platform keystore, a software vault or an HSM) owns all key
//! material. This crate decides *when* keys are generated and rotated, gates
//! operations behind an optional human-authentication step, and speaks a fixed
//! AES-256-GCM envelope format (`IV ‖ ciphertext ‖ tag`, base-64 for transport).
//!
//! ## Core Concepts
//!
//! - **`KeyCustodian`**: the trait every secure-storage backend implements.
//!   `MemoryCustodian` is the in-process software backend.
//! - **`KeyLifecycleManager`**: generate-on-demand, policy-driven rotation and deletion.
//! - **`AuthenticationGate`**: the optional human-presence check; `ChannelGate` hands
//!   prompts to a UI layer over a channel.
//! - **`CryptoManager`**: the entry point composing all of the above.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use seal_custody::{ChannelGate, CryptoConfig, CryptoManager, MemoryCustodian, RotationConfig};
//! use std::sync::Arc;
//!
//! async fn run() -> seal_custody::Result<()> {
//!     let (gate, _prompts) = ChannelGate::new(8);
//!     let manager = CryptoManager::new(
//!         Arc::new(MemoryCustodian::new()),
//!         Arc::new(gate),
//!         RotationConfig::default(),
//!     );
//!     let config = CryptoConfig::new("acct-key")?;
//!
//!     // Encrypt
//!     let envelope = manager.encrypt_data(&config, b"Hello, Seal-Custody!").await?;
//!
//!     // Decrypt
//!     let plaintext = manager.decrypt_data(&config, &envelope).await?;
//!     assert_eq!(plaintext, b"Hello, Seal-Custody!");
//!     Ok(())
//! }
//! ```

pub mod asymmetric;
pub mod auth;
pub mod common;
pub mod custodian;
pub mod error;
pub mod orchestrator;
pub mod rotation;
pub mod symmetric;

// --- Core API ---
pub use crate::asymmetric::{AsymmetricCipher, EcCurve, KeyPairSpec};
pub use crate::auth::{AuthOutcome, AuthPrompt, AuthRequest, AuthenticationGate, ChannelGate};
pub use crate::common::{
    ConfigError, CryptoConfig, CryptoConfigBuilder, KeyAlgorithm, KeyAlias, KeyKind, KeyMaterial,
    KeyPurposes, RotationConfig, ValidityWindow,
};
pub use crate::custodian::KeyCustodian;
#[cfg(feature = "memory-custodian")]
pub use crate::custodian::MemoryCustodian;
pub use crate::error::{Error, Operation, Result};
pub use crate::orchestrator::CryptoManager;
pub use crate::rotation::{
    KeyLifecycleManager, RotationOutcome, RotationPolicy, RotationTrigger, is_rotation_due,
};
pub use crate::symmetric::{EncryptedEnvelope, EnvelopeCipher};

/// The version of the `seal-custody` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
