//! Abstraction over the secure key store that owns all key material.
// 中文: 对持有全部密钥材料的安全密钥托管方的抽象。

#[cfg(feature = "memory-custodian")]
pub mod memory;

#[cfg(feature = "memory-custodian")]
pub use self::memory::MemoryCustodian;

use crate::asymmetric::KeyPairSpec;
use crate::common::key::{KeyAlias, KeyMaterial};
use crate::common::validity::ValidityWindow;
use crate::error::Result;
use std::collections::BTreeSet;

/// Defines the contract every secure-storage backend must implement.
///
/// A custodian generates and stores keys and never releases secret or private
/// bytes except as a transient `KeyMaterial` handle used in-process for a single
/// operation. Hardware keystores, software vaults and HSMs all plug in here,
/// which keeps the orchestration layer free of platform dependencies.
///
/// Implementations must be safe for concurrent use. Regenerating a key under an
/// existing alias replaces the previous entry atomically.
///
/// 中文: 定义所有安全存储后端必须实现的契约。
///
/// 托管方负责生成和存储密钥，除了单次操作期间在进程内使用的临时 `KeyMaterial`
/// 句柄之外，绝不导出对称密钥或私钥。实现必须支持并发访问；在已有别名下重新生成
/// 密钥时，旧条目会被原子地替换。
pub trait KeyCustodian: Send + Sync {
    /// Generates a symmetric key under `alias`, replacing any existing entry.
    ///
    /// Fails with `KeyGeneration` on unsupported sizes, busy backends or policy rejection.
    fn generate_symmetric_key(
        &self,
        alias: &KeyAlias,
        key_size_bits: usize,
        validity: ValidityWindow,
        require_authentication: bool,
    ) -> Result<()>;

    /// Generates an asymmetric key pair under `alias`, replacing any existing entry.
    fn generate_key_pair(&self, alias: &KeyAlias, spec: KeyPairSpec) -> Result<()>;

    /// Fetches the symmetric key handle; `KeyNotFound` if absent.
    fn fetch_symmetric_key(&self, alias: &KeyAlias) -> Result<KeyMaterial>;

    /// Returns `None` when the alias is missing or holds no key pair.
    fn fetch_private_key(&self, alias: &KeyAlias) -> Option<KeyMaterial>;

    /// Returns `None` when the alias is missing or holds no key pair.
    fn fetch_public_key(&self, alias: &KeyAlias) -> Option<KeyMaterial>;

    fn list_aliases(&self) -> BTreeSet<KeyAlias>;

    /// Removes the alias entirely; `KeyNotFound` if absent.
    fn delete_key(&self, alias: &KeyAlias) -> Result<()>;

    /// Returns `None` if the custodian does not track a window for the alias.
    fn fetch_validity_window(&self, alias: &KeyAlias) -> Option<ValidityWindow>;

    /// The authentication requirement recorded when the symmetric key was generated.
    ///
    /// Returns `None` when the alias is missing or holds no symmetric key. Rotation reuses
    /// this flag so that regenerating a key never weakens its access policy.
    fn requires_authentication(&self, alias: &KeyAlias) -> Option<bool>;

    fn contains_alias(&self, alias: &KeyAlias) -> bool {
        self.list_aliases().contains(alias)
    }
}
