//! 进程内的软件密钥托管实现。
//!
//! 没有硬件密钥库的环境（测试、桌面、服务端）可以直接使用它。密钥只存在于内存中，
//! 条目被替换或删除时随 `ZeroizingVec` 一起清零。
use crate::asymmetric::{AsymmetricCipher, KeyPairSpec};
use crate::common::key::{AES_KEY_SIZE_BITS, KeyAlias, KeyMaterial};
use crate::common::validity::ValidityWindow;
use crate::custodian::KeyCustodian;
use crate::error::{Error, Result};
use dashmap::DashMap;
use rand_core::{OsRng, TryRngCore};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Clone)]
enum CustodianEntry {
    Secret {
        key: KeyMaterial,
        validity: ValidityWindow,
        require_authentication: bool,
    },
    Pair {
        public: KeyMaterial,
        private: KeyMaterial,
    },
}

/// 基于 `DashMap` 的并发安全托管方
#[derive(Default)]
pub struct MemoryCustodian {
    entries: DashMap<KeyAlias, CustodianEntry>,
}

impl MemoryCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

impl KeyCustodian for MemoryCustodian {
    fn generate_symmetric_key(
        &self,
        alias: &KeyAlias,
        key_size_bits: usize,
        validity: ValidityWindow,
        require_authentication: bool,
    ) -> Result<()> {
        if key_size_bits != AES_KEY_SIZE_BITS {
            return Err(Error::key_generation(
                alias,
                format!("unsupported AES key size: {key_size_bits} bits"),
            ));
        }

        let mut key_bytes = vec![0u8; key_size_bits / 8];
        OsRng
            .try_fill_bytes(&mut key_bytes)
            .map_err(|e| Error::key_generation(alias, e.to_string()))?;

        self.entries.insert(
            alias.clone(),
            CustodianEntry::Secret {
                key: KeyMaterial::aes(key_bytes),
                validity,
                require_authentication,
            },
        );
        debug!(alias = %alias, not_after = %validity.not_after(), "stored symmetric key");
        Ok(())
    }

    fn generate_key_pair(&self, alias: &KeyAlias, spec: KeyPairSpec) -> Result<()> {
        let (public, private) =
            AsymmetricCipher::generate_key_pair(spec).map_err(|e| Error::key_generation(alias, e))?;
        self.entries
            .insert(alias.clone(), CustodianEntry::Pair { public, private });
        debug!(alias = %alias, ?spec, "stored key pair");
        Ok(())
    }

    fn fetch_symmetric_key(&self, alias: &KeyAlias) -> Result<KeyMaterial> {
        match self.entries.get(alias).as_deref() {
            Some(CustodianEntry::Secret { key, .. }) => Ok(key.clone()),
            _ => Err(Error::KeyNotFound(alias.clone())),
        }
    }

    fn fetch_private_key(&self, alias: &KeyAlias) -> Option<KeyMaterial> {
        match self.entries.get(alias).as_deref() {
            Some(CustodianEntry::Pair { private, .. }) => Some(private.clone()),
            _ => None,
        }
    }

    fn fetch_public_key(&self, alias: &KeyAlias) -> Option<KeyMaterial> {
        match self.entries.get(alias).as_deref() {
            Some(CustodianEntry::Pair { public, .. }) => Some(public.clone()),
            _ => None,
        }
    }

    fn list_aliases(&self) -> BTreeSet<KeyAlias> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    fn delete_key(&self, alias: &KeyAlias) -> Result<()> {
        self.entries
            .remove(alias)
            .map(|_| ())
            .ok_or_else(|| Error::KeyNotFound(alias.clone()))
    }

    fn fetch_validity_window(&self, alias: &KeyAlias) -> Option<ValidityWindow> {
        match self.entries.get(alias).as_deref() {
            Some(CustodianEntry::Secret { validity, .. }) => Some(*validity),
            _ => None,
        }
    }

    fn requires_authentication(&self, alias: &KeyAlias) -> Option<bool> {
        match self.entries.get(alias).as_deref() {
            Some(CustodianEntry::Secret {
                require_authentication,
                ..
            }) => Some(*require_authentication),
            _ => None,
        }
    }

    fn contains_alias(&self, alias: &KeyAlias) -> bool {
        self.entries.contains_key(alias)
    }
}
