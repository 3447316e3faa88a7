//! Credential (vault) collection.
//!
//! Independent CRUD consumer of its own persisted key; the core touches it
//! only to validate adds and to round-trip it through backups.

use super::{load_collection, next_id, persist_collection, StoreResult};
use crate::config::VAULT_KEY;
use crate::model::credential::{CredentialEntry, CredentialId};
use crate::repo::kv_repo::KvRepository;
use log::info;

pub struct VaultStore<R: KvRepository> {
    repo: R,
    entries: Vec<CredentialEntry>,
}

impl<R: KvRepository> VaultStore<R> {
    pub fn load(repo: R) -> Self {
        let entries = load_collection::<CredentialEntry, _>(&repo, VAULT_KEY);
        info!(
            "event=vault_store_load module=store status=ok count={}",
            entries.len()
        );
        Self { repo, entries }
    }

    pub fn entries(&self) -> &[CredentialEntry] {
        &self.entries
    }

    pub fn find(&self, id: CredentialId) -> Option<&CredentialEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Adds a credential; every field is required.
    pub fn add(&mut self, site: &str, username: &str, password: &str) -> StoreResult<CredentialId> {
        let id = next_id(self.entries.iter().map(|entry| entry.id).max())?;
        let entry = CredentialEntry::build(id, site, username, password)?;

        let mut next = self.entries.clone();
        next.push(entry);
        persist_collection(&self.repo, VAULT_KEY, &next)?;
        self.entries = next;
        info!("event=vault_add module=store status=ok id={id}");
        Ok(id)
    }

    /// Removes the entry with `id`; returns whether anything was removed.
    pub fn delete(&mut self, id: CredentialId) -> StoreResult<bool> {
        if self.find(id).is_none() {
            return Ok(false);
        }
        let next = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect::<Vec<_>>();
        persist_collection(&self.repo, VAULT_KEY, &next)?;
        self.entries = next;
        info!("event=vault_delete module=store status=ok id={id}");
        Ok(true)
    }

    /// Replaces the whole collection (import path).
    pub fn replace_all(&mut self, entries: Vec<CredentialEntry>) -> StoreResult<()> {
        persist_collection(&self.repo, VAULT_KEY, &entries)?;
        self.entries = entries;
        Ok(())
    }
}
