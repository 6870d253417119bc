//! Session salt and the token mapping table

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use veil_core::IdentifierType;

use crate::canonical::{canonicalize, CanonicalKey};

const TOKEN_KEY_CONTEXT: &str = "veil 2026-01 consistency token";
const TOKEN_HEX_LEN: usize = 8;

/// Per-session secret used to derive token text. Tokens are a function of
/// the salt and an allocation counter, never of the protected value, so a
/// token leaks nothing about what it replaced.
pub struct SessionSalt {
    bytes: SecretBox<[u8; 32]>,
}

impl SessionSalt {
    /// Fresh random salt for a new session.
    pub fn generate() -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(&std::time::UNIX_EPOCH.elapsed().unwrap_or_default().subsec_nanos().to_le_bytes());
        Self::from_bytes(*hasher.finalize().as_bytes())
    }

    /// Rebuild the salt of an earlier session, for longitudinal imports.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            bytes: SecretBox::new(Box::new(bytes)),
        }
    }

    /// Public fingerprint of the salt. Safe to persist in exports; used to
    /// verify that an import belongs to this session lineage.
    pub fn fingerprint(&self) -> String {
        blake3::hash(self.bytes.expose_secret()).to_hex()[..16].to_string()
    }

    fn token_key(&self) -> [u8; 32] {
        blake3::derive_key(TOKEN_KEY_CONTEXT, self.bytes.expose_secret())
    }
}

/// One allocated token and its bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyEntry {
    pub token: String,
    pub first_seen: Uuid,
    pub occurrences: u64,
}

#[derive(Default)]
struct TableState {
    entries: HashMap<CanonicalKey, ConsistencyEntry>,
    counters: HashMap<IdentifierType, u64>,
}

/// Thread-safe canonical-value to token table.
///
/// All mutation happens under one lock, so concurrent documents in a batch
/// see a single consistent allocation sequence.
pub struct ConsistencyManager {
    salt: SessionSalt,
    inner: Mutex<TableState>,
}

impl ConsistencyManager {
    pub fn new(salt: SessionSalt) -> Self {
        Self {
            salt,
            inner: Mutex::new(TableState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Token for a raw detected value, allocating one on first sight.
    /// Repeated calls with canonically equal values return the same token.
    pub fn token_for(&self, identifier: IdentifierType, raw: &str, document_id: Uuid) -> String {
        let key = canonicalize(identifier, raw);
        let mut state = self.lock();
        if let Some(entry) = state.entries.get_mut(&key) {
            entry.occurrences += 1;
            return entry.token.clone();
        }

        let counter = state.counters.entry(identifier).or_insert(0);
        *counter += 1;
        let token = derive_token(&self.salt, identifier, *counter);
        tracing::debug!(
            identifier = identifier.tag(),
            token = %token,
            "allocated consistency token"
        );
        state.entries.insert(
            key,
            ConsistencyEntry {
                token: token.clone(),
                first_seen: document_id,
                occurrences: 1,
            },
        );
        token
    }

    pub fn salt_fingerprint(&self) -> String {
        self.salt.fingerprint()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Copy of the table for export.
    pub(crate) fn snapshot(
        &self,
    ) -> (
        Vec<(CanonicalKey, ConsistencyEntry)>,
        HashMap<IdentifierType, u64>,
    ) {
        let state = self.lock();
        let mut entries: Vec<_> = state
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.1.token.cmp(&b.1.token));
        (entries, state.counters.clone())
    }

    /// Merge an imported table. Existing allocations win; counters advance
    /// to at least the imported values so new allocations never reuse a
    /// token number from the earlier session.
    pub(crate) fn absorb(
        &self,
        entries: Vec<(CanonicalKey, ConsistencyEntry)>,
        counters: HashMap<IdentifierType, u64>,
    ) {
        let mut state = self.lock();
        for (key, entry) in entries {
            state.entries.entry(key).or_insert(entry);
        }
        for (identifier, counter) in counters {
            let current = state.counters.entry(identifier).or_insert(0);
            *current = (*current).max(counter);
        }
    }
}

fn derive_token(salt: &SessionSalt, identifier: IdentifierType, counter: u64) -> String {
    let key = salt.token_key();
    let material = format!("{}:{}", identifier.tag(), counter);
    let digest = blake3::keyed_hash(&key, material.as_bytes());
    let hex = digest.to_hex();
    format!(
        "{}_{}",
        identifier.tag(),
        hex[..TOKEN_HEX_LEN].to_ascii_uppercase()
    )
}
