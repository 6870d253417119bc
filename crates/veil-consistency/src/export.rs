//! Encrypted export and import of the token table
//!
//! Exports let a later session keep issuing the same tokens for the same
//! values. The table is serialized to JSON and sealed with an age scrypt
//! passphrase; the salt itself never leaves the process, only its
//! fingerprint, which import checks before merging anything.

use std::collections::HashMap;
use std::io::{Read, Write};

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use age::{Decryptor, Encryptor};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use veil_core::{IdentifierType, Result, VeilError};

use crate::canonical::CanonicalKey;
use crate::manager::{ConsistencyEntry, ConsistencyManager};

const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    pub key: CanonicalKey,
    pub token: String,
    pub first_seen: Uuid,
    pub occurrences: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsistencyExport {
    pub version: u32,
    pub salt_fingerprint: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub counters: HashMap<IdentifierType, u64>,
    pub entries: Vec<ExportEntry>,
}

/// Serialize the manager's table and seal it with a passphrase. The output
/// is ASCII-armored, safe to store alongside other run artifacts.
pub fn export_encrypted(manager: &ConsistencyManager, passphrase: SecretString) -> Result<Vec<u8>> {
    let (entries, counters) = manager.snapshot();
    let export = ConsistencyExport {
        version: EXPORT_VERSION,
        salt_fingerprint: manager.salt_fingerprint(),
        created_at: OffsetDateTime::now_utc(),
        counters,
        entries: entries
            .into_iter()
            .map(|(key, entry)| ExportEntry {
                key,
                token: entry.token,
                first_seen: entry.first_seen,
                occurrences: entry.occurrences,
            })
            .collect(),
    };
    let payload = serde_json::to_vec(&export)?;

    let recipient = age::scrypt::Recipient::new(passphrase);
    let encryptor = Encryptor::with_recipients(std::iter::once(&recipient as &dyn age::Recipient))
        .map_err(|e| VeilError::ExportFailed(e.to_string()))?;

    let mut sealed = Vec::new();
    let armor = ArmoredWriter::wrap_output(&mut sealed, Format::AsciiArmor)
        .map_err(|e| VeilError::ExportFailed(e.to_string()))?;
    let mut writer = encryptor
        .wrap_output(armor)
        .map_err(|e| VeilError::ExportFailed(e.to_string()))?;
    writer
        .write_all(&payload)
        .map_err(|e| VeilError::ExportFailed(e.to_string()))?;
    writer
        .finish()
        .and_then(|armor| armor.finish())
        .map_err(|e| VeilError::ExportFailed(e.to_string()))?;

    tracing::info!(
        entries = export.entries.len(),
        fingerprint = %export.salt_fingerprint,
        "consistency table exported"
    );
    Ok(sealed)
}

/// Unseal an export and merge it into the manager. Rejected wholesale when
/// the passphrase is wrong, the format version is unknown, or the salt
/// fingerprint does not match the manager's session salt.
pub fn import_encrypted(
    manager: &ConsistencyManager,
    sealed: &[u8],
    passphrase: SecretString,
) -> Result<usize> {
    let decryptor = Decryptor::new(ArmoredReader::new(sealed))
        .map_err(|e| VeilError::ImportRejected(e.to_string()))?;
    let identity = age::scrypt::Identity::new(passphrase);
    let mut reader = decryptor
        .decrypt(std::iter::once(&identity as &dyn age::Identity))
        .map_err(|e| VeilError::ImportRejected(e.to_string()))?;

    let mut payload = Vec::new();
    reader
        .read_to_end(&mut payload)
        .map_err(|e| VeilError::ImportRejected(e.to_string()))?;
    let export: ConsistencyExport = serde_json::from_slice(&payload)?;

    if export.version != EXPORT_VERSION {
        return Err(VeilError::ImportRejected(format!(
            "unsupported export version {}",
            export.version
        )));
    }
    if export.salt_fingerprint != manager.salt_fingerprint() {
        return Err(VeilError::SaltMismatch);
    }

    let count = export.entries.len();
    let entries = export
        .entries
        .into_iter()
        .map(|e| {
            (
                e.key,
                ConsistencyEntry {
                    token: e.token,
                    first_seen: e.first_seen,
                    occurrences: e.occurrences,
                },
            )
        })
        .collect();
    manager.absorb(entries, export.counters);

    tracing::info!(entries = count, "consistency table imported");
    Ok(count)
}
