//! Import of the flat `users.json` account file
//!
//! Earlier releases kept accounts in a JSON object keyed by mobile number:
//!
//! ```json
//! { "9876543210": { "name": "Asha", "password": "leafy" } }
//! ```
//!
//! On startup the file is imported into the `accounts` table and renamed to
//! `users.json.imported`. Identifiers already in the database are left alone.

use super::accounts::{find_account, register};
use agro_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct LegacyAccount {
    #[serde(default)]
    name: String,
    #[serde(default)]
    password: String,
}

/// Import `path` if it exists, returning how many accounts were added
pub async fn import_legacy_accounts(db: &SqlitePool, path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let content = tokio::fs::read_to_string(path).await?;
    let records: BTreeMap<String, LegacyAccount> = serde_json::from_str(&content)
        .map_err(|e| Error::InvalidInput(format!("{}: {}", path.display(), e)))?;

    let mut imported = 0;
    for (identifier, record) in &records {
        if find_account(db, identifier).await?.is_some() {
            warn!(identifier = %identifier, "Legacy account already exists, skipping");
            continue;
        }
        register(db, identifier, &record.name, &record.password).await?;
        imported += 1;
    }

    let mut renamed = path.as_os_str().to_owned();
    renamed.push(".imported");
    tokio::fs::rename(path, &renamed).await?;

    info!(
        "Imported {} of {} legacy accounts from {}",
        imported,
        records.len(),
        path.display()
    );
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::accounts::authenticate;
    use agro_common::db::init_database;

    #[tokio::test]
    async fn test_missing_file_is_noop() {
        let temp = tempfile::tempdir().unwrap();
        let db = init_database(&temp.path().join("agrodetect.db")).await.unwrap();

        let count = import_legacy_accounts(&db, &temp.path().join("users.json"))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_import_hashes_and_skips_existing() {
        let temp = tempfile::tempdir().unwrap();
        let db = init_database(&temp.path().join("agrodetect.db")).await.unwrap();
        register(&db, "222", "Ravi", "new-password").await.unwrap();

        let legacy = temp.path().join("users.json");
        std::fs::write(
            &legacy,
            r#"{"111": {"name": "Asha", "password": "leafy"},
                "222": {"name": "Ravi", "password": "old-password"}}"#,
        )
        .unwrap();

        let count = import_legacy_accounts(&db, &legacy).await.unwrap();
        assert_eq!(count, 1);

        assert_eq!(authenticate(&db, "111", "leafy").await.unwrap().display_name, "Asha");
        assert!(authenticate(&db, "222", "new-password").await.is_ok());
        assert!(authenticate(&db, "222", "old-password").await.is_err());

        assert!(!legacy.exists());
        assert!(temp.path().join("users.json.imported").exists());
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let db = init_database(&temp.path().join("agrodetect.db")).await.unwrap();
        let legacy = temp.path().join("users.json");
        std::fs::write(&legacy, "not json").unwrap();

        let err = import_legacy_accounts(&db, &legacy).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(legacy.exists(), "malformed file must be left in place");
    }
}
