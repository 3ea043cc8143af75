//! Account store
//!
//! Accounts are keyed by identifier (the farmer's mobile number). Registering
//! an identifier that already exists overwrites its name and password: the
//! last registration wins.

use agro_common::db::Account;
use agro_common::password::{hash_new_password, verify_password};
use agro_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Insert or overwrite the account for `identifier`
///
/// No validation is applied to any field.
pub async fn register(
    db: &SqlitePool,
    identifier: &str,
    display_name: &str,
    password: &str,
) -> Result<Account> {
    let stored = hash_new_password(password);

    let result = sqlx::query(
        r#"
        INSERT INTO accounts (identifier, display_name, password_hash, password_salt)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(identifier) DO UPDATE SET
            display_name = excluded.display_name,
            password_hash = excluded.password_hash,
            password_salt = excluded.password_salt,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(identifier)
    .bind(display_name)
    .bind(&stored.hash)
    .bind(&stored.salt)
    .execute(db)
    .await?;

    info!(
        identifier,
        rows = result.rows_affected(),
        "Account registered"
    );

    Ok(Account {
        identifier: identifier.to_string(),
        display_name: display_name.to_string(),
    })
}

/// Return the account when `password` matches the stored hash
///
/// Unknown identifiers and wrong passwords both yield
/// [`Error::InvalidCredentials`].
pub async fn authenticate(db: &SqlitePool, identifier: &str, password: &str) -> Result<Account> {
    let row: Option<(String, String, String)> = sqlx::query_as(
        "SELECT display_name, password_hash, password_salt FROM accounts WHERE identifier = ?",
    )
    .bind(identifier)
    .fetch_optional(db)
    .await?;

    match row {
        Some((display_name, hash, salt)) if verify_password(password, &salt, &hash) => {
            debug!(identifier, "Credentials accepted");
            Ok(Account {
                identifier: identifier.to_string(),
                display_name,
            })
        }
        _ => {
            debug!(identifier, "Credentials rejected");
            Err(Error::InvalidCredentials)
        }
    }
}

/// Look up an account by identifier
pub async fn find_account(db: &SqlitePool, identifier: &str) -> Result<Option<Account>> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT identifier, display_name FROM accounts WHERE identifier = ?")
            .bind(identifier)
            .fetch_optional(db)
            .await?;

    Ok(row.map(|(identifier, display_name)| Account {
        identifier,
        display_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agro_common::db::init_database;

    async fn setup_db() -> (tempfile::TempDir, SqlitePool) {
        let temp = tempfile::tempdir().unwrap();
        let pool = init_database(&temp.path().join("agrodetect.db")).await.unwrap();
        (temp, pool)
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let (_temp, db) = setup_db().await;

        register(&db, "9876543210", "Asha", "leafy").await.unwrap();

        let account = authenticate(&db, "9876543210", "leafy").await.unwrap();
        assert_eq!(account.identifier, "9876543210");
        assert_eq!(account.display_name, "Asha");
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (_temp, db) = setup_db().await;
        register(&db, "9876543210", "Asha", "leafy").await.unwrap();

        let err = authenticate(&db, "9876543210", "LEAFY").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_identifier_rejected() {
        let (_temp, db) = setup_db().await;

        let err = authenticate(&db, "0000000000", "anything").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_reregistration_overwrites() {
        let (_temp, db) = setup_db().await;

        register(&db, "555", "Asha", "first").await.unwrap();
        register(&db, "555", "Asha Devi", "second").await.unwrap();

        assert!(authenticate(&db, "555", "first").await.is_err());
        let account = authenticate(&db, "555", "second").await.unwrap();
        assert_eq!(account.display_name, "Asha Devi");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_password_not_stored_in_plaintext() {
        let (_temp, db) = setup_db().await;
        register(&db, "555", "Asha", "plain-secret").await.unwrap();

        let (hash, salt): (String, String) =
            sqlx::query_as("SELECT password_hash, password_salt FROM accounts WHERE identifier = '555'")
                .fetch_one(&db)
                .await
                .unwrap();
        assert_ne!(hash, "plain-secret");
        assert_eq!(hash.len(), 64);
        assert_eq!(salt.len(), 32);
    }

    #[tokio::test]
    async fn test_empty_fields_accepted() {
        let (_temp, db) = setup_db().await;

        register(&db, "", "", "").await.unwrap();
        let account = authenticate(&db, "", "").await.unwrap();
        assert_eq!(account.display_name, "");
    }

    #[tokio::test]
    async fn test_find_account() {
        let (_temp, db) = setup_db().await;
        assert!(find_account(&db, "555").await.unwrap().is_none());

        register(&db, "555", "Asha", "pw").await.unwrap();
        let found = find_account(&db, "555").await.unwrap().unwrap();
        assert_eq!(found.display_name, "Asha");
    }
}
