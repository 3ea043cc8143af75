//! Tests for database initialization and migrations

use agro_common::db::{get_schema_version, init_database, CURRENT_SCHEMA_VERSION};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("sub").join("agrodetect.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_accounts_table_created() {
    let temp = tempfile::tempdir().unwrap();
    let pool = init_database(&temp.path().join("agrodetect.db")).await.unwrap();

    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('accounts') ORDER BY cid")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(
        columns,
        vec![
            "identifier",
            "display_name",
            "password_hash",
            "password_salt",
            "created_at",
            "updated_at"
        ]
    );
}

#[tokio::test]
async fn test_reopen_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("agrodetect.db");

    let pool1 = init_database(&db_path).await.unwrap();
    assert_eq!(get_schema_version(&pool1).await.unwrap(), CURRENT_SCHEMA_VERSION);
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(versions, 1, "Migrations must not be re-applied");
}
