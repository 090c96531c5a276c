use configuration::Config;
use core_types::Context;
use database::{Session, SqlitePool};
use std::path::Path;
use tempfile::TempDir;

fn config(db: &Path, replica: &Path) -> Config {
    Config::from_lookup(db, |_| None).with_remote(format!("file:{}", replica.display()))
}

async fn remove_database(db: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut path = db.as_os_str().to_os_string();
        path.push(suffix);
        let _ = tokio::fs::remove_file(&path).await;
    }
}

async fn count_notes(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM notes")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn database_survives_losing_the_local_file() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("data").join("app.db");
    let replica = dir.path().join("replica");
    let ctx = Context::background();

    let mut session = Session::new(config(&db, &replica));
    let pool = session.open(&ctx).await.unwrap();
    assert!(session.is_replicated());
    sqlx::query("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO notes (body) VALUES ('first'), ('second')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
        .execute(&pool)
        .await
        .unwrap();
    session.close(&ctx).await.unwrap();

    remove_database(&db).await;
    assert!(!db.exists());

    let mut session = Session::new(config(&db, &replica));
    let pool = session.open(&ctx).await.unwrap();
    assert!(db.exists());
    assert_eq!(count_notes(&pool).await, 2);
    session.close(&ctx).await.unwrap();
}

#[tokio::test]
async fn fresh_replica_starts_an_empty_database() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("app.db");
    let replica = dir.path().join("replica");
    let ctx = Context::background();

    let mut session = Session::new(config(&db, &replica));
    let pool = session.open(&ctx).await.unwrap();
    let tables: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(tables, 0);
    session.close(&ctx).await.unwrap();

    assert!(replica.join("generations").is_dir());
}

#[tokio::test]
async fn s3_replica_is_rejected_by_the_local_engine() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("app.db");
    let cfg = Config::from_lookup(&db, |_| None).with_remote("s3://my-bucket/db");

    let mut session = Session::new(cfg);
    let err = session.open(&Context::background()).await.unwrap_err();
    assert!(matches!(err, database::SessionError::ReplicaAttach { ref replica, .. } if replica == "s3"));
    assert!(!db.exists());
}
