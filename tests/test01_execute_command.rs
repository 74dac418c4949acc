#![cfg(feature = "sqlite")]

use db_tools::prelude::*;

async fn memory_engine() -> Engine {
    Engine::from_url("sqlite::memory:").await.expect("memory engine")
}

async fn table_exists(engine: &Engine, name: &str) -> bool {
    let outcome = engine
        .run_query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = :name",
            [("name", name)],
        )
        .await
        .expect("catalog query");
    !outcome.rows().expect("rows").is_empty()
}

#[tokio::test]
async fn create_table_is_committed() -> Result<(), Box<dyn std::error::Error>> {
    let engine = memory_engine().await;
    engine
        .execute_command("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT, quantity INTEGER)")
        .await?;
    assert!(table_exists(&engine, "items").await);
    Ok(())
}

#[tokio::test]
async fn syntax_error_is_reported() {
    let engine = memory_engine().await;
    let err = engine
        .execute_command("CREAT TABLE items (id INTEGER)")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Statement);
    assert!(!err.is_retryable());
    assert!(!execute_command("CREAT TABLE items (id INTEGER)", &engine).await);
}

#[tokio::test]
async fn failing_batch_leaves_nothing_behind() {
    let engine = memory_engine().await;
    let ok = execute_command(
        "CREATE TABLE first (id INTEGER);
         CREATE TABLE second (id INTEGER);
         CREATE TABLE first (id INTEGER);",
        &engine,
    )
    .await;
    assert!(!ok);
    assert!(!table_exists(&engine, "first").await);
    assert!(!table_exists(&engine, "second").await);
}

#[tokio::test]
async fn multi_statement_batch_applies_together() {
    let engine = memory_engine().await;
    assert!(
        execute_command(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL);
             CREATE INDEX users_email ON users (email);
             INSERT INTO users (email) VALUES ('seed@example.com');",
            &engine,
        )
        .await
    );
    let outcome = engine
        .run_query("SELECT COUNT(*) AS n FROM users", ())
        .await
        .unwrap();
    let rows = outcome.rows().unwrap();
    assert_eq!(rows.iter().next().unwrap().get("n"), Some(&RowValues::Int(1)));
}

#[tokio::test]
async fn engine_is_reusable_after_a_failure() {
    let engine = memory_engine().await;
    assert!(!execute_command("DROP TABLE missing", &engine).await);
    assert!(execute_command("CREATE TABLE t (id INTEGER)", &engine).await);
    assert!(table_exists(&engine, "t").await);
}
