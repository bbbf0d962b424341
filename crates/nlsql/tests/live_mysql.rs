//! Round trips against a running MySQL server.
//!
//! Run with `cargo test -p nlsql --test live_mysql -- --ignored`.
//! Connection settings come from `NLSQL_MYSQL_HOST`, `NLSQL_MYSQL_PORT`,
//! `NLSQL_MYSQL_USER`, `NLSQL_MYSQL_PASSWORD` and `NLSQL_MYSQL_DBNAME`.

use nlsql::{ConnectionConfig, QueryResult, QueryService};
use serde_json::{json, Value as Json};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

async fn service() -> QueryService {
    let cfg = ConnectionConfig::new(
        "mysql",
        env_or("NLSQL_MYSQL_HOST", "localhost"),
        env_or("NLSQL_MYSQL_PORT", "3306"),
        env_or("NLSQL_MYSQL_USER", "root"),
        env_or("NLSQL_MYSQL_PASSWORD", "root"),
        env_or("NLSQL_MYSQL_DBNAME", "mysql"),
    );
    let svc = QueryService::default();
    svc.connect(&cfg).await.unwrap();
    svc
}

fn cell(result: &QueryResult, column: &str) -> Json {
    serde_json::to_value(result.rows[0].get(column).unwrap()).unwrap()
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn test_time_outside_a_day() {
    let svc = service().await;
    let result = svc
        .execute_query(
            "SELECT CAST('-12:30:00' AS TIME) AS behind, CAST('838:59:59' AS TIME) AS longest",
        )
        .await
        .unwrap();

    assert_eq!(cell(&result, "behind"), json!("-12:30:00"));
    assert_eq!(cell(&result, "longest"), json!("838:59:59"));
    svc.shutdown().await;
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn test_widest_decimal() {
    let svc = service().await;
    let result = svc
        .execute_query(
            "SELECT CAST('12345678901234567890123456789012345.123456789012345678901234567890' \
             AS DECIMAL(65,30)) AS d",
        )
        .await
        .unwrap();

    assert_eq!(
        cell(&result, "d"),
        json!("12345678901234567890123456789012345.123456789012345678901234567890")
    );
    svc.shutdown().await;
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn test_float_and_integers() {
    let svc = service().await;
    let result = svc
        .execute_query("SELECT CAST(0.1 AS FLOAT) AS f, CAST(-7 AS SIGNED) AS i, NULL AS nothing")
        .await
        .unwrap();

    assert_eq!(cell(&result, "f"), json!(0.1));
    assert_eq!(cell(&result, "i"), json!(-7));
    assert_eq!(cell(&result, "nothing"), json!(null));
    svc.shutdown().await;
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn test_server_error_text_is_reported() {
    let svc = service().await;
    let err = svc
        .execute_query("SELECT * FROM nlsql_no_such_table")
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.contains("nlsql_no_such_table"), "{}", text);
    assert!(text.contains("doesn't exist"), "{}", text);
    svc.shutdown().await;
}
