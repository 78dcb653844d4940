use atelier_database::{Database, DatabaseError, Migration, QueryBuilder};

fn demo_migrations() -> Vec<Migration> {
    vec![Migration::new(
        "demo",
        "0001",
        "DEFINE TABLE IF NOT EXISTS demo SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS name ON demo TYPE string;",
    )]
}

#[tokio::test]
async fn connects_and_applies_migrations() {
    let db = Database::builder()
        .url("mem://")
        .session("atelier", "integration")
        .migrations(demo_migrations())
        .init()
        .await
        .expect("mem engine should connect");

    let version = db.version().await.expect("version query");
    assert!(!version.to_string().is_empty());
}

#[tokio::test]
async fn missing_session_is_a_validation_error() {
    let err = Database::builder().url("mem://").init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn composed_query_round_trip() {
    let db = Database::builder()
        .url("mem://")
        .session("atelier", "composed")
        .migrations(demo_migrations())
        .init()
        .await
        .expect("mem engine should connect");

    db.query("CREATE demo SET name = 'alpha'; CREATE demo SET name = 'beta';")
        .await
        .expect("seed rows");

    let query = QueryBuilder::select("demo").filter("name = $name").bind("name", "alpha");

    let total = db.run_count(&query).await.expect("count");
    assert_eq!(total, 1);
}
