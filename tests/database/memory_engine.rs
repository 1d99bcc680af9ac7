use fluent_query::database::{MemoryEngine, MemoryEngineError, PersistenceEngine};
use fluent_query::metamodel::Value;

fn engine_with_accounts() -> MemoryEngine {
    let engine = MemoryEngine::new();
    let rows: [(i64, &str, Option<i64>); 4] = [
        (10, "A-10", Some(1)),
        (11, "A-11", Some(1)),
        (12, "B-12", Some(2)),
        (13, "B-13", None),
    ];
    for (id, number, customer) in rows {
        engine
            .update(
                "insert into TB_ACCOUNT (CD_ACCOUNT, NU_ACCOUNT, CD_CUSTOMER) values ($1, $2, $3)",
                &[id.into(), number.into(), customer.into()],
            )
            .unwrap();
    }
    engine
}

fn ids(engine: &MemoryEngine, statement: &str, parameters: &[Value]) -> Vec<i64> {
    engine
        .query(statement, parameters)
        .unwrap()
        .iter()
        .map(|row| match row.get("CD_ACCOUNT") {
            Some(Value::Integer(id)) => *id,
            other => panic!("unexpected id {other:?}"),
        })
        .collect()
}

#[test]
fn test_declared_table_starts_empty() {
    let engine = MemoryEngine::new();
    engine.create_table("TB_CUSTOMER", &["CD_CUSTOMER", "DS_NAME"]);
    assert_eq!(engine.table_names(), vec!["TB_CUSTOMER".to_string()]);
    assert!(engine
        .query("select e0.* from TB_CUSTOMER e0 where e0.DS_NAME = ?", &["x".into()])
        .unwrap()
        .is_empty());

    engine.clear();
    assert!(engine.table_names().is_empty());
}

#[test]
fn test_single_character_wildcard() {
    let engine = engine_with_accounts();
    assert_eq!(
        ids(&engine, "select e0.* from TB_ACCOUNT e0 where e0.NU_ACCOUNT like ?", &["B-1_".into()]),
        vec![12, 13]
    );
}

#[test]
fn test_membership_list_ignores_null_columns() {
    let engine = engine_with_accounts();
    assert_eq!(
        ids(
            &engine,
            "select e0.* from TB_ACCOUNT e0 where e0.CD_CUSTOMER in (:p0, :p1)",
            &[1i64.into(), 2i64.into()],
        ),
        vec![10, 11, 12]
    );
}

#[test]
fn test_nulls_sort_as_largest_value() {
    let engine = engine_with_accounts();
    assert_eq!(
        ids(&engine, "select e0.* from TB_ACCOUNT e0 order by e0.CD_CUSTOMER desc, e0.CD_ACCOUNT asc", &[]),
        vec![13, 12, 10, 11]
    );
}

#[test]
fn test_missing_parameter_is_reported() {
    let engine = engine_with_accounts();
    let error = engine
        .query("select e0.* from TB_ACCOUNT e0 where e0.CD_ACCOUNT = ?", &[])
        .unwrap_err();
    assert_eq!(error, MemoryEngineError::MissingParameter { index: 0 });
}

#[test]
fn test_malformed_statement_is_a_parse_error() {
    let engine = MemoryEngine::new();
    let error = engine.query("select e0.* from", &[]).unwrap_err();
    assert!(matches!(error, MemoryEngineError::Parse { .. }));
}

#[tokio::test]
async fn test_engine_trait_surfaces_errors() {
    let engine = engine_with_accounts();
    assert_eq!(engine.placeholder_style(), None);

    let rows = engine
        .fetch("select e0.* from TB_ACCOUNT e0 where e0.CD_ACCOUNT >= ? limit 1", &[12i64.into()])
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let error = engine.fetch("delete from TB_ACCOUNT", &[]).await.unwrap_err();
    assert!(error.to_string().starts_with("Unsupported statement"));

    let error = engine.fetch("select e0.* from", &[]).await.unwrap_err();
    assert!(error.to_string().starts_with("Parse error"));
}
