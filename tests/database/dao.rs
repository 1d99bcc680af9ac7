use crate::common::{accounts, customers, seeded_dao};
use fluent_query::database::{Dao, MemoryEngine, PersistenceEngine, Row};
use fluent_query::error::EngineError;
use fluent_query::metamodel::{EntityType, Value};
use fluent_query::naming::NamingConvention;
use fluent_query::query_builder::{InsertBuilder, QueryBuilder};
use fluent_query::test_helpers::{Account, Customer};
use fluent_query::translation::PlaceholderStyle;
use fluent_query::{FluentQueryConfig, FluentQueryError};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

#[tokio::test]
async fn test_insert_then_find_by_id() {
    let dao = seeded_dao().await;

    let found: Option<Customer> = dao.find_by_id(2i64).await.unwrap();
    assert_eq!(found, Some(customers()[1].clone()));

    let missing: Option<Customer> = dao.find_by_id(99i64).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_list_with_conjunction() {
    let dao = seeded_dao().await;

    let mut query = dao.query::<Customer>();
    query
        .where_(|c| c.name)
        .unwrap()
        .like("t%")
        .and(|c| c.region_code)
        .unwrap()
        .eq(25)
        .and(|c| c.min_balance)
        .unwrap()
        .ge(Decimal::new(1000, 1));
    let found: Vec<Customer> = dao.list(&query.build().unwrap()).await.unwrap();

    assert_eq!(found, vec![customers()[0].clone()]);
}

#[tokio::test]
async fn test_correlated_membership_lists_accounts_in_order() {
    let dao = seeded_dao().await;

    // accounts whose owner's name starts with "t" and whose balance covers the owner's minimum
    let mut query = dao.query::<Account>();
    query
        .where_(|a| a.customer)
        .unwrap()
        .in_query::<Customer, _>(|q, account| {
            q.select(|c| c.id)?
                .where_(|c| c.name)?
                .like("t%")
                .and(|c| c.min_balance)?
                .le_outer(account.get(|a| a.balance)?)?;
            Ok(())
        })
        .unwrap()
        .order_by(|a| a.id)
        .unwrap()
        .asc();
    let found: Vec<Account> = dao.list(&query.build().unwrap()).await.unwrap();

    let ids: Vec<i64> = found.iter().map(|account| account.id).collect();
    assert_eq!(ids, vec![10, 12]);
    assert_eq!(found[0], accounts()[0]);
}

#[tokio::test]
async fn test_single_returns_first_row() {
    let dao = seeded_dao().await;

    let mut query = dao.query::<Account>();
    query.order_by(|a| a.balance).unwrap().desc();
    let richest: Option<Account> = dao.single(&query.build().unwrap()).await.unwrap();
    assert_eq!(richest.map(|account| account.id), Some(13));
}

#[tokio::test]
async fn test_paginated_listing() {
    let dao = seeded_dao().await;

    let mut query = dao.query::<Account>();
    query.order_by(|a| a.id).unwrap().asc();
    query.paginate(2, 3).unwrap();
    let page: Vec<Account> = dao.list(&query.build().unwrap()).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, 13);
}

#[tokio::test]
async fn test_projected_rows() {
    let dao = seeded_dao().await;

    let mut query = dao.query::<Customer>();
    query
        .select(|c| c.region_code)
        .unwrap()
        .group_by(|c| c.region_code)
        .unwrap()
        .order_by(|c| c.region_code)
        .unwrap()
        .asc();
    let rows = dao.fetch_rows(&query.build().unwrap()).await.unwrap();
    let regions: Vec<_> = rows.iter().map(|row| row.get("NU_REGION_CODE").cloned()).collect();
    assert_eq!(regions, vec![Some(Value::Integer(25)), Some(Value::Integer(30))]);
}

#[tokio::test]
async fn test_insert_tree_with_explicit_bindings() {
    let dao = Dao::new(MemoryEngine::new(), Arc::new(NamingConvention::new()));
    dao.register(&[EntityType::of::<Customer>()]).unwrap();

    let mut insert = InsertBuilder::<Customer>::for_entity();
    insert.value(|c| c.id).unwrap().set(7).value(|c| c.name).unwrap().set("tess");
    let affected = dao.insert_tree(&insert.build().unwrap()).await.unwrap();
    assert_eq!(affected, 1);

    let rows = dao.engine().rows("TB_CUSTOMER");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("DS_NAME"), Some(&Value::Text("tess".to_string())));
}

#[tokio::test]
async fn test_list_rejects_mismatched_target() {
    let dao = seeded_dao().await;
    let tree = QueryBuilder::<Customer>::for_entity().build().unwrap();
    let error = dao.list::<Account>(&tree).await.unwrap_err();
    assert!(matches!(error, FluentQueryError::InvalidQueryStructure { .. }));
}

#[tokio::test]
async fn test_unregistered_sub_query_entity_fails_translation() {
    let dao = Dao::new(MemoryEngine::new(), Arc::new(NamingConvention::new()));

    let mut query = dao.query::<Account>();
    query
        .where_(|a| a.customer)
        .unwrap()
        .in_query::<Customer, _>(|q, _| {
            q.select(|c| c.id)?;
            Ok(())
        })
        .unwrap();
    let error = dao.list::<Account>(&query.build().unwrap()).await.unwrap_err();
    assert!(matches!(error, FluentQueryError::UnknownEntity { .. }));
}

/// Engine that records statements and fails every call
#[derive(Debug, Default)]
struct FailingEngine {
    statements: Mutex<Vec<(String, Vec<Value>)>>,
}

#[async_trait]
impl PersistenceEngine for FailingEngine {
    fn placeholder_style(&self) -> Option<PlaceholderStyle> {
        Some(PlaceholderStyle::Numbered)
    }

    async fn fetch(&self, statement: &str, parameters: &[Value]) -> Result<Vec<Row>, EngineError> {
        self.statements
            .lock()
            .push((statement.to_string(), parameters.to_vec()));
        Err("connection reset".into())
    }

    async fn execute(&self, statement: &str, parameters: &[Value]) -> Result<u64, EngineError> {
        self.statements
            .lock()
            .push((statement.to_string(), parameters.to_vec()));
        Err("read-only replica".into())
    }
}

#[tokio::test]
async fn test_engine_failures_are_wrapped_with_statement() {
    let dao = Dao::from_config(FailingEngine::default(), &FluentQueryConfig::default());
    dao.register(&[EntityType::of::<Customer>()]).unwrap();

    let mut query = dao.query::<Customer>();
    query.where_(|c| c.region_code).unwrap().eq(25);
    let error = dao.list::<Customer>(&query.build().unwrap()).await.unwrap_err();

    match &error {
        FluentQueryError::Execution {
            statement,
            parameters,
            ..
        } => {
            assert_eq!(
                statement,
                "select e0.* from TB_CUSTOMER e0 where e0.NU_REGION_CODE = $1"
            );
            assert_eq!(parameters, &vec![Value::Integer(25)]);
        }
        other => panic!("expected an execution error, got {other:?}"),
    }
    assert!(std::error::Error::source(&error).is_some());

    let insert_error = dao.insert(&customers()[0]).await.unwrap_err();
    assert!(insert_error.to_string().contains("read-only replica"));

    let recorded = dao.engine().statements.lock();
    assert_eq!(recorded.len(), 2);
    assert!(recorded[1].0.starts_with("insert into TB_CUSTOMER (CD_CUSTOMER"));
    assert!(recorded[1].0.contains("$1"));
}
