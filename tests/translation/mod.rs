//! Statement translation against the fixture naming.

use crate::common::discovered_convention;
use fluent_query::metamodel::Value;
use fluent_query::naming::{NamingConvention, NamingOverrides};
use fluent_query::query_builder::{InsertBuilder, QueryBuilder};
use fluent_query::test_helpers::{Account, Customer};
use fluent_query::translation::{PlaceholderStyle, SqlTranslator};
use fluent_query::FluentQueryError;
use rust_decimal::Decimal;

fn correlated_accounts_query() -> fluent_query::QueryTree {
    let mut query = QueryBuilder::<Account>::for_entity();
    query
        .where_(|a| a.account_number)
        .unwrap()
        .like("A%")
        .and(|a| a.customer)
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
    query.build().unwrap()
}

#[test]
fn test_select_all_attributes() {
    let convention = discovered_convention();
    let tree = QueryBuilder::<Customer>::for_entity().build().unwrap();
    let statement = SqlTranslator::new(&convention).translate(&tree).unwrap();
    assert_eq!(statement.text, "select e0.* from TB_CUSTOMER e0");
    assert_eq!(statement.parameter_count(), 0);
}

#[test]
fn test_conjunction_with_positional_parameters() {
    let convention = discovered_convention();
    let mut query = QueryBuilder::<Customer>::for_entity();
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
    let statement = SqlTranslator::new(&convention)
        .translate(&query.build().unwrap())
        .unwrap();

    assert_eq!(
        statement.text,
        "select e0.* from TB_CUSTOMER e0 where e0.DS_NAME like ? and e0.NU_REGION_CODE = ? \
         and e0.VL_MIN_BALANCE >= ?"
    );
    assert_eq!(
        statement.positional,
        vec![
            Value::Text("t%".to_string()),
            Value::Integer(25),
            Value::Decimal(Decimal::new(1000, 1)),
        ]
    );
}

#[test]
fn test_insert_with_named_parameters() {
    let convention = discovered_convention();
    let mut insert = InsertBuilder::<Customer>::for_entity();
    insert
        .value(|c| c.id)
        .unwrap()
        .set(1)
        .value(|c| c.name)
        .unwrap()
        .set("test")
        .value(|c| c.min_balance)
        .unwrap()
        .set(Decimal::new(102, 1));
    let statement = SqlTranslator::new(&convention)
        .translate_insert(&insert.build().unwrap())
        .unwrap();

    assert_eq!(
        statement.text,
        "insert into TB_CUSTOMER (CD_CUSTOMER, DS_NAME, VL_MIN_BALANCE) values (:p0, :p1, :p2)"
    );
    assert_eq!(statement.parameter("p0"), Some(&Value::Integer(1)));
    assert_eq!(statement.parameter("p1"), Some(&Value::Text("test".to_string())));
    assert_eq!(
        statement.parameter("p2"),
        Some(&Value::Decimal(Decimal::new(102, 1)))
    );
    assert_eq!(statement.named.len(), 3);
}

#[test]
fn test_correlated_sub_query() {
    let convention = discovered_convention();
    let statement = SqlTranslator::new(&convention)
        .translate(&correlated_accounts_query())
        .unwrap();

    assert_eq!(
        statement.text,
        "select e0.* from TB_ACCOUNT e0 where e0.NU_ACCOUNT like ? and e0.CD_CUSTOMER in \
         (select e1.CD_CUSTOMER from TB_CUSTOMER e1 where e1.DS_NAME like ? and \
         e1.VL_MIN_BALANCE <= e0.VL_BALANCE) order by e0.CD_ACCOUNT asc"
    );
    assert_eq!(
        statement.positional,
        vec![Value::Text("A%".to_string()), Value::Text("t%".to_string())]
    );
}

#[test]
fn test_sub_query_parameters_sit_between_outer_parameters() {
    let convention = discovered_convention();
    let mut query = QueryBuilder::<Account>::for_entity();
    query
        .where_(|a| a.id)
        .unwrap()
        .gt(1)
        .and(|a| a.customer)
        .unwrap()
        .in_query::<Customer, _>(|q, _| {
            q.select(|c| c.id)?.where_(|c| c.region_code)?.eq(2);
            Ok(())
        })
        .unwrap()
        .and(|a| a.id)
        .unwrap()
        .lt(3);
    let statement = SqlTranslator::new(&convention)
        .with_query_placeholders(PlaceholderStyle::Numbered)
        .translate(&query.build().unwrap())
        .unwrap();

    assert_eq!(
        statement.text,
        "select e0.* from TB_ACCOUNT e0 where e0.CD_ACCOUNT > $1 and e0.CD_CUSTOMER in \
         (select e1.CD_CUSTOMER from TB_CUSTOMER e1 where e1.NU_REGION_CODE = $2) \
         and e0.CD_ACCOUNT < $3"
    );
    assert_eq!(
        statement.positional,
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
    );
}

#[test]
fn test_nested_groups_are_parenthesized() {
    let convention = discovered_convention();
    let mut query = QueryBuilder::<Customer>::for_entity();
    query
        .where_(|c| c.region_code)
        .unwrap()
        .eq(25)
        .and_group(|g| {
            g.where_(|c| c.name)?.like("t%").or(|c| c.name)?.is_null();
            Ok(())
        })
        .unwrap()
        .or(|c| c.id)
        .unwrap()
        .eq(9);
    let statement = SqlTranslator::new(&convention)
        .translate(&query.build().unwrap())
        .unwrap();

    assert_eq!(
        statement.text,
        "select e0.* from TB_CUSTOMER e0 where (e0.NU_REGION_CODE = ? and \
         (e0.DS_NAME like ? or e0.DS_NAME is null)) or e0.CD_CUSTOMER = ?"
    );
}

#[test]
fn test_projection_grouping_and_window() {
    let convention = discovered_convention();
    let mut query = QueryBuilder::<Customer>::for_entity();
    query
        .select(|c| c.region_code)
        .unwrap()
        .group_by(|c| c.region_code)
        .unwrap()
        .order_by(|c| c.region_code)
        .unwrap()
        .desc();
    query.paginate(2, 10).unwrap();
    let statement = SqlTranslator::new(&convention)
        .translate(&query.build().unwrap())
        .unwrap();

    assert_eq!(
        statement.text,
        "select e0.NU_REGION_CODE from TB_CUSTOMER e0 group by e0.NU_REGION_CODE \
         order by e0.NU_REGION_CODE desc limit 10 offset 10"
    );
}

#[test]
fn test_membership_list_placeholders() {
    let convention = discovered_convention();
    let mut query = QueryBuilder::<Customer>::for_entity();
    query.where_(|c| c.id).unwrap().in_values([1, 2]).unwrap();
    let statement = SqlTranslator::new(&convention)
        .with_query_placeholders(PlaceholderStyle::Named)
        .translate(&query.build().unwrap())
        .unwrap();
    assert_eq!(
        statement.text,
        "select e0.* from TB_CUSTOMER e0 where e0.CD_CUSTOMER in (:p0, :p1)"
    );
}

#[test]
fn test_translation_is_deterministic() {
    let convention = discovered_convention();
    let tree = correlated_accounts_query();
    let translator = SqlTranslator::new(&convention);
    assert_eq!(
        translator.translate(&tree).unwrap(),
        translator.translate(&tree).unwrap()
    );
}

#[test]
fn test_overridden_names_are_emitted() {
    let convention = NamingConvention::new().with_overrides(
        NamingOverrides::new()
            .with_table("Customer", "CLIENTS")
            .with_column("Customer", "name", "FULL_NAME"),
    );
    convention.discover_entity::<Customer>().unwrap();

    let mut query = QueryBuilder::<Customer>::for_entity();
    query.where_(|c| c.name).unwrap().eq("tom");
    let statement = SqlTranslator::new(&convention)
        .translate(&query.build().unwrap())
        .unwrap();
    assert_eq!(
        statement.text,
        "select e0.* from CLIENTS e0 where e0.FULL_NAME = ?"
    );
}

#[test]
fn test_undiscovered_sub_query_entity_fails() {
    let convention = NamingConvention::new();
    convention.discover_entity::<Account>().unwrap();
    let error = SqlTranslator::new(&convention)
        .translate(&correlated_accounts_query())
        .unwrap_err();
    assert!(matches!(error, FluentQueryError::UnknownEntity { .. }));
}
