use fluent_query::metamodel::{EntityKey, Reference, Value};
use fluent_query::query_builder::InsertBuilder;
use fluent_query::test_helpers::{Account, Customer};
use fluent_query::FluentQueryError;
use rust_decimal::Decimal;

#[test]
fn test_bindings_keep_call_order() {
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
    let tree = insert.build().unwrap();

    assert_eq!(tree.entity(), EntityKey::of::<Customer>());
    let bindings: Vec<_> = tree
        .bindings()
        .iter()
        .map(|(attribute, value)| (attribute.name, value.clone()))
        .collect();
    assert_eq!(
        bindings,
        vec![
            ("id", Value::Integer(1)),
            ("name", Value::Text("test".to_string())),
            ("min_balance", Value::Decimal(Decimal::new(102, 1))),
        ]
    );
}

#[test]
fn test_duplicate_binding_is_rejected() {
    let mut insert = InsertBuilder::<Customer>::for_entity();
    insert.value(|c| c.name).unwrap().set("first");
    let error = insert.value(|c| c.name).err().unwrap();
    assert!(matches!(error, FluentQueryError::InvalidQueryStructure { .. }));
    assert_eq!(
        error.to_string(),
        "Invalid query structure for Customer.name: bound twice"
    );
}

#[test]
fn test_explicit_null_binding() {
    let mut insert = InsertBuilder::<Customer>::for_entity();
    insert.value(|c| c.id).unwrap().set(5).value(|c| c.name).unwrap().set_null();
    let tree = insert.build().unwrap();
    assert_eq!(tree.bindings()[1].1, Value::Null);
}

#[test]
fn test_association_binding_stores_referenced_identity() {
    let mut insert = InsertBuilder::<Account>::for_entity();
    insert
        .value(|a| a.id)
        .unwrap()
        .set(10)
        .value(|a| a.customer)
        .unwrap()
        .set(Reference::<Customer>::new(1i64));
    let tree = insert.build().unwrap();
    assert_eq!(tree.bindings()[1].0.name, "customer");
    assert_eq!(tree.bindings()[1].1, Value::Integer(1));
}

#[test]
fn test_from_record_binds_present_values() {
    let account = Account::new(12, "A-12", Decimal::new(600, 0), 2);
    let tree = InsertBuilder::from_record(&account).unwrap().build().unwrap();
    let names: Vec<_> = tree.bindings().iter().map(|(a, _)| a.name).collect();
    assert_eq!(names, vec!["id", "account_number", "balance", "customer"]);
}

#[test]
fn test_empty_insert_is_rejected() {
    let error = InsertBuilder::<Account>::for_entity().build().unwrap_err();
    assert!(error.to_string().contains("at least one binding"));
}
