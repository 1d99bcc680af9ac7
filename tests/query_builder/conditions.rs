use fluent_query::metamodel::{EntityKey, Value};
use fluent_query::query_builder::{Operand, Operator, QueryBuilder};
use fluent_query::test_helpers::{Account, Customer};
use fluent_query::FluentQueryError;
use rust_decimal::Decimal;

#[test]
fn test_null_checks_carry_no_operand() {
    let mut query = QueryBuilder::<Customer>::for_entity();
    query
        .where_(|c| c.name)
        .unwrap()
        .is_null()
        .and(|c| c.min_balance)
        .unwrap()
        .is_not_null();
    let tree = query.build().unwrap();

    let leaves = tree.predicate().unwrap().comparisons();
    assert_eq!(leaves[0].operator, Operator::IsNull);
    assert_eq!(leaves[1].operator, Operator::IsNotNull);
    assert!(leaves.iter().all(|leaf| leaf.operand == Operand::None));
}

#[test]
fn test_membership_list_keeps_value_order() {
    let mut query = QueryBuilder::<Customer>::for_entity();
    query.where_(|c| c.id).unwrap().in_values([3, 1, 2]).unwrap();
    let tree = query.build().unwrap();

    let leaves = tree.predicate().unwrap().comparisons();
    assert_eq!(leaves[0].operator, Operator::In);
    assert_eq!(
        leaves[0].operand,
        Operand::Values(vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)])
    );
}

#[test]
fn test_empty_membership_list_is_rejected() {
    let mut query = QueryBuilder::<Customer>::for_entity();
    let error = query
        .where_(|c| c.id)
        .unwrap()
        .in_values(Vec::<i64>::new())
        .unwrap_err();
    assert!(error.to_string().contains("must not be empty"));
}

#[test]
fn test_sub_query_is_nested_one_level_down() {
    let mut query = QueryBuilder::<Account>::for_entity();
    query
        .where_(|a| a.customer)
        .unwrap()
        .in_query::<Customer, _>(|q, _| {
            q.select(|c| c.id)?.where_(|c| c.region_code)?.eq(25);
            Ok(())
        })
        .unwrap();
    let tree = query.build().unwrap();

    let leaves = tree.predicate().unwrap().comparisons();
    let Operand::SubQuery(sub) = &leaves[0].operand else {
        panic!("expected a sub-query operand");
    };
    assert_eq!(sub.entity(), EntityKey::of::<Customer>());
    assert_eq!(sub.depth(), 1);
    assert_eq!(sub.projections().len(), 1);
}

#[test]
fn test_correlated_reference_records_outer_depth() {
    let mut query = QueryBuilder::<Account>::for_entity();
    query
        .where_(|a| a.customer)
        .unwrap()
        .in_query::<Customer, _>(|q, account| {
            assert_eq!(account.depth(), 0);
            q.select(|c| c.id)?
                .where_(|c| c.min_balance)?
                .le_outer(account.get(|a| a.balance)?)?;
            Ok(())
        })
        .unwrap();
    let tree = query.build().unwrap();

    let outer_leaves = tree.predicate().unwrap().comparisons();
    let Operand::SubQuery(sub) = &outer_leaves[0].operand else {
        panic!("expected a sub-query operand");
    };
    let inner_leaves = sub.predicate().unwrap().comparisons();
    let Operand::Correlated(reference) = &inner_leaves[0].operand else {
        panic!("expected a correlated operand");
    };
    assert_eq!(reference.depth, 0);
    assert_eq!(reference.attribute.name, "balance");
    assert_eq!(reference.attribute.entity, EntityKey::of::<Account>());
}

#[test]
fn test_sub_query_without_projection_is_rejected() {
    let mut query = QueryBuilder::<Account>::for_entity();
    let error = query
        .where_(|a| a.customer)
        .unwrap()
        .in_query::<Customer, _>(|q, _| {
            q.where_(|c| c.name)?.like("t%");
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(error, FluentQueryError::InvalidQueryStructure { .. }));
    assert!(error.to_string().contains("exactly one attribute, found 0"));
}

#[test]
fn test_sub_query_with_two_projections_is_rejected() {
    let mut query = QueryBuilder::<Account>::for_entity();
    let error = query
        .where_(|a| a.customer)
        .unwrap()
        .in_query::<Customer, _>(|q, _| {
            q.select(|c| c.id)?.select(|c| c.name)?;
            Ok(())
        })
        .unwrap_err();
    assert!(error.to_string().contains("found 2"));
}

#[test]
fn test_sub_query_errors_surface_from_closure() {
    let mut query = QueryBuilder::<Account>::for_entity();
    let error = query
        .where_(|a| a.customer)
        .unwrap()
        .in_query::<Customer, _>(|q, _| {
            q.select(|c| c.id)?;
            q.and(|c| c.id)?.in_values(Vec::<i64>::new())?;
            Ok(())
        })
        .unwrap_err();
    assert!(error.is_construction_error());
}

#[test]
fn test_decimal_comparisons_accept_decimal_values() {
    let mut query = QueryBuilder::<Customer>::for_entity();
    query
        .where_(|c| c.min_balance)
        .unwrap()
        .ge(Decimal::new(1000, 1));
    let tree = query.build().unwrap();
    let leaves = tree.predicate().unwrap().comparisons();
    assert_eq!(leaves[0].operand, Operand::Value(Value::Decimal(Decimal::new(1000, 1))));
}
