use fluent_query::query_builder::{Pagination, QueryBuilder};
use fluent_query::test_helpers::Customer;
use fluent_query::FluentQueryError;

#[test]
fn test_page_based_pagination() {
    let pagination = Pagination::page(2, 10);
    assert_eq!(pagination.limit, Some(10));
    assert_eq!(pagination.offset, Some(10));
    assert_eq!(pagination.to_sql(), " limit 10 offset 10");
}

#[test]
fn test_first_page_pagination() {
    let pagination = Pagination::page(1, 20);
    assert_eq!(pagination.offset, Some(0));
    assert_eq!(pagination.to_sql(), " limit 20 offset 0");
}

#[test]
fn test_limit_only() {
    let pagination = Pagination::limit_only(5);
    assert_eq!(pagination.offset, None);
    assert_eq!(pagination.to_sql(), " limit 5");
}

#[test]
fn test_offset_only() {
    let pagination = Pagination::offset_only(15);
    assert_eq!(pagination.limit, None);
    assert_eq!(pagination.to_sql(), " offset 15");
}

#[test]
fn test_no_window_renders_nothing() {
    assert!(Pagination::default().is_empty());
    assert_eq!(Pagination::default().to_sql(), "");
}

#[test]
fn test_total_pages_calculation() {
    let pagination = Pagination::page(1, 10);
    assert_eq!(pagination.total_pages(25), 3);
    assert_eq!(pagination.total_pages(30), 3);
    assert_eq!(pagination.total_pages(31), 4);
    assert_eq!(Pagination::default().total_pages(31), 1);
}

#[test]
fn test_current_page_and_next_page() {
    let pagination = Pagination::page(3, 10);
    assert_eq!(pagination.current_page(), 3);
    assert!(pagination.has_next_page(31));
    assert!(!pagination.has_next_page(30));
}

#[test]
fn test_apply_windows_a_sequence() {
    let rows: Vec<u32> = (1..=10).collect();
    assert_eq!(Pagination::page(2, 3).apply(rows), vec![4, 5, 6]);
}

#[test]
fn test_builder_limit_and_offset() {
    let mut query = QueryBuilder::<Customer>::for_entity();
    query.limit(5).offset(20);
    let tree = query.build().unwrap();
    assert_eq!(tree.pagination(), Pagination::limit_only(5).with_offset(20));
}

#[test]
fn test_builder_rejects_page_zero() {
    let mut query = QueryBuilder::<Customer>::for_entity();
    let error = query.paginate(0, 10).err().unwrap();
    assert!(matches!(error, FluentQueryError::BuilderState { .. }));
    assert!(query.paginate(1, 0).is_err());
}
