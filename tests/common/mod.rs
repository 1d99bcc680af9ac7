#![allow(dead_code)]

pub mod strategies;

use fluent_query::database::{Dao, MemoryEngine};
use fluent_query::metamodel::EntityType;
use fluent_query::naming::NamingConvention;
use fluent_query::test_helpers::{Account, Customer};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Convention with both fixture entities discovered
pub fn discovered_convention() -> NamingConvention {
    let convention = NamingConvention::new();
    convention
        .discover(&[EntityType::of::<Customer>(), EntityType::of::<Account>()])
        .expect("fixture entities should be discoverable");
    convention
}

pub fn customers() -> Vec<Customer> {
    vec![
        Customer::new(1, "tom", 25, Decimal::new(1000, 1)),
        Customer::new(2, "tara", 30, Decimal::new(5000, 1)),
        Customer::new(3, "bob", 25, Decimal::new(50, 0)),
    ]
}

pub fn accounts() -> Vec<Account> {
    vec![
        Account::new(10, "A-10", Decimal::new(150, 0), 1),
        Account::new(11, "A-11", Decimal::new(90, 0), 1),
        Account::new(12, "A-12", Decimal::new(600, 0), 2),
        Account::new(13, "B-13", Decimal::new(700, 0), 3),
    ]
}

/// In-memory DAO holding the fixture customers and accounts
pub async fn seeded_dao() -> Dao<MemoryEngine> {
    let dao = Dao::new(MemoryEngine::new(), Arc::new(NamingConvention::new()));
    dao.register(&[EntityType::of::<Customer>(), EntityType::of::<Account>()])
        .expect("fixture entities should register");

    for customer in customers() {
        dao.insert(&customer).await.expect("customer insert");
    }
    for account in accounts() {
        dao.insert(&account).await.expect("account insert");
    }
    dao
}
