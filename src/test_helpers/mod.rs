//! Test fixtures.
//!
//! Two small entities with explicit physical names, shared by unit tests,
//! integration tests, benchmarks and documentation examples. `Account.customer`
//! is an association to `Customer` stored in the `CD_CUSTOMER` column.

use crate::error::Result;
use crate::metamodel::{
    Attribute, AttributeDescriptor, Entity, EntityDescriptor, RecordValues, Reference, Value,
};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: Option<String>,
    pub region_code: Option<i64>,
    pub min_balance: Option<Decimal>,
}

pub struct CustomerFields {
    pub id: Attribute<Customer, i64>,
    pub name: Attribute<Customer, String>,
    pub region_code: Attribute<Customer, i64>,
    pub min_balance: Attribute<Customer, Decimal>,
}

impl Customer {
    pub fn new(id: i64, name: &str, region_code: i64, min_balance: Decimal) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            region_code: Some(region_code),
            min_balance: Some(min_balance),
        }
    }
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";

    type Fields = CustomerFields;

    const FIELDS: CustomerFields = CustomerFields {
        id: Attribute::new("id"),
        name: Attribute::new("name"),
        region_code: Attribute::new("region_code"),
        min_balance: Attribute::new("min_balance"),
    };

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new(Self::NAME)
            .with_table("TB_CUSTOMER")
            .attribute(
                AttributeDescriptor::of::<i64>("id")
                    .with_column("CD_CUSTOMER")
                    .as_identity(),
            )
            .attribute(AttributeDescriptor::of::<String>("name").with_column("DS_NAME"))
            .attribute(AttributeDescriptor::of::<i64>("region_code").with_column("NU_REGION_CODE"))
            .attribute(AttributeDescriptor::of::<Decimal>("min_balance").with_column("VL_MIN_BALANCE"))
    }

    fn to_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("region_code", self.region_code.into()),
            ("min_balance", self.min_balance.into()),
        ]
    }

    fn from_values(values: &RecordValues) -> Result<Self> {
        Ok(Self {
            id: values.require("id")?,
            name: values.get("name")?,
            region_code: values.get("region_code")?,
            min_balance: values.get("min_balance")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub account_number: Option<String>,
    pub balance: Option<Decimal>,
    pub customer: Option<Reference<Customer>>,
}

pub struct AccountFields {
    pub id: Attribute<Account, i64>,
    pub account_number: Attribute<Account, String>,
    pub balance: Attribute<Account, Decimal>,
    pub customer: Attribute<Account, Reference<Customer>>,
}

impl Account {
    pub fn new(id: i64, account_number: &str, balance: Decimal, customer: i64) -> Self {
        Self {
            id,
            account_number: Some(account_number.to_string()),
            balance: Some(balance),
            customer: Some(Reference::new(customer)),
        }
    }
}

impl Entity for Account {
    const NAME: &'static str = "Account";

    type Fields = AccountFields;

    const FIELDS: AccountFields = AccountFields {
        id: Attribute::new("id"),
        account_number: Attribute::new("account_number"),
        balance: Attribute::new("balance"),
        customer: Attribute::new("customer"),
    };

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new(Self::NAME)
            .with_table("TB_ACCOUNT")
            .attribute(
                AttributeDescriptor::of::<i64>("id")
                    .with_column("CD_ACCOUNT")
                    .as_identity(),
            )
            .attribute(AttributeDescriptor::of::<String>("account_number").with_column("NU_ACCOUNT"))
            .attribute(AttributeDescriptor::of::<Decimal>("balance").with_column("VL_BALANCE"))
            .attribute(AttributeDescriptor::of::<Reference<Customer>>("customer").with_column("CD_CUSTOMER"))
    }

    fn to_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("account_number", self.account_number.clone().into()),
            ("balance", self.balance.into()),
            ("customer", self.customer.clone().into()),
        ]
    }

    fn from_values(values: &RecordValues) -> Result<Self> {
        Ok(Self {
            id: values.require("id")?,
            account_number: values.get("account_number")?,
            balance: values.get("balance")?,
            customer: values.get("customer")?,
        })
    }
}
