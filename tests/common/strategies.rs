use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for LIKE patterns built from plain characters and wildcards
pub fn like_pattern_strategy() -> impl Strategy<Value = String> {
    "[a-z%_]{1,12}"
}

/// Strategy for region codes
pub fn region_code_strategy() -> impl Strategy<Value = i64> {
    0i64..1000
}

/// Strategy for balances with up to two decimal places
pub fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000, 0u32..=2).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Strategy for membership lists
pub fn id_list_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..10_000, 1..20)
}

/// Strategy for optional 1-indexed pages
pub fn page_strategy() -> impl Strategy<Value = Option<(u64, u64)>> {
    prop::option::of((1u64..100, 1u64..100))
}
