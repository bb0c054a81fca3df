//! Property-based test generators using proptest.

use proptest::prelude::*;
use txkv_core::{Key, Record, Value};

/// Strategy for keys drawn from a small range so operations collide.
pub fn key_strategy() -> impl Strategy<Value = Key> {
    (0u64..16).prop_map(Key::new)
}

/// Strategy for field values.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[a-z]{0,12}".prop_map(Value::Text),
    ]
}

/// Strategy for records with one to four fields.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::btree_map("[a-z]{1,8}", value_strategy(), 1..5)
        .prop_map(|fields| fields.into_iter().collect::<Record>())
}

/// A single buffered operation: `Some` is a put, `None` a delete.
pub type WriteOp = (Key, Option<Record>);

/// Strategy for a sequence of puts and deletes.
pub fn write_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<WriteOp>> {
    prop::collection::vec(
        (key_strategy(), prop::option::weighted(0.8, record_strategy())),
        0..max_len,
    )
}

/// Strategy for an initial committed table.
pub fn table_strategy() -> impl Strategy<Value = Vec<(Key, Record)>> {
    prop::collection::vec((key_strategy(), record_strategy()), 0..8)
}

/// Test configuration presets.
pub fn quick_config() -> ProptestConfig {
    ProptestConfig::with_cases(64)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(quick_config())]

        #[test]
        fn keys_stay_in_range(key in key_strategy()) {
            prop_assert!(key.as_u64() < 16);
        }

        #[test]
        fn records_are_never_empty(record in record_strategy()) {
            prop_assert!(!record.is_empty());
            prop_assert!(record.len() <= 4);
        }
    }
}
