use super::engine::Row;
use crate::error::{FluentQueryError, Result};
use crate::metamodel::{Entity, EntityKey, RecordValues, Value};
use crate::naming::NamingConvention;

/// Rebuilds one `E` from a raw row by reversing the column mapping
///
/// Each attribute is read from its physical column, falling back to a column
/// named like the attribute. Missing values stay absent, except for identity
/// attributes, which must be present and non-null.
pub fn map_row<E: Entity>(row: &Row, convention: &NamingConvention) -> Result<E> {
    let mapping = convention.mapping(&EntityKey::of::<E>())?;
    let mut values = RecordValues::new(E::NAME);

    for column in &mapping.columns {
        let value = row
            .get(&column.column)
            .or_else(|| row.get(column.attribute))
            .cloned()
            .unwrap_or(Value::Null);

        if column.identity && value.is_null() {
            return Err(FluentQueryError::row_mapping(
                E::NAME,
                column.attribute,
                format!("identity column {} is missing", column.column),
            ));
        }
        values.insert(column.attribute, value);
    }

    E::from_values(&values)
}
