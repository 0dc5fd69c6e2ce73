//! Storage of small domain integers as `SMALLINT` columns.

/// Implements the sea-orm value conversions for a type that round-trips
/// through `i16` via `TryFrom<i16>` / `Into<i16>`.
#[macro_export]
macro_rules! small_int_column {
    ($ty:ty, $name:literal) => {
        impl ::sea_orm::sea_query::ValueType for $ty {
            fn try_from(
                v: ::sea_orm::Value,
            ) -> Result<Self, ::sea_orm::sea_query::ValueTypeErr> {
                match v {
                    ::sea_orm::Value::SmallInt(Some(n)) => <$ty as TryFrom<i16>>::try_from(n)
                        .map_err(|_| ::sea_orm::sea_query::ValueTypeErr),
                    _ => Err(::sea_orm::sea_query::ValueTypeErr),
                }
            }

            fn type_name() -> String {
                $name.to_string()
            }

            fn array_type() -> ::sea_orm::sea_query::ArrayType {
                ::sea_orm::sea_query::ArrayType::SmallInt
            }

            fn column_type() -> ::sea_orm::sea_query::ColumnType {
                ::sea_orm::sea_query::ColumnType::SmallInteger
            }
        }

        impl From<$ty> for ::sea_orm::Value {
            fn from(value: $ty) -> Self {
                ::sea_orm::Value::SmallInt(Some(i16::from(value)))
            }
        }

        impl ::sea_orm::TryGetable for $ty {
            fn try_get_by<I: ::sea_orm::ColIdx>(
                res: &::sea_orm::QueryResult,
                index: I,
            ) -> Result<Self, ::sea_orm::TryGetError> {
                let val: i16 = res.try_get_by(index)?;

                <$ty as TryFrom<i16>>::try_from(val).map_err(|e| {
                    ::sea_orm::TryGetError::DbErr(::sea_orm::DbErr::Type(format!(
                        "Failed to decode {}: {e}",
                        $name
                    )))
                })
            }
        }

        impl ::sea_orm::sea_query::Nullable for $ty {
            fn null() -> ::sea_orm::Value {
                ::sea_orm::Value::SmallInt(None)
            }
        }
    };
}
