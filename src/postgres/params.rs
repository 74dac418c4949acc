use std::error::Error;

use chrono::{TimeZone, Utc};
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::RowValues;

/// Borrowed Postgres parameters for one statement execution.
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    #[must_use]
    pub fn convert(params: &'a [RowValues]) -> Params<'a> {
        let references = params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        Params { references }
    }

    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            // Narrow to the column's width; i64 wire format is only valid for INT8.
            RowValues::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::FLOAT4 => {
                    #[allow(clippy::cast_precision_loss)]
                    let f = *i as f32;
                    f.to_sql(ty, out)
                }
                Type::FLOAT8 => {
                    #[allow(clippy::cast_precision_loss)]
                    let f = *i as f64;
                    f.to_sql(ty, out)
                }
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                    i.to_string().to_sql(ty, out)
                }
                _ => (*i).to_sql(ty, out),
            },
            RowValues::Float(f) => match *ty {
                Type::FLOAT4 => {
                    #[allow(clippy::cast_possible_truncation)]
                    let narrowed = *f as f32;
                    narrowed.to_sql(ty, out)
                }
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                    f.to_string().to_sql(ty, out)
                }
                _ => (*f).to_sql(ty, out),
            },
            RowValues::Text(s) => s.to_sql(ty, out),
            RowValues::Bool(b) => (*b).to_sql(ty, out),
            RowValues::Timestamp(dt) => match *ty {
                // naive timestamps are taken as UTC
                Type::TIMESTAMPTZ => Utc.from_utc_datetime(dt).to_sql(ty, out),
                Type::DATE => dt.date().to_sql(ty, out),
                _ => dt.to_sql(ty, out),
            },
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => jsval.to_sql(ty, out),
            RowValues::Blob(bytes) => bytes.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &RowValues, ty: &Type) -> Vec<u8> {
        let mut buf = bytes::BytesMut::new();
        value.to_sql_checked(ty, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn ints_follow_column_width() {
        assert_eq!(encode(&RowValues::Int(7), &Type::INT2), 7_i16.to_be_bytes());
        assert_eq!(encode(&RowValues::Int(7), &Type::INT4), 7_i32.to_be_bytes());
        assert_eq!(encode(&RowValues::Int(7), &Type::INT8), 7_i64.to_be_bytes());
        assert_eq!(encode(&RowValues::Int(7), &Type::TEXT), b"7");
    }

    #[test]
    fn timestamps_bind_to_zoned_and_date_columns() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let value = RowValues::Timestamp(dt);

        let mut zoned = bytes::BytesMut::new();
        Utc.from_utc_datetime(&dt)
            .to_sql(&Type::TIMESTAMPTZ, &mut zoned)
            .unwrap();
        assert_eq!(encode(&value, &Type::TIMESTAMPTZ), zoned.to_vec());
        // same instant, same wire value as the naive form
        assert_eq!(encode(&value, &Type::TIMESTAMPTZ), encode(&value, &Type::TIMESTAMP));

        let mut date = bytes::BytesMut::new();
        dt.date().to_sql(&Type::DATE, &mut date).unwrap();
        assert_eq!(encode(&value, &Type::DATE), date.to_vec());
        assert_eq!(date.len(), 4);
    }

    #[test]
    fn out_of_range_int_is_an_error() {
        let mut buf = bytes::BytesMut::new();
        assert!(RowValues::Int(70_000).to_sql_checked(&Type::INT2, &mut buf).is_err());
    }

    #[test]
    fn null_binds_as_null() {
        let mut buf = bytes::BytesMut::new();
        assert!(matches!(
            RowValues::Null.to_sql_checked(&Type::INT4, &mut buf),
            Ok(IsNull::Yes)
        ));
    }
}
