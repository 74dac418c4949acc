use std::error::Error;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use tokio_postgres::types::{FromSql, Kind, Type};
use tokio_postgres::{Row, Statement};

use crate::error::DbToolsError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Build a result set from rows of a prepared statement.
///
/// Column names come from the statement, so an empty result still reports them.
///
/// # Errors
/// Returns `DbToolsError` if a value cannot be extracted.
pub fn build_result_set(stmt: &Statement, rows: &[Row]) -> Result<ResultSet, DbToolsError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_columns(column_names, rows.len());
    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Extract a `RowValues` from a `tokio_postgres` row at the given index.
///
/// # Errors
/// Returns `DbToolsError` if the column cannot be read as the mapped type.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<RowValues, DbToolsError> {
    let type_name = row.columns()[idx].type_().name();

    let value = match type_name {
        "int2" => row
            .try_get::<_, Option<i16>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))),
        "int8" => row
            .try_get::<_, Option<i64>>(idx)?
            .map_or(RowValues::Null, RowValues::Int),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Float(f64::from(v))),
        "float8" => row
            .try_get::<_, Option<f64>>(idx)?
            .map_or(RowValues::Null, RowValues::Float),
        "bool" => row
            .try_get::<_, Option<bool>>(idx)?
            .map_or(RowValues::Null, RowValues::Bool),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map_or(RowValues::Null, RowValues::Timestamp),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Timestamp(v.naive_utc())),
        "json" | "jsonb" => row
            .try_get::<_, Option<Value>>(idx)?
            .map_or(RowValues::Null, RowValues::JSON),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)?
            .map_or(RowValues::Null, RowValues::Blob),
        "date" => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Text(v.to_string())),
        "time" => row
            .try_get::<_, Option<NaiveTime>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Text(v.to_string())),
        _ => row.try_get::<_, AnyValue>(idx)?.0,
    };
    Ok(value)
}

/// Decodes any column type, so a query never fails on an unmapped type.
///
/// Text-like types (including enums) become `Text`, `numeric` and `uuid`
/// are rendered as their usual text form, and everything else keeps its
/// binary wire bytes as a `Blob`.
struct AnyValue(RowValues);

impl<'a> FromSql<'a> for AnyValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let value = match *ty {
            Type::NUMERIC => RowValues::Text(numeric_text(raw)?),
            Type::UUID => RowValues::Text(uuid_text(raw)?),
            _ if <String as FromSql>::accepts(ty) || matches!(ty.kind(), Kind::Enum(_)) => {
                RowValues::Text(std::str::from_utf8(raw)?.to_string())
            }
            _ => RowValues::Blob(raw.to_vec()),
        };
        Ok(AnyValue(value))
    }

    fn from_sql_null(_: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(AnyValue(RowValues::Null))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Render a binary `numeric` (base-10000 digits) at its declared scale.
fn numeric_text(raw: &[u8]) -> Result<String, Box<dyn Error + Sync + Send>> {
    let word = |i: usize| -> Result<[u8; 2], Box<dyn Error + Sync + Send>> {
        raw.get(i * 2..i * 2 + 2)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| "truncated numeric value".into())
    };
    let ndigits = usize::try_from(i16::from_be_bytes(word(0)?))?;
    let weight = i32::from(i16::from_be_bytes(word(1)?));
    let sign = u16::from_be_bytes(word(2)?);
    let dscale = usize::from(u16::from_be_bytes(word(3)?));
    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        _ => {}
    }
    let digits = (0..ndigits)
        .map(|i| word(4 + i).map(i16::from_be_bytes))
        .collect::<Result<Vec<_>, _>>()?;
    let digit_at = |pos: i32| -> i16 {
        usize::try_from(pos)
            .ok()
            .and_then(|p| digits.get(p).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        write!(out, "{}", digit_at(0))?;
        for pos in 1..=weight {
            write!(out, "{:04}", digit_at(pos))?;
        }
    }
    if dscale > 0 {
        let mut frac = String::with_capacity(dscale + 4);
        let mut pos = weight + 1;
        while frac.len() < dscale {
            write!(frac, "{:04}", digit_at(pos))?;
            pos += 1;
        }
        frac.truncate(dscale);
        out.push('.');
        out.push_str(&frac);
    }
    Ok(out)
}

fn uuid_text(raw: &[u8]) -> Result<String, Box<dyn Error + Sync + Send>> {
    if raw.len() != 16 {
        return Err(format!("uuid must be 16 bytes, got {}", raw.len()).into());
    }
    let mut out = String::with_capacity(36);
    for (i, byte) in raw.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        write!(out, "{byte:02x}")?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(weight: i16, sign: u16, dscale: u16, digits: &[i16]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend(i16::try_from(digits.len()).unwrap().to_be_bytes());
        raw.extend(weight.to_be_bytes());
        raw.extend(sign.to_be_bytes());
        raw.extend(dscale.to_be_bytes());
        for d in digits {
            raw.extend(d.to_be_bytes());
        }
        raw
    }

    #[test]
    fn numeric_renders_at_scale() {
        assert_eq!(numeric_text(&numeric(0, 0, 1, &[1, 5000])).unwrap(), "1.5");
        assert_eq!(
            numeric_text(&numeric(0, 0, 16, &[1, 5000])).unwrap(),
            "1.5000000000000000"
        );
        assert_eq!(
            numeric_text(&numeric(1, NUMERIC_NEG, 2, &[12, 3456, 7800])).unwrap(),
            "-123456.78"
        );
        assert_eq!(numeric_text(&numeric(-1, 0, 4, &[1])).unwrap(), "0.0001");
        assert_eq!(numeric_text(&numeric(0, 0, 0, &[])).unwrap(), "0");
        assert_eq!(numeric_text(&numeric(1, 0, 0, &[1])).unwrap(), "10000");
        assert_eq!(numeric_text(&numeric(0, NUMERIC_NAN, 0, &[])).unwrap(), "NaN");
    }

    #[test]
    fn numeric_rejects_truncated_input() {
        assert!(numeric_text(&[0, 2, 0, 0]).is_err());
        let mut raw = numeric(0, 0, 1, &[1, 5000]);
        raw.pop();
        assert!(numeric_text(&raw).is_err());
    }

    #[test]
    fn fallback_accepts_unmapped_types() {
        let uuid: Vec<u8> = (0..16).collect();
        let AnyValue(value) = AnyValue::from_sql(&Type::UUID, &uuid).unwrap();
        assert_eq!(
            value,
            RowValues::Text("00010203-0405-0607-0809-0a0b0c0d0e0f".into())
        );

        let AnyValue(value) = AnyValue::from_sql(&Type::TEXT, b"plain").unwrap();
        assert_eq!(value, RowValues::Text("plain".into()));

        let AnyValue(value) = AnyValue::from_sql(&Type::INET, &[2, 32, 0, 4, 10, 0, 0, 1]).unwrap();
        assert_eq!(value, RowValues::Blob(vec![2, 32, 0, 4, 10, 0, 0, 1]));

        assert!(<AnyValue as FromSql>::accepts(&Type::INTERVAL));
        let AnyValue(value) = AnyValue::from_sql_null(&Type::NUMERIC).unwrap();
        assert_eq!(value, RowValues::Null);
    }
}
