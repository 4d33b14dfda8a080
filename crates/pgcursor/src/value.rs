//! Bound argument values.
//!
//! Every placeholder in a rendered statement is bound to a [`Value`]. Condition
//! literals come out of the operator mini-language as text (`{age: ">=18"}` binds
//! `"18"`), so `Value` coerces text to whatever parameter type Postgres inferred for
//! the placeholder instead of requiring the caller to pick a Rust type up front.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type};

type BindResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

/// A value bound to one `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value, narrowed to the parameter type at bind time.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value, coerced to the parameter type at bind time.
    Text(String),
    /// JSON document.
    Json(serde_json::Value),
}

impl Value {
    /// Returns the text payload, if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Text(v.to_rfc3339())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> BindResult {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => text_to_sql(if *b { "true" } else { "false" }, ty, out),
            },
            Value::Int(n) => int_to_sql(*n, ty, out),
            Value::Float(x) => match *ty {
                Type::FLOAT4 => (*x as f32).to_sql(ty, out),
                Type::FLOAT8 => x.to_sql(ty, out),
                _ => text_to_sql(&x.to_string(), ty, out),
            },
            Value::Text(s) => text_to_sql(s, ty, out),
            Value::Json(v) => match *ty {
                Type::JSON | Type::JSONB => v.to_sql(ty, out),
                _ => text_to_sql(&v.to_string(), ty, out),
            },
        }
    }

    // Type mismatches are reported by `to_sql` with the offending text.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn int_to_sql(n: i64, ty: &Type, out: &mut BytesMut) -> BindResult {
    match *ty {
        Type::INT2 => i16::try_from(n)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(n)?.to_sql(ty, out),
        Type::INT8 => n.to_sql(ty, out),
        Type::OID => u32::try_from(n)?.to_sql(ty, out),
        Type::FLOAT4 => (n as f32).to_sql(ty, out),
        Type::FLOAT8 => (n as f64).to_sql(ty, out),
        _ => text_to_sql(&n.to_string(), ty, out),
    }
}

fn text_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> BindResult {
    match *ty {
        Type::BOOL => parse_bool(s)?.to_sql(ty, out),
        Type::INT2 => s.trim().parse::<i16>()?.to_sql(ty, out),
        Type::INT4 => s.trim().parse::<i32>()?.to_sql(ty, out),
        Type::INT8 => s.trim().parse::<i64>()?.to_sql(ty, out),
        Type::OID => s.trim().parse::<u32>()?.to_sql(ty, out),
        Type::FLOAT4 => s.trim().parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => s.trim().parse::<f64>()?.to_sql(ty, out),
        Type::NUMERIC => parse_decimal(s)?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out),
        Type::UUID => uuid::Uuid::parse_str(s.trim())?.to_sql(ty, out),
        Type::DATE => s.trim().parse::<NaiveDate>()?.to_sql(ty, out),
        Type::TIME => s.trim().parse::<NaiveTime>()?.to_sql(ty, out),
        Type::TIMESTAMP => parse_timestamp(s)?.to_sql(ty, out),
        Type::TIMESTAMPTZ => parse_timestamptz(s)?.to_sql(ty, out),
        _ if <&str as ToSql>::accepts(ty) => <&str as ToSql>::to_sql(&s, ty, out),
        _ => match ty.kind() {
            Kind::Enum(labels) => enum_to_sql(s, labels, ty, out),
            _ => Err(format!("cannot bind {s:?} to a parameter of type {ty}").into()),
        },
    }
}

// Enum values travel as their label bytes.
fn enum_to_sql(s: &str, labels: &[String], ty: &Type, out: &mut BytesMut) -> BindResult {
    if !labels.is_empty() && !labels.iter().any(|label| label == s) {
        return Err(format!("{s:?} is not a label of enum {ty}").into());
    }
    out.extend_from_slice(s.as_bytes());
    Ok(IsNull::No)
}

// Accepts plain and scientific notation (`1.5`, `1e-7`).
fn parse_decimal(s: &str) -> Result<Decimal, rust_decimal::Error> {
    let s = s.trim();
    s.parse::<Decimal>()
        .or_else(|err| Decimal::from_scientific(s).map_err(|_| err))
}

fn parse_bool(s: &str) -> Result<bool, Box<dyn Error + Sync + Send>> {
    match s.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("invalid boolean literal {s:?}").into()),
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
}

// Offset-less input is taken as UTC.
fn parse_timestamptz(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let s = s.trim();
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z")
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| parse_timestamp(s).map(|naive| naive.and_utc())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value, ty: &Type) -> BytesMut {
        let mut buf = BytesMut::new();
        let is_null = value.to_sql_checked(ty, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::No));
        buf
    }

    #[test]
    fn text_literal_coerces_to_integer_parameter() {
        let buf = encode(&Value::from("42"), &Type::INT4);
        assert_eq!(&buf[..], &42i32.to_be_bytes());

        let buf = encode(&Value::from(" 7 "), &Type::INT8);
        assert_eq!(&buf[..], &7i64.to_be_bytes());
    }

    #[test]
    fn text_literal_binds_as_is_to_text_parameter() {
        let buf = encode(&Value::from("%ali_e%"), &Type::TEXT);
        assert_eq!(&buf[..], b"%ali_e%");

        let buf = encode(&Value::from("x"), &Type::VARCHAR);
        assert_eq!(&buf[..], b"x");
    }

    #[test]
    fn text_literal_coerces_to_bool_parameter() {
        assert_eq!(&encode(&Value::from("t"), &Type::BOOL)[..], &[1]);
        assert_eq!(&encode(&Value::from("FALSE"), &Type::BOOL)[..], &[0]);
        assert_eq!(&encode(&Value::from("1"), &Type::BOOL)[..], &[1]);
    }

    #[test]
    fn integer_is_range_checked_when_narrowed() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(70_000).to_sql_checked(&Type::INT2, &mut buf).is_err());

        let buf = encode(&Value::Int(300), &Type::INT2);
        assert_eq!(&buf[..], &300i16.to_be_bytes());
    }

    #[test]
    fn integer_widens_to_float_parameter() {
        let buf = encode(&Value::Int(3), &Type::FLOAT8);
        assert_eq!(&buf[..], &3f64.to_be_bytes());
    }

    #[test]
    fn unparsable_text_is_a_bind_error() {
        let mut buf = BytesMut::new();
        assert!(Value::from("abc").to_sql_checked(&Type::INT4, &mut buf).is_err());
        assert!(Value::from("maybe").to_sql_checked(&Type::BOOL, &mut buf).is_err());
        assert!(Value::from("x").to_sql_checked(&Type::BYTEA, &mut buf).is_err());
    }

    #[test]
    fn null_binds_as_sql_null_for_any_type() {
        let mut buf = BytesMut::new();
        let is_null = Value::Null.to_sql_checked(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn text_coerces_to_uuid_and_dates() {
        let id = uuid::Uuid::new_v4();
        let buf = encode(&Value::from(id), &Type::UUID);
        assert_eq!(&buf[..], id.as_bytes());

        encode(&Value::from("2024-02-29"), &Type::DATE);
        encode(&Value::from("2024-02-29 12:30:00"), &Type::TIMESTAMP);
        encode(&Value::from("2024-02-29T12:30:00.5"), &Type::TIMESTAMP);
        encode(&Value::from("2024-02-29T12:30:00Z"), &Type::TIMESTAMPTZ);
        encode(&Value::from("2024-02-29 12:30:00"), &Type::TIMESTAMPTZ);
    }

    #[test]
    fn numbers_and_text_coerce_to_numeric() {
        let expected = |d: Decimal| {
            let mut buf = BytesMut::new();
            d.to_sql(&Type::NUMERIC, &mut buf).unwrap();
            buf
        };

        assert_eq!(encode(&Value::from("10"), &Type::NUMERIC), expected(Decimal::from(10)));
        assert_eq!(encode(&Value::from(1.5), &Type::NUMERIC), expected(Decimal::new(15, 1)));
        assert_eq!(encode(&Value::Int(3), &Type::NUMERIC), expected(Decimal::from(3)));
        assert_eq!(encode(&Value::from("1e-2"), &Type::NUMERIC), expected(Decimal::new(1, 2)));

        let mut buf = BytesMut::new();
        assert!(Value::from("ten").to_sql_checked(&Type::NUMERIC, &mut buf).is_err());
    }

    #[test]
    fn text_coerces_to_time() {
        let expected = {
            let mut buf = BytesMut::new();
            NaiveTime::from_hms_opt(12, 30, 0)
                .unwrap()
                .to_sql(&Type::TIME, &mut buf)
                .unwrap();
            buf
        };
        assert_eq!(encode(&Value::from("12:30:00"), &Type::TIME), expected);
        encode(&Value::from("08:15:00.250"), &Type::TIME);
    }

    #[test]
    fn text_binds_to_enum_label() {
        let mood = Type::new(
            "mood".to_string(),
            90_001,
            Kind::Enum(vec!["happy".to_string(), "sad".to_string()]),
            "public".to_string(),
        );

        assert_eq!(&encode(&Value::from("sad"), &mood)[..], b"sad");

        let mut buf = BytesMut::new();
        assert!(Value::from("angry").to_sql_checked(&mood, &mut buf).is_err());
    }

    #[test]
    fn json_binds_to_jsonb_and_text_parses_as_json() {
        let doc = serde_json::json!({"a": 1});
        let direct = encode(&Value::from(doc.clone()), &Type::JSONB);
        let parsed = encode(&Value::from(doc.to_string()), &Type::JSONB);
        assert_eq!(direct, parsed);
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
        assert!(Value::from(None::<&str>).is_null());
    }

    #[test]
    fn display_renders_payload() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::Null.to_string(), "NULL");
    }
}
