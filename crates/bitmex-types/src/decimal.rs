//! Decimal field helpers
//!
//! BitMEX sends prices as JSON numbers. Going through `f64` loses precision,
//! so numbers are parsed from their textual form instead.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    fn into_decimal<E: Error>(self) -> Result<Decimal, E> {
        match self {
            Self::String(s) => Decimal::from_str(&s).map_err(E::custom),
            Self::Number(n) => {
                let s = n.to_string();
                // Scientific notation (e.g. 5e-6) only round-trips through f64
                if s.contains('e') || s.contains('E') {
                    let f = n.as_f64().ok_or_else(|| E::custom("invalid number"))?;
                    Decimal::from_f64(f).ok_or_else(|| E::custom("cannot convert to decimal"))
                } else {
                    Decimal::from_str(&s).map_err(E::custom)
                }
            }
        }
    }
}

/// Deserialize an optional decimal, accepting `null`, numbers and strings.
pub(crate) fn deserialize_opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(value) => value.into_decimal().map(Some),
        None => Ok(None),
    }
}
