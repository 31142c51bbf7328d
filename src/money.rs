// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Decimal helpers for amounts exchanged with the API.
//!
//! The server speaks plain JSON numbers. Inbound values are coerced the way
//! the web forms did: missing, `null` or non-numeric input counts as zero.
//! Outbound amounts go back out as JSON numbers.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

/// Parse user or CSV input into a decimal. Accepts `.` or `,` as the
/// decimal separator and ignores surrounding whitespace.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    // "1.234,50" is Turkish grouping, "1,234.50" is not.
    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(_), None) => s.replace(',', "."),
        (Some(c), Some(d)) if c > d => s.replace('.', "").replace(',', "."),
        _ => s.replace(',', ""),
    };
    normalized
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&normalized).ok())
}

/// Coerce an arbitrary JSON value into a decimal, zero when it is not numeric.
pub fn coerce(v: &Value) -> Decimal {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else {
                n.as_f64()
                    .and_then(|f| Decimal::try_from(f).ok())
                    .unwrap_or(Decimal::ZERO)
            }
        }
        Value::String(s) => parse_amount(s).unwrap_or(Decimal::ZERO),
        Value::Bool(b) => Decimal::from(*b as i64),
        _ => Decimal::ZERO,
    }
}

/// Lossy conversion used for the wire and for CSV exports.
pub fn to_f64(d: &Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{:.2} {}", d.round_dp(2), ccy)
}

/// `#[serde(with = "crate::money::lenient")]`
pub mod lenient {
    use super::{coerce, to_f64};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(d: &Decimal, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(to_f64(d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        let v = Option::<Value>::deserialize(d)?;
        Ok(v.as_ref().map(coerce).unwrap_or(Decimal::ZERO))
    }
}

/// Lenient date handling: the server sends full ISO timestamps, forms send
/// `YYYY-MM-DD`. Only the calendar date is kept.
pub mod date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let head = raw.trim().get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }

    pub fn serialize<S: Serializer>(d: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let v = Option::<String>::deserialize(d)?;
        Ok(v.as_deref().and_then(parse))
    }
}
