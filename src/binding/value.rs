//! Typed field values and parsing of raw record values.

use crate::template::FieldType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A display-ready value of a resolved field.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Currency, percentage or plain number
    Number(f64),
    Text(String),
    Date(NaiveDate),
    ImageRef(String),
    Financing(Vec<FinancingOption>),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::ImageRef(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_financing(&self) -> Option<&[FinancingOption]> {
        match self {
            FieldValue::Financing(options) => Some(options),
            _ => None,
        }
    }
}

/// One financing plan offered on a poster ("12 cuotas sin interés").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancingOption {
    pub installments: u32,
    /// Interest over the base price, in percent. Zero means interest-free.
    #[serde(default, alias = "rate")]
    pub rate_percent: f64,
    /// Amount of each installment, computed from the template's base price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_amount: Option<f64>,
    /// Total financed amount, computed from the template's base price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl FinancingOption {
    pub fn new(installments: u32, rate_percent: f64) -> Self {
        Self {
            installments,
            rate_percent,
            installment_amount: None,
            total: None,
        }
    }

    pub fn is_interest_free(&self) -> bool {
        self.rate_percent == 0.0
    }

    /// Fill in total and per-installment amounts for a base price
    pub(crate) fn price_against(&mut self, base: f64, decimals: u8) {
        if self.installments == 0 {
            self.total = None;
            self.installment_amount = None;
            return;
        }
        let total = base * (100.0 + self.rate_percent) / 100.0;
        self.total = Some(round_to(total, decimals));
        self.installment_amount = Some(round_to(total / f64::from(self.installments), decimals));
    }
}

/// Round half away from zero to `decimals` fractional digits.
///
/// The scaled value is first cleaned of binary representation error so that
/// inputs like `2.675` round the way they read.
pub fn round_to(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimals));
    let scaled = ((value * factor) * 1e6).round() / 1e6;
    scaled.round() / factor
}

/// Parse a raw record value as `field_type`.
///
/// On failure returns a short description of what was found, for the
/// validation report.
pub fn parse_value(field_type: FieldType, raw: &Value) -> Result<FieldValue, String> {
    match field_type {
        FieldType::Currency | FieldType::Percentage | FieldType::Number => {
            parse_numeric(raw).map(FieldValue::Number)
        }
        FieldType::Text => match raw {
            Value::String(s) => Ok(FieldValue::Text(s.trim().to_string())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(FieldValue::Text(n.to_string())),
            Value::Number(n) => Ok(FieldValue::Text(number_to_text(n.as_f64().unwrap_or(0.0)))),
            Value::Bool(b) => Ok(FieldValue::Text(b.to_string())),
            other => Err(describe(other)),
        },
        FieldType::Date => match raw {
            Value::String(s) => parse_date(s)
                .map(FieldValue::Date)
                .ok_or_else(|| format!("unparseable date {s:?}")),
            other => Err(describe(other)),
        },
        FieldType::ImageRef => match raw {
            Value::String(s) => Ok(FieldValue::ImageRef(s.trim().to_string())),
            other => Err(describe(other)),
        },
        FieldType::FinancingList => parse_financing(raw).map(FieldValue::Financing),
    }
}

fn parse_numeric(raw: &Value) -> Result<f64, String> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("number {n}")),
        Value::String(s) => parse_number(s).ok_or_else(|| format!("text {s:?}")),
        other => Err(describe(other)),
    }
}

/// Parse a human-entered number such as `"$ 1.200,50"`, `"1200.5"` or `"20%"`.
///
/// Separators follow es-AR conventions when ambiguous: a lone comma is the
/// decimal separator and a lone dot followed by exactly three digits groups
/// thousands.
pub fn parse_number(input: &str) -> Option<f64> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("ARS")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != '%')
        .collect();
    if cleaned.is_empty()
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
    {
        return None;
    }

    let dots = cleaned.matches('.').count();
    let commas = cleaned.matches(',').count();
    let normalized = match (dots, commas) {
        (0, 0) => cleaned,
        (_, 0) if dots > 1 => cleaned.replace('.', ""),
        (1, 0) => {
            let (int_part, frac) = cleaned.split_once('.')?;
            let digits = int_part.trim_start_matches(['-', '+']);
            if frac.len() == 3 && !digits.is_empty() && digits != "0" {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (0, 1) => cleaned.replace(',', "."),
        (0, _) => cleaned.replace(',', ""),
        _ => {
            let last_dot = cleaned.rfind('.')?;
            let last_comma = cleaned.rfind(',')?;
            if last_comma > last_dot {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse ISO (`2024-05-31`), day-first (`31/05/2024`) or RFC 3339 dates.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(input, "%d-%m-%Y"))
        .ok()
        .or_else(|| input.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

fn parse_financing(raw: &Value) -> Result<Vec<FinancingOption>, String> {
    let Value::Array(items) = raw else {
        return Err(describe(raw));
    };
    items
        .iter()
        .map(|item| match item {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(|n| FinancingOption::new(n, 0.0))
                .ok_or_else(|| format!("installment count {n}")),
            Value::Object(_) => serde_json::from_value::<FinancingOption>(item.clone())
                .map_err(|e| format!("financing option ({e})")),
            other => Err(describe(other)),
        })
        .collect()
}

/// Integers print without a fractional part
fn number_to_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("text {s:?}"),
        Value::Array(_) => "list".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
