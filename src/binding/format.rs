//! Display formatting of resolved values for poster text.

use super::value::{FieldValue, FinancingOption};
use crate::constants::DEFAULT_CURRENCY_SYMBOL;
use crate::template::FieldType;
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Day-first date pattern used by default and when a configured one is unusable
pub const DEFAULT_DATE_PATTERN: &str = "%d/%m/%Y";

/// Whether `pattern` is a strftime pattern chrono can render
pub fn is_valid_date_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Number formatting conventions. Defaults to es-AR (`$ 1.234,50`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub currency_symbol: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
    /// strftime pattern for dates
    pub date_pattern: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
        }
    }
}

impl NumberFormat {
    /// Format with grouped thousands and exactly `decimals` fractional digits
    pub fn number(&self, value: f64, decimals: u8) -> String {
        let fixed = format!("{:.*}", usize::from(decimals), value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, digit) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(digit);
        }

        let mut out = String::new();
        if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
            out.push('-');
        }
        out.push_str(&grouped);
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }

    /// `$ 1.234,50`; fractional digits are dropped when the amount is whole
    pub fn currency(&self, value: f64, decimals: u8) -> String {
        let decimals = if value.fract() == 0.0 { 0 } else { decimals };
        format!("{} {}", self.currency_symbol, self.number(value, decimals))
    }

    /// `20%`, or `12,5%` for fractional percentages
    pub fn percentage(&self, value: f64) -> String {
        let decimals = if value.fract() == 0.0 { 0 } else { 2 };
        let text = self.number(value, decimals);
        let text = if decimals > 0 {
            text.trim_end_matches('0')
                .trim_end_matches(self.decimal_separator)
                .to_string()
        } else {
            text
        };
        format!("{text}%")
    }

    /// Falls back to `DEFAULT_DATE_PATTERN` when `date_pattern` is invalid
    pub fn date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.date_pattern)).is_ok() {
            return out;
        }
        tracing::warn!(pattern = %self.date_pattern, "Invalid date pattern, using default");
        date.format(DEFAULT_DATE_PATTERN).to_string()
    }

    /// `12 cuotas sin interés de $ 100`
    pub fn financing(&self, option: &FinancingOption, decimals: u8) -> String {
        let mut text = if option.is_interest_free() {
            format!("{} cuotas sin interés", option.installments)
        } else {
            format!("{} cuotas", option.installments)
        };
        if let Some(amount) = option.installment_amount {
            text.push_str(" de ");
            text.push_str(&self.currency(amount, decimals));
        }
        text
    }

    /// Format a resolved value according to its field type
    pub fn value(&self, field_type: FieldType, value: &FieldValue, decimals: u8) -> String {
        match (field_type, value) {
            (FieldType::Currency, FieldValue::Number(n)) => self.currency(*n, decimals),
            (FieldType::Percentage, FieldValue::Number(n)) => self.percentage(*n),
            (_, FieldValue::Number(n)) => {
                let decimals = if n.fract() == 0.0 { 0 } else { decimals };
                self.number(*n, decimals)
            }
            (_, FieldValue::Text(s)) | (_, FieldValue::ImageRef(s)) => s.clone(),
            (_, FieldValue::Date(d)) => self.date(*d),
            (_, FieldValue::Financing(options)) => options
                .iter()
                .map(|o| self.financing(o, decimals))
                .collect::<Vec<_>>()
                .join(" / "),
        }
    }
}
