//! Display formatting tests

use carteles::binding::{FieldValue, FinancingOption, NumberFormat, is_valid_date_pattern};
use carteles::template::FieldType;
use chrono::NaiveDate;

#[test]
fn test_number_grouping() {
    let format = NumberFormat::default();
    assert_eq!(format.number(0.0, 0), "0");
    assert_eq!(format.number(999.0, 0), "999");
    assert_eq!(format.number(1000.0, 0), "1.000");
    assert_eq!(format.number(1234567.891, 2), "1.234.567,89");
    assert_eq!(format.number(-1500.5, 2), "-1.500,50");
}

#[test]
fn test_currency_drops_decimals_for_whole_amounts() {
    let format = NumberFormat::default();
    assert_eq!(format.currency(1200.0, 2), "$ 1.200");
    assert_eq!(format.currency(1234.5, 2), "$ 1.234,50");
    assert_eq!(format.currency(99.99, 2), "$ 99,99");
}

#[test]
fn test_percentage() {
    let format = NumberFormat::default();
    assert_eq!(format.percentage(20.0), "20%");
    assert_eq!(format.percentage(12.5), "12,5%");
}

#[test]
fn test_custom_separators() {
    let format = NumberFormat {
        currency_symbol: "US$".to_string(),
        thousands_separator: ',',
        decimal_separator: '.',
        date_pattern: "%Y-%m-%d".to_string(),
    };
    assert_eq!(format.currency(1234.5, 2), "US$ 1,234.50");
    assert_eq!(
        format.date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        "2024-03-01"
    );
}

#[test]
fn test_value_by_field_type() {
    let format = NumberFormat::default();
    let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

    assert_eq!(
        format.value(FieldType::Date, &FieldValue::Date(date), 2),
        "31/12/2024"
    );
    assert_eq!(
        format.value(FieldType::Number, &FieldValue::Number(12.0), 2),
        "12"
    );
    assert_eq!(
        format.value(FieldType::Text, &FieldValue::Text("Oferta".into()), 2),
        "Oferta"
    );
}

#[test]
fn test_financing_text() {
    let format = NumberFormat::default();
    let mut option = FinancingOption::new(12, 0.0);
    assert_eq!(format.financing(&option, 0), "12 cuotas sin interés");

    option.installment_amount = Some(100.0);
    assert_eq!(format.financing(&option, 0), "12 cuotas sin interés de $ 100");

    let with_interest = FinancingOption {
        installments: 6,
        rate_percent: 10.0,
        installment_amount: Some(183.33),
        total: Some(1100.0),
    };
    assert_eq!(format.financing(&with_interest, 2), "6 cuotas de $ 183,33");
}

#[test]
fn test_invalid_date_pattern_falls_back_to_default() {
    let format = NumberFormat {
        date_pattern: "%Q".to_string(),
        ..NumberFormat::default()
    };
    let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

    assert_eq!(format.date(date), "31/12/2024");
    assert_eq!(
        format.value(FieldType::Date, &FieldValue::Date(date), 2),
        "31/12/2024"
    );
}

#[test]
fn test_date_pattern_validation() {
    assert!(is_valid_date_pattern("%d/%m/%Y"));
    assert!(is_valid_date_pattern("Válido hasta el %d de %B"));
    assert!(!is_valid_date_pattern("%Q"));
}
