// 🔢 Number formatting for the console views
//
// Same thresholds as the visualizer: K / M / B / T with fixed digits.

use crate::merge::Metric;
use serde_json::Value;

const SCALES: [(f64, &str, &str, &str); 4] = [
    (1e12, "T", "Trillion", "Trillions"),
    (1e9, "B", "Billion", "Billions"),
    (1e6, "M", "Million", "Millions"),
    (1e3, "K", "Thousand", "Thousands"),
];

/// Humanize a number: 2.6e12 → "2.60 T" (or "2.60 Trillions" when `long`)
///
/// Missing or zero values render as "--".
pub fn format_number(number: Option<f64>, long: bool, digits: usize) -> String {
    let number = match number {
        Some(n) if n != 0.0 && !n.is_nan() => n,
        _ => return "--".to_string(),
    };

    for (threshold, short, singular, plural) in SCALES {
        if number >= threshold {
            let scaled = number / threshold;
            let suffix = match (long, scaled == 1.0) {
                (false, _) => short,
                (true, true) => singular,
                (true, false) => plural,
            };
            return format!("{:.*} {}", digits, scaled, suffix);
        }
    }

    format!("{:.*}", digits, number)
}

/// Numeric view of a raw merged value (numbers and numeric strings)
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// "$ 2.60 Trillions" for money, "3.1416 %" for inflation
pub fn format_metric(metric: Metric, value: Option<&Value>) -> String {
    let number = value.and_then(as_number);
    match metric {
        Metric::Gdp | Metric::Gdppc => format!("$ {}", format_number(number, true, 2)),
        Metric::Inflation => format!("{} %", format_number(number, false, 4)),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_number_scales() {
        assert_eq!(format_number(Some(2.6e12), false, 2), "2.60 T");
        assert_eq!(format_number(Some(2.6e12), true, 2), "2.60 Trillions");
        assert_eq!(format_number(Some(1e9), true, 2), "1.00 Billion");
        assert_eq!(format_number(Some(45_000_000.0), false, 1), "45.0 M");
        assert_eq!(format_number(Some(40_000.0), true, 2), "40.00 Thousands");
        assert_eq!(format_number(Some(12.25), false, 2), "12.25");
    }

    #[test]
    fn test_format_number_missing() {
        assert_eq!(format_number(None, false, 2), "--");
        assert_eq!(format_number(Some(0.0), true, 2), "--");
    }

    #[test]
    fn test_negative_numbers_not_scaled() {
        assert_eq!(format_number(Some(-2500.0), false, 1), "-2500.0");
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Metric::Gdp, Some(&json!(2.6e12))), "$ 2.60 Trillions");
        assert_eq!(format_metric(Metric::Gdppc, Some(&json!("40000"))), "$ 40.00 Thousands");
        assert_eq!(format_metric(Metric::Inflation, Some(&json!(1.5))), "1.5000 %");
        assert_eq!(format_metric(Metric::Inflation, None), "-- %");
        assert_eq!(format_metric(Metric::Gdp, Some(&Value::Null)), "$ --");
    }
}
