use crate::error::{Error, Result};

/// Parses a badge counter such as `39,689` or `39.7K` into a whole number of views.
///
/// A `K` suffix (any case) multiplies by one thousand; the result is truncated.
pub fn parse_counter(text: &str) -> Result<f64> {
    let invalid = || Error::InvalidCounterText(text.to_owned());

    let mut digits = text.trim().to_ascii_uppercase();
    let multiplier = if digits.contains('K') {
        digits = digits.replace('K', "");
        1000.0
    } else {
        1.0
    };
    let digits = digits.replace(',', "");

    let number: f64 = digits.trim().parse().map_err(|_| invalid())?;
    let value = (number * multiplier).trunc();
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_grouped_numbers() {
        assert_eq!(parse_counter("39689").unwrap(), 39689.0);
        assert_eq!(parse_counter("39,689").unwrap(), 39689.0);
        assert_eq!(parse_counter(" 1,234,567 ").unwrap(), 1_234_567.0);
    }

    #[test]
    fn thousands_suffix() {
        assert_eq!(parse_counter("39.7K").unwrap(), 39700.0);
        assert_eq!(parse_counter("12k").unwrap(), 12000.0);
        assert_eq!(parse_counter("1.2345K").unwrap(), 1234.0);
    }

    #[test]
    fn rejects_garbage() {
        for text in ["", "K", "n/a", "-5", "inf"] {
            assert!(
                matches!(parse_counter(text), Err(Error::InvalidCounterText(_))),
                "{text}"
            );
        }
    }
}
