//! @ai:module:intent Numeric-aware ordering of parameter values
//! @ai:module:layer domain
//! @ai:module:public_api numeric_reading, compare_values
//! @ai:module:stateless true

use std::cmp::Ordering;

/// @ai:intent Numeric reading of a parameter value: full float, else leading number
/// @ai:effects pure
/// @ai:example ("500k") -> Some(500.0)
/// @ai:example ("2.5") -> Some(2.5)
/// @ai:example ("FIFO") -> None
pub fn numeric_reading(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<f64>() {
        return (!n.is_nan()).then_some(n);
    }

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in value.char_indices() {
        match c {
            '-' if i == 0 => {}
            '0'..='9' => end = i + 1,
            '.' if !seen_dot && end > 0 => seen_dot = true,
            _ => break,
        }
    }

    if end == 0 {
        return None;
    }
    value[..end].parse().ok()
}

/// @ai:intent Order values numerically when both read as numbers, otherwise lexically
/// @ai:effects pure
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (numeric_reading(a), numeric_reading(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_reading() {
        assert_eq!(numeric_reading("300"), Some(300.0));
        assert_eq!(numeric_reading("500k"), Some(500.0));
        assert_eq!(numeric_reading("2.5M"), Some(2.5));
        assert_eq!(numeric_reading("-4"), Some(-4.0));
        assert_eq!(numeric_reading("FIFO"), None);
        assert_eq!(numeric_reading("-"), None);
        assert_eq!(numeric_reading("NaN"), None);
    }

    #[test]
    fn test_numeric_sort_beats_lexical() {
        let mut values = vec!["10M", "2M", "FIFO", "1M", "LIFO"];
        values.sort_by(|a, b| compare_values(a, b));
        assert_eq!(values, vec!["1M", "2M", "10M", "FIFO", "LIFO"]);
    }
}
