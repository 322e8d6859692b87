//! Numeric parsing for sortable cell values (`12`, `45%`, `250m`, `512Mi`).

/// Parses a cell value as a number, honoring percent signs and
/// Kubernetes-style quantity suffixes.
pub fn parse_quantity(input: &str) -> Option<f64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }

    // (suffix, multiplier, divisor)
    const SUFFIXES: &[(&str, f64, f64)] = &[
        ("Ki", 1024.0, 1.0),
        ("Mi", 1024.0 * 1024.0, 1.0),
        ("Gi", 1024.0 * 1024.0 * 1024.0, 1.0),
        ("Ti", 1024.0 * 1024.0 * 1024.0 * 1024.0, 1.0),
        ("%", 1.0, 1.0),
        ("m", 1.0, 1000.0),
        ("k", 1e3, 1.0),
        ("M", 1e6, 1.0),
        ("G", 1e9, 1.0),
        ("T", 1e12, 1.0),
    ];

    SUFFIXES.iter().find_map(|(suffix, mul, div)| {
        let number = s.strip_suffix(suffix)?;
        let v = number.parse::<f64>().ok()?;
        v.is_finite().then_some(v * mul / div)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_quantity("12"), Some(12.0));
        assert_eq!(parse_quantity("-3.5"), Some(-3.5));
        assert_eq!(parse_quantity(" 7 "), Some(7.0));
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(parse_quantity("45%"), Some(45.0));
        assert_eq!(parse_quantity("250m"), Some(0.25));
        assert_eq!(parse_quantity("2Ki"), Some(2048.0));
        assert_eq!(parse_quantity("1Gi"), Some(1024.0 * 1024.0 * 1024.0));
        assert_eq!(parse_quantity("3k"), Some(3000.0));
    }

    #[test]
    fn test_not_numbers() {
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("Running"), None);
        assert_eq!(parse_quantity("1/2"), None);
        assert_eq!(parse_quantity("n/a"), None);
        assert_eq!(parse_quantity("NaN"), None);
    }
}
