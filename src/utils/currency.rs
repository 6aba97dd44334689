/// AED display formatting for dashboard figures.
///
/// Expects the non-negative finite amounts the rent normalizer produces, but
/// never panics: negatives keep their sign and non-finite input renders as
/// `AED 0.00`.
pub fn format_aed(amount: f64) -> String {
    if !amount.is_finite() {
        return "AED 0.00".to_string();
    }

    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-AED {}.{:02}", grouped, fraction)
    } else {
        format!("AED {}.{:02}", grouped, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain_amount() {
        assert_eq!(format_aed(4500.0), "AED 4,500.00");
    }

    #[test]
    fn test_format_small_amount() {
        assert_eq!(format_aed(950.5), "AED 950.50");
        assert_eq!(format_aed(0.0), "AED 0.00");
    }

    #[test]
    fn test_format_large_amount() {
        assert_eq!(format_aed(1234567.89), "AED 1,234,567.89");
    }

    #[test]
    fn test_format_rounds_to_cents() {
        assert_eq!(format_aed(4500.006), "AED 4,500.01");
        assert_eq!(format_aed(4500.004), "AED 4,500.00");
    }

    #[test]
    fn test_format_degenerate_input() {
        assert_eq!(format_aed(f64::NAN), "AED 0.00");
        assert_eq!(format_aed(-1200.0), "-AED 1,200.00");
    }
}
