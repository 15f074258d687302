/// Formats free-form input as `(xxx) xxx-xxxx` while the user types.
///
/// Non-digits are dropped and at most ten digits are kept. Partial input
/// gets the partial mask, so `5551` becomes `(555) 1`.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(10).collect();
    let n = digits.len();
    if n == 0 {
        return String::new();
    }

    let mut out = String::with_capacity(14);
    out.push('(');
    out.push_str(&digits[..n.min(3)]);
    if n >= 3 {
        out.push_str(") ");
        out.push_str(&digits[3..n.min(6)]);
        if n >= 6 {
            out.push('-');
            out.push_str(&digits[6..]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::format_phone_number;

    #[test]
    fn full_number() {
        assert_eq!(format_phone_number("5551234567"), "(555) 123-4567");
    }

    #[test]
    fn reformatting_is_stable() {
        let once = format_phone_number("555.123.4567");
        assert_eq!(format_phone_number(&once), once);
    }

    #[test]
    fn partial_masks() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("abc"), "");
        assert_eq!(format_phone_number("55"), "(55");
        assert_eq!(format_phone_number("555"), "(555) ");
        assert_eq!(format_phone_number("5551"), "(555) 1");
        assert_eq!(format_phone_number("555123"), "(555) 123-");
        assert_eq!(format_phone_number("5551234"), "(555) 123-4");
    }

    #[test]
    fn extra_digits_are_dropped() {
        assert_eq!(format_phone_number("+1 (555) 123-4567 ext 9"), "(155) 512-3456");
        assert_eq!(format_phone_number("555123456789"), "(555) 123-4567");
    }
}
