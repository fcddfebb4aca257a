use std::sync::OnceLock;

use regex::Regex;

fn percentage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([0-9]+)%").expect("percentage pattern is valid"))
}

/// Returns the digit run of the first `<digits>%` in `text`.
///
/// Only the first match is considered. A value outside 0..=100 yields `None`
/// rather than a clamped or later value.
pub fn extract_percentage(text: &str) -> Option<u8> {
    let digits = percentage_pattern().captures(text)?.get(1)?.as_str();
    digits.parse::<u8>().ok().filter(|value| *value <= 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_percentage() {
        assert_eq!(extract_percentage("The match is 62%"), Some(62));
        assert_eq!(extract_percentage("62% now, 80% later"), Some(62));
    }

    #[test]
    fn test_absent_when_no_percentage() {
        assert_eq!(extract_percentage("Fit score: 7/10"), None);
        assert_eq!(extract_percentage("percent sign alone %"), None);
        assert_eq!(extract_percentage(""), None);
    }

    #[test]
    fn test_digits_must_touch_the_sign() {
        assert_eq!(extract_percentage("about 75 %"), None);
        assert_eq!(extract_percentage("about 75 % or 40%"), Some(40));
    }

    #[test]
    fn test_leading_zeros_and_bounds() {
        assert_eq!(extract_percentage("007%"), Some(7));
        assert_eq!(extract_percentage("0%"), Some(0));
        assert_eq!(extract_percentage("100%"), Some(100));
    }

    #[test]
    fn test_out_of_range_first_match_is_absent() {
        assert_eq!(extract_percentage("grew 150% then 60%"), None);
        assert_eq!(extract_percentage("99999999999999999999%"), None);
    }

    #[test]
    fn test_sign_is_not_part_of_the_run() {
        assert_eq!(extract_percentage("-15%"), Some(15));
        assert_eq!(extract_percentage("12.5%"), Some(5));
    }
}
