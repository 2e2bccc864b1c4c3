//! Generated code lists served when the backend cannot be reached.
//!
//! Only enumerable code lists have fallbacks; financial data never does.

/// Highest division / class number generated.
const FALLBACK_MAX: u8 = 99;

/// `"01"`..`"99"`
pub fn fallback_divisions() -> Vec<String> {
    (1..=FALLBACK_MAX).map(|n| format!("{:02}", n)).collect()
}

/// `"1"`..`"99"`, unpadded
pub fn fallback_groups() -> Vec<String> {
    (1..=FALLBACK_MAX).map(|n| n.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_divisions() {
        let divisions = fallback_divisions();
        assert_eq!(divisions.len(), 99);
        assert_eq!(divisions.first().map(String::as_str), Some("01"));
        assert_eq!(divisions[8], "09");
        assert_eq!(divisions[9], "10");
        assert_eq!(divisions.last().map(String::as_str), Some("99"));
    }

    #[test]
    fn test_fallback_groups() {
        let groups = fallback_groups();
        assert_eq!(groups.len(), 99);
        assert_eq!(groups[0], "1");
        assert_eq!(groups[9], "10");
        assert_eq!(groups[98], "99");
    }
}
