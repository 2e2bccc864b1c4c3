//! Cache Key Module
//!
//! Builds deterministic cache keys of the form
//! `pkd_<endpoint>_<param>..._<version>`.

use std::borrow::Cow;
use std::fmt::Display;

/// Marker rendered for an absent parameter.
const ABSENT: &str = "~";

// == Cache Key ==
/// Builder for a cache key. Parameter order is part of the key, so every
/// accessor must push its parameters in a fixed order.
#[derive(Debug, Clone)]
pub struct CacheKey {
    key: String,
}

impl CacheKey {
    pub fn new(endpoint: &str) -> Self {
        let mut key = String::from("pkd_");
        key.push_str(&escape(endpoint));
        Self { key }
    }

    /// Appends one parameter; `None` is encoded distinctly from every value.
    pub fn param<V: Display>(mut self, value: Option<V>) -> Self {
        self.key.push('_');
        match value {
            Some(value) => self.key.push_str(&escape(&value.to_string())),
            None => self.key.push_str(ABSENT),
        }
        self
    }

    /// Appends the data version and returns the finished key.
    pub fn finish(self, version: &str) -> String {
        let mut key = self.key;
        key.push('_');
        key.push_str(&escape(version));
        key
    }
}

// `_` separates parts and `~` marks absence, so neither may appear raw in a part.
fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(&['%', '_', '~'][..]) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '_' => out.push_str("%5F"),
            '~' => out.push_str("%7E"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_shape() {
        let key = CacheKey::new("divisions").param(Some("B")).finish("2025");
        assert_eq!(key, "pkd_divisions_B_2025");

        let key = CacheKey::new("groups")
            .param(Some("C"))
            .param(Some("10"))
            .finish("2025");
        assert_eq!(key, "pkd_groups_C_10_2025");
    }

    #[test]
    fn test_absent_differs_from_tilde_value() {
        let absent = CacheKey::new("rankings").param(None::<&str>).finish("2025");
        let tilde = CacheKey::new("rankings").param(Some("~")).finish("2025");
        assert_ne!(absent, tilde);
    }

    #[test]
    fn test_separator_in_value_does_not_collide() {
        let a = CacheKey::new("groups")
            .param(Some("A_B"))
            .param(Some("C"))
            .finish("2025");
        let b = CacheKey::new("groups")
            .param(Some("A"))
            .param(Some("B_C"))
            .finish("2025");
        assert_ne!(a, b);
    }

    #[test]
    fn test_numeric_params() {
        let key = CacheKey::new("rankings")
            .param(Some(50))
            .param(Some(0.5))
            .finish("2007");
        assert_eq!(key, "pkd_rankings_50_0.5_2007");
    }

    fn part_strategy() -> impl Strategy<Value = Option<String>> {
        prop::option::of("[A-Za-z0-9_~%,.-]{0,6}")
    }

    proptest! {
        // Distinct parameter lists must never map to the same key
        #[test]
        fn prop_keys_are_injective(
            a in prop::collection::vec(part_strategy(), 0..4),
            b in prop::collection::vec(part_strategy(), 0..4),
            version in "[0-9]{4}",
        ) {
            prop_assume!(a != b);

            let key_a = a.iter().fold(CacheKey::new("compare"), |k, p| k.param(p.as_deref())).finish(&version);
            let key_b = b.iter().fold(CacheKey::new("compare"), |k, p| k.param(p.as_deref())).finish(&version);
            prop_assert_ne!(key_a, key_b);
        }

        // The same request always produces the same key
        #[test]
        fn prop_keys_are_deterministic(parts in prop::collection::vec(part_strategy(), 0..4)) {
            let build = || parts.iter().fold(CacheKey::new("index"), |k, p| k.param(p.as_deref())).finish("2025");
            prop_assert_eq!(build(), build());
        }
    }
}
