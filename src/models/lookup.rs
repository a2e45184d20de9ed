//! Outcome of a lookup that can fall back to static data

/// A value obtained either from a live service or from a static fallback.
///
/// Both variants are successes; the tag only records provenance.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Live(T),
    Fallback(T),
}

impl<T> Lookup<T> {
    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Lookup::Live(value) | Lookup::Fallback(value) => value,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Lookup::Live(value) | Lookup::Fallback(value) => value,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Lookup::Fallback(_))
    }

    /// Provenance label used in logs and response headers
    #[must_use]
    pub fn source(&self) -> &'static str {
        match self {
            Lookup::Live(_) => "live",
            Lookup::Fallback(_) => "fallback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance() {
        let live = Lookup::Live(3.75);
        let fallback = Lookup::Fallback(3.75);
        assert!(!live.is_fallback());
        assert!(fallback.is_fallback());
        assert_eq!(live.source(), "live");
        assert_eq!(fallback.source(), "fallback");
        assert_eq!(live.value(), fallback.value());
    }

    #[test]
    fn test_into_inner_drops_tag() {
        assert_eq!(Lookup::Live(4).into_inner(), 4);
        assert_eq!(Lookup::Fallback(4).into_inner(), 4);
    }
}
