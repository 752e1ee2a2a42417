use regex::Regex;

/// Matches a string value the way Envoy's `StringMatcher` does.
#[derive(Clone, Debug)]
pub enum StringMatch {
    /// An exact match; `ignore_case` folds ASCII case.
    Exact(String, bool),
    Prefix(String),
    Suffix(String),
    Contains(String),
    Regex(Regex),
}

// === impl StringMatch ===

impl StringMatch {
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into(), false)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(m, false) => value == m,
            Self::Exact(m, true) => value.eq_ignore_ascii_case(m),
            Self::Prefix(m) => value.starts_with(m.as_str()),
            Self::Suffix(m) => value.ends_with(m.as_str()),
            Self::Contains(m) => value.contains(m.as_str()),
            Self::Regex(re) => re.is_match(value),
        }
    }
}

impl PartialEq for StringMatch {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(l, li), Self::Exact(r, ri)) => l == r && li == ri,
            (Self::Prefix(l), Self::Prefix(r)) => l == r,
            (Self::Suffix(l), Self::Suffix(r)) => l == r,
            (Self::Contains(l), Self::Contains(r)) => l == r,
            (Self::Regex(l), Self::Regex(r)) => l.as_str() == r.as_str(),
            _ => false,
        }
    }
}

impl Eq for StringMatch {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_honors_case_flag() {
        assert!(StringMatch::exact("GET").matches("GET"));
        assert!(!StringMatch::exact("GET").matches("get"));
        assert!(StringMatch::Exact("GET".to_string(), true).matches("get"));
    }

    #[test]
    fn affix_and_contains() {
        assert!(StringMatch::Prefix("/api".to_string()).matches("/api/echo"));
        assert!(!StringMatch::Prefix("/api".to_string()).matches("/echo/api"));
        assert!(StringMatch::Suffix(".example.com".to_string()).matches("a.example.com"));
        assert!(StringMatch::Contains("admin".to_string()).matches("/v1/admin/list"));
    }

    #[test]
    fn regex() {
        let m = StringMatch::Regex(Regex::new("^/users/[0-9]+$").unwrap());
        assert!(m.matches("/users/42"));
        assert!(!m.matches("/users/alice"));
    }
}
