//! Conversions from Envoy matcher messages to the core matcher types.
//!
//! Every conversion is fallible: a matcher the evaluators cannot express
//! (an invalid regex, an absence match) yields `None` and the caller drops
//! the enclosing rule rather than evaluating a weaker one.

use governance_core::{NetworkMatch, StringMatch};
use governance_xds::proto::{matcher, route, CidrRange};
use regex::Regex;
use tracing::warn;

pub(crate) fn string_match(m: &matcher::StringMatcher) -> Option<StringMatch> {
    use matcher::string_matcher::MatchPattern;
    let converted = match m.match_pattern.as_ref()? {
        MatchPattern::Exact(s) => StringMatch::Exact(s.clone(), m.ignore_case),
        MatchPattern::Prefix(s) => StringMatch::Prefix(s.clone()),
        MatchPattern::Suffix(s) => StringMatch::Suffix(s.clone()),
        MatchPattern::Contains(s) => StringMatch::Contains(s.clone()),
        MatchPattern::SafeRegex(re) => StringMatch::Regex(regex(&re.regex)?),
    };
    Some(converted)
}

pub(crate) fn header_match(m: &route::HeaderMatcher) -> Option<StringMatch> {
    use route::header_matcher::HeaderMatchSpecifier;
    if m.invert_match {
        warn!(header = %m.name, "inverted header matches are unsupported");
        return None;
    }
    let converted = match m.header_match_specifier.as_ref()? {
        HeaderMatchSpecifier::ExactMatch(s) => StringMatch::exact(s.clone()),
        HeaderMatchSpecifier::PrefixMatch(s) => StringMatch::Prefix(s.clone()),
        HeaderMatchSpecifier::SuffixMatch(s) => StringMatch::Suffix(s.clone()),
        HeaderMatchSpecifier::ContainsMatch(s) => StringMatch::Contains(s.clone()),
        HeaderMatchSpecifier::SafeRegexMatch(re) => StringMatch::Regex(regex(&re.regex)?),
        HeaderMatchSpecifier::StringMatch(sm) => string_match(sm)?,
        // Presence matches any value at all.
        HeaderMatchSpecifier::PresentMatch(true) => StringMatch::Prefix(String::new()),
        HeaderMatchSpecifier::PresentMatch(false) => {
            warn!(header = %m.name, "header absence matches are unsupported");
            return None;
        }
    };
    Some(converted)
}

pub(crate) fn query_match(m: &route::QueryParameterMatcher) -> Option<StringMatch> {
    use route::query_parameter_matcher::QueryParameterMatchSpecifier;
    match m.query_parameter_match_specifier.as_ref()? {
        QueryParameterMatchSpecifier::StringMatch(sm) => string_match(sm),
        QueryParameterMatchSpecifier::PresentMatch(true) => {
            Some(StringMatch::Prefix(String::new()))
        }
        QueryParameterMatchSpecifier::PresentMatch(false) => {
            warn!(param = %m.name, "parameter absence matches are unsupported");
            None
        }
    }
}

pub(crate) fn path_match(m: &matcher::PathMatcher) -> Option<StringMatch> {
    match m.rule.as_ref()? {
        matcher::path_matcher::Rule::Path(sm) => string_match(sm),
    }
}

pub(crate) fn value_match(m: &matcher::ValueMatcher) -> Option<StringMatch> {
    use matcher::value_matcher::MatchPattern;
    match m.match_pattern.as_ref()? {
        MatchPattern::StringMatch(sm) => string_match(sm),
        MatchPattern::ListMatch(list) => match list.match_pattern.as_ref()? {
            matcher::list_matcher::MatchPattern::OneOf(one) => value_match(one),
        },
        _ => None,
    }
}

pub(crate) fn network(cidr: &CidrRange) -> Option<NetworkMatch> {
    let addr = match cidr.address_prefix.parse::<std::net::IpAddr>() {
        Ok(addr) => addr,
        Err(error) => {
            warn!(%error, prefix = %cidr.address_prefix, "invalid address prefix");
            return None;
        }
    };
    let default_len = if addr.is_ipv4() { 32 } else { 128 };
    let len = cidr.prefix_len.unwrap_or(default_len);
    let net = governance_core::IpNet::new(addr, len.try_into().ok()?).ok()?;
    Some(net.into())
}

pub(crate) fn regex(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(error) => {
            warn!(%error, pattern, "invalid regex in matcher");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governance_xds::proto::matcher::{string_matcher::MatchPattern, StringMatcher};

    #[test]
    fn string_matchers() {
        let m = StringMatcher {
            ignore_case: true,
            match_pattern: Some(MatchPattern::Exact("GET".to_string())),
        };
        assert_eq!(
            string_match(&m),
            Some(StringMatch::Exact("GET".to_string(), true))
        );

        let m = StringMatcher {
            ignore_case: false,
            match_pattern: None,
        };
        assert_eq!(string_match(&m), None);
    }

    #[test]
    fn invalid_regex_is_dropped() {
        let m = StringMatcher {
            ignore_case: false,
            match_pattern: Some(MatchPattern::SafeRegex(
                governance_xds::proto::matcher::RegexMatcher {
                    regex: "(".to_string(),
                },
            )),
        };
        assert_eq!(string_match(&m), None);
    }

    #[test]
    fn cidr_ranges() {
        let net = network(&CidrRange {
            address_prefix: "10.1.0.0".to_string(),
            prefix_len: Some(16),
        })
        .unwrap();
        assert!(net.matches("10.1.2.3".parse().unwrap()));
        assert!(!net.matches("10.2.0.1".parse().unwrap()));

        assert!(network(&CidrRange {
            address_prefix: "not-an-ip".to_string(),
            prefix_len: None,
        })
        .is_none());
    }
}
