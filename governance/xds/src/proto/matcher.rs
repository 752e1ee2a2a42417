//! `envoy.type.matcher.v3` subset.

/// `envoy.type.matcher.v3.RegexMatcher`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegexMatcher {
    #[prost(string, tag = "2")]
    pub regex: String,
}

/// `envoy.type.matcher.v3.StringMatcher`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringMatcher {
    #[prost(bool, tag = "6")]
    pub ignore_case: bool,
    #[prost(oneof = "string_matcher::MatchPattern", tags = "1, 2, 3, 5, 7")]
    pub match_pattern: Option<string_matcher::MatchPattern>,
}

pub mod string_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum MatchPattern {
        #[prost(string, tag = "1")]
        Exact(String),
        #[prost(string, tag = "2")]
        Prefix(String),
        #[prost(string, tag = "3")]
        Suffix(String),
        #[prost(message, tag = "5")]
        SafeRegex(super::RegexMatcher),
        #[prost(string, tag = "7")]
        Contains(String),
    }
}

/// `envoy.type.matcher.v3.PathMatcher`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PathMatcher {
    #[prost(oneof = "path_matcher::Rule", tags = "1")]
    pub rule: Option<path_matcher::Rule>,
}

pub mod path_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Rule {
        #[prost(message, tag = "1")]
        Path(super::StringMatcher),
    }
}

/// `envoy.type.matcher.v3.MetadataMatcher`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetadataMatcher {
    #[prost(string, tag = "1")]
    pub filter: String,
    #[prost(message, repeated, tag = "2")]
    pub path: Vec<metadata_matcher::PathSegment>,
    #[prost(message, optional, tag = "3")]
    pub value: Option<ValueMatcher>,
}

pub mod metadata_matcher {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PathSegment {
        #[prost(oneof = "path_segment::Segment", tags = "1")]
        pub segment: Option<path_segment::Segment>,
    }

    pub mod path_segment {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Segment {
            #[prost(string, tag = "1")]
            Key(String),
        }
    }
}

/// `envoy.type.matcher.v3.ValueMatcher`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValueMatcher {
    #[prost(oneof = "value_matcher::MatchPattern", tags = "3, 4, 5, 6")]
    pub match_pattern: Option<value_matcher::MatchPattern>,
}

pub mod value_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum MatchPattern {
        #[prost(message, tag = "3")]
        StringMatch(super::StringMatcher),
        #[prost(bool, tag = "4")]
        BoolMatch(bool),
        #[prost(bool, tag = "5")]
        PresentMatch(bool),
        #[prost(message, tag = "6")]
        ListMatch(Box<super::ListMatcher>),
    }
}

/// `envoy.type.matcher.v3.ListMatcher`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListMatcher {
    #[prost(oneof = "list_matcher::MatchPattern", tags = "1")]
    pub match_pattern: Option<list_matcher::MatchPattern>,
}

pub mod list_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum MatchPattern {
        #[prost(message, tag = "1")]
        OneOf(Box<super::ValueMatcher>),
    }
}

// === impl StringMatcher ===

impl StringMatcher {
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            ignore_case: false,
            match_pattern: Some(string_matcher::MatchPattern::Exact(value.into())),
        }
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        Self {
            ignore_case: false,
            match_pattern: Some(string_matcher::MatchPattern::Prefix(value.into())),
        }
    }
}
