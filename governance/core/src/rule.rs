/// A leaf predicate evaluated against some request context.
pub trait Matches<C: ?Sized> {
    fn matches(&self, ctx: &C) -> bool;
}

/// A group of alternative leaf matchers.
///
/// The group evaluates to true when any leaf matches. When `negated` is set
/// the result of the *whole group* is inverted; negation never applies
/// per-leaf. An empty, non-negated group is false (an OR over nothing), so
/// an empty negated group is vacuously true.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrRule<T> {
    pub rules: Vec<T>,
    pub negated: bool,
}

/// A conjunction of [`OrRule`] groups.
///
/// Evaluates to true only when every group evaluates to true. An empty rule
/// is "no restriction" and evaluates to true; callers must treat it as
/// permitting everything rather than matching nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AndRule<T> {
    pub rules: Vec<OrRule<T>>,
}

// === impl OrRule ===

impl<T> OrRule<T> {
    pub fn new(rules: Vec<T>) -> Self {
        Self {
            rules,
            negated: false,
        }
    }

    pub fn negated(rules: Vec<T>) -> Self {
        Self {
            rules,
            negated: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate<C: ?Sized>(&self, ctx: &C) -> bool
    where
        T: Matches<C>,
    {
        let matched = self.rules.iter().any(|rule| rule.matches(ctx));
        matched ^ self.negated
    }
}

// === impl AndRule ===

impl<T> AndRule<T> {
    pub fn new(rules: Vec<OrRule<T>>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate<C: ?Sized>(&self, ctx: &C) -> bool
    where
        T: Matches<C>,
    {
        self.rules.iter().all(|or| or.evaluate(ctx))
    }
}

impl<T> Default for AndRule<T> {
    fn default() -> Self {
        Self { rules: vec![] }
    }
}

impl<T> FromIterator<OrRule<T>> for AndRule<T> {
    fn from_iter<I: IntoIterator<Item = OrRule<T>>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
