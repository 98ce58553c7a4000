//! Content filters
//!
//! A [`Filter`] is a predicate over decoded file content. Composites own their
//! children and evaluate them in order with short-circuiting, so the order in which
//! children are declared is observable through [`MatchBudget`] side effects.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use regex::Regex;

use super::admission;
use super::error::{ClassifyError, ClassifyResult};

/// Budget value meaning "never runs out"
pub const UNLIMITED: i64 = -1;

/// Remaining number of positive results a [`Filter::Limited`] may still produce
///
/// Negative values are unlimited, zero is exhausted. The counter is shared by every
/// clone of the owning filter and lives for the whole run.
#[derive(Debug)]
pub struct MatchBudget {
    remaining: AtomicI64,
}

impl MatchBudget {
    pub fn new(remaining: i64) -> Arc<Self> {
        Arc::new(Self {
            remaining: AtomicI64::new(remaining),
        })
    }

    pub fn remaining(&self) -> i64 {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Take one match from the budget; false once it is exhausted
    fn consume(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| match left {
                0 => None,
                n if n > 0 => Some(n - 1),
                n => Some(n),
            })
            .is_ok()
    }
}

/// Predicate over file content
#[derive(Debug, Clone)]
pub enum Filter {
    /// Always true
    Always,
    /// True if the content contains any of the substrings (case-sensitive)
    Keyword(Vec<String>),
    /// True if any of the patterns is found anywhere in the content
    Regex(Vec<Regex>),
    /// True iff every child is true
    And(Vec<Filter>),
    /// True iff any child is true
    Or(Vec<Filter>),
    Not(Box<Filter>),
    /// True while the child matches and the shared budget lasts
    Limited {
        budget: Arc<MatchBudget>,
        filter: Box<Filter>,
    },
    /// Rejects content with control characters, unusual whitespace or unpaired surrogates
    Admissible,
}

impl Filter {
    pub fn keyword<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Keyword(words.into_iter().map(Into::into).collect())
    }

    /// Compile `patterns` into a [`Filter::Regex`]
    pub fn regex<I, S>(patterns: I) -> ClassifyResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|e| ClassifyError::invalid_pattern(p, e))
            })
            .collect::<ClassifyResult<Vec<_>>>()?;
        Ok(Filter::Regex(compiled))
    }

    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    /// Wrap `filter` in a fresh budget of `budget` matches ([`UNLIMITED`] for no cap)
    pub fn limited(budget: i64, filter: Filter) -> Self {
        Self::with_budget(MatchBudget::new(budget), filter)
    }

    /// Wrap `filter` in an existing, possibly shared, budget
    pub fn with_budget(budget: Arc<MatchBudget>, filter: Filter) -> Self {
        Filter::Limited {
            budget,
            filter: Box::new(filter),
        }
    }

    pub fn matches(&self, content: &str) -> bool {
        match self {
            Filter::Always => true,
            Filter::Keyword(words) => words.iter().any(|w| content.contains(w.as_str())),
            Filter::Regex(patterns) => patterns.iter().any(|p| p.is_match(content)),
            Filter::And(children) => children.iter().all(|c| c.matches(content)),
            Filter::Or(children) => children.iter().any(|c| c.matches(content)),
            Filter::Not(child) => !child.matches(content),
            Filter::Limited { budget, filter } => {
                if budget.is_exhausted() {
                    return false;
                }
                filter.matches(content) && budget.consume()
            }
            Filter::Admissible => admission::admits(content),
        }
    }
}

/// A filter whose positive result assigns `label`
#[derive(Debug, Clone)]
pub struct LabeledFilter {
    label: String,
    filter: Filter,
}

impl LabeledFilter {
    pub fn new(label: impl Into<String>, filter: Filter) -> Self {
        Self {
            label: label.into(),
            filter,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn matches(&self, content: &str) -> bool {
        self.filter.matches(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never() -> Filter {
        Filter::not(Filter::Always)
    }

    /// Always-true filter that records each evaluation in its budget
    fn counting(budget: &Arc<MatchBudget>) -> Filter {
        Filter::with_budget(Arc::clone(budget), Filter::Always)
    }

    #[test]
    fn test_always_and_not() {
        assert!(Filter::Always.matches(""));
        assert!(!Filter::not(Filter::Always).matches("anything"));
        assert!(Filter::not(never()).matches("anything"));
    }

    #[test]
    fn test_keyword_is_case_sensitive_substring() {
        let filter = Filter::keyword(["extends", "implements"]);
        assert!(filter.matches("class A extends B"));
        assert!(filter.matches("class A implements B"));
        assert!(!filter.matches("class A EXTENDS B"));
        assert!(!Filter::keyword(Vec::<String>::new()).matches("x"));
    }

    #[test]
    fn test_regex_is_unanchored_find() {
        let filter = Filter::regex([r"class\s+[A-z]*Builder"]).unwrap();
        assert!(filter.matches("package x;\n\npublic class FooBuilder {\n}"));
        assert!(!filter.matches("public class Foo {}"));
    }

    #[test]
    fn test_regex_rejects_invalid_pattern() {
        let err = Filter::regex(["ok", "(unclosed"]).unwrap_err();
        match err {
            ClassifyError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_and_short_circuits() {
        assert!(!Filter::And(vec![Filter::Always, never()]).matches("x"));
        assert!(Filter::And(vec![]).matches("x"));

        let budget = MatchBudget::new(5);
        Filter::And(vec![never(), counting(&budget)]).matches("x");
        assert_eq!(budget.remaining(), 5, "second child evaluated after a false");

        Filter::And(vec![Filter::Always, counting(&budget)]).matches("x");
        assert_eq!(budget.remaining(), 4);
    }

    #[test]
    fn test_or_short_circuits() {
        assert!(Filter::Or(vec![never(), Filter::Always]).matches("x"));
        assert!(!Filter::Or(vec![]).matches("x"));

        let budget = MatchBudget::new(5);
        Filter::Or(vec![Filter::Always, counting(&budget)]).matches("x");
        assert_eq!(budget.remaining(), 5, "second child evaluated after a true");

        Filter::Or(vec![never(), counting(&budget)]).matches("x");
        assert_eq!(budget.remaining(), 4);
    }

    #[test]
    fn test_limited_returns_true_exactly_n_times() {
        let filter = Filter::limited(3, Filter::Always);
        let hits = (0..10).filter(|_| filter.matches("x")).count();
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_limited_unlimited_and_zero() {
        let unlimited = Filter::limited(UNLIMITED, Filter::Always);
        assert!((0..1000).all(|_| unlimited.matches("x")));

        let zero = Filter::limited(0, Filter::Always);
        assert!((0..10).all(|_| !zero.matches("x")));
    }

    #[test]
    fn test_limited_does_not_evaluate_child_when_exhausted() {
        let inner = MatchBudget::new(10);
        let filter = Filter::limited(1, counting(&inner));

        assert!(filter.matches("x"));
        assert!(!filter.matches("x"));
        assert!(!filter.matches("x"));
        assert_eq!(inner.remaining(), 9);
    }

    #[test]
    fn test_limited_only_counts_positive_results() {
        let filter = Filter::limited(1, Filter::keyword(["hit"]));
        assert!(!filter.matches("miss"));
        assert!(!filter.matches("miss again"));
        assert!(filter.matches("hit"));
        assert!(!filter.matches("hit"));
    }

    #[test]
    fn test_budget_is_shared_between_clones() {
        let filter = Filter::limited(2, Filter::Always);
        let copy = filter.clone();
        assert!(filter.matches("x"));
        assert!(copy.matches("x"));
        assert!(!filter.matches("x"));
        assert!(!copy.matches("x"));
    }

    #[test]
    fn test_labeled_filter_delegates() {
        let labeled = LabeledFilter::new("Builder", Filter::keyword(["Builder"]));
        assert_eq!(labeled.label(), "Builder");
        assert!(labeled.matches("class FooBuilder"));
        assert!(!labeled.matches("class Foo"));
    }
}
