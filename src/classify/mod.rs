//! Classification Pipeline
//!
//! Content first passes an optional admission filter, then the labeled category
//! filters are tried in declaration order and the first match names the category.

pub mod admission;
pub mod catalog;
mod error;
pub mod filter;

pub use catalog::{CategorySpec, FilterSpec};
pub use error::{ClassifyError, ClassifyResult};
pub use filter::{Filter, LabeledFilter, MatchBudget, UNLIMITED};

use crate::core::validation::{validate_category_label, validate_unique_labels};

#[derive(Debug, Clone)]
pub struct Classifier {
    admission: Option<Filter>,
    categories: Vec<LabeledFilter>,
}

impl Classifier {
    pub fn new(admission: Option<Filter>, categories: Vec<LabeledFilter>) -> Self {
        Self {
            admission,
            categories,
        }
    }

    /// Compile configured categories
    ///
    /// With a `category_limit`, each category is additionally capped at that many
    /// matches for the whole run.
    pub fn from_specs(
        admission: Option<&FilterSpec>,
        categories: &[CategorySpec],
        category_limit: Option<i64>,
    ) -> ClassifyResult<Self> {
        validate_unique_labels(categories.iter().map(|c| c.label.as_str())).map_err(|e| {
            ClassifyError::InvalidCategory {
                label: duplicate_label(categories).unwrap_or_default(),
                message: e.message().to_string(),
            }
        })?;

        let mut compiled = Vec::with_capacity(categories.len());
        for spec in categories {
            validate_category_label(&spec.label).map_err(|e| ClassifyError::InvalidCategory {
                label: spec.label.clone(),
                message: e.message().to_string(),
            })?;

            let mut filter = spec.filter.compile()?;
            if let Some(limit) = category_limit {
                filter = Filter::limited(limit, filter);
            }
            compiled.push(LabeledFilter::new(spec.label.clone(), filter));
        }

        let admission = admission.map(FilterSpec::compile).transpose()?;
        Ok(Self::new(admission, compiled))
    }

    /// Label for `content`, or `None` if it is not admitted or matches no category
    pub fn classify(&self, content: &str) -> Option<&str> {
        if let Some(admission) = &self.admission {
            if !admission.matches(content) {
                return None;
            }
        }

        self.categories
            .iter()
            .find(|category| category.matches(content))
            .map(LabeledFilter::label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(LabeledFilter::label)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn duplicate_label(categories: &[CategorySpec]) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    categories
        .iter()
        .find(|c| !seen.insert(c.label.as_str()))
        .map(|c| c.label.clone())
}

#[cfg(test)]
mod tests {
    use super::catalog::{default_admission, default_test_keywords, design_patterns};
    use super::*;

    fn patterns() -> Classifier {
        Classifier::from_specs(
            Some(&default_admission(&default_test_keywords())),
            &design_patterns(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let classifier = Classifier::new(
            None,
            vec![
                LabeledFilter::new("First", Filter::keyword(["shared"])),
                LabeledFilter::new("Second", Filter::keyword(["shared"])),
            ],
        );
        assert_eq!(classifier.classify("shared content"), Some("First"));
        assert_eq!(classifier.classify("nothing"), None);
    }

    #[test]
    fn test_later_categories_not_evaluated_after_match() {
        let budget = MatchBudget::new(3);
        let classifier = Classifier::new(
            None,
            vec![
                LabeledFilter::new("Hit", Filter::Always),
                LabeledFilter::new("Probe", Filter::with_budget(budget.clone(), Filter::Always)),
            ],
        );
        classifier.classify("x");
        assert_eq!(budget.remaining(), 3);
    }

    #[test]
    fn test_admission_gates_categories() {
        let budget = MatchBudget::new(3);
        let classifier = Classifier::new(
            Some(Filter::Admissible),
            vec![LabeledFilter::new(
                "Any",
                Filter::with_budget(budget.clone(), Filter::Always),
            )],
        );
        assert_eq!(classifier.classify("bad\u{01}"), None);
        assert_eq!(budget.remaining(), 3);
        assert_eq!(classifier.classify("good"), Some("Any"));
    }

    #[test]
    fn test_design_pattern_samples() {
        let classifier = patterns();
        let samples = [
            ("public class PipeAdapter implements Pipe {}", Some("Adapter")),
            ("class ApplesToOrangesBuilder {}", Some("Adapter")),
            (
                "public class RemoteBridge extends Base implements Device {}",
                Some("Bridge"),
            ),
            ("public class FooBuilder {\n}\n", Some("Builder")),
            ("class LoggingDecorator {}", Some("Decorator")),
            ("class NullLogger implements Logger {}", Some("Null Object")),
            ("public class IdleState {}", Some("State")),
            (
                "public interface SortStrategy extends Comparator {}",
                Some("Strategy"),
            ),
            (
                "public abstract class Game {\n    abstract void play();\n    public final void run() { play(); }\n}\n",
                Some("Template Method"),
            ),
            ("public class Util { static int add(int a, int b) { return a + b; } }", None),
            ("public class FooBuilderTest {}", None),
        ];

        for (content, expected) in samples {
            assert_eq!(classifier.classify(content), expected, "{:?}", content);
        }
    }

    #[test]
    fn test_category_limit_caps_each_category() {
        let classifier = Classifier::from_specs(None, &design_patterns(), Some(1)).unwrap();
        assert_eq!(classifier.classify("class ABuilder {}"), Some("Builder"));
        assert_eq!(classifier.classify("class BBuilder {}"), None);
        assert_eq!(classifier.classify("class CDecorator {}"), Some("Decorator"));
    }

    #[test]
    fn test_from_specs_rejects_bad_labels() {
        let dup = vec![
            CategorySpec::new("Same", FilterSpec::Always),
            CategorySpec::new("Same", FilterSpec::Always),
        ];
        match Classifier::from_specs(None, &dup, None).unwrap_err() {
            ClassifyError::InvalidCategory { label, .. } => assert_eq!(label, "Same"),
            other => panic!("unexpected error: {other:?}"),
        }

        let slash = vec![CategorySpec::new("a/b", FilterSpec::Always)];
        assert!(Classifier::from_specs(None, &slash, None).is_err());
    }

    #[test]
    fn test_labels_in_declaration_order() {
        let classifier = patterns();
        let labels: Vec<&str> = classifier.labels().collect();
        assert_eq!(labels.first(), Some(&"Adapter"));
        assert_eq!(labels.last(), Some(&"Template Method"));
        assert_eq!(classifier.len(), 8);
    }
}
