//! Declarative filter definitions
//!
//! Categories are configured as a tree of [`FilterSpec`] nodes and compiled into
//! [`Filter`]s once at startup. In TOML a node is either a bare string (`"always"`,
//! `"admissible"`) or a single-key table:
//!
//! ```toml
//! [[category]]
//! label = "Bridge"
//! filter = { all = [ { regex = ["[B,b]ridge"] }, { keyword = ["extends"] } ] }
//! ```

use serde::{Deserialize, Serialize};

use super::error::ClassifyResult;
use super::filter::Filter;

/// Uncompiled filter expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSpec {
    Always,
    Admissible,
    Keyword(Vec<String>),
    Regex(Vec<String>),
    All(Vec<FilterSpec>),
    Any(Vec<FilterSpec>),
    Not(Box<FilterSpec>),
    Limited { budget: i64, filter: Box<FilterSpec> },
}

impl FilterSpec {
    fn regex(patterns: &[&str]) -> Self {
        FilterSpec::Regex(patterns.iter().map(|p| p.to_string()).collect())
    }

    fn keyword(words: &[&str]) -> Self {
        FilterSpec::Keyword(words.iter().map(|w| w.to_string()).collect())
    }

    /// Build the runtime filter; every `limited` node gets its own budget
    pub fn compile(&self) -> ClassifyResult<Filter> {
        Ok(match self {
            FilterSpec::Always => Filter::Always,
            FilterSpec::Admissible => Filter::Admissible,
            FilterSpec::Keyword(words) => Filter::keyword(words.iter().cloned()),
            FilterSpec::Regex(patterns) => Filter::regex(patterns)?,
            FilterSpec::All(children) => Filter::And(compile_all(children)?),
            FilterSpec::Any(children) => Filter::Or(compile_all(children)?),
            FilterSpec::Not(child) => Filter::not(child.compile()?),
            FilterSpec::Limited { budget, filter } => Filter::limited(*budget, filter.compile()?),
        })
    }
}

fn compile_all(children: &[FilterSpec]) -> ClassifyResult<Vec<Filter>> {
    children.iter().map(FilterSpec::compile).collect()
}

/// One configured category: a label and the expression that selects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub label: String,
    pub filter: FilterSpec,
}

impl CategorySpec {
    pub fn new(label: impl Into<String>, filter: FilterSpec) -> Self {
        Self {
            label: label.into(),
            filter,
        }
    }
}

/// Keywords whose presence marks a file as a test
pub fn default_test_keywords() -> Vec<String> {
    vec!["Test".to_string(), "junit".to_string()]
}

/// Admissible content that mentions none of `test_keywords`
pub fn default_admission(test_keywords: &[String]) -> FilterSpec {
    if test_keywords.is_empty() {
        return FilterSpec::Admissible;
    }
    FilterSpec::All(vec![
        FilterSpec::Admissible,
        FilterSpec::Not(Box::new(FilterSpec::Keyword(test_keywords.to_vec()))),
    ])
}

/// Built-in catalog of object-oriented design patterns, in evaluation order
pub fn design_patterns() -> Vec<CategorySpec> {
    vec![
        CategorySpec::new(
            "Adapter",
            FilterSpec::regex(&[
                r"class\s+[A-z]*Adapter",
                r"class\s+[A-z]*2[A-z]+",
                r"class\s+[A-z]+To[A-Z][A-z]*",
            ]),
        ),
        CategorySpec::new(
            "Bridge",
            FilterSpec::All(vec![
                FilterSpec::regex(&["[B,b]ridge"]),
                FilterSpec::keyword(&["extends"]),
                FilterSpec::keyword(&["implements"]),
            ]),
        ),
        CategorySpec::new("Builder", FilterSpec::regex(&[r"class\s+[A-z]*Builder"])),
        CategorySpec::new("Decorator", FilterSpec::regex(&[r"class\s+[A-z]*Decorator"])),
        CategorySpec::new(
            "Null Object",
            FilterSpec::regex(&[
                r"class\s+Null[A-z]+\s+extends\s+",
                r"class\s+Null[A-z]+\s+implements\s+",
            ]),
        ),
        CategorySpec::new(
            "State",
            FilterSpec::regex(&[r"class\s+[A-z]*State", r"interface\s+[A-z]*State"]),
        ),
        // "clasS"/"interfacE" followed by a name and "implementS"/"Extends"
        CategorySpec::new(
            "Strategy",
            FilterSpec::regex(&[
                r"[s,e]\s+[A-z]*Strategy\s+[i,e]",
                r"[s,e]\s+[A-z]*Behaviou?r\s+[i,e]",
            ]),
        ),
        CategorySpec::new(
            "Template Method",
            FilterSpec::All(vec![
                FilterSpec::regex(&[r"abstract\s+[A-z]+\s+[A-z]+\("]),
                FilterSpec::regex(&[r"public\s+[A-z, ]+\s+[A-z]+\("]),
                FilterSpec::regex(&[r"final\s+[A-z, ]+\s+[A-z]+\("]),
                FilterSpec::regex(&[r"abstract\s+class", r"interface\s+"]),
            ]),
        ),
    ]
}
