use std::fmt;

use serde::{Deserialize, Serialize};

/// Category label attached to every class node of one ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Discipline,
    Domain,
    Species,
    Generic,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discipline => "DISCIPLINE",
            Self::Domain => "DOMAIN",
            Self::Species => "SPECIES",
            Self::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword and the category it selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: Category,
}

impl CategoryRule {
    #[must_use]
    pub fn new(keyword: impl Into<String>, category: Category) -> Self {
        Self {
            keyword: keyword.into(),
            category,
        }
    }
}

/// Picks the category of an ontology from its file path.
///
/// Rules are tried in order against the lowercased path and the first keyword
/// found as a substring wins. Paths matching no rule are [`Category::Generic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelClassifier {
    rules: Vec<CategoryRule>,
}

impl Default for LabelClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl LabelClassifier {
    #[must_use]
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| CategoryRule {
                keyword: rule.keyword.to_lowercase(),
                category: rule.category,
            })
            .collect();
        Self { rules }
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> Category {
        let path = path.to_lowercase();
        self.rules
            .iter()
            .find(|rule| path.contains(&rule.keyword))
            .map_or(Category::Generic, |rule| rule.category)
    }
}

/// `disciplines`, `fairsharing` and `taxon`, in that order.
#[must_use]
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("disciplines", Category::Discipline),
        CategoryRule::new("fairsharing", Category::Domain),
        CategoryRule::new("taxon", Category::Species),
    ]
}
