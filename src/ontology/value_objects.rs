use std::fmt;

use oxrdf::NamedNode;
use thiserror::Error;

/// Absolute IRI naming an ontology entity.
///
/// Ordering is lexicographic on the IRI text, which is what canonical
/// equivalence-group representatives are picked by.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(String);

impl Iri {
    /// Parses `text` as an absolute IRI.
    ///
    /// # Errors
    ///
    /// When `text` is not a valid IRI.
    pub fn new(text: impl Into<String>) -> Result<Self, IriError> {
        let text = text.into();
        match NamedNode::new(text.as_str()) {
            Ok(_) => Ok(Self(text)),
            Err(_) => Err(IriError::Invalid { value: text }),
        }
    }

    /// Wraps one of the vocabulary constants in [`super::vocab`].
    pub(crate) fn known(text: &'static str) -> Self {
        Self(text.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bracketed form printed by ontology tooling, `<http://example.org/onto#Class>`.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("<{}>", self.0)
    }

    #[must_use]
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NamedNode> for Iri {
    fn from(node: NamedNode) -> Self {
        Self(node.into_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
}
