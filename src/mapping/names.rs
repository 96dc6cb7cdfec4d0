//! Node key derivation.
//!
//! The default rule slices the qualified identifier between the fragment
//! marker and the closing bracket. Identifiers without a fragment keep their
//! whole bracketed form as key, so two distinct classes only collide when
//! their qualified identifiers are identical, while slash-style IRIs produce
//! long keys. [`LocalNameResolver`] is the well-defined alternative.

use serde::{Deserialize, Serialize};

const FRAGMENT_MARKER: char = '#';
const CLOSING_DELIMITER: char = '>';

/// Derives the deduplication key of a node from a qualified identifier.
pub trait NameResolver: Send + Sync {
    fn key_for(&self, qualified: &str) -> String;
}

/// Key strategies selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    #[default]
    Fragment,
    LocalName,
}

impl KeyStrategy {
    #[must_use]
    pub fn resolver(self) -> Box<dyn NameResolver> {
        match self {
            Self::Fragment => Box::new(FragmentKeyResolver),
            Self::LocalName => Box::new(LocalNameResolver),
        }
    }
}

/// Substring between the first `#` and the next `>`, else the identifier verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentKeyResolver;

impl NameResolver for FragmentKeyResolver {
    fn key_for(&self, qualified: &str) -> String {
        let Some(marker) = qualified.find(FRAGMENT_MARKER) else {
            return qualified.to_owned();
        };
        let fragment = &qualified[marker + FRAGMENT_MARKER.len_utf8()..];
        match fragment.find(CLOSING_DELIMITER) {
            Some(end) => fragment[..end].to_owned(),
            None => fragment.to_owned(),
        }
    }
}

/// Fragment if present, otherwise the last path segment, brackets stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalNameResolver;

impl NameResolver for LocalNameResolver {
    fn key_for(&self, qualified: &str) -> String {
        let iri = qualified
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix(CLOSING_DELIMITER))
            .unwrap_or(qualified);
        if let Some((_, fragment)) = iri.split_once(FRAGMENT_MARKER) {
            if !fragment.is_empty() {
                return fragment.to_owned();
            }
        }
        iri.trim_end_matches(['/', '#'])
            .rsplit(['/', ':'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(iri)
            .to_owned()
    }
}
