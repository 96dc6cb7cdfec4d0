//! # Application Error Handling
//!
//! [`Error`] is the fatal channel: anything carried by it ends the run.
//! Faults confined to one ontology are [`crate::mapping::MappingError`]s and
//! never surface here.

use crate::{graph::domain::GraphStoreError, ontology::loader::OntologyLoadError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),

    #[error(transparent)]
    JSON(#[from] serde_json::Error),

    /// An input ontology could not be read or parsed.
    #[error(transparent)]
    OntologyLoad(#[from] OntologyLoadError),

    /// The graph store could not be opened or read.
    #[error(transparent)]
    Store(#[from] GraphStoreError),

    #[error(transparent)]
    Any(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Any(Box::new(err))
    }

    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::Message(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn wrapped_errors_keep_their_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such ontology");
        assert_eq!(Error::wrap(io).to_string(), "no such ontology");
        assert_eq!(Error::string("boom").to_string(), "boom");
    }
}
