//! Status values observed by the presentation layer

use crate::data::RecipeResultSet;

/// Progress of one load request
///
/// Every load yields `Loading` first and then exactly one of the terminal
/// variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalStatus {
    /// The request is in flight
    Loading,
    /// Recipes served from the cache or a fresh fetch
    Success(RecipeResultSet),
    /// The fetch failed; `cached` is the fallback snapshot, possibly empty
    Error {
        message: String,
        cached: RecipeResultSet,
    },
}

impl RetrievalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RetrievalStatus::Loading)
    }

    /// Recipes carried by a terminal status
    pub fn recipes(&self) -> Option<&RecipeResultSet> {
        match self {
            RetrievalStatus::Loading => None,
            RetrievalStatus::Success(recipes) => Some(recipes),
            RetrievalStatus::Error { cached, .. } => Some(cached),
        }
    }

    /// Error message to notify the user with, if any
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RetrievalStatus::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Identity of a load request
///
/// Epochs increase with every load, so a result can be checked against the
/// most recent request and dropped if it was superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(pub(crate) u64);

impl Epoch {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_is_not_terminal() {
        assert!(!RetrievalStatus::Loading.is_terminal());
        assert!(RetrievalStatus::Loading.recipes().is_none());
    }

    #[test]
    fn test_error_carries_fallback_recipes() {
        let status = RetrievalStatus::Error {
            message: "Timeout".to_string(),
            cached: RecipeResultSet::empty(),
        };

        assert!(status.is_terminal());
        assert_eq!(status.error_message(), Some("Timeout"));
        assert_eq!(status.recipes().map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_success_has_no_error_message() {
        let status = RetrievalStatus::Success(RecipeResultSet::empty());
        assert!(status.error_message().is_none());
    }
}
