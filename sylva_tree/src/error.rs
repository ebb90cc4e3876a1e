// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;

/// Failure reported by a [`Loader`](crate::Loader) while fetching children.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    /// Creates a load error with a human-readable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message the loader gave.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by engine operations.
///
/// None of these leave the forest or the state sets half-mutated: every
/// operation either applies completely or not at all.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The operation referenced an id absent from the forest.
    #[error("node `{id}` not found")]
    NotFound {
        /// The missing id.
        id: String,
    },
    /// The move would place a node onto itself or inside its own subtree.
    #[error("cannot move `{dragged}` relative to `{target}`: target is inside the moved subtree")]
    CycleRejected {
        /// The node being moved.
        dragged: String,
        /// The requested target.
        target: String,
    },
    /// The loader failed; the node reverted to unloaded and can be retried.
    #[error("loading children of `{id}` failed")]
    Load {
        /// The node whose children were requested.
        id: String,
        /// What the loader reported.
        #[source]
        source: LoadError,
    },
}

impl TreeError {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_ids() {
        assert_eq!(TreeError::not_found("x").to_string(), "node `x` not found");
        let err = TreeError::Load {
            id: "n".into(),
            source: LoadError::new("timeout"),
        };
        assert_eq!(err.to_string(), "loading children of `n` failed");
        assert_eq!(
            core::error::Error::source(&err).map(ToString::to_string),
            Some("timeout".into())
        );
    }
}
