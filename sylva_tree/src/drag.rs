// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag-and-drop tracking for tree rows.
//!
//! This module tracks which row is being dragged and which row it currently
//! hovers, independent of how pointer events are captured. The host's input
//! layer translates its raw drag events into the three transitions below, and
//! the engine turns a completed drop into a node move.
//!
//! ## Transitions
//!
//! 1. **Start**: a drag begins on a row. Any previous drag is replaced.
//! 2. **Over**: the pointer hovers a row. Hovering the dragged row itself is
//!    ignored, so a row never highlights as its own drop target.
//! 3. **Leave**: the pointer leaves the hovered row.
//! 4. **Drop**: the drag ends on a target. The state is always cleared,
//!    whether or not a move follows.
//!
//! ## Usage
//!
//! ```
//! use sylva_tree::drag::{DragState, Dropped};
//!
//! let mut drag = DragState::new();
//! drag.on_start("file");
//! assert!(!drag.on_over("file")); // own row: ignored
//! assert!(drag.on_over("folder"));
//! assert_eq!(drag.over(), Some("folder"));
//!
//! let dropped = drag.on_drop("folder");
//! assert_eq!(dropped, Some(Dropped { dragged: "file".into(), target: "folder".into() }));
//! assert!(!drag.is_dragging());
//! ```

use alloc::string::String;

/// Drag gesture state machine keyed by node id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragState {
    /// Node being dragged
    dragged: Option<String>,
    /// Row currently hovered by the drag
    over: Option<String>,
}

/// A completed drag gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dropped {
    /// Node that was dragged.
    pub dragged: String,
    /// Node it was released on.
    pub target: String,
}

impl DragState {
    /// Creates an idle drag state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Id of the dragged node.
    #[must_use]
    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    /// Id of the hovered row.
    #[must_use]
    pub fn over(&self) -> Option<&str> {
        self.over.as_deref()
    }

    /// Begins dragging `id`, replacing any previous gesture.
    pub fn on_start(&mut self, id: &str) {
        self.dragged = Some(String::from(id));
        self.over = None;
    }

    /// Records the hovered row. Returns `true` if the hover target changed.
    ///
    /// Ignored when idle and when `id` is the dragged node.
    pub fn on_over(&mut self, id: &str) -> bool {
        match self.dragged.as_deref() {
            None => false,
            Some(dragged) if dragged == id => false,
            Some(_) if self.over.as_deref() == Some(id) => false,
            Some(_) => {
                self.over = Some(String::from(id));
                true
            }
        }
    }

    /// Clears the hovered row. Returns `true` if there was one.
    pub fn on_leave(&mut self) -> bool {
        self.over.take().is_some()
    }

    /// Ends the gesture on `target` and resets to idle.
    ///
    /// Returns `None` if no drag was in progress.
    pub fn on_drop(&mut self, target: &str) -> Option<Dropped> {
        self.over = None;
        self.dragged.take().map(|dragged| Dropped {
            dragged,
            target: String::from(target),
        })
    }

    /// Abandons the gesture. Returns `true` if one was in progress.
    pub fn cancel(&mut self) -> bool {
        self.over = None;
        self.dragged.take().is_some()
    }
}
