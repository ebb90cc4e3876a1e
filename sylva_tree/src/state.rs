// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Id-keyed state memberships.

use alloc::string::String;

use hashbrown::HashSet;

/// Which set a membership operation targets.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StateKind {
    /// Shown with children.
    Expanded,
    /// Checkbox ticked.
    Checked,
    /// Part of the selection.
    Selected,
    /// A lazy load is in flight.
    Loading,
}

/// Expansion, check, selection, and loading memberships plus the focus cursor.
///
/// Memberships are keyed by node id and may name ids that are not (or no
/// longer) in the forest. Such ids have no visible effect and are never
/// cleaned up eagerly.
#[derive(Clone, Debug, Default)]
pub struct StateSets {
    expanded: HashSet<String>,
    checked: HashSet<String>,
    selected: HashSet<String>,
    loading: HashSet<String>,
    focused: Option<String>,
}

impl StateSets {
    /// Empty memberships, no focus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The set for `kind`.
    #[must_use]
    pub fn set(&self, kind: StateKind) -> &HashSet<String> {
        match kind {
            StateKind::Expanded => &self.expanded,
            StateKind::Checked => &self.checked,
            StateKind::Selected => &self.selected,
            StateKind::Loading => &self.loading,
        }
    }

    pub(crate) fn set_mut(&mut self, kind: StateKind) -> &mut HashSet<String> {
        match kind {
            StateKind::Expanded => &mut self.expanded,
            StateKind::Checked => &mut self.checked,
            StateKind::Selected => &mut self.selected,
            StateKind::Loading => &mut self.loading,
        }
    }

    /// Returns `true` if `id` is a member of the `kind` set.
    #[must_use]
    pub fn contains(&self, kind: StateKind, id: &str) -> bool {
        self.set(kind).contains(id)
    }

    /// Adds or removes `id`. Returns `true` if membership changed.
    pub fn assign(&mut self, kind: StateKind, id: &str, value: bool) -> bool {
        let set = self.set_mut(kind);
        if value {
            if set.contains(id) {
                false
            } else {
                set.insert(id.into())
            }
        } else {
            set.remove(id)
        }
    }

    /// Empties the `kind` set. Returns `true` if it was non-empty.
    pub fn clear(&mut self, kind: StateKind) -> bool {
        let set = self.set_mut(kind);
        let changed = !set.is_empty();
        set.clear();
        changed
    }

    /// Expanded ids.
    #[must_use]
    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    /// Checked ids.
    #[must_use]
    pub fn checked(&self) -> &HashSet<String> {
        &self.checked
    }

    /// Selected ids.
    #[must_use]
    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Ids with a load in flight.
    #[must_use]
    pub fn loading(&self) -> &HashSet<String> {
        &self.loading
    }

    /// The focus cursor.
    #[must_use]
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Moves the focus cursor. Returns `true` if it changed.
    pub fn set_focused(&mut self, id: Option<&str>) -> bool {
        if self.focused.as_deref() == id {
            return false;
        }
        self.focused = id.map(String::from);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_reports_membership_changes() {
        let mut state = StateSets::new();
        assert!(state.assign(StateKind::Checked, "a", true));
        assert!(!state.assign(StateKind::Checked, "a", true));
        assert!(state.contains(StateKind::Checked, "a"));
        assert!(!state.contains(StateKind::Selected, "a"));
        assert!(state.assign(StateKind::Checked, "a", false));
        assert!(!state.assign(StateKind::Checked, "a", false));
    }

    #[test]
    fn missing_ids_are_tolerated() {
        let mut state = StateSets::new();
        assert!(state.assign(StateKind::Expanded, "ghost", true));
        assert!(state.clear(StateKind::Expanded));
        assert!(!state.clear(StateKind::Expanded));
        assert!(state.expanded().is_empty());
    }

    #[test]
    fn focus_cursor_tracks_changes() {
        let mut state = StateSets::new();
        assert!(state.set_focused(Some("x")));
        assert!(!state.set_focused(Some("x")));
        assert_eq!(state.focused(), Some("x"));
        assert!(state.set_focused(None));
        assert_eq!(state.focused(), None);
    }
}
