// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine facade: forest, state, flattening, and windowing in one place.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use sylva_window::{ScrollAlign, UniformRows, Viewport};

use crate::cascade::{apply_cascade, reconcile_loaded};
use crate::config::TreeConfig;
use crate::drag::DragState;
use crate::error::{LoadError, TreeError};
use crate::flatten::{Filter, VisibleRow, compute_visible_rows};
use crate::loader::{LoadReport, LoadRequest, Loader, fetch};
use crate::mutation;
use crate::search::SearchTerm;
use crate::state::{StateKind, StateSets};
use crate::store::{Forest, NodeRef};
use crate::types::{Changes, NodeKey, Position, RowFlags, TreeNode};

/// The rows to materialize for the current scroll position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TreeWindow<'a> {
    /// Rows `start..end` of the visible sequence.
    pub rows: &'a [VisibleRow],
    /// Index of the first realized row.
    pub start: usize,
    /// One past the last realized row.
    pub end: usize,
    /// Offset at which to place the first realized row.
    pub translate_offset: f64,
    /// Height of the whole visible sequence, for sizing the scroll area.
    pub total_height: f64,
}

/// Result of an expand or toggle command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expansion<P = ()> {
    /// The node is now expanded.
    Expanded,
    /// The node is now collapsed.
    Collapsed,
    /// The node is a lazy stand-in and is now loading. Run the loader with
    /// the request and pass the outcome to [`TreeEngine::finish_load`].
    NeedsLoad(LoadRequest<P>),
    /// Nothing changed (already expanded, or a load is already in flight).
    Unchanged,
}

impl<P> Expansion<P> {
    /// What the command changed.
    #[must_use]
    pub fn changes(&self) -> Changes {
        match self {
            Self::Expanded | Self::Collapsed => Changes::EXPANSION,
            Self::NeedsLoad(_) => Changes::LOADING,
            Self::Unchanged => Changes::empty(),
        }
    }
}

/// A completed drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropOutcome {
    /// Node that was dragged.
    pub dragged: String,
    /// Node it was dropped on.
    pub target: String,
    /// Requested placement relative to `target`.
    pub position: Position,
    /// Whether the engine moved the node itself.
    ///
    /// `false` when default drag and drop is off, or when the move was
    /// rejected (for example, a drop into the dragged node's own subtree).
    pub moved: bool,
    /// Everything the drop changed.
    pub changes: Changes,
}

/// A windowed tree: the canonical forest, its view state, and the visible
/// window derived from them.
///
/// Commands mutate the forest or the state sets and return [`Changes`]. The
/// visible sequence is recomputed lazily on the next read, so a batch of
/// commands costs one flatten.
///
/// The engine expects sequential calls from a single owner. The only
/// concurrency it takes part in is lazy loading: requests issued by
/// [`TreeEngine::begin_load`] may be outstanding in any number and complete
/// in any order.
///
/// ## Example
///
/// ```rust
/// use sylva_tree::{Position, TreeConfig, TreeEngine, TreeNode};
///
/// let mut tree: TreeEngine = TreeEngine::new(
///     vec![TreeNode::new("A", "A").child(TreeNode::new("B", "B"))],
///     TreeConfig::default(),
/// );
/// let ids = |tree: &mut TreeEngine| -> Vec<String> {
///     let rows = tree.rows().to_vec();
///     rows.iter().map(|r| tree.node(r.key).unwrap().id().to_owned()).collect()
/// };
///
/// assert_eq!(ids(&mut tree), ["A"]);
/// tree.expand("A").unwrap();
/// assert_eq!(ids(&mut tree), ["A", "B"]);
/// assert!(tree.move_node("B", "A", Position::Before));
/// assert_eq!(ids(&mut tree), ["B", "A"]);
/// ```
pub struct TreeEngine<P = ()> {
    forest: Forest<P>,
    state: StateSets,
    filter: Option<Filter<P>>,
    search: SearchTerm,
    rows: Vec<VisibleRow>,
    rows_stale: bool,
    viewport: Viewport<UniformRows>,
    drag: DragState,
    config: TreeConfig,
}

impl<P> core::fmt::Debug for TreeEngine<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeEngine")
            .field("forest", &self.forest)
            .field("state", &self.state)
            .field("filtered", &self.filter.is_some())
            .field("search", &self.search.as_str())
            .field("rows", &self.rows.len())
            .field("rows_stale", &self.rows_stale)
            .field("viewport", &self.viewport)
            .field("drag", &self.drag)
            .field("config", &self.config)
            .finish()
    }
}

impl<P> Default for TreeEngine<P> {
    fn default() -> Self {
        Self::new(Vec::new(), TreeConfig::default())
    }
}

impl<P> TreeEngine<P> {
    /// Creates an engine over `nodes` with empty state sets.
    #[must_use]
    pub fn new(nodes: Vec<TreeNode<P>>, config: TreeConfig) -> Self {
        Self {
            forest: Forest::from_nodes(nodes),
            state: StateSets::new(),
            filter: None,
            search: SearchTerm::default(),
            rows: Vec::new(),
            rows_stale: true,
            viewport: Viewport::new(
                UniformRows::new(0, config.row_height),
                config.viewport_height,
                config.overscan_rows,
            ),
            drag: DragState::new(),
            config,
        }
    }

    /// Sets the initial filter predicate.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(&NodeRef<'_, P>) -> bool + 'static) -> Self {
        self.set_filter(filter);
        self
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The canonical forest.
    #[must_use]
    pub fn forest(&self) -> &Forest<P> {
        &self.forest
    }

    /// The state memberships.
    #[must_use]
    pub fn state(&self) -> &StateSets {
        &self.state
    }

    // --- data ---

    /// Replaces the whole forest.
    ///
    /// State memberships are kept; ids that no longer exist simply have no
    /// effect. Loads still in flight for replaced nodes are discarded when
    /// they complete, unless an unloaded node with the same id exists again.
    pub fn set_data(&mut self, nodes: Vec<TreeNode<P>>) -> Changes {
        self.forest.set_data(nodes);
        tracing::debug!(nodes = self.forest.len(), "replaced tree data");
        self.invalidate_rows();
        Changes::STRUCTURE
    }

    /// Owned snapshot of the current forest, including moves and loads.
    #[must_use]
    pub fn data(&self) -> Vec<TreeNode<P>>
    where
        P: Clone,
    {
        self.forest.to_nodes()
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn find_node_by_id(&self, id: &str) -> Option<NodeRef<'_, P>> {
        self.forest.get(id)
    }

    /// Resolves a row key to its node.
    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<NodeRef<'_, P>> {
        self.forest.node(key)
    }

    /// Returns `true` iff `candidate_id` is `ancestor_id` or inside its subtree.
    #[must_use]
    pub fn is_descendant(&self, ancestor_id: &str, candidate_id: &str) -> bool {
        self.forest.is_descendant(ancestor_id, candidate_id)
    }

    /// Mutable access to a node's payload.
    ///
    /// The visible sequence is recomputed on the next read, since the filter
    /// may look at payloads.
    pub fn payload_mut(&mut self, id: &str) -> Option<&mut P> {
        let key = self.forest.key_of(id)?;
        self.rows_stale = true;
        self.forest.payload_mut(key)
    }

    // --- visible rows and window ---

    /// The visible sequence, recomputed if anything changed since the last read.
    pub fn rows(&mut self) -> &[VisibleRow] {
        self.ensure_rows();
        &self.rows
    }

    /// The realized slice of the visible sequence for the current scroll offset.
    pub fn window(&mut self) -> TreeWindow<'_> {
        self.ensure_rows();
        let w = self.viewport.window();
        TreeWindow {
            rows: &self.rows[w.range()],
            start: w.start,
            end: w.end,
            translate_offset: w.translate_offset,
            total_height: w.total_height,
        }
    }

    /// Presentation flags for `row`, combining the state sets with the row.
    #[must_use]
    pub fn row_flags(&self, row: &VisibleRow) -> RowFlags {
        let Some(node) = self.forest.node(row.key) else {
            return RowFlags::empty();
        };
        let id = node.id();
        let mut flags = RowFlags::empty();
        flags.set(
            RowFlags::EXPANDED,
            row.forced_open || self.state.contains(StateKind::Expanded, id),
        );
        flags.set(
            RowFlags::HAS_CHILDREN,
            node.child_keys().is_some_and(|c| !c.is_empty())
                || (self.config.lazy && node.is_unloaded()),
        );
        flags.set(RowFlags::LOADING, self.state.contains(StateKind::Loading, id));
        flags.set(RowFlags::SELECTED, self.state.contains(StateKind::Selected, id));
        flags.set(RowFlags::CHECKED, self.state.contains(StateKind::Checked, id));
        flags.set(RowFlags::FOCUSED, self.state.focused() == Some(id));
        flags.set(RowFlags::DRAG_OVER, self.drag.over() == Some(id));
        flags.set(RowFlags::SEARCH_MATCH, row.is_search_match);
        flags
    }

    /// Byte ranges of the row's label that match the active search term.
    #[must_use]
    pub fn highlight(&self, row: &VisibleRow) -> Vec<Range<usize>> {
        self.forest
            .node(row.key)
            .map(|n| self.search.spans(n.label()))
            .unwrap_or_default()
    }

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.viewport.scroll_offset()
    }

    /// Sets the scroll offset reported by the host's scroll container.
    pub fn set_scroll_offset(&mut self, offset: f64) -> Changes {
        if self.viewport.set_scroll_offset(offset) {
            Changes::SCROLL
        } else {
            Changes::empty()
        }
    }

    /// Resizes the viewport.
    pub fn set_viewport_height(&mut self, height: f64) -> Changes {
        if self.viewport.set_viewport_height(height) {
            Changes::SCROLL
        } else {
            Changes::empty()
        }
    }

    /// Scrolls the row of `id` into view. No-op if the node is not visible.
    pub fn scroll_to(&mut self, id: &str, align: ScrollAlign) -> Changes {
        match self.row_index(id) {
            Some(index) if self.viewport.scroll_to_index(index, align) => Changes::SCROLL,
            _ => Changes::empty(),
        }
    }

    /// Forces the visible sequence to be recomputed.
    pub fn refresh(&mut self) -> Changes {
        self.invalidate_rows();
        Changes::FILTER
    }

    // --- expansion ---

    /// Returns `true` if `id` is in the expanded set.
    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.state.contains(StateKind::Expanded, id)
    }

    /// Collapses `id`. Unknown ids are tolerated.
    pub fn collapse(&mut self, id: &str) -> Changes {
        self.assign_expanded(id, false)
    }

    /// Empties the expanded set.
    pub fn collapse_all(&mut self) -> Changes {
        if self.state.clear(StateKind::Expanded) {
            self.invalidate_rows();
            Changes::EXPANSION
        } else {
            Changes::empty()
        }
    }

    /// Expands every node with children, loaded or lazily available.
    ///
    /// Lazy nodes are marked expanded but not fetched; see
    /// [`TreeEngine::expand_all_with`].
    pub fn expand_all(&mut self) -> Changes {
        let keys = self.forest.keys_depth_first();
        self.expand_keys(&keys)
    }

    /// Finishes a load started by [`TreeEngine::begin_load`].
    ///
    /// On success the children are spliced in (an empty list still marks the
    /// node loaded), cascaded memberships are extended to them, and the node
    /// is expanded. On failure the node stays unloaded, is collapsed, and the
    /// error is returned; it can be expanded again to retry.
    ///
    /// A completion for a node that no longer exists, or that has children
    /// by now, is discarded apart from clearing its loading flag.
    pub fn finish_load(
        &mut self,
        id: &str,
        result: Result<Vec<TreeNode<P>>, LoadError>,
    ) -> Result<Changes, TreeError> {
        let mut changes = Changes::empty();
        if self.state.assign(StateKind::Loading, id, false) {
            changes |= Changes::LOADING;
        }
        let key = match self.forest.get(id) {
            Some(node) if !node.is_loaded() => node.key(),
            _ => {
                tracing::debug!(id, "discarding stale load completion");
                return Ok(changes);
            }
        };
        match result {
            Ok(children) => {
                let count = children.len();
                self.forest.replace_children(key, children);
                changes |= Changes::STRUCTURE;
                if reconcile_loaded(&self.forest, &mut self.state, StateKind::Checked, key) {
                    changes |= Changes::CHECKED;
                }
                if self.config.cascade_select
                    && reconcile_loaded(&self.forest, &mut self.state, StateKind::Selected, key)
                {
                    changes |= Changes::SELECTION;
                }
                changes |= self.assign_expanded(id, true);
                self.invalidate_rows();
                tracing::debug!(id, children = count, "loaded children");
                Ok(changes)
            }
            Err(source) => {
                tracing::warn!(id, error = %source, "loading children failed");
                self.assign_expanded(id, false);
                Err(TreeError::Load {
                    id: String::from(id),
                    source,
                })
            }
        }
    }

    // --- selection ---

    /// Returns `true` if `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.state.contains(StateKind::Selected, id)
    }

    /// Adds or removes `id` from the selection, with its loaded subtree when
    /// `cascade` is set.
    pub fn set_selected(&mut self, id: &str, value: bool, cascade: bool) -> Changes {
        if apply_cascade(
            &self.forest,
            &mut self.state,
            StateKind::Selected,
            id,
            value,
            cascade,
        ) {
            Changes::SELECTION
        } else {
            Changes::empty()
        }
    }

    /// Row click. No-op when the tree is not selectable or `id` is unknown.
    ///
    /// With `multi` and multi-selection enabled the node is toggled;
    /// otherwise the selection is replaced by the node. Cascades when
    /// cascading selection is on. The node also takes the focus.
    pub fn select(&mut self, id: &str, multi: bool) -> Changes {
        if !self.config.selectable || self.forest.key_of(id).is_none() {
            return Changes::empty();
        }
        let cascade = self.config.cascade_select;
        let mut changes = if multi && self.config.multi_select {
            let value = !self.is_selected(id);
            self.set_selected(id, value, cascade)
        } else {
            let before = self.state.selected().clone();
            self.state.clear(StateKind::Selected);
            self.set_selected(id, true, cascade);
            if *self.state.selected() == before {
                Changes::empty()
            } else {
                Changes::SELECTION
            }
        };
        changes |= self.focus(id);
        changes
    }

    /// Selects `id` alone, replacing the selection unless multi-selection is
    /// on. No-op when the tree is not selectable.
    ///
    /// Never cascades; cascading selection belongs to [`TreeEngine::select`].
    pub fn select_node(&mut self, id: &str) -> Changes {
        if !self.config.selectable {
            return Changes::empty();
        }
        let mut changes = Changes::empty();
        if !self.config.multi_select {
            changes |= self.clear_selection();
        }
        changes | self.set_selected(id, true, false)
    }

    /// Removes `id` from the selection, leaving its descendants alone.
    pub fn unselect_node(&mut self, id: &str) -> Changes {
        self.set_selected(id, false, false)
    }

    /// Empties the selection.
    pub fn clear_selection(&mut self) -> Changes {
        if self.state.clear(StateKind::Selected) {
            Changes::SELECTION
        } else {
            Changes::empty()
        }
    }

    /// Selected nodes present in the forest, in depth-first order.
    #[must_use]
    pub fn selected_nodes(&self) -> Vec<NodeRef<'_, P>> {
        self.members(StateKind::Selected)
    }

    // --- checkboxes ---

    /// Returns `true` if `id` is checked.
    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.state.contains(StateKind::Checked, id)
    }

    /// Checks or unchecks `id`, with its loaded subtree when `cascade` is set.
    ///
    /// Children loaded later under a checked node are checked on arrival.
    pub fn set_checked(&mut self, id: &str, value: bool, cascade: bool) -> Changes {
        if apply_cascade(
            &self.forest,
            &mut self.state,
            StateKind::Checked,
            id,
            value,
            cascade,
        ) {
            Changes::CHECKED
        } else {
            Changes::empty()
        }
    }

    /// Checks `id` in checkbox mode.
    pub fn check_node(&mut self, id: &str, cascade: bool) -> Changes {
        if !self.config.checkbox {
            return Changes::empty();
        }
        self.set_checked(id, true, cascade)
    }

    /// Unchecks `id` in checkbox mode.
    pub fn uncheck_node(&mut self, id: &str, cascade: bool) -> Changes {
        if !self.config.checkbox {
            return Changes::empty();
        }
        self.set_checked(id, false, cascade)
    }

    /// Checkbox click: flips `id` and its loaded subtree.
    pub fn toggle_check(&mut self, id: &str) -> Changes {
        if !self.config.checkbox {
            return Changes::empty();
        }
        let value = !self.is_checked(id);
        self.set_checked(id, value, true)
    }

    /// Checked nodes present in the forest, in depth-first order.
    #[must_use]
    pub fn checked_nodes(&self) -> Vec<NodeRef<'_, P>> {
        self.members(StateKind::Checked)
    }

    // --- filter and search ---

    /// Replaces the filter predicate. Rejected nodes hide their whole subtree.
    pub fn set_filter(&mut self, filter: impl Fn(&NodeRef<'_, P>) -> bool + 'static) -> Changes {
        self.filter = Some(alloc::boxed::Box::new(filter));
        self.invalidate_rows();
        Changes::FILTER
    }

    /// Removes the filter predicate.
    pub fn clear_filter(&mut self) -> Changes {
        if self.filter.take().is_some() {
            self.invalidate_rows();
            Changes::FILTER
        } else {
            Changes::empty()
        }
    }

    /// Sets the search term (trimmed; empty clears the search) and scrolls
    /// back to the top.
    pub fn search(&mut self, term: &str) -> Changes {
        let term = SearchTerm::new(term);
        let mut changes = Changes::empty();
        if term != self.search {
            tracing::debug!(term = term.as_str(), "search term changed");
            self.search = term;
            self.invalidate_rows();
            changes |= Changes::FILTER;
        }
        changes | self.set_scroll_offset(0.0)
    }

    /// The active search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        self.search.as_str()
    }

    // --- focus ---

    /// Id holding the focus cursor.
    #[must_use]
    pub fn focused_id(&self) -> Option<&str> {
        self.state.focused()
    }

    /// Moves the focus cursor to `id`.
    pub fn focus(&mut self, id: &str) -> Changes {
        if self.state.set_focused(Some(id)) {
            Changes::FOCUS
        } else {
            Changes::empty()
        }
    }

    /// Index of the focused node in the current visible sequence.
    ///
    /// Resolved against the fresh sequence on every call; `None` when nothing
    /// is focused or the focused node is not visible.
    pub fn focused_index(&mut self) -> Option<usize> {
        let id = String::from(self.state.focused()?);
        self.row_index(&id)
    }

    /// Moves the focus `delta` rows, clamped to the visible sequence, and
    /// scrolls the focused row into view.
    ///
    /// Without a visible focused row the focus lands on the first row.
    pub fn move_focus(&mut self, delta: isize) -> Changes {
        self.ensure_rows();
        let current = self.focused_index();
        let len = self.rows.len();
        if len == 0 {
            return Changes::empty();
        }
        let index = match current {
            Some(i) => i.saturating_add_signed(delta).min(len - 1),
            None => 0,
        };
        let Some(id) = self.forest.node(self.rows[index].key).map(|n| String::from(n.id())) else {
            return Changes::empty();
        };
        let mut changes = self.focus(&id);
        if self.viewport.scroll_to_index(index, ScrollAlign::Nearest) {
            changes |= Changes::SCROLL;
        }
        changes
    }

    // --- moves and drag and drop ---

    /// Moves `dragged` with its subtree next to or into `target`.
    ///
    /// Fails without touching the forest if either id is unknown or `target`
    /// lies inside the subtree of `dragged`.
    pub fn try_move_node(
        &mut self,
        dragged: &str,
        target: &str,
        position: Position,
    ) -> Result<Changes, TreeError> {
        mutation::try_move_node(&mut self.forest, dragged, target, position)?;
        self.invalidate_rows();
        Ok(Changes::STRUCTURE)
    }

    /// Like [`TreeEngine::try_move_node`], reporting only success.
    pub fn move_node(&mut self, dragged: &str, target: &str, position: Position) -> bool {
        self.try_move_node(dragged, target, position).is_ok()
    }

    /// Begins dragging `id`. No-op unless rows are draggable and `id` exists.
    pub fn start_drag(&mut self, id: &str) -> Changes {
        if !self.config.draggable || self.forest.key_of(id).is_none() {
            return Changes::empty();
        }
        self.drag.on_start(id);
        Changes::DRAG
    }

    /// The pointer hovers the row of `id` during a drag.
    pub fn drag_over(&mut self, id: &str) -> Changes {
        if self.drag.on_over(id) {
            Changes::DRAG
        } else {
            Changes::empty()
        }
    }

    /// The pointer leaves the hovered row.
    pub fn drag_leave(&mut self) -> Changes {
        if self.drag.on_leave() {
            Changes::DRAG
        } else {
            Changes::empty()
        }
    }

    /// Id of the node being dragged.
    #[must_use]
    pub fn dragged_id(&self) -> Option<&str> {
        self.drag.dragged()
    }

    /// Abandons the drag without dropping, for example when the pointer is
    /// released outside the tree.
    pub fn cancel_drag(&mut self) -> Changes {
        if self.drag.cancel() {
            Changes::DRAG
        } else {
            Changes::empty()
        }
    }

    /// Ends the drag by dropping into `target`.
    pub fn drop(&mut self, target: &str) -> Option<DropOutcome> {
        self.drop_at(target, Position::Inside)
    }

    /// Ends the drag on `target` at `position`.
    ///
    /// The drag state is cleared in every case. With default drag and drop
    /// enabled the node is moved; otherwise the outcome tells the host what
    /// was requested. Returns `None` if no drag was in progress.
    pub fn drop_at(&mut self, target: &str, position: Position) -> Option<DropOutcome> {
        let dropped = self.drag.on_drop(target)?;
        let mut changes = Changes::DRAG;
        let moved = self.config.default_drag_drop
            && match self.try_move_node(&dropped.dragged, &dropped.target, position) {
                Ok(c) => {
                    changes |= c;
                    true
                }
                Err(_) => false,
            };
        Some(DropOutcome {
            dragged: dropped.dragged,
            target: dropped.target,
            position,
            moved,
            changes,
        })
    }

    // --- internals ---

    fn invalidate_rows(&mut self) {
        self.rows_stale = true;
    }

    fn ensure_rows(&mut self) {
        if !self.rows_stale {
            return;
        }
        self.rows = compute_visible_rows(
            &self.forest,
            self.state.expanded(),
            self.filter.as_deref(),
            &self.search,
        );
        self.viewport.metrics_mut().set_count(self.rows.len());
        self.rows_stale = false;
    }

    fn row_index(&mut self, id: &str) -> Option<usize> {
        let key = self.forest.key_of(id)?;
        self.ensure_rows();
        self.rows.iter().position(|r| r.key == key)
    }

    fn assign_expanded(&mut self, id: &str, value: bool) -> Changes {
        if self.state.assign(StateKind::Expanded, id, value) {
            self.invalidate_rows();
            Changes::EXPANSION
        } else {
            Changes::empty()
        }
    }

    fn expand_keys(&mut self, keys: &[NodeKey]) -> Changes {
        let mut changes = Changes::empty();
        for &key in keys {
            let Some(node) = self.forest.node(key) else {
                continue;
            };
            let expandable = node.has_children() || node.child_keys().is_some_and(|c| !c.is_empty());
            if expandable && self.state.assign(StateKind::Expanded, node.id(), true) {
                changes |= Changes::EXPANSION;
            }
        }
        if !changes.is_empty() {
            self.invalidate_rows();
        }
        changes
    }

    fn members(&self, kind: StateKind) -> Vec<NodeRef<'_, P>> {
        let set = self.state.set(kind);
        if set.is_empty() {
            return Vec::new();
        }
        self.forest
            .keys_depth_first()
            .into_iter()
            .filter_map(|k| self.forest.node(k))
            .filter(|n| set.contains(n.id()))
            .collect()
    }
}

/// Lazy loading needs to copy payloads into [`LoadRequest`]s.
impl<P: Clone> TreeEngine<P> {
    /// Marks the lazy node `id` loading and returns the request to run.
    ///
    /// Returns `None` if `id` is unknown, already has children, or is
    /// already loading; a repeated expand of a loading node is a no-op.
    pub fn begin_load(&mut self, id: &str) -> Option<LoadRequest<P>> {
        let node = self.forest.get(id)?;
        if !node.is_unloaded() || self.state.contains(StateKind::Loading, id) {
            return None;
        }
        let request = LoadRequest {
            id: String::from(node.id()),
            label: String::from(node.label()),
            payload: node.payload().clone(),
        };
        self.state.assign(StateKind::Loading, id, true);
        Some(request)
    }

    /// Expands `id`.
    ///
    /// In lazy mode an unloaded node is not expanded yet: it is marked
    /// loading and the returned [`Expansion::NeedsLoad`] carries the request.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if `id` is not in the forest.
    pub fn expand(&mut self, id: &str) -> Result<Expansion<P>, TreeError> {
        let node = self.forest.get(id).ok_or_else(|| TreeError::not_found(id))?;
        if self.config.lazy && node.is_unloaded() {
            return Ok(match self.begin_load(id) {
                Some(request) => Expansion::NeedsLoad(request),
                None => Expansion::Unchanged,
            });
        }
        Ok(if self.assign_expanded(id, true).is_empty() {
            Expansion::Unchanged
        } else {
            Expansion::Expanded
        })
    }

    /// Row-arrow click: collapses an expanded node, expands any other.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if `id` is not in the forest.
    pub fn toggle_expand(&mut self, id: &str) -> Result<Expansion<P>, TreeError> {
        if self.forest.key_of(id).is_none() {
            return Err(TreeError::not_found(id));
        }
        if self.is_expanded(id) {
            self.collapse(id);
            return Ok(Expansion::Collapsed);
        }
        self.expand(id)
    }

    /// [`TreeEngine::expand`], running `loader` when the node needs loading.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] for unknown ids, [`TreeError::Load`] when
    /// the loader fails.
    pub async fn expand_with<L: Loader<P>>(
        &mut self,
        id: &str,
        loader: &L,
    ) -> Result<Changes, TreeError> {
        let expansion = self.expand(id)?;
        self.settle(expansion, loader).await
    }

    /// [`TreeEngine::toggle_expand`], running `loader` when the node needs loading.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] for unknown ids, [`TreeError::Load`] when
    /// the loader fails.
    pub async fn toggle_expand_with<L: Loader<P>>(
        &mut self,
        id: &str,
        loader: &L,
    ) -> Result<Changes, TreeError> {
        let expansion = self.toggle_expand(id)?;
        self.settle(expansion, loader).await
    }

    /// Expands everything, loading lazy nodes as they are reached.
    ///
    /// All unloaded lazy nodes are fetched concurrently. As each load lands,
    /// its new subtree is expanded and any lazy nodes inside it are fetched
    /// in the same fan-out. Completion order does not matter: row order comes
    /// from the tree structure. Failed loads are collected in the report and
    /// leave their nodes collapsed.
    ///
    /// Outside lazy mode this is [`TreeEngine::expand_all`].
    pub async fn expand_all_with<L: Loader<P>>(&mut self, loader: &L) -> LoadReport {
        let mut report = LoadReport {
            changes: self.expand_all(),
            errors: Vec::new(),
        };
        if !self.config.lazy {
            return report;
        }

        let mut pending = FuturesUnordered::new();
        let keys = self.forest.keys_depth_first();
        for request in self.begin_loads(&keys) {
            report.changes |= Changes::LOADING;
            pending.push(fetch(loader, request));
        }
        tracing::debug!(in_flight = pending.len(), "expanding all");

        while let Some((id, result)) = pending.next().await {
            match self.finish_load(&id, result) {
                Ok(changes) => {
                    report.changes |= changes;
                    if !changes.contains(Changes::STRUCTURE) {
                        continue;
                    }
                    let Some(key) = self.forest.key_of(&id) else {
                        continue;
                    };
                    let subtree = self.forest.descendants(key);
                    report.changes |= self.expand_keys(&subtree);
                    for request in self.begin_loads(&subtree) {
                        pending.push(fetch(loader, request));
                    }
                }
                Err(err) => {
                    report.changes |= Changes::LOADING | Changes::EXPANSION;
                    report.errors.push(err);
                }
            }
        }
        tracing::debug!(failed = report.errors.len(), "expand all finished");
        report
    }

    async fn settle<L: Loader<P>>(
        &mut self,
        expansion: Expansion<P>,
        loader: &L,
    ) -> Result<Changes, TreeError> {
        match expansion {
            Expansion::NeedsLoad(request) => {
                let (id, result) = fetch(loader, request).await;
                self.finish_load(&id, result).map(|c| c | Changes::LOADING)
            }
            other => Ok(other.changes()),
        }
    }

    fn begin_loads(&mut self, keys: &[NodeKey]) -> Vec<LoadRequest<P>> {
        let ids: Vec<String> = keys
            .iter()
            .filter_map(|&k| self.forest.node(k))
            .filter(|n| n.is_unloaded())
            .map(|n| String::from(n.id()))
            .collect();
        ids.iter().filter_map(|id| self.begin_load(id)).collect()
    }
}
