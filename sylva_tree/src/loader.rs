// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The loader collaborator and the handles that track in-flight loads.

use alloc::string::String;
use alloc::vec::Vec;
use core::future::Future;

use crate::error::{LoadError, TreeError};
use crate::types::{Changes, TreeNode};

/// Everything a loader gets to know about the node it fetches children for.
///
/// Issued by [`TreeEngine::begin_load`](crate::TreeEngine::begin_load), which
/// also marks the node loading. Hand the outcome back to
/// [`TreeEngine::finish_load`](crate::TreeEngine::finish_load) using
/// [`LoadRequest::id`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest<P = ()> {
    /// Id of the lazy node.
    pub id: String,
    /// Its label.
    pub label: String,
    /// A copy of its payload.
    pub payload: P,
}

/// Fetches the children of lazy nodes.
///
/// Called at most once per unresolved node at a time. The engine imposes no
/// timeout and cannot cancel a fetch; a result arriving for a node that no
/// longer needs it is discarded.
///
/// Any `Fn(LoadRequest<P>) -> impl Future` closure is a loader:
///
/// ```rust
/// use sylva_tree::{LoadError, LoadRequest, Loader, TreeNode};
///
/// fn assert_loader<L: Loader>(_: &L) {}
///
/// let loader = |req: LoadRequest| async move {
///     if req.id == "broken" {
///         return Err(LoadError::new("unreachable host"));
///     }
///     Ok(vec![TreeNode::new(format!("{}/child", req.id), "child")])
/// };
/// assert_loader(&loader);
/// ```
pub trait Loader<P = ()> {
    /// Fetches the children of the node described by `request`.
    fn fetch_children(
        &self,
        request: LoadRequest<P>,
    ) -> impl Future<Output = Result<Vec<TreeNode<P>>, LoadError>>;
}

impl<P, F, Fut> Loader<P> for F
where
    F: Fn(LoadRequest<P>) -> Fut,
    Fut: Future<Output = Result<Vec<TreeNode<P>>, LoadError>>,
{
    fn fetch_children(
        &self,
        request: LoadRequest<P>,
    ) -> impl Future<Output = Result<Vec<TreeNode<P>>, LoadError>> {
        self(request)
    }
}

/// Runs one fetch, tagging the outcome with the node id.
///
/// Borrows only the loader so many of these can be in flight while the
/// engine stays free to apply completions.
pub(crate) fn fetch<'l, P, L: Loader<P>>(
    loader: &'l L,
    request: LoadRequest<P>,
) -> impl Future<Output = (String, Result<Vec<TreeNode<P>>, LoadError>)> + 'l
where
    P: 'l,
{
    let id = request.id.clone();
    let pending = loader.fetch_children(request);
    async move { (id, pending.await) }
}

/// Outcome of a bulk expand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Everything the operation changed.
    pub changes: Changes,
    /// Loads that failed; those nodes stay unloaded and collapsed.
    pub errors: Vec<TreeError>,
}

impl LoadReport {
    /// Returns `true` if every load succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
