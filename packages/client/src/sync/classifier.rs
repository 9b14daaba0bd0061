//! Change Classifier: decides whether a local change batch syncs now.
//!
//! A drag or resize emits a frame per pointer move with the in-progress flag
//! set, then one final frame with the flag cleared. Only the final frame may
//! reach the network.

use crate::domain::{EdgeChange, NodeChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Settled content change
    SyncNow,
    /// A gesture is still in flight
    Defer,
    /// Visual-only change
    Ignore,
}

impl SyncDecision {
    pub fn should_sync(self) -> bool {
        matches!(self, Self::SyncNow)
    }
}

/// Classify a batch of node changes.
///
/// Add and remove always sync, even when the same batch carries an
/// in-flight drag frame. Otherwise any in-progress flag defers the batch,
/// and a cleared flag syncs it. A position without a drag flag is a
/// programmatic move and syncs. Dimensions without a resize flag are
/// measurements and selection is visual, so neither syncs.
pub fn classify_node_changes(changes: &[NodeChange]) -> SyncDecision {
    let structural = changes
        .iter()
        .any(|c| matches!(c, NodeChange::Add { .. } | NodeChange::Remove { .. }));
    if structural {
        return SyncDecision::SyncNow;
    }

    let in_progress = changes.iter().any(|c| gesture_flag(c) == Some(true));
    if in_progress {
        return SyncDecision::Defer;
    }

    let settled = changes.iter().any(|c| match c {
        NodeChange::Position {
            position, dragging, ..
        } => *dragging == Some(false) || (dragging.is_none() && position.is_some()),
        NodeChange::Dimensions { resizing, .. } => *resizing == Some(false),
        _ => false,
    });
    if settled {
        SyncDecision::SyncNow
    } else {
        SyncDecision::Ignore
    }
}

/// Classify a batch of edge changes. Selection is visual-only.
pub fn classify_edge_changes(changes: &[EdgeChange]) -> SyncDecision {
    if changes
        .iter()
        .any(|c| matches!(c, EdgeChange::Add { .. } | EdgeChange::Remove { .. }))
    {
        SyncDecision::SyncNow
    } else {
        SyncDecision::Ignore
    }
}

fn gesture_flag(change: &NodeChange) -> Option<bool> {
    match change {
        NodeChange::Position { dragging, .. } => *dragging,
        NodeChange::Dimensions { resizing, .. } => *resizing,
        _ => None,
    }
}
