//! History Manager: undo / redo over settled graph content.

use crate::domain::{Edge, Node};

/// Immutable copy of `{nodes, edges}`.
///
/// Selection is stripped on capture, so a selection-only difference never
/// produces a distinct history entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistorySnapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl HistorySnapshot {
    pub fn capture(nodes: &[Node], edges: &[Edge]) -> Self {
        Self {
            nodes: nodes
                .iter()
                .cloned()
                .map(|mut n| {
                    n.selected = false;
                    n
                })
                .collect(),
            edges: edges
                .iter()
                .cloned()
                .map(|mut e| {
                    e.selected = false;
                    e
                })
                .collect(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }
}

/// Past / present / future stacks. Unbounded.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<HistorySnapshot>,
    present: HistorySnapshot,
    future: Vec<HistorySnapshot>,
    initial: HistorySnapshot,
}

impl History {
    pub fn new(initial: HistorySnapshot) -> Self {
        Self {
            past: Vec::new(),
            present: initial.clone(),
            future: Vec::new(),
            initial,
        }
    }

    /// Record a settled state. Returns `false` when it equals the present
    /// entry and was dropped.
    pub fn push(&mut self, snapshot: HistorySnapshot) -> bool {
        if snapshot == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, snapshot);
        self.past.push(previous);
        self.future.clear();
        true
    }

    pub fn undo(&mut self) -> Option<HistorySnapshot> {
        let previous = self.past.pop()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(self.present.clone())
    }

    pub fn redo(&mut self) -> Option<HistorySnapshot> {
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        Some(self.present.clone())
    }

    /// Drop both stacks and go back to the initial snapshot.
    pub fn reset(&mut self) -> HistorySnapshot {
        self.past.clear();
        self.future.clear();
        self.present = self.initial.clone();
        self.present.clone()
    }

    /// Re-seed with a new initial snapshot, e.g. after the chart loads.
    pub fn reset_to(&mut self, initial: HistorySnapshot) {
        *self = Self::new(initial);
    }

    pub fn present(&self) -> &HistorySnapshot {
        &self.present
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::XYPosition;

    fn snapshot(ids: &[&str]) -> HistorySnapshot {
        let nodes: Vec<Node> = ids
            .iter()
            .map(|id| {
                let mut node = Node::new("default", XYPosition::default());
                node.id = id.to_string();
                node
            })
            .collect();
        HistorySnapshot::capture(&nodes, &[])
    }

    #[test]
    fn test_undo_restores_previous_push() {
        // テスト項目: N 回 push した後の undo は N-1 番目を返す
        // given (前提条件):
        let mut history = History::new(snapshot(&[]));
        history.push(snapshot(&["a"]));
        history.push(snapshot(&["a", "b"]));
        history.push(snapshot(&["a", "b", "c"]));

        // when (操作):
        let restored = history.undo();

        // then (期待する結果):
        assert_eq!(restored, Some(snapshot(&["a", "b"])));
        assert!(history.can_redo());
    }

    #[test]
    fn test_redo_after_undo_restores_latest() {
        // テスト項目: undo の後の redo は N 番目を返す
        let mut history = History::new(snapshot(&[]));
        history.push(snapshot(&["a"]));
        history.push(snapshot(&["a", "b"]));
        history.undo();

        let restored = history.redo();

        assert_eq!(restored, Some(snapshot(&["a", "b"])));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_future() {
        // テスト項目: push は future スタックを空にする
        // given (前提条件):
        let mut history = History::new(snapshot(&[]));
        history.push(snapshot(&["a"]));
        history.push(snapshot(&["a", "b"]));
        history.undo();
        assert_eq!(history.future_len(), 1);

        // when (操作):
        history.push(snapshot(&["x"]));

        // then (期待する結果):
        assert_eq!(history.future_len(), 0);
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_reset_restores_initial_and_clears_stacks() {
        // テスト項目: reset は最初のスナップショットに戻り、両スタックを空にする
        let mut history = History::new(snapshot(&["seed"]));
        history.push(snapshot(&["a"]));
        history.push(snapshot(&["b"]));
        history.undo();

        let restored = history.reset();

        assert_eq!(restored, snapshot(&["seed"]));
        assert_eq!(history.past_len(), 0);
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_selection_only_push_is_dropped() {
        // テスト項目: 選択状態だけが異なるスナップショットは履歴に積まれない
        // given (前提条件):
        let mut node = Node::new("default", XYPosition::default());
        node.id = "a".to_string();
        let mut history = History::new(HistorySnapshot::capture(std::slice::from_ref(&node), &[]));

        // when (操作):
        node.selected = true;
        let pushed = history.push(HistorySnapshot::capture(&[node], &[]));

        // then (期待する結果):
        assert!(!pushed);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_on_empty_history() {
        // テスト項目: 空の履歴での undo / redo は None
        let mut history = History::default();

        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_reset_to_reseeds() {
        // テスト項目: reset_to で初期スナップショットが差し替わる
        let mut history = History::default();
        history.push(snapshot(&["a"]));

        history.reset_to(snapshot(&["loaded"]));

        assert_eq!(history.present(), &snapshot(&["loaded"]));
        assert_eq!(history.reset(), snapshot(&["loaded"]));
    }
}
