//! Client-local node behaviour, attached by type tag.
//!
//! Behaviour never travels over the wire. After every load or wholesale
//! replace the store asks the registry for the behaviour of each node's type
//! and keeps it beside the node, keyed by node id.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::graph::Node;

/// Types that carry an inline text editor
pub const INTERACTIVE_NODE_TYPES: [&str; 4] = ["editableNode", "decisionNode", "dataNode", "testNode"];

/// Class applied to freshly dropped text-box style nodes
const TEXT_BOX_CLASS: &str = "w-[200px] h-[100px]";

/// Applies edited text to a node.
pub type TextEditHandler = Arc<dyn Fn(&mut Node, &str) + Send + Sync>;

#[derive(Clone)]
pub struct NodeBehavior {
    pub on_update_text: TextEditHandler,
    pub default_class: Option<&'static str>,
}

impl std::fmt::Debug for NodeBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeBehavior")
            .field("default_class", &self.default_class)
            .finish_non_exhaustive()
    }
}

/// Lookup table from type tag to behaviour
#[derive(Debug, Clone)]
pub struct BehaviorRegistry {
    by_type: HashMap<String, NodeBehavior>,
}

impl BehaviorRegistry {
    pub fn empty() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: impl Into<String>, behavior: NodeBehavior) {
        self.by_type.insert(kind.into(), behavior);
    }

    pub fn behavior_for(&self, kind: Option<&str>) -> Option<&NodeBehavior> {
        kind.and_then(|k| self.by_type.get(k))
    }

    /// Resolve behaviour for every node that has one.
    pub fn attach(&self, nodes: &[Node]) -> HashMap<String, NodeBehavior> {
        nodes
            .iter()
            .filter_map(|n| self.behavior_for(n.kind()).map(|b| (n.id.clone(), b.clone())))
            .collect()
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        let set_label: TextEditHandler = Arc::new(|node: &mut Node, text: &str| {
            node.data
                .insert("label".to_string(), Value::String(text.to_string()));
        });

        let mut registry = Self::empty();
        for kind in INTERACTIVE_NODE_TYPES {
            let default_class = matches!(kind, "editableNode" | "testNode").then_some(TEXT_BOX_CLASS);
            registry.register(
                kind,
                NodeBehavior {
                    on_update_text: set_label.clone(),
                    default_class,
                },
            );
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::XYPosition;

    fn node(id: &str, kind: &str) -> Node {
        let mut node = Node::new(kind, XYPosition::default());
        node.id = id.to_string();
        node
    }

    #[test]
    fn test_default_registry_covers_interactive_types() {
        // テスト項目: 既定のレジストリはインタラクティブな型すべてに振る舞いを持つ
        let registry = BehaviorRegistry::default();

        for kind in INTERACTIVE_NODE_TYPES {
            assert!(registry.behavior_for(Some(kind)).is_some(), "{kind}");
        }
        assert!(registry.behavior_for(Some("default")).is_none());
        assert!(registry.behavior_for(None).is_none());
    }

    #[test]
    fn test_attach_only_interactive_nodes() {
        // テスト項目: attach はインタラクティブなノードにのみ振る舞いを付与する
        // given (前提条件):
        let registry = BehaviorRegistry::default();
        let nodes = vec![node("a", "editableNode"), node("b", "input"), node("c", "decisionNode")];

        // when (操作):
        let attached = registry.attach(&nodes);

        // then (期待する結果):
        assert_eq!(attached.len(), 2);
        assert!(attached.contains_key("a"));
        assert!(attached.contains_key("c"));
    }

    #[test]
    fn test_text_handler_sets_label() {
        // テスト項目: テキスト編集ハンドラは data.label を更新する
        // given (前提条件):
        let registry = BehaviorRegistry::default();
        let mut target = node("a", "dataNode");
        let behavior = registry.behavior_for(target.kind()).unwrap().clone();

        // when (操作):
        (behavior.on_update_text)(&mut target, "hello");

        // then (期待する結果):
        assert_eq!(target.label(), Some("hello"));
    }

    #[test]
    fn test_default_class_for_text_boxes() {
        // テスト項目: editableNode と testNode だけが既定のクラスを持つ
        let registry = BehaviorRegistry::default();

        assert_eq!(
            registry.behavior_for(Some("editableNode")).unwrap().default_class,
            Some(TEXT_BOX_CLASS)
        );
        assert_eq!(registry.behavior_for(Some("decisionNode")).unwrap().default_class, None);
    }
}
