//! Local Graph Store: the live nodes, edges and viewport of the open chart.

use std::collections::HashMap;

use crate::domain::{
    BehaviorRegistry, Connection, Edge, EdgeChange, GraphError, GraphState, Node, NodeBehavior,
    NodeChange, Viewport, XYPosition, apply_edge_changes, apply_node_changes, connect,
};

/// Owns the graph exclusively; every mutation goes through here.
#[derive(Debug)]
pub struct LocalGraphStore {
    graph: GraphState,
    registry: BehaviorRegistry,
    behaviors: HashMap<String, NodeBehavior>,
}

impl LocalGraphStore {
    pub fn new(registry: BehaviorRegistry) -> Self {
        Self {
            graph: GraphState::default(),
            registry,
            behaviors: HashMap::new(),
        }
    }

    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    pub fn viewport(&self) -> Viewport {
        self.graph.viewport
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.graph.nodes.iter().find(|n| n.id == id)
    }

    pub fn behavior(&self, node_id: &str) -> Option<&NodeBehavior> {
        self.behaviors.get(node_id)
    }

    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        apply_node_changes(changes, &mut self.graph.nodes, &mut self.graph.edges);
        if changes
            .iter()
            .any(|c| matches!(c, NodeChange::Add { .. } | NodeChange::Remove { .. }))
        {
            self.reattach();
        }
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        apply_edge_changes(changes, &mut self.graph.edges);
    }

    /// Add an edge for `connection` unless one already joins the same
    /// endpoints. Returns the applied change.
    pub fn connect(&mut self, connection: Connection) -> Option<EdgeChange> {
        let change = connect(connection, &self.graph.edges)?;
        self.apply_edge_changes(std::slice::from_ref(&change));
        Some(change)
    }

    /// Create a node of `kind` at `position` with a fresh id.
    pub fn add_node(&mut self, kind: &str, position: XYPosition) -> NodeChange {
        let mut node = Node::new(kind, position);
        if let Some(class) = self.registry.behavior_for(Some(kind)).and_then(|b| b.default_class) {
            node.class_name = Some(class.to_string());
        }
        let change = NodeChange::Add { node };
        self.apply_node_changes(std::slice::from_ref(&change));
        change
    }

    /// Add a copy of `node_id` next to it. Returns the applied change.
    pub fn duplicate_node(&mut self, node_id: &str) -> Result<NodeChange, GraphError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?
            .duplicate();
        let change = NodeChange::Add { node };
        self.apply_node_changes(std::slice::from_ref(&change));
        Ok(change)
    }

    /// Run the node's text-edit behaviour.
    pub fn update_node_text(&mut self, node_id: &str, text: &str) -> Result<(), GraphError> {
        let behavior = self
            .behaviors
            .get(node_id)
            .cloned()
            .ok_or_else(|| match self.node(node_id) {
                Some(_) => GraphError::NotEditable(node_id.to_string()),
                None => GraphError::NodeNotFound(node_id.to_string()),
            })?;
        let node = self
            .graph
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        (behavior.on_update_text)(node, text);
        Ok(())
    }

    /// Mark every node and edge selected. Visual only.
    pub fn select_all(&mut self) {
        self.graph.nodes.iter_mut().for_each(|n| n.selected = true);
        self.graph.edges.iter_mut().for_each(|e| e.selected = true);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.graph.viewport = viewport;
    }

    /// Replace nodes and edges wholesale, keeping the viewport.
    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.graph.nodes = nodes;
        self.graph.edges = edges;
        self.reattach();
    }

    /// Replace the whole graph including the viewport.
    pub fn replace_graph(&mut self, graph: GraphState) {
        self.graph = graph;
        self.reattach();
    }

    fn reattach(&mut self) {
        self.behaviors = self.registry.attach(&self.graph.nodes);
        tracing::trace!("Attached behaviour to {} node(s)", self.behaviors.len());
    }
}

impl Default for LocalGraphStore {
    fn default() -> Self {
        Self::new(BehaviorRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: &str) -> Node {
        let mut node = Node::new(kind, XYPosition::default());
        node.id = id.to_string();
        node
    }

    #[test]
    fn test_add_node_attaches_behavior_and_class() {
        // テスト項目: editableNode を追加すると振る舞いと既定クラスが付与される
        // given (前提条件):
        let mut store = LocalGraphStore::default();

        // when (操作):
        let change = store.add_node("editableNode", XYPosition::new(5.0, 5.0));

        // then (期待する結果):
        let id = change.id().to_string();
        assert!(id.starts_with("dndnode_"));
        assert!(store.behavior(&id).is_some());
        assert_eq!(store.node(&id).unwrap().class_name.as_deref(), Some("w-[200px] h-[100px]"));
        assert_eq!(store.node(&id).unwrap().label(), Some("editableNode node"));
    }

    #[test]
    fn test_duplicate_node() {
        // テスト項目: 複製は新しい ID でずらした位置に追加され、振る舞いも付与される
        // given (前提条件):
        let mut store = LocalGraphStore::default();
        let mut original = node("a", "editableNode");
        original.position = XYPosition::new(10.0, 20.0);
        original.selected = true;
        original.data.insert("label".to_string(), "hello".into());
        store.replace(vec![original], vec![]);

        // when (操作):
        let change = store.duplicate_node("a").unwrap();

        // then (期待する結果):
        let id = change.id().to_string();
        assert!(id.starts_with("dndnode_"));
        let copy = store.node(&id).unwrap();
        assert_eq!(copy.position, XYPosition::new(60.0, 70.0));
        assert_eq!(copy.label(), Some("hello"));
        assert_eq!(copy.kind(), Some("editableNode"));
        assert!(!copy.selected);
        assert!(store.behavior(&id).is_some());
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(
            store.duplicate_node("missing"),
            Err(GraphError::NodeNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_replace_reattaches_behavior() {
        // テスト項目: 丸ごと置換の後にもテキスト編集の振る舞いが再付与される
        // given (前提条件):
        let mut store = LocalGraphStore::default();

        // when (操作):
        store.replace(vec![node("a", "decisionNode"), node("b", "input")], vec![]);

        // then (期待する結果):
        assert!(store.behavior("a").is_some());
        assert!(store.behavior("b").is_none());
        assert!(store.update_node_text("a", "yes?").is_ok());
        assert_eq!(store.node("a").unwrap().label(), Some("yes?"));
    }

    #[test]
    fn test_update_node_text_errors() {
        // テスト項目: 存在しないノードと編集不可のノードはそれぞれのエラーになる
        let mut store = LocalGraphStore::default();
        store.replace(vec![node("b", "input")], vec![]);

        assert_eq!(
            store.update_node_text("missing", "x"),
            Err(GraphError::NodeNotFound("missing".to_string()))
        );
        assert_eq!(
            store.update_node_text("b", "x"),
            Err(GraphError::NotEditable("b".to_string()))
        );
    }

    #[test]
    fn test_remove_drops_behavior() {
        // テスト項目: ノードを削除すると振る舞いも外れる
        let mut store = LocalGraphStore::default();
        store.replace(vec![node("a", "editableNode")], vec![]);

        store.apply_node_changes(&[NodeChange::Remove { id: "a".to_string() }]);

        assert!(store.behavior("a").is_none());
        assert!(store.nodes().is_empty());
    }

    #[test]
    fn test_connect_twice_adds_one_edge() {
        // テスト項目: 同じ接続を二度行ってもエッジは一本
        let mut store = LocalGraphStore::default();
        store.replace(vec![node("a", "input"), node("b", "output")], vec![]);

        assert!(store.connect(Connection::new("a", "b")).is_some());
        assert!(store.connect(Connection::new("a", "b")).is_none());
        assert_eq!(store.edges().len(), 1);
    }

    #[test]
    fn test_select_all_and_replace_keeps_viewport() {
        // テスト項目: select_all は全要素を選択し、replace はビューポートを保持する
        // given (前提条件):
        let mut store = LocalGraphStore::default();
        let viewport = Viewport { x: 3.0, y: 4.0, zoom: 2.0 };
        store.set_viewport(viewport);
        store.replace(vec![node("a", "input")], vec![]);

        // when (操作):
        store.select_all();

        // then (期待する結果):
        assert!(store.nodes().iter().all(|n| n.selected));
        assert_eq!(store.viewport(), viewport);
    }
}
