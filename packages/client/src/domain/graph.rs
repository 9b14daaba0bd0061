//! Graph content: nodes, edges and viewport.
//!
//! These are pure data and serialize to the same JSON the relay and the chart
//! store carry. Client-side behaviour (text editing) is kept out of them and
//! attached by type tag in [`super::behavior`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix of generated node ids.
pub const NODE_ID_PREFIX: &str = "dndnode_";

/// How far a duplicate is shifted from its original on both axes.
pub const DUPLICATE_OFFSET: f64 = 50.0;

/// Prefix of generated edge ids.
pub const EDGE_ID_PREFIX: &str = "edge_";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XYPosition {
    pub x: f64,
    pub y: f64,
}

impl XYPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_zoom() -> f64 {
    1.0
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: default_zoom(),
        }
    }
}

/// A diagram node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    /// Type tag selecting the rendering / behaviour variant
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub position: XYPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl Node {
    /// A new node with a fresh unique id and a default label
    pub fn new(kind: impl Into<String>, position: XYPosition) -> Self {
        let kind = kind.into();
        let mut data = Map::new();
        data.insert("label".to_string(), Value::String(format!("{kind} node")));
        Self {
            id: format!("{NODE_ID_PREFIX}{}", uuid::Uuid::new_v4()),
            kind: Some(kind),
            position,
            width: None,
            height: None,
            data,
            selected: false,
            class_name: None,
        }
    }

    /// A copy under a fresh id, offset from the original and unselected.
    pub fn duplicate(&self) -> Self {
        Self {
            id: format!("{NODE_ID_PREFIX}{}", uuid::Uuid::new_v4()),
            position: XYPosition::new(
                self.position.x + DUPLICATE_OFFSET,
                self.position.y + DUPLICATE_OFFSET,
            ),
            selected: false,
            ..self.clone()
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.data.get("label").and_then(Value::as_str)
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Dimensions { width, height }),
            _ => None,
        }
    }

    pub fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.width = Some(dimensions.width);
        self.height = Some(dimensions.height);
    }
}

/// A connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Edge {
    /// Whether this edge joins the same endpoints as `connection`
    pub fn matches(&self, connection: &Connection) -> bool {
        self.source == connection.source
            && self.target == connection.target
            && self.source_handle == connection.source_handle
            && self.target_handle == connection.target_handle
    }
}

/// A user-drawn connection request, before it becomes an [`Edge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn into_edge(self) -> Edge {
        Edge {
            id: format!("{EDGE_ID_PREFIX}{}", uuid::Uuid::new_v4()),
            source: self.source,
            target: self.target,
            source_handle: self.source_handle,
            target_handle: self.target_handle,
            selected: false,
        }
    }
}

/// The persisted `{nodes, edges, viewport}` shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphState {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl GraphState {
    /// Decode a state blob, tolerating missing or malformed parts.
    ///
    /// Each of `nodes`, `edges` and `viewport` is decoded on its own; a part
    /// that is absent or does not decode falls back to its empty default.
    pub fn from_value(value: &Value) -> Self {
        Self {
            nodes: decode_sequence(value.get("nodes"), "nodes"),
            edges: decode_sequence(value.get("edges"), "edges"),
            viewport: value
                .get("viewport")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default(),
        }
    }

    /// Whether every edge endpoint names a node in this state
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| {
                !self.nodes.iter().any(|n| n.id == e.source)
                    || !self.nodes.iter().any(|n| n.id == e.target)
            })
            .collect()
    }
}

/// Decode an optional JSON array of `T`. Anything else becomes empty.
pub fn decode_sequence<T: serde::de::DeserializeOwned>(value: Option<&Value>, what: &str) -> Vec<T> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            tracing::warn!("Malformed {} payload treated as empty: {}", what, e);
            Vec::new()
        }),
    }
}
