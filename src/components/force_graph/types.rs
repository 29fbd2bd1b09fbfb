//! Raw graph data as delivered by the data providers, before validation.

use serde::{Deserialize, Serialize};

/// A user node as it arrives from a provider.
///
/// Every algorithm-specific field is optional; which ones must be present depends
/// on the [`VisualizationMode`](super::VisualizationMode) used to draw the graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Display name. Falls back to the id when empty.
	#[serde(default)]
	pub name: String,
	/// Coarse grouping used by the plain network view and path results.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group: Option<u32>,
	/// PageRank score.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub page_rank: Option<f64>,
	/// Community id from a detection run.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub community: Option<u32>,
	/// Betweenness centrality.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub betweenness: Option<f64>,
	/// Number of triangles the node takes part in.
	#[serde(
		default,
		alias = "triangles",
		skip_serializing_if = "Option::is_none"
	)]
	pub triangle_count: Option<u32>,
	/// Generic centrality score produced by an algorithm run.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub score: Option<f64>,
}

impl GraphNode {
	/// Creates a node with only an id; the name mirrors it.
	pub fn new(id: impl Into<String>) -> Self {
		let id = id.into();
		Self {
			name: id.clone(),
			id,
			..Default::default()
		}
	}
}

/// A connection between two users. Layout treats it as undirected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Connection strength; drives spring weight and stroke width.
	#[serde(default = "default_link_value")]
	pub value: f64,
	/// Marks links that belong to a highlighted path result.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub highlight: bool,
}

fn default_link_value() -> f64 {
	1.0
}

impl GraphLink {
	/// Creates a plain link with unit value.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			value: 1.0,
			highlight: false,
		}
	}

	/// Sets the link value.
	pub fn with_value(mut self, value: f64) -> Self {
		self.value = value;
		self
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes in render order.
	pub nodes: Vec<GraphNode>,
	/// Links between them.
	pub links: Vec<GraphLink>,
}
