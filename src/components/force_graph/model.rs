//! Validated, immutable graph used by the layout engine.
//!
//! Raw provider data ([`GraphData`]) is checked once in [`Graph::build`]: node ids
//! must be unique and every link endpoint must name an existing node. Edges are
//! resolved to node indices up front, so the engine never looks ids up while
//! stepping.
//!
//! Algorithm outputs arrive as loosely typed optional fields. They are folded into
//! an [`Attributes`] bag keyed by [`AttributeKey`], where each key has exactly one
//! value kind, so renderers can match on them exhaustively.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::types::{GraphData, GraphLink, GraphNode};

/// Names of the per-node algorithm outputs the dashboard knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKey {
	/// PageRank score.
	PageRank,
	/// Community id from a detection run.
	Community,
	/// Betweenness centrality.
	Betweenness,
	/// Triangles the node takes part in.
	TriangleCount,
	/// Generic centrality score.
	Score,
	/// Display group from the data provider.
	Group,
}

/// Shape of the value stored under an [`AttributeKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
	/// Continuous score, usually in `[0, 1]`.
	Real,
	/// Categorical label such as a community id.
	Category,
	/// Non-negative count.
	Count,
}

impl AttributeKey {
	/// Every key, in display order.
	pub const ALL: [AttributeKey; 6] = [
		AttributeKey::PageRank,
		AttributeKey::Community,
		AttributeKey::Betweenness,
		AttributeKey::TriangleCount,
		AttributeKey::Score,
		AttributeKey::Group,
	];

	/// The value kind stored under this key.
	pub fn kind(self) -> ValueKind {
		match self {
			AttributeKey::PageRank | AttributeKey::Betweenness | AttributeKey::Score => {
				ValueKind::Real
			}
			AttributeKey::Community | AttributeKey::Group => ValueKind::Category,
			AttributeKey::TriangleCount => ValueKind::Count,
		}
	}

	/// Human readable label.
	pub fn label(self) -> &'static str {
		match self {
			AttributeKey::PageRank => "PageRank",
			AttributeKey::Community => "Community",
			AttributeKey::Betweenness => "Betweenness",
			AttributeKey::TriangleCount => "Triangles",
			AttributeKey::Score => "Score",
			AttributeKey::Group => "Group",
		}
	}
}

impl fmt::Display for AttributeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// A single attribute value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttributeValue {
	/// Continuous score.
	Real(f64),
	/// Categorical label.
	Category(u32),
	/// Non-negative count.
	Count(u32),
}

impl AttributeValue {
	/// Numeric view of the value, whatever its kind.
	pub fn as_f64(self) -> f64 {
		match self {
			AttributeValue::Real(v) => v,
			AttributeValue::Category(c) | AttributeValue::Count(c) => c as f64,
		}
	}
}

impl fmt::Display for AttributeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttributeValue::Real(v) => write!(f, "{v:.3}"),
			AttributeValue::Category(c) | AttributeValue::Count(c) => write!(f, "{c}"),
		}
	}
}

/// Typed per-node attribute bag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(BTreeMap<AttributeKey, AttributeValue>);

impl Attributes {
	/// Folds the optional provider fields into the bag, rejecting non-finite scores.
	fn from_raw(node: &GraphNode) -> Result<Self, ValidationError> {
		let mut map = BTreeMap::new();
		let reals = [
			(AttributeKey::PageRank, node.page_rank),
			(AttributeKey::Betweenness, node.betweenness),
			(AttributeKey::Score, node.score),
		];
		for (key, value) in reals {
			if let Some(v) = value {
				if !v.is_finite() {
					return Err(ValidationError::NonFiniteAttribute {
						id: node.id.clone(),
						key,
					});
				}
				map.insert(key, AttributeValue::Real(v));
			}
		}
		if let Some(c) = node.community {
			map.insert(AttributeKey::Community, AttributeValue::Category(c));
		}
		if let Some(g) = node.group {
			map.insert(AttributeKey::Group, AttributeValue::Category(g));
		}
		if let Some(t) = node.triangle_count {
			map.insert(AttributeKey::TriangleCount, AttributeValue::Count(t));
		}
		Ok(Self(map))
	}

	/// Stored value for `key`.
	pub fn get(&self, key: AttributeKey) -> Option<AttributeValue> {
		self.0.get(&key).copied()
	}

	/// True if a value is stored for `key`.
	pub fn contains(&self, key: AttributeKey) -> bool {
		self.0.contains_key(&key)
	}

	/// Continuous value for `key`, or `None` if absent or not a real.
	pub fn real(&self, key: AttributeKey) -> Option<f64> {
		match self.get(key)? {
			AttributeValue::Real(v) => Some(v),
			_ => None,
		}
	}

	/// Category or count for `key`, or `None` if absent or not discrete.
	pub fn discrete(&self, key: AttributeKey) -> Option<u32> {
		match self.get(key)? {
			AttributeValue::Category(c) | AttributeValue::Count(c) => Some(c),
			AttributeValue::Real(_) => None,
		}
	}

	/// Entries in key order.
	pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, AttributeValue)> + '_ {
		self.0.iter().map(|(k, v)| (*k, *v))
	}
}

/// A user in the validated graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique id.
	pub id: String,
	/// Display name; falls back to the id.
	pub name: String,
	/// Algorithm outputs attached to this node.
	pub attributes: Attributes,
}

impl Node {
	fn from_raw(raw: &GraphNode) -> Result<Self, ValidationError> {
		let name = if raw.name.is_empty() {
			raw.id.clone()
		} else {
			raw.name.clone()
		};
		Ok(Self {
			id: raw.id.clone(),
			name,
			attributes: Attributes::from_raw(raw)?,
		})
	}
}

/// An undirected connection between two node indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Index of one endpoint.
	pub source: usize,
	/// Index of the other endpoint.
	pub target: usize,
	/// Positive weight; scales spring strength and stroke width.
	pub value: f64,
	/// Drawn as part of a highlighted path.
	pub highlight: bool,
}

impl Edge {
	/// True when both endpoints are the same node.
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// Canonical node/edge set. Immutable once built; new data means a new graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	index: HashMap<String, usize>,
}

impl Graph {
	/// Validates raw provider data into a graph.
	///
	/// Fails on duplicate node ids, links naming unknown ids, and non-positive or
	/// non-finite link values. Duplicate links are kept as separate edges.
	pub fn build(raw_nodes: &[GraphNode], raw_links: &[GraphLink]) -> Result<Self, ValidationError> {
		let mut index = HashMap::with_capacity(raw_nodes.len());
		let mut nodes = Vec::with_capacity(raw_nodes.len());
		for (i, raw) in raw_nodes.iter().enumerate() {
			if index.insert(raw.id.clone(), i).is_some() {
				return Err(ValidationError::DuplicateNode(raw.id.clone()));
			}
			nodes.push(Node::from_raw(raw)?);
		}

		let mut edges = Vec::with_capacity(raw_links.len());
		for (i, link) in raw_links.iter().enumerate() {
			let resolve = |id: &String| {
				index
					.get(id)
					.copied()
					.ok_or_else(|| ValidationError::UnknownEndpoint {
						index: i,
						id: id.clone(),
					})
			};
			let source = resolve(&link.source)?;
			let target = resolve(&link.target)?;
			if !link.value.is_finite() || link.value <= 0.0 {
				return Err(ValidationError::InvalidEdgeValue {
					index: i,
					value: link.value,
				});
			}
			edges.push(Edge {
				source,
				target,
				value: link.value,
				highlight: link.highlight,
			});
		}

		Ok(Self {
			nodes,
			edges,
			index,
		})
	}

	/// Convenience wrapper over [`Graph::build`].
	pub fn from_data(data: &GraphData) -> Result<Self, ValidationError> {
		Self::build(&data.nodes, &data.links)
	}

	/// Returns a graph with the same nodes and edges but new names and attributes.
	///
	/// `raw_nodes` must name exactly the ids of this graph, in any order. Node order
	/// and edges are preserved, so a layout bound to `self` can be rebound to the
	/// result without restarting.
	pub fn rebind_attributes(&self, raw_nodes: &[GraphNode]) -> Result<Self, ValidationError> {
		let mut replacements: Vec<Option<Node>> = vec![None; self.nodes.len()];
		for raw in raw_nodes {
			let Some(&i) = self.index.get(&raw.id) else {
				return Err(ValidationError::UnknownRebindNode(raw.id.clone()));
			};
			if replacements[i].is_some() {
				return Err(ValidationError::DuplicateNode(raw.id.clone()));
			}
			replacements[i] = Some(Node::from_raw(raw)?);
		}

		let nodes = replacements
			.into_iter()
			.zip(&self.nodes)
			.map(|(node, old)| node.ok_or_else(|| ValidationError::MissingRebindNode(old.id.clone())))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			nodes,
			edges: self.edges.clone(),
			index: self.index.clone(),
		})
	}

	/// True when both graphs have the same ids in the same order and the same
	/// edge endpoints. Attributes and names are ignored.
	pub fn same_identity(&self, other: &Graph) -> bool {
		self.nodes.len() == other.nodes.len()
			&& self.edges.len() == other.edges.len()
			&& self.nodes.iter().zip(&other.nodes).all(|(a, b)| a.id == b.id)
			&& self
				.edges
				.iter()
				.zip(&other.edges)
				.all(|(a, b)| a.source == b.source && a.target == b.target)
	}

	/// Nodes in render order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in input order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Node at `index`.
	pub fn node(&self, index: usize) -> Option<&Node> {
		self.nodes.get(index)
	}

	/// Index of the node with `id`.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when the graph has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of edges touching each node, duplicates included, self-loops excluded.
	pub fn degrees(&self) -> Vec<usize> {
		let mut degrees = vec![0; self.nodes.len()];
		for edge in self.edges.iter().filter(|e| !e.is_self_loop()) {
			degrees[edge.source] += 1;
			degrees[edge.target] += 1;
		}
		degrees
	}

	/// Degree of a single node, or `None` for an out-of-range index.
	pub fn degree(&self, index: usize) -> Option<usize> {
		if index >= self.nodes.len() {
			return None;
		}
		Some(
			self.edges
				.iter()
				.filter(|e| !e.is_self_loop() && (e.source == index || e.target == index))
				.count(),
		)
	}

	/// Number of distinct neighbours of each node.
	pub fn distinct_degrees(&self) -> Vec<usize> {
		let mut neighbours: Vec<HashSet<usize>> = vec![HashSet::new(); self.nodes.len()];
		for edge in self.edges.iter().filter(|e| !e.is_self_loop()) {
			neighbours[edge.source].insert(edge.target);
			neighbours[edge.target].insert(edge.source);
		}
		neighbours.iter().map(HashSet::len).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str) -> GraphNode {
		GraphNode::new(id)
	}

	#[test]
	fn builds_and_resolves_edges() {
		let graph = Graph::build(
			&[node("a"), node("b"), node("c")],
			&[GraphLink::new("a", "b"), GraphLink::new("c", "b").with_value(3.0)],
		)
		.unwrap();

		assert_eq!(graph.len(), 3);
		assert_eq!(graph.edges()[1].source, 2);
		assert_eq!(graph.edges()[1].target, 1);
		assert_eq!(graph.edges()[1].value, 3.0);
		assert_eq!(graph.index_of("c"), Some(2));
	}

	#[test]
	fn rejects_unknown_endpoint() {
		let err = Graph::build(&[node("a")], &[GraphLink::new("a", "missing")]).unwrap_err();
		assert_eq!(
			err,
			ValidationError::UnknownEndpoint {
				index: 0,
				id: "missing".into()
			}
		);
	}

	#[test]
	fn rejects_duplicate_ids() {
		let err = Graph::build(&[node("a"), node("a")], &[]).unwrap_err();
		assert_eq!(err, ValidationError::DuplicateNode("a".into()));
	}

	#[test]
	fn rejects_bad_edge_values() {
		for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
			let err = Graph::build(
				&[node("a"), node("b")],
				&[GraphLink::new("a", "b").with_value(value)],
			)
			.unwrap_err();
			assert!(matches!(err, ValidationError::InvalidEdgeValue { index: 0, .. }));
		}
	}

	#[test]
	fn rejects_non_finite_scores() {
		let mut raw = node("a");
		raw.page_rank = Some(f64::NAN);
		let err = Graph::build(&[raw], &[]).unwrap_err();
		assert_eq!(
			err,
			ValidationError::NonFiniteAttribute {
				id: "a".into(),
				key: AttributeKey::PageRank
			}
		);
	}

	#[test]
	fn empty_graph_is_valid() {
		let graph = Graph::build(&[], &[]).unwrap();
		assert!(graph.is_empty());
		assert!(graph.edges().is_empty());
	}

	#[test]
	fn attributes_are_typed() {
		let mut raw = node("a");
		raw.page_rank = Some(0.4);
		raw.community = Some(3);
		raw.triangle_count = Some(7);
		let graph = Graph::build(&[raw], &[]).unwrap();
		let attrs = &graph.nodes()[0].attributes;

		assert_eq!(attrs.real(AttributeKey::PageRank), Some(0.4));
		assert_eq!(attrs.discrete(AttributeKey::Community), Some(3));
		assert_eq!(attrs.get(AttributeKey::TriangleCount), Some(AttributeValue::Count(7)));
		assert_eq!(attrs.real(AttributeKey::Community), None);
		assert!(!attrs.contains(AttributeKey::Score));
	}

	#[test]
	fn stored_values_match_key_kind() {
		let raw = GraphNode {
			group: Some(2),
			page_rank: Some(0.3),
			community: Some(1),
			betweenness: Some(0.7),
			triangle_count: Some(4),
			score: Some(0.1),
			..node("a")
		};
		let graph = Graph::build(&[raw], &[]).unwrap();
		let attrs = &graph.nodes()[0].attributes;

		assert_eq!(attrs.iter().count(), AttributeKey::ALL.len());
		for (key, value) in attrs.iter() {
			let kind = match value {
				AttributeValue::Real(_) => ValueKind::Real,
				AttributeValue::Category(_) => ValueKind::Category,
				AttributeValue::Count(_) => ValueKind::Count,
			};
			assert_eq!(key.kind(), kind, "{key}");
		}
		assert_eq!(attrs.get(AttributeKey::TriangleCount).map(AttributeValue::as_f64), Some(4.0));
	}

	#[test]
	fn duplicate_links_are_kept() {
		let graph = Graph::build(
			&[node("a"), node("b")],
			&[GraphLink::new("a", "b"), GraphLink::new("b", "a")],
		)
		.unwrap();
		assert_eq!(graph.edges().len(), 2);
		assert_eq!(graph.degrees(), vec![2, 2]);
		assert_eq!(graph.distinct_degrees(), vec![1, 1]);
		assert_eq!(graph.degree(0), Some(2));
		assert_eq!(graph.degree(5), None);
	}

	#[test]
	fn rebind_keeps_identity() {
		let graph = Graph::build(&[node("a"), node("b")], &[GraphLink::new("a", "b")]).unwrap();
		let mut b = node("b");
		b.score = Some(0.9);
		let mut a = node("a");
		a.name = "Alice".into();

		let rebound = graph.rebind_attributes(&[b, a]).unwrap();
		assert!(rebound.same_identity(&graph));
		assert_eq!(rebound.nodes()[0].name, "Alice");
		assert_eq!(rebound.nodes()[1].attributes.real(AttributeKey::Score), Some(0.9));
	}

	#[test]
	fn rebind_rejects_changed_id_set() {
		let graph = Graph::build(&[node("a"), node("b")], &[]).unwrap();
		assert_eq!(
			graph.rebind_attributes(&[node("a")]).unwrap_err(),
			ValidationError::MissingRebindNode("b".into())
		);
		assert_eq!(
			graph.rebind_attributes(&[node("a"), node("b"), node("c")]).unwrap_err(),
			ValidationError::UnknownRebindNode("c".into())
		);
	}

	#[test]
	fn name_falls_back_to_id() {
		let raw = GraphNode {
			id: "u1".into(),
			..Default::default()
		};
		let graph = Graph::build(&[raw], &[]).unwrap();
		assert_eq!(graph.nodes()[0].name, "u1");
	}
}
