//! Mock data providers for the dashboard.
//!
//! The dashboard stands in for a graph database: the network is generated from a
//! seed, analytics are derived from whatever graph is shown, and algorithm runs,
//! query results and the schema come from canned fixtures under `assets/`.

use std::collections::BTreeSet;
use std::fmt;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::components::force_graph::{AttributeKey, Graph, GraphData, GraphLink, GraphNode, VisualizationMode};

/// Users in the generated network.
pub const NETWORK_SIZE: usize = 50;
/// Number of groups users are spread over.
pub const NETWORK_GROUPS: u32 = 5;
/// Probability that any pair of users is connected.
pub const CONNECTION_DENSITY: f64 = 0.1;

const FIRST_NAMES: [&str; 16] = [
	"Ada", "Ben", "Chloe", "Dmitri", "Elena", "Farid", "Grace", "Hiro", "Ines", "Jonas", "Kira",
	"Luis", "Maya", "Nils", "Olga", "Priya",
];

const LAST_NAMES: [&str; 12] = [
	"Alvarez", "Brandt", "Chen", "Dubois", "Eriksen", "Fischer", "Garcia", "Haddad", "Ivanova",
	"Kowalski", "Moreau", "Novak",
];

/// Generates the social network shown on the main view.
///
/// Every user carries a group, a PageRank in `[0.1, 0.9)`, a community equal to
/// its group, and a betweenness in `[0, 1)`, so any of the network views can draw
/// it. Each pair of users is linked with probability [`CONNECTION_DENSITY`] and a
/// strength between 1 and 5.
pub fn network_data(seed: u64) -> GraphData {
	let mut rng = StdRng::seed_from_u64(seed);

	let nodes: Vec<GraphNode> = (0..NETWORK_SIZE)
		.map(|i| {
			let group = rng.gen_range(0..NETWORK_GROUPS);
			let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
			let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
			GraphNode {
				id: format!("user{i}"),
				name: format!("{first} {last}"),
				group: Some(group),
				page_rank: Some(rng.gen_range(0.1..0.9)),
				community: Some(group),
				betweenness: Some(rng.gen_range(0.0..1.0)),
				..Default::default()
			}
		})
		.collect();

	let mut links = Vec::new();
	for i in 0..NETWORK_SIZE {
		for j in (i + 1)..NETWORK_SIZE {
			if rng.gen_bool(CONNECTION_DENSITY) {
				let value = rng.gen_range(1..=5u32) as f64;
				links.push(GraphLink::new(format!("user{i}"), format!("user{j}")).with_value(value));
			}
		}
	}

	info!("data: generated {} users, {} connections", nodes.len(), links.len());
	GraphData { nodes, links }
}

/// The most influential user, by PageRank (or generic score).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Influencer {
	/// Display name.
	pub name: String,
	/// PageRank, or the generic score when no PageRank is present.
	pub score: f64,
}

/// Headline numbers for the analytics cards.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
	/// Number of users.
	pub total_users: usize,
	/// Number of connections, duplicates included.
	pub total_connections: usize,
	/// Connections per user.
	pub avg_connections: f64,
	/// Distinct community labels, falling back to groups.
	pub communities: usize,
	/// Connections over the number of possible undirected pairs.
	pub density: f64,
	/// Highest-scoring user, if any user carries a score.
	pub most_influential: Option<Influencer>,
}

impl AnalyticsSummary {
	/// Summarizes a validated graph.
	pub fn from_graph(graph: &Graph) -> Self {
		let users = graph.len();
		let connections = graph.edges().len();

		let labels = |key: AttributeKey| -> BTreeSet<u32> {
			graph
				.nodes()
				.iter()
				.filter_map(|n| n.attributes.discrete(key))
				.collect()
		};
		let mut communities = labels(AttributeKey::Community);
		if communities.is_empty() {
			communities = labels(AttributeKey::Group);
		}

		let pairs = users * users.saturating_sub(1) / 2;
		let most_influential = graph
			.nodes()
			.iter()
			.filter_map(|n| {
				let score = n
					.attributes
					.real(AttributeKey::PageRank)
					.or_else(|| n.attributes.real(AttributeKey::Score))?;
				Some(Influencer {
					name: n.name.clone(),
					score,
				})
			})
			.max_by(|a, b| a.score.total_cmp(&b.score));

		Self {
			total_users: users,
			total_connections: connections,
			avg_connections: if users == 0 {
				0.0
			} else {
				connections as f64 / users as f64
			},
			communities: communities.len(),
			density: if pairs == 0 {
				0.0
			} else {
				connections as f64 / pairs as f64
			},
			most_influential,
		}
	}
}

/// Family of graph algorithm a fixture demonstrates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
	/// Ranks nodes by importance.
	Centrality,
	/// Groups densely connected nodes.
	Community,
	/// Finds routes between nodes.
	Pathfinding,
}

/// One reported number from an algorithm run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
	/// Short title.
	pub name: String,
	/// Preformatted value.
	pub value: String,
	/// One-line explanation.
	pub description: String,
}

/// A canned algorithm run: the query shown to the user and its result graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmExample {
	/// Stable tab key.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Algorithm family, shown as a badge.
	pub kind: AlgorithmKind,
	/// Encoding used to draw `visual_data`.
	pub view: VisualizationMode,
	/// What the algorithm computes.
	pub description: String,
	/// Cypher call that would run it.
	pub query: String,
	/// Headline numbers of the run.
	pub metrics: Vec<Metric>,
	/// Result graph.
	pub visual_data: GraphData,
}

const CATALOG: &str = include_str!("../assets/algorithms.json");

/// All algorithm fixtures, in display order.
pub fn algorithm_catalog() -> Result<Vec<AlgorithmExample>, serde_json::Error> {
	let catalog: Vec<AlgorithmExample> = serde_json::from_str(CATALOG)?;
	info!("data: loaded {} algorithm examples", catalog.len());
	Ok(catalog)
}

/// One value in a query result row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
	/// Numeric column.
	Number(f64),
	/// Text column.
	Text(String),
	/// Collected list, shown comma-separated.
	List(Vec<String>),
}

impl fmt::Display for Cell {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Cell::Number(n) => write!(f, "{n}"),
			Cell::Text(s) => f.write_str(s),
			Cell::List(items) => f.write_str(&items.join(", ")),
		}
	}
}

/// A page of tabular query output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
	/// Column names, in order.
	pub columns: Vec<String>,
	/// Rows shown; each has one cell per column.
	pub rows: Vec<Vec<Cell>>,
	/// Matching rows in the full result, of which `rows` is the first page.
	pub total: usize,
}

/// A canned Cypher query with the results it would return.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryExample {
	/// Stable tab key.
	pub id: String,
	/// Display name.
	pub name: String,
	/// What the query answers.
	pub description: String,
	/// Cypher text.
	pub query: String,
	/// Reported execution time in milliseconds.
	pub execution_time: u32,
	/// Operator pipeline of the plan.
	pub query_plan: String,
	/// Result table.
	pub results: QueryResults,
}

const QUERIES: &str = include_str!("../assets/queries.json");

/// All query fixtures, in display order.
pub fn query_catalog() -> Result<Vec<QueryExample>, serde_json::Error> {
	let queries: Vec<QueryExample> = serde_json::from_str(QUERIES)?;
	info!("data: loaded {} query examples", queries.len());
	Ok(queries)
}

/// A node label of the database schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaLabel {
	/// Label name, e.g. `User`.
	pub id: String,
	/// Swatch color as a CSS hex string.
	pub color: String,
	/// Property keys stored on nodes with this label.
	pub properties: Vec<String>,
}

/// A relationship type between two labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaRelationship {
	/// Label at the tail.
	pub source: String,
	/// Label at the head.
	pub target: String,
	/// Relationship type, e.g. `FOLLOWS`.
	#[serde(rename = "type")]
	pub kind: String,
}

/// The database schema: labels, relationship types, and the DDL that creates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphSchema {
	/// Node labels, in display order.
	pub labels: Vec<SchemaLabel>,
	/// Relationship types between labels.
	pub relationships: Vec<SchemaRelationship>,
	/// Cypher that sets up constraints, indexes and sample data.
	pub cypher: String,
}

impl GraphSchema {
	/// The schema as a drawable graph, one node per label.
	///
	/// Each label gets its own group. Its PageRank slot carries the label's share
	/// of the largest property count, so richer labels draw larger. Relationships
	/// between the same label become self-loops, which the layout ignores.
	pub fn graph_data(&self) -> GraphData {
		let widest = self.labels.iter().map(|l| l.properties.len()).max().unwrap_or(0).max(1);
		let nodes = self
			.labels
			.iter()
			.enumerate()
			.map(|(i, label)| GraphNode {
				group: Some(i as u32),
				page_rank: Some(label.properties.len() as f64 / widest as f64),
				..GraphNode::new(label.id.clone())
			})
			.collect();
		let links = self
			.relationships
			.iter()
			.map(|r| GraphLink::new(r.source.clone(), r.target.clone()))
			.collect();
		GraphData { nodes, links }
	}
}

const SCHEMA: &str = include_str!("../assets/schema.json");

/// The social network schema fixture.
pub fn graph_schema() -> Result<GraphSchema, serde_json::Error> {
	let schema: GraphSchema = serde_json::from_str(SCHEMA)?;
	info!(
		"data: loaded schema with {} labels, {} relationship types",
		schema.labels.len(),
		schema.relationships.len()
	);
	Ok(schema)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn network_is_deterministic_and_valid() {
		let data = network_data(7);
		assert_eq!(data, network_data(7));
		assert_eq!(data.nodes.len(), NETWORK_SIZE);
		assert_eq!(data.nodes[3].id, "user3");

		let graph = Graph::from_data(&data).unwrap();
		for mode in VisualizationMode::NETWORK_VIEWS {
			assert!(mode.validate(&graph).is_ok(), "{mode} view");
		}
		assert!(VisualizationMode::Network.validate(&graph).is_ok());
	}

	#[test]
	fn network_values_in_range() {
		let data = network_data(1);
		for node in &data.nodes {
			let pr = node.page_rank.unwrap();
			assert!((0.1..0.9).contains(&pr));
			assert!(node.group.unwrap() < NETWORK_GROUPS);
			assert_eq!(node.community, node.group);
		}
		for link in &data.links {
			assert!((1.0..=5.0).contains(&link.value));
			assert_eq!(link.value.fract(), 0.0);
		}
	}

	#[test]
	fn summary_from_small_graph() {
		let mut a = GraphNode::new("a");
		a.name = "Alice".into();
		a.page_rank = Some(0.9);
		a.community = Some(0);
		let mut b = GraphNode::new("b");
		b.page_rank = Some(0.2);
		b.community = Some(1);
		let c = GraphNode::new("c");
		let graph = Graph::build(&[a, b, c], &[GraphLink::new("a", "b"), GraphLink::new("b", "c")]).unwrap();

		let summary = AnalyticsSummary::from_graph(&graph);
		assert_eq!(summary.total_users, 3);
		assert_eq!(summary.total_connections, 2);
		assert!((summary.avg_connections - 2.0 / 3.0).abs() < 1e-12);
		assert_eq!(summary.communities, 2);
		assert!((summary.density - 2.0 / 3.0).abs() < 1e-12);
		assert_eq!(
			summary.most_influential,
			Some(Influencer {
				name: "Alice".into(),
				score: 0.9
			})
		);
	}

	#[test]
	fn summary_of_empty_graph() {
		let summary = AnalyticsSummary::from_graph(&Graph::default());
		assert_eq!(summary.total_users, 0);
		assert_eq!(summary.density, 0.0);
		assert_eq!(summary.avg_connections, 0.0);
		assert_eq!(summary.most_influential, None);
	}

	#[test]
	fn summary_serializes_camel_case() {
		let summary = AnalyticsSummary::from_graph(&Graph::default());
		let json = serde_json::to_value(&summary).unwrap();
		assert!(json.get("totalUsers").is_some());
		assert!(json.get("mostInfluential").is_some());
	}

	#[test]
	fn catalog_fixtures_fit_their_views() {
		let catalog = algorithm_catalog().unwrap();
		let ids: Vec<_> = catalog.iter().map(|a| a.id.as_str()).collect();
		assert_eq!(
			ids,
			["pagerank", "louvain", "betweenness", "triangle-count", "shortest-path"]
		);

		for example in &catalog {
			let graph = Graph::from_data(&example.visual_data).unwrap();
			assert!(example.view.validate(&graph).is_ok(), "{}", example.id);
			assert!(!example.metrics.is_empty());
		}

		let path = &catalog[4];
		assert_eq!(path.kind, AlgorithmKind::Pathfinding);
		assert_eq!(path.view, VisualizationMode::ShortestPath);
		assert_eq!(path.visual_data.links.iter().filter(|l| l.highlight).count(), 3);
	}

	#[test]
	fn query_rows_match_columns() {
		let queries = query_catalog().unwrap();
		assert_eq!(queries.len(), 7);
		assert_eq!(queries[0].id, "friends-of-friends");
		assert_eq!(queries[0].execution_time, 45);

		for query in &queries {
			let results = &query.results;
			assert!(results.rows.len() <= results.total, "{}", query.id);
			for row in &results.rows {
				assert_eq!(row.len(), results.columns.len(), "{}", query.id);
			}
		}
	}

	#[test]
	fn cells_render_as_text() {
		assert_eq!(Cell::Number(245.0).to_string(), "245");
		assert_eq!(Cell::Number(339.5).to_string(), "339.5");
		assert_eq!(Cell::Text("user456".into()).to_string(), "user456");
		assert_eq!(Cell::List(vec!["Alice".into(), "Bob".into()]).to_string(), "Alice, Bob");

		let row: Vec<Cell> = serde_json::from_str(r#"["Emma", 28, ["a", "b"]]"#).unwrap();
		assert_eq!(
			row,
			[
				Cell::Text("Emma".into()),
				Cell::Number(28.0),
				Cell::List(vec!["a".into(), "b".into()])
			]
		);
	}

	#[test]
	fn schema_draws_as_network() {
		let schema = graph_schema().unwrap();
		assert_eq!(schema.labels.len(), 6);
		assert!(schema.cypher.starts_with("// Define constraints"));

		let data = schema.graph_data();
		let graph = Graph::from_data(&data).unwrap();
		assert!(VisualizationMode::Network.validate(&graph).is_ok());
		assert_eq!(graph.edges().iter().filter(|e| e.is_self_loop()).count(), 2);

		let user = graph.index_of("User").unwrap();
		let hashtag = graph.index_of("Hashtag").unwrap();
		assert_eq!(graph.nodes()[user].attributes.real(AttributeKey::PageRank), Some(1.0));
		assert_eq!(
			graph.nodes()[hashtag].attributes.real(AttributeKey::PageRank),
			Some(2.0 / 7.0)
		);
	}
}
