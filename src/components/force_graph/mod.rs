//! Force-directed graph visualization component.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - A deterministic, seedable force simulation ([`ForceLayoutEngine`])
//! - Pan, zoom, and node dragging routed through an [`InteractionController`]
//! - Per-view node encodings for algorithm outputs ([`VisualizationMode`])
//!
//! The layout core (`model`, `engine`, `forces`, `interaction`, `encoding`) has
//! no DOM dependency and is usable headless, e.g. from tests.
//!
//! # Example
//!
//! ```ignore
//! use social_graph::{ForceGraphCanvas, GraphData, GraphLink, GraphNode, VisualizationMode};
//!
//! let data = GraphData {
//!     nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
//!     links: vec![GraphLink::new("a", "b")],
//! };
//!
//! view! { <ForceGraphCanvas data=data mode=VisualizationMode::Network /> }
//! ```

mod component;
pub mod encoding;
pub mod engine;
pub mod error;
mod forces;
pub mod interaction;
pub mod model;
mod render;
mod types;

use serde::Deserialize;

pub use component::ForceGraphCanvas;
pub use encoding::{Color, NodeStyle, VisualizationMode};
pub use engine::{
	Bounds, ForceLayoutEngine, Intent, IntentSender, LayoutState, NodeState, Point,
	SimulationConfig, StepOutcome,
};
pub use error::{InvalidStateError, ValidationError};
pub use interaction::{InteractionConfig, InteractionController, MotionMode, ViewTransform, ZoomControls};
pub use model::{AttributeKey, AttributeValue, Attributes, Edge, Graph, Node};
pub use types::{GraphData, GraphLink, GraphNode};

/// Tunables for one graph view.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Physics parameters.
	pub simulation: SimulationConfig,
	/// Drag and zoom parameters.
	pub interaction: InteractionConfig,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn config_fills_missing_fields() {
		let config: GraphConfig =
			serde_json::from_str(r#"{"simulation": {"charge_strength": -50}}"#).unwrap();
		assert_eq!(config.simulation.charge_strength, -50.0);
		assert_eq!(config.simulation.link_distance, 100.0);
		assert_eq!(config.interaction, InteractionConfig::default());
	}
}
