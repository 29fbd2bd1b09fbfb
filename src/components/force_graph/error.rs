//! Error types for graph construction and layout control.

use thiserror::Error;

use super::encoding::VisualizationMode;
use super::model::AttributeKey;

/// Raised when raw node/link data cannot form a valid [`Graph`](super::Graph).
///
/// Construction is atomic: when this is returned no graph exists.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
	/// Two nodes share an id.
	#[error("duplicate node id `{0}`")]
	DuplicateNode(String),

	#[error("link {index} references unknown node `{id}`")]
	/// A link endpoint names no node.
	UnknownEndpoint {
		/// Position of the link in the input.
		index: usize,
		/// The unresolved id.
		id: String,
	},

	#[error("link {index} has invalid value {value}; expected a finite value above zero")]
	/// A link weight is zero, negative or not finite.
	InvalidEdgeValue {
		/// Position of the link in the input.
		index: usize,
		/// The rejected weight.
		value: f64,
	},

	#[error("node `{id}` has a non-finite {key} value")]
	/// A numeric attribute is NaN or infinite.
	NonFiniteAttribute {
		/// Node id.
		id: String,
		/// Offending attribute.
		key: AttributeKey,
	},

	#[error("node `{id}` has no {key} value, required by the {mode} view")]
	/// A view needs an attribute the node does not carry.
	MissingAttribute {
		/// Node id.
		id: String,
		/// Required attribute.
		key: AttributeKey,
		/// View that requires it.
		mode: VisualizationMode,
	},

	/// Rebind data names an id outside the graph.
	#[error("rebind names node `{0}` which is not part of the graph")]
	UnknownRebindNode(String),

	/// Rebind data skips a node of the graph.
	#[error("rebind omits node `{0}`")]
	MissingRebindNode(String),
}

/// Raised when layout or interaction operations are called out of order.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidStateError {
	/// No graph has been bound yet.
	#[error("layout engine has not been initialized with a graph")]
	NotInitialized,

	/// Drag move or end without a drag start.
	#[error("node `{0}` is not pinned")]
	NotPinned(String),

	/// Drag start on a node already being dragged.
	#[error("node `{0}` is already pinned")]
	AlreadyPinned(String),

	/// The id names no node of the bound graph.
	#[error("node `{0}` is not part of the bound graph")]
	UnknownNode(String),

	/// Rebind with a graph whose ids or edges differ.
	#[error("graph does not share node identity with the bound graph")]
	IdentityMismatch,
}
