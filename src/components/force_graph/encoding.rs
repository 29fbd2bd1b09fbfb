//! Per-view visual encoding: node colors, radii, and tooltip text.
//!
//! Each [`VisualizationMode`] names the attributes it reads, so a graph can be
//! checked against a view before drawing ([`VisualizationMode::validate`]). The
//! encoding itself is total: a missing value encodes as zero.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::model::{AttributeKey, Graph, Node};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color at opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// CSS color string: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Categorical palette for communities and groups.
pub const CATEGORY10: [Color; 10] = [
	Color::rgb(0x1f, 0x77, 0xb4),
	Color::rgb(0xff, 0x7f, 0x0e),
	Color::rgb(0x2c, 0xa0, 0x2c),
	Color::rgb(0xd6, 0x27, 0x28),
	Color::rgb(0x94, 0x67, 0xbd),
	Color::rgb(0x8c, 0x56, 0x4b),
	Color::rgb(0xe3, 0x77, 0xc2),
	Color::rgb(0x7f, 0x7f, 0x7f),
	Color::rgb(0xbc, 0xbd, 0x22),
	Color::rgb(0x17, 0xbe, 0xcf),
];

/// Softer categorical palette for path results.
pub const SET2: [Color; 8] = [
	Color::rgb(0x66, 0xc2, 0xa5),
	Color::rgb(0xfc, 0x8d, 0x62),
	Color::rgb(0x8d, 0xa0, 0xcb),
	Color::rgb(0xe7, 0x8a, 0xc3),
	Color::rgb(0xa6, 0xd8, 0x54),
	Color::rgb(0xff, 0xd9, 0x2f),
	Color::rgb(0xe5, 0xc4, 0x94),
	Color::rgb(0xb3, 0xb3, 0xb3),
];

/// Yellow-orange-red stops for sequential scores.
const YL_OR_RD: [Color; 9] = [
	Color::rgb(0xff, 0xff, 0xcc),
	Color::rgb(0xff, 0xed, 0xa0),
	Color::rgb(0xfe, 0xd9, 0x76),
	Color::rgb(0xfe, 0xb2, 0x4c),
	Color::rgb(0xfd, 0x8d, 0x3c),
	Color::rgb(0xfc, 0x4e, 0x2a),
	Color::rgb(0xe3, 0x1a, 0x1c),
	Color::rgb(0xbd, 0x00, 0x26),
	Color::rgb(0x80, 0x00, 0x26),
];

/// Maps `t` in `[0, 1]` onto the yellow-orange-red ramp. Out of range clamps.
pub fn sequential(t: f64) -> Color {
	let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
	let scaled = t * (YL_OR_RD.len() - 1) as f64;
	let i = (scaled.floor() as usize).min(YL_OR_RD.len() - 2);
	YL_OR_RD[i].lerp(YL_OR_RD[i + 1], scaled - i as f64)
}

/// Picks a palette entry, wrapping around.
pub fn categorical(palette: &[Color], index: u32) -> Color {
	palette[index as usize % palette.len()]
}

/// Resolved style for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	/// Fill color.
	pub color: Color,
	/// Radius in graph units.
	pub radius: f64,
}

/// Which algorithm output drives node color and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationMode {
	/// Plain network: color by group, size by PageRank.
	#[default]
	Network,
	/// Color and size by PageRank.
	PageRank,
	/// Color by detected community.
	Community,
	/// Color and size by betweenness centrality.
	Betweenness,
	/// Generic `score` from a centrality algorithm run.
	Centrality,
	/// Size by number of triangles a node closes.
	TriangleCount,
	/// Nodes on the highlighted path stand out.
	ShortestPath,
}

impl VisualizationMode {
	/// Modes offered by the main network view selector.
	pub const NETWORK_VIEWS: [VisualizationMode; 3] = [
		VisualizationMode::PageRank,
		VisualizationMode::Community,
		VisualizationMode::Betweenness,
	];

	/// Human-readable name for selectors and legends.
	pub fn label(self) -> &'static str {
		match self {
			VisualizationMode::Network => "Network",
			VisualizationMode::PageRank => "PageRank",
			VisualizationMode::Community => "Community Detection",
			VisualizationMode::Betweenness => "Betweenness Centrality",
			VisualizationMode::Centrality => "Centrality",
			VisualizationMode::TriangleCount => "Triangle Count",
			VisualizationMode::ShortestPath => "Shortest Path",
		}
	}

	/// Attributes every node must carry for this view.
	pub fn required_keys(self) -> &'static [AttributeKey] {
		match self {
			VisualizationMode::Network => &[AttributeKey::Group, AttributeKey::PageRank],
			VisualizationMode::PageRank => &[AttributeKey::PageRank],
			VisualizationMode::Community => &[AttributeKey::Community],
			VisualizationMode::Betweenness => &[AttributeKey::Betweenness],
			VisualizationMode::Centrality => &[AttributeKey::Score],
			VisualizationMode::TriangleCount => {
				&[AttributeKey::Community, AttributeKey::TriangleCount]
			}
			VisualizationMode::ShortestPath => &[AttributeKey::Group],
		}
	}

	/// Checks that every node carries the attributes this view reads.
	pub fn validate(self, graph: &Graph) -> Result<(), ValidationError> {
		for node in graph.nodes() {
			if let Some(&key) = self
				.required_keys()
				.iter()
				.find(|key| !node.attributes.contains(**key))
			{
				return Err(ValidationError::MissingAttribute {
					id: node.id.clone(),
					key,
					mode: self,
				});
			}
		}
		Ok(())
	}

	/// Color and radius for `node`. `base_size` is the user-chosen minimum radius.
	pub fn encode(self, node: &Node, base_size: f64) -> NodeStyle {
		let attrs = &node.attributes;
		let real = |key: AttributeKey| attrs.real(key).unwrap_or(0.0);
		let category = |key: AttributeKey| attrs.discrete(key).unwrap_or(0);

		match self {
			VisualizationMode::Network => NodeStyle {
				color: categorical(&CATEGORY10, category(AttributeKey::Group)),
				radius: base_size + real(AttributeKey::PageRank) * 15.0,
			},
			VisualizationMode::PageRank => NodeStyle {
				color: sequential(real(AttributeKey::PageRank)),
				radius: base_size + real(AttributeKey::PageRank) * 20.0,
			},
			VisualizationMode::Community => NodeStyle {
				color: categorical(&CATEGORY10, category(AttributeKey::Community)),
				radius: base_size + 5.0,
			},
			VisualizationMode::Betweenness => NodeStyle {
				color: sequential(real(AttributeKey::Betweenness)),
				radius: base_size + real(AttributeKey::Betweenness) * 20.0,
			},
			VisualizationMode::Centrality => NodeStyle {
				color: sequential(real(AttributeKey::Score)),
				radius: base_size + real(AttributeKey::Score) * 20.0,
			},
			VisualizationMode::TriangleCount => NodeStyle {
				color: categorical(&CATEGORY10, category(AttributeKey::Community)),
				radius: base_size * 2.0,
			},
			VisualizationMode::ShortestPath => NodeStyle {
				color: categorical(&SET2, category(AttributeKey::Group)),
				radius: base_size + 3.0,
			},
		}
	}

	/// Tooltip text: the node name followed by the values this view reads.
	pub fn describe(self, node: &Node) -> String {
		let mut text = node.name.clone();
		for &key in self.required_keys() {
			if let Some(value) = node.attributes.get(key) {
				text.push_str(&format!("\n{key}: {value}"));
			}
		}
		text
	}
}

impl fmt::Display for VisualizationMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}
