//! Canvas rendering for the force graph.
//!
//! Drawing is split into passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Plain edges, then highlighted edges (world space)
//! 3. Nodes and labels (world space)
//! 4. Hover tooltip (screen space)
//!
//! Node styles are resolved once per frame with [`node_styles`] so the pointer
//! handlers can hit-test against the same radii that were drawn.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::encoding::{Color, NodeStyle, VisualizationMode};
use super::engine::{Bounds, LayoutState, Point};
use super::interaction::ViewTransform;
use super::model::Graph;

const BACKGROUND: Color = Color::rgb(0xf9, 0xfa, 0xfb);
const EDGE: Color = Color::rgba(0x99, 0x99, 0x99, 0.6);
/// Shortest-path edges.
const ACCENT: Color = Color::rgb(0xe1, 0x1d, 0x48);
const NODE_BORDER: Color = Color::rgb(0xff, 0xff, 0xff);
const LABEL: Color = Color::rgb(0x33, 0x33, 0x33);
const TOOLTIP_BG: Color = Color::rgba(0, 0, 0, 0.8);
const TOOLTIP_TEXT: Color = Color::rgb(0xff, 0xff, 0xff);

const LABEL_FONT: &str = "10px sans-serif";
const TOOLTIP_FONT: &str = "12px sans-serif";
const TOOLTIP_LINE_HEIGHT: f64 = 16.0;
const TOOLTIP_PADDING: f64 = 8.0;

/// Everything one frame needs. Borrowed from the component's context.
pub struct Frame<'a> {
	/// Graph being drawn.
	pub graph: &'a Graph,
	/// Node positions, in graph order.
	pub state: &'a LayoutState,
	/// Per-node style, in graph order.
	pub styles: &'a [NodeStyle],
	/// Active encoding, used for tooltips.
	pub mode: VisualizationMode,
	/// Pan and zoom.
	pub transform: ViewTransform,
	/// Canvas size in CSS pixels.
	pub bounds: Bounds,
	/// Draw node names next to nodes.
	pub show_labels: bool,
	/// Index of the node under the pointer.
	pub hovered: Option<usize>,
}

/// Resolves color and radius of every node for `mode`.
pub fn node_styles(graph: &Graph, mode: VisualizationMode, base_size: f64) -> Vec<NodeStyle> {
	graph
		.nodes()
		.iter()
		.map(|node| mode.encode(node, base_size))
		.collect()
}

/// Stroke width for an edge of the given value.
pub fn edge_width(value: f64) -> f64 {
	value.max(0.0).sqrt()
}

/// Renders the complete graph to the canvas.
pub fn render(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	draw_background(frame, ctx);

	ctx.save();
	let _ = ctx.translate(frame.transform.x, frame.transform.y);
	let _ = ctx.scale(frame.transform.k, frame.transform.k);

	draw_edges(frame, ctx);
	draw_nodes(frame, ctx);

	ctx.restore();

	if let Some(index) = frame.hovered {
		draw_tooltip(frame, ctx, index);
	}
}

fn draw_background(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&BACKGROUND.to_css());
	ctx.fill_rect(0.0, 0.0, frame.bounds.width, frame.bounds.height);
}

fn draw_edges(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let nodes = frame.state.nodes();
	let edges = frame.graph.edges();

	ctx.set_stroke_style_str(&EDGE.to_css());
	for edge in edges.iter().filter(|e| !e.highlight && !e.is_self_loop()) {
		let (s, t) = (&nodes[edge.source], &nodes[edge.target]);
		ctx.set_line_width(edge_width(edge.value));
		ctx.begin_path();
		ctx.move_to(s.x, s.y);
		ctx.line_to(t.x, t.y);
		ctx.stroke();
	}

	// Highlighted edges sit above the rest with a dash so they read at any zoom.
	ctx.set_stroke_style_str(&ACCENT.to_css());
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0),
		&JsValue::from_f64(3.0),
	));
	for edge in edges.iter().filter(|e| e.highlight && !e.is_self_loop()) {
		let (s, t) = (&nodes[edge.source], &nodes[edge.target]);
		ctx.set_line_width(edge_width(edge.value) + 2.0);
		ctx.begin_path();
		ctx.move_to(s.x, s.y);
		ctx.line_to(t.x, t.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let border = NODE_BORDER.to_css();
	for (i, (node, style)) in frame.state.nodes().iter().zip(frame.styles).enumerate() {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&style.color.to_css());
		ctx.fill();

		let hovered = frame.hovered == Some(i);
		ctx.set_stroke_style_str(&border);
		ctx.set_line_width(if hovered { 3.0 } else { 1.5 });
		ctx.stroke();
	}

	if !frame.show_labels {
		return;
	}
	ctx.set_font(LABEL_FONT);
	ctx.set_fill_style_str(&LABEL.to_css());
	for ((node, style), model) in frame
		.state
		.nodes()
		.iter()
		.zip(frame.styles)
		.zip(frame.graph.nodes())
	{
		let _ = ctx.fill_text(&model.name, node.x + style.radius + 4.0, node.y + 3.0);
	}
}

fn draw_tooltip(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d, index: usize) {
	let (Some(node), Some(state)) = (frame.graph.node(index), frame.state.nodes().get(index)) else {
		return;
	};
	let text = frame.mode.describe(node);
	let lines: Vec<&str> = text.lines().collect();

	ctx.set_font(TOOLTIP_FONT);
	let width = lines
		.iter()
		.filter_map(|line| ctx.measure_text(line).ok())
		.map(|m| m.width())
		.fold(0.0, f64::max);

	let anchor = frame.transform.graph_to_screen(state.position());
	let (x, y, w, h) = tooltip_box(
		anchor,
		width + TOOLTIP_PADDING * 2.0,
		lines.len() as f64 * TOOLTIP_LINE_HEIGHT + TOOLTIP_PADDING * 2.0,
		frame.bounds,
	);

	ctx.set_fill_style_str(&TOOLTIP_BG.to_css());
	ctx.fill_rect(x, y, w, h);
	ctx.set_fill_style_str(&TOOLTIP_TEXT.to_css());
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(
			line,
			x + TOOLTIP_PADDING,
			y + TOOLTIP_PADDING + (i as f64 + 0.75) * TOOLTIP_LINE_HEIGHT,
		);
	}
}

/// Places a `w`×`h` tooltip above-right of `anchor`, flipped to stay inside `bounds`.
fn tooltip_box(anchor: Point, w: f64, h: f64, bounds: Bounds) -> (f64, f64, f64, f64) {
	const OFFSET: f64 = 10.0;
	let mut x = anchor.x + OFFSET;
	let mut y = anchor.y - OFFSET - h;
	if x + w > bounds.width {
		x = anchor.x - OFFSET - w;
	}
	if y < 0.0 {
		y = anchor.y + OFFSET;
	}
	(x.max(0.0), y.max(0.0), w, h)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_width_is_sqrt_of_value() {
		assert_eq!(edge_width(4.0), 2.0);
		assert_eq!(edge_width(1.0), 1.0);
		assert_eq!(edge_width(-3.0), 0.0);
	}

	#[test]
	fn tooltip_flips_at_edges() {
		let bounds = Bounds::new(200.0, 200.0);
		assert_eq!(
			tooltip_box(Point::new(50.0, 100.0), 40.0, 30.0, bounds),
			(60.0, 60.0, 40.0, 30.0)
		);
		assert_eq!(
			tooltip_box(Point::new(190.0, 5.0), 40.0, 30.0, bounds),
			(140.0, 15.0, 40.0, 30.0)
		);
	}
}
