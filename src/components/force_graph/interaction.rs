//! Pointer, zoom, and resize handling.
//!
//! The controller never touches layout state. Drags become [`Intent`]s for the
//! engine; zoom and pan only change the [`ViewTransform`], which is shared with
//! any [`ZoomControls`] handles handed out to buttons.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::debug;
use serde::Deserialize;

use super::engine::{Bounds, Intent, IntentSender, Point};
use super::error::InvalidStateError;
use super::model::Graph;

/// Tunables for interaction behavior.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
	/// Alpha the simulation is warmed to while a node is dragged.
	pub drag_alpha: f64,
	/// Alpha used to re-settle the layout after a resize.
	pub resize_alpha: f64,
	/// Alpha applied by [`ZoomControls::reset`].
	pub reset_alpha: f64,
	/// Smallest zoom factor.
	pub min_zoom: f64,
	/// Largest zoom factor.
	pub max_zoom: f64,
	/// Zoom multiplier of the zoom-in button.
	pub zoom_in_factor: f64,
	/// Zoom multiplier of the zoom-out button.
	pub zoom_out_factor: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			drag_alpha: 0.3,
			resize_alpha: 0.3,
			reset_alpha: 1.0,
			min_zoom: 0.1,
			max_zoom: 4.0,
			zoom_in_factor: 1.5,
			zoom_out_factor: 0.75,
		}
	}
}

/// Pan and zoom transform applied to the entire graph view.
///
/// Screen = graph * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	/// No pan, 100% zoom.
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Maps a screen point into graph space.
	pub fn screen_to_graph(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	/// Maps a graph point onto the screen.
	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Scales by `factor` around the screen point `center`, keeping that point
	/// fixed, with the resulting zoom clamped to `[min, max]`.
	pub fn zoomed(self, factor: f64, center: Point, min: f64, max: f64) -> Self {
		let k = (self.k * factor).clamp(min, max);
		let ratio = k / self.k;
		Self {
			x: center.x - (center.x - self.x) * ratio,
			y: center.y - (center.y - self.y) * ratio,
			k,
		}
	}

	/// Translated by a screen-space delta.
	pub fn panned(self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
			..self
		}
	}
}

/// Whether a node follows the simulation or the pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionMode {
	/// Moved by the simulation.
	#[default]
	Free,
	/// Held under the pointer during a drag.
	Pinned,
}

/// Button-facing zoom handle. Cheap to clone; all clones share one transform.
#[derive(Clone, Debug)]
pub struct ZoomControls {
	transform: Rc<Cell<ViewTransform>>,
	bounds: Rc<Cell<Bounds>>,
	intents: IntentSender,
	config: Rc<InteractionConfig>,
}

impl ZoomControls {
	/// Zooms in around the viewport center.
	pub fn zoom_in(&self) {
		self.zoom_by(self.config.zoom_in_factor);
	}

	/// Zooms out around the viewport center.
	pub fn zoom_out(&self) {
		self.zoom_by(self.config.zoom_out_factor);
	}

	/// Restores the identity transform and reheats the layout.
	pub fn reset(&self) {
		self.transform.set(ViewTransform::IDENTITY);
		self.intents.send(Intent::Reheat(self.config.reset_alpha));
	}

	fn zoom_by(&self, factor: f64) {
		let center = self.bounds.get().center();
		let next = self.transform.get().zoomed(
			factor,
			center,
			self.config.min_zoom,
			self.config.max_zoom,
		);
		self.transform.set(next);
	}
}

/// Turns pointer and viewport events into engine intents and view changes.
pub struct InteractionController {
	intents: IntentSender,
	transform: Rc<Cell<ViewTransform>>,
	bounds: Rc<Cell<Bounds>>,
	config: Rc<InteractionConfig>,
	known: HashSet<String>,
	motion: HashMap<String, MotionMode>,
}

impl InteractionController {
	/// A controller that sends its intents to `intents`.
	pub fn new(intents: IntentSender, bounds: Bounds, config: InteractionConfig) -> Self {
		Self {
			intents,
			transform: Rc::new(Cell::new(ViewTransform::IDENTITY)),
			bounds: Rc::new(Cell::new(bounds)),
			config: Rc::new(config),
			known: HashSet::new(),
			motion: HashMap::new(),
		}
	}

	/// Records the ids of a newly initialized graph. Every node starts free.
	///
	/// The view transform is kept.
	pub fn bind_graph(&mut self, graph: &Graph) {
		self.known = graph.nodes().iter().map(|n| n.id.clone()).collect();
		self.motion.clear();
	}

	/// Handle for zoom buttons.
	pub fn zoom_controls(&self) -> ZoomControls {
		ZoomControls {
			transform: Rc::clone(&self.transform),
			bounds: Rc::clone(&self.bounds),
			intents: self.intents.clone(),
			config: Rc::clone(&self.config),
		}
	}

	/// Current pan and zoom.
	pub fn transform(&self) -> ViewTransform {
		self.transform.get()
	}

	/// Last viewport size passed to [`on_resize`](Self::on_resize).
	pub fn bounds(&self) -> Bounds {
		self.bounds.get()
	}

	/// Drag state of a node; unknown ids are free.
	pub fn motion_mode(&self, id: &str) -> MotionMode {
		self.motion.get(id).copied().unwrap_or_default()
	}

	/// Converts a screen point using the current transform.
	pub fn screen_to_graph(&self, p: Point) -> Point {
		self.transform.get().screen_to_graph(p)
	}

	/// Pins `id` under the pointer and warms the simulation.
	pub fn on_drag_start(&mut self, id: &str, pointer: Point) -> Result<(), InvalidStateError> {
		if !self.known.contains(id) {
			return Err(InvalidStateError::UnknownNode(id.to_string()));
		}
		if self.motion_mode(id) == MotionMode::Pinned {
			return Err(InvalidStateError::AlreadyPinned(id.to_string()));
		}
		self.motion.insert(id.to_string(), MotionMode::Pinned);
		self.intents.send(Intent::Reheat(self.config.drag_alpha));
		self.pin(id, pointer);
		debug!("interaction: drag started on `{id}`");
		Ok(())
	}

	/// Moves the pin of a dragged node to the pointer.
	pub fn on_drag_move(&mut self, id: &str, pointer: Point) -> Result<(), InvalidStateError> {
		self.require_pinned(id)?;
		self.pin(id, pointer);
		Ok(())
	}

	/// Releases a dragged node. Alpha is left to decay on its own.
	pub fn on_drag_end(&mut self, id: &str) -> Result<(), InvalidStateError> {
		self.require_pinned(id)?;
		self.motion.remove(id);
		self.intents.send(Intent::Unpin { id: id.to_string() });
		debug!("interaction: drag ended on `{id}`");
		Ok(())
	}

	/// Zooms by `factor` around the screen point `center`.
	pub fn on_zoom(&mut self, factor: f64, center: Point) {
		let next = self.transform.get().zoomed(
			factor,
			center,
			self.config.min_zoom,
			self.config.max_zoom,
		);
		self.transform.set(next);
	}

	/// Shifts the view by a screen-space delta.
	pub fn on_pan(&mut self, dx: f64, dy: f64) {
		self.transform.set(self.transform.get().panned(dx, dy));
	}

	/// Retargets the centering force and briefly reheats the layout.
	pub fn on_resize(&mut self, bounds: Bounds) {
		self.bounds.set(bounds);
		self.intents.send(Intent::Recenter(bounds));
		self.intents.send(Intent::Reheat(self.config.resize_alpha));
	}

	fn require_pinned(&self, id: &str) -> Result<(), InvalidStateError> {
		match self.motion_mode(id) {
			MotionMode::Pinned => Ok(()),
			MotionMode::Free => Err(InvalidStateError::NotPinned(id.to_string())),
		}
	}

	fn pin(&self, id: &str, pointer: Point) {
		let p = self.screen_to_graph(pointer);
		self.intents.send(Intent::Pin {
			id: id.to_string(),
			x: p.x,
			y: p.y,
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::engine::{ForceLayoutEngine, SimulationConfig};
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn setup() -> (ForceLayoutEngine, InteractionController) {
		let graph = Graph::build(
			&[GraphNode::new("a"), GraphNode::new("b")],
			&[GraphLink::new("a", "b")],
		)
		.unwrap();
		let bounds = Bounds::new(400.0, 400.0);
		let mut engine = ForceLayoutEngine::new(SimulationConfig::default());
		let mut controller =
			InteractionController::new(engine.intent_sender(), bounds, InteractionConfig::default());
		controller.bind_graph(&graph);
		engine.initialize(graph, bounds);
		(engine, controller)
	}

	#[test]
	fn drag_lifecycle_follows_state_machine() {
		let (mut engine, mut controller) = setup();
		assert_eq!(controller.motion_mode("a"), MotionMode::Free);

		controller.on_drag_start("a", Point::new(10.0, 10.0)).unwrap();
		assert_eq!(controller.motion_mode("a"), MotionMode::Pinned);
		assert_eq!(
			controller.on_drag_start("a", Point::new(10.0, 10.0)),
			Err(InvalidStateError::AlreadyPinned("a".into()))
		);

		controller.on_drag_move("a", Point::new(50.0, 60.0)).unwrap();
		engine.step(0.016).unwrap();
		assert_eq!(engine.position("a"), Some(Point::new(50.0, 60.0)));

		controller.on_drag_end("a").unwrap();
		assert_eq!(controller.motion_mode("a"), MotionMode::Free);
		engine.step(0.016).unwrap();
		assert!(!engine.state().unwrap().nodes()[0].is_pinned());
	}

	#[test]
	fn move_and_end_require_a_pin() {
		let (_engine, mut controller) = setup();
		assert_eq!(
			controller.on_drag_move("a", Point::default()),
			Err(InvalidStateError::NotPinned("a".into()))
		);
		assert_eq!(
			controller.on_drag_end("b"),
			Err(InvalidStateError::NotPinned("b".into()))
		);
		assert_eq!(
			controller.on_drag_start("zzz", Point::default()),
			Err(InvalidStateError::UnknownNode("zzz".into()))
		);
	}

	#[test]
	fn drag_start_reheats_converged_layout() {
		let (mut engine, mut controller) = setup();
		engine.run(1_000).unwrap();
		assert!(engine.is_converged());

		controller.on_drag_start("b", Point::new(0.0, 0.0)).unwrap();
		engine.step(0.016).unwrap();
		assert!(!engine.is_converged());
		assert!(engine.state().unwrap().alpha() > 0.25);
	}

	#[test]
	fn drag_end_does_not_cool_layout() {
		let (mut engine, mut controller) = setup();
		controller.on_drag_start("a", Point::new(0.0, 0.0)).unwrap();
		engine.step(0.016).unwrap();
		let before = engine.state().unwrap().alpha();
		controller.on_drag_end("a").unwrap();
		engine.step(1.0 / 60.0).unwrap();
		let after = engine.state().unwrap().alpha();
		assert!(after > before * 0.95);
	}

	#[test]
	fn pin_uses_graph_coordinates() {
		let (mut engine, mut controller) = setup();
		controller.on_pan(100.0, 0.0);
		controller.on_zoom(2.0, Point::new(100.0, 0.0));
		let t = controller.transform();
		assert_eq!(t.k, 2.0);

		controller.on_drag_start("a", Point::new(140.0, 20.0)).unwrap();
		engine.step(0.016).unwrap();
		assert_eq!(engine.position("a"), Some(Point::new(20.0, 10.0)));
	}

	#[test]
	fn zoom_and_pan_leave_layout_alone() {
		let (engine, mut controller) = setup();
		let before = engine.state().unwrap().clone();
		controller.on_zoom(1.5, Point::new(200.0, 200.0));
		controller.on_pan(-30.0, 12.0);
		assert_eq!(engine.state().unwrap(), &before);
	}

	#[test]
	fn zoom_is_clamped_and_anchored() {
		let t = ViewTransform::IDENTITY.zoomed(100.0, Point::new(50.0, 50.0), 0.1, 4.0);
		assert_eq!(t.k, 4.0);
		let anchor = t.screen_to_graph(Point::new(50.0, 50.0));
		assert!((anchor.x - 50.0).abs() < 1e-9);
		assert!((anchor.y - 50.0).abs() < 1e-9);

		let round_trip = t.screen_to_graph(t.graph_to_screen(Point::new(3.0, -7.0)));
		assert!((round_trip.x - 3.0).abs() < 1e-9);
	}

	#[test]
	fn zoom_controls_share_transform_and_reset_reheats() {
		let (mut engine, controller) = setup();
		let controls = controller.zoom_controls();

		controls.zoom_in();
		assert_eq!(controller.transform().k, 1.5);
		controls.zoom_out();
		assert!((controller.transform().k - 1.125).abs() < 1e-9);

		engine.run(1_000).unwrap();
		controls.reset();
		assert_eq!(controller.transform(), ViewTransform::IDENTITY);
		engine.step(0.016).unwrap();
		assert!(engine.state().unwrap().alpha() > 0.9);
	}

	#[test]
	fn resize_recenters_and_reheats() {
		let (mut engine, mut controller) = setup();
		engine.run(1_000).unwrap();
		controller.on_resize(Bounds::new(1000.0, 500.0));
		engine.step(0.016).unwrap();
		let state = engine.state().unwrap();
		assert_eq!(state.center(), Point::new(500.0, 250.0));
		assert!(state.alpha() > 0.25);
		assert_eq!(controller.bounds(), Bounds::new(1000.0, 500.0));
	}

	#[test]
	fn bind_graph_releases_pins() {
		let (engine, mut controller) = setup();
		controller.on_drag_start("a", Point::default()).unwrap();
		controller.bind_graph(engine.graph().unwrap());
		assert_eq!(controller.motion_mode("a"), MotionMode::Free);
	}
}
