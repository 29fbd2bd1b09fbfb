//! Force-directed layout simulation.
//!
//! [`ForceLayoutEngine`] owns the only mutable copy of the layout: node positions,
//! velocities, pins, and the "alpha" temperature that scales every force and
//! decays each tick until the layout is considered converged.
//!
//! Nothing outside the engine mutates that state directly. Pointer handlers talk
//! to it through [`Intent`]s sent on an [`IntentSender`]; the queue is drained at
//! the start of each [`ForceLayoutEngine::step`], so interaction never interleaves
//! with a tick.

use std::f64::consts::PI;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use super::error::InvalidStateError;
use super::forces::{self, Spring};
use super::model::Graph;

/// A point in graph (world) or screen space, depending on context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downward.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

/// Viewport size in pixels. The centering force targets its middle.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Bounds {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl Bounds {
	/// Viewport of `width` x `height` pixels.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Middle of the viewport.
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for Bounds {
	fn default() -> Self {
		Self::new(800.0, 600.0)
	}
}

/// Physics parameters for the simulation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Many-body strength. Negative values repel.
	pub charge_strength: f64,
	/// Distances below this are softened in the charge pass.
	pub charge_distance_min: f64,
	/// Spring rest length.
	pub link_distance: f64,
	/// Multiplier on the degree-normalised spring strength.
	pub link_strength: f64,
	/// Strength of the barycenter correction (1.0 = snap every tick).
	pub center_strength: f64,
	/// Minimum radius each node keeps clear around itself.
	pub collide_radius: f64,
	/// Fraction of an overlap resolved per tick.
	pub collide_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Multiplicative alpha decay per tick.
	pub alpha_decay: f64,
	/// Alpha below which the layout counts as converged.
	pub alpha_min: f64,
	/// Radius of the circle nodes are seeded on.
	pub initial_radius: f64,
	/// Ticks per second of wall time passed to `step`.
	pub tick_rate: f64,
	/// Upper bound on ticks run by a single `step`.
	pub max_ticks_per_step: usize,
	/// Seed for initial jitter and coincident-point separation.
	pub seed: u64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			charge_strength: -400.0,
			charge_distance_min: 1.0,
			link_distance: 100.0,
			link_strength: 1.0,
			center_strength: 1.0,
			collide_radius: 30.0,
			collide_strength: 1.0,
			velocity_decay: 0.2,
			// Reaches alpha_min from 1.0 in 600 ticks.
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 600.0),
			alpha_min: 0.001,
			initial_radius: 100.0,
			tick_rate: 60.0,
			max_ticks_per_step: 4,
			seed: 42,
		}
	}
}

/// Live simulation data for one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeState {
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Velocity along x, in graph units per tick.
	pub vx: f64,
	/// Velocity along y, in graph units per tick.
	pub vy: f64,
	/// Pinned x coordinate; overrides integration on that axis.
	pub fx: Option<f64>,
	/// Pinned y coordinate; overrides integration on that axis.
	pub fy: Option<f64>,
}

impl NodeState {
	/// A free, resting node at `(x, y)`.
	pub fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			..Default::default()
		}
	}

	/// Current position.
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// True when either axis is pinned.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// Mutable layout owned by one engine.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutState {
	nodes: Vec<NodeState>,
	alpha: f64,
	running: bool,
	center: Point,
	ticks: u64,
}

impl LayoutState {
	/// Per-node state, in graph node order.
	pub fn nodes(&self) -> &[NodeState] {
		&self.nodes
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// False after [`ForceLayoutEngine::stop`].
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Current centering target.
	pub fn center(&self) -> Point {
		self.center
	}

	/// Total ticks since the last `initialize`.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}
}

/// Requests from the interaction layer, applied at the start of the next step.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	/// Fix a node at a graph-space position.
	Pin {
		/// Node id.
		id: String,
		/// Graph-space x.
		x: f64,
		/// Graph-space y.
		y: f64,
	},
	/// Release a pinned node.
	Unpin {
		/// Node id.
		id: String,
	},
	/// Raise alpha to at least this value; never lowers it.
	Reheat(f64),
	/// Move the centering target to the middle of new bounds.
	Recenter(Bounds),
}

/// Cloneable handle for queueing [`Intent`]s.
#[derive(Clone, Debug)]
pub struct IntentSender(Sender<Intent>);

impl IntentSender {
	/// Queues an intent. Intents sent after the engine is dropped are discarded.
	pub fn send(&self, intent: Intent) {
		let _ = self.0.send(intent);
	}
}

/// What a call to [`ForceLayoutEngine::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
	/// The simulation advanced by this many ticks.
	Advanced {
		/// Ticks actually run.
		ticks: usize,
	},
	/// Alpha is below the threshold; positions only changed through pins.
	Converged,
	/// The engine is stopped; nothing changed.
	Halted,
}

/// Iterative force-directed layout.
pub struct ForceLayoutEngine {
	config: SimulationConfig,
	graph: Option<Graph>,
	state: Option<LayoutState>,
	springs: Vec<Spring>,
	rng: StdRng,
	sender: Sender<Intent>,
	intents: Receiver<Intent>,
}

impl ForceLayoutEngine {
	/// An engine with no graph bound yet.
	pub fn new(config: SimulationConfig) -> Self {
		let (sender, intents) = mpsc::channel();
		Self {
			rng: StdRng::seed_from_u64(config.seed),
			config,
			graph: None,
			state: None,
			springs: Vec::new(),
			sender,
			intents,
		}
	}

	/// Active physics parameters.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Handle for queueing intents from event handlers.
	pub fn intent_sender(&self) -> IntentSender {
		IntentSender(self.sender.clone())
	}

	/// Binds a graph and seeds a fresh layout inside `bounds`.
	///
	/// Nodes start on a circle around the viewport center with a small seeded
	/// jitter, alpha is reset to 1, all pins and queued intents are dropped.
	/// Calling this on a stopped engine restarts it.
	pub fn initialize(&mut self, graph: Graph, bounds: Bounds) {
		self.rng = StdRng::seed_from_u64(self.config.seed);
		while self.intents.try_recv().is_ok() {}

		let center = bounds.center();
		let n = graph.len();
		let nodes = (0..n)
			.map(|i| {
				let angle = i as f64 * 2.0 * PI / n as f64;
				let jitter_x = self.rng.gen_range(-1.0..1.0);
				let jitter_y = self.rng.gen_range(-1.0..1.0);
				NodeState::at(
					center.x + self.config.initial_radius * angle.cos() + jitter_x,
					center.y + self.config.initial_radius * angle.sin() + jitter_y,
				)
			})
			.collect();

		self.springs = forces::springs(&graph, self.config.link_distance, self.config.link_strength);
		info!(
			"layout: initialized {} nodes, {} springs in {}x{}",
			n,
			self.springs.len(),
			bounds.width,
			bounds.height
		);
		self.graph = Some(graph);
		self.state = Some(LayoutState {
			nodes,
			alpha: 1.0,
			running: true,
			center,
			ticks: 0,
		});
	}

	/// Swaps in a graph with the same identity (ids and edges) as the bound one,
	/// e.g. carrying a different algorithm's attributes. Layout state is untouched.
	pub fn rebind(&mut self, graph: Graph) -> Result<(), InvalidStateError> {
		let current = self.graph.as_ref().ok_or(InvalidStateError::NotInitialized)?;
		if !current.same_identity(&graph) {
			return Err(InvalidStateError::IdentityMismatch);
		}
		info!("layout: rebound attributes for {} nodes", graph.len());
		self.graph = Some(graph);
		Ok(())
	}

	/// Changes the spring rest length for the bound graph.
	pub fn set_link_distance(&mut self, distance: f64) {
		self.config.link_distance = distance;
		for spring in &mut self.springs {
			spring.distance = distance;
		}
	}

	/// Advances the simulation by `dt` seconds of wall time.
	///
	/// Queued intents are applied first. The number of ticks is `dt * tick_rate`,
	/// rounded, at least one and at most `max_ticks_per_step`.
	pub fn step(&mut self, dt: f64) -> Result<StepOutcome, InvalidStateError> {
		let running = self
			.state
			.as_ref()
			.ok_or(InvalidStateError::NotInitialized)?
			.running;
		if !running {
			return Ok(StepOutcome::Halted);
		}

		self.drain_intents();

		if self.is_converged() {
			return Ok(StepOutcome::Converged);
		}

		let wanted = if dt.is_finite() && dt > 0.0 {
			(dt * self.config.tick_rate).round() as usize
		} else {
			1
		};
		let budget = wanted.clamp(1, self.config.max_ticks_per_step.max(1));

		let mut ticks = 0;
		while ticks < budget {
			self.tick();
			ticks += 1;
			if self.is_converged() {
				if let Some(state) = &self.state {
					debug!("layout: converged after {} ticks", state.ticks);
				}
				break;
			}
		}
		Ok(StepOutcome::Advanced { ticks })
	}

	/// Ticks synchronously until converged or `max_ticks` is reached.
	///
	/// Returns the number of ticks run. Intents are applied once, up front.
	pub fn run(&mut self, max_ticks: usize) -> Result<usize, InvalidStateError> {
		let running = self
			.state
			.as_ref()
			.ok_or(InvalidStateError::NotInitialized)?
			.running;
		if !running {
			return Ok(0);
		}
		self.drain_intents();

		let mut ticks = 0;
		while ticks < max_ticks && !self.is_converged() {
			self.tick();
			ticks += 1;
		}
		Ok(ticks)
	}

	/// True once alpha has decayed below `alpha_min`, or the graph is empty.
	pub fn is_converged(&self) -> bool {
		self.state
			.as_ref()
			.is_some_and(|s| s.nodes.is_empty() || s.alpha < self.config.alpha_min)
	}

	/// Sets alpha to `target` and resumes stepping, even after [`stop`](Self::stop).
	pub fn reheat(&mut self, target: f64) -> Result<(), InvalidStateError> {
		let state = self.state.as_mut().ok_or(InvalidStateError::NotInitialized)?;
		state.alpha = target.max(0.0);
		state.running = true;
		debug!("layout: reheated to {:.3}", state.alpha);
		Ok(())
	}

	/// Halts stepping. Positions are kept; idempotent.
	pub fn stop(&mut self) {
		if let Some(state) = &mut self.state {
			if state.running {
				debug!("layout: stopped at alpha {:.4}", state.alpha);
			}
			state.running = false;
		}
	}

	/// Layout state, once initialized.
	pub fn state(&self) -> Option<&LayoutState> {
		self.state.as_ref()
	}

	/// Bound graph, once initialized.
	pub fn graph(&self) -> Option<&Graph> {
		self.graph.as_ref()
	}

	/// Current position of the node with `id`.
	pub fn position(&self, id: &str) -> Option<Point> {
		let index = self.graph.as_ref()?.index_of(id)?;
		self.state.as_ref()?.nodes.get(index).map(NodeState::position)
	}

	/// Index of the topmost node whose hit circle contains `point` (graph space).
	///
	/// Later nodes render on top, so they win ties.
	pub fn node_at(&self, point: Point, radius: impl Fn(usize) -> f64) -> Option<usize> {
		let state = self.state.as_ref()?;
		state
			.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(i, node)| node.position().distance(point) <= radius(*i))
			.map(|(i, _)| i)
	}

	fn drain_intents(&mut self) {
		let (Some(graph), Some(state)) = (&self.graph, &mut self.state) else {
			return;
		};
		while let Ok(intent) = self.intents.try_recv() {
			match intent {
				Intent::Pin { id, x, y } => match graph.index_of(&id) {
					Some(i) => {
						let node = &mut state.nodes[i];
						node.fx = Some(x);
						node.fy = Some(y);
						node.x = x;
						node.y = y;
						node.vx = 0.0;
						node.vy = 0.0;
					}
					None => warn!("layout: ignoring pin for unknown node `{id}`"),
				},
				Intent::Unpin { id } => match graph.index_of(&id) {
					Some(i) => {
						let node = &mut state.nodes[i];
						node.fx = None;
						node.fy = None;
					}
					None => warn!("layout: ignoring unpin for unknown node `{id}`"),
				},
				Intent::Reheat(target) => {
					if target > state.alpha {
						state.alpha = target;
					}
				}
				Intent::Recenter(bounds) => state.center = bounds.center(),
			}
		}
	}

	fn tick(&mut self) {
		let Some(state) = &mut self.state else {
			return;
		};
		let config = &self.config;
		state.alpha *= 1.0 - config.alpha_decay;
		state.ticks += 1;
		let alpha = state.alpha;

		forces::apply_charge(
			&mut state.nodes,
			config.charge_strength,
			config.charge_distance_min,
			alpha,
			&mut self.rng,
		);
		forces::apply_springs(&mut state.nodes, &self.springs, alpha, &mut self.rng);
		forces::apply_center(
			&mut state.nodes,
			state.center.x,
			state.center.y,
			config.center_strength,
		);
		forces::apply_collide(
			&mut state.nodes,
			config.collide_radius,
			config.collide_strength,
			&mut self.rng,
		);
		forces::integrate(&mut state.nodes, config.velocity_decay);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn pair() -> Graph {
		Graph::build(
			&[GraphNode::new("a"), GraphNode::new("b")],
			&[GraphLink::new("a", "b")],
		)
		.unwrap()
	}

	fn engine_with(graph: Graph) -> ForceLayoutEngine {
		let mut engine = ForceLayoutEngine::new(SimulationConfig::default());
		engine.initialize(graph, Bounds::new(800.0, 600.0));
		engine
	}

	#[test]
	fn step_before_initialize_fails() {
		let mut engine = ForceLayoutEngine::new(SimulationConfig::default());
		assert_eq!(engine.step(0.016), Err(InvalidStateError::NotInitialized));
		assert_eq!(engine.reheat(1.0), Err(InvalidStateError::NotInitialized));
		assert!(!engine.is_converged());
	}

	#[test]
	fn initialize_resets_alpha_and_centers_seed() {
		let engine = engine_with(pair());
		let state = engine.state().unwrap();
		assert_eq!(state.alpha(), 1.0);
		assert!(state.is_running());
		assert_eq!(state.center(), Point::new(400.0, 300.0));
		assert!(state.nodes().iter().all(|n| !n.is_pinned()));
	}

	#[test]
	fn initialize_is_deterministic_for_a_seed() {
		let a = engine_with(pair());
		let b = engine_with(pair());
		assert_eq!(a.state(), b.state());
	}

	#[test]
	fn empty_graph_is_immediately_converged() {
		let mut engine = engine_with(Graph::default());
		assert!(engine.is_converged());
		assert_eq!(engine.step(0.016), Ok(StepOutcome::Converged));
	}

	#[test]
	fn alpha_never_increases_without_reheat() {
		let mut engine = engine_with(pair());
		let mut last = engine.state().unwrap().alpha();
		for _ in 0..100 {
			engine.step(0.016).unwrap();
			let alpha = engine.state().unwrap().alpha();
			assert!(alpha <= last);
			assert!(alpha >= 0.0);
			last = alpha;
		}
	}

	#[test]
	fn dt_controls_tick_count() {
		let mut engine = engine_with(pair());
		assert_eq!(engine.step(1.0 / 60.0), Ok(StepOutcome::Advanced { ticks: 1 }));
		assert_eq!(engine.step(2.0 / 60.0), Ok(StepOutcome::Advanced { ticks: 2 }));
		assert_eq!(engine.step(10.0), Ok(StepOutcome::Advanced { ticks: 4 }));
		assert_eq!(engine.step(0.0), Ok(StepOutcome::Advanced { ticks: 1 }));
		assert_eq!(engine.state().unwrap().ticks(), 8);
	}

	#[test]
	fn tick_applies_charge_before_springs() {
		let graph = pair();
		let mut engine = engine_with(graph.clone());
		let config = SimulationConfig::default();
		let mut nodes = engine.state().unwrap().nodes().to_vec();
		let center = engine.state().unwrap().center();

		let mut rng = StdRng::seed_from_u64(0);
		let alpha = 1.0 - config.alpha_decay;
		let springs = forces::springs(&graph, config.link_distance, config.link_strength);
		forces::apply_charge(&mut nodes, config.charge_strength, config.charge_distance_min, alpha, &mut rng);
		forces::apply_springs(&mut nodes, &springs, alpha, &mut rng);
		forces::apply_center(&mut nodes, center.x, center.y, config.center_strength);
		forces::apply_collide(&mut nodes, config.collide_radius, config.collide_strength, &mut rng);
		forces::integrate(&mut nodes, config.velocity_decay);

		engine.step(1.0 / 60.0).unwrap();
		assert_eq!(engine.state().unwrap().nodes(), nodes.as_slice());
	}

	#[test]
	fn run_reaches_convergence() {
		let mut engine = engine_with(pair());
		let ticks = engine.run(1_000).unwrap();
		assert!(engine.is_converged());
		assert!((595..=605).contains(&ticks));
		assert_eq!(engine.step(0.016), Ok(StepOutcome::Converged));
	}

	#[test]
	fn reheat_resumes_stopped_engine() {
		let mut engine = engine_with(pair());
		engine.run(1_000).unwrap();
		engine.stop();
		assert_eq!(engine.step(0.016), Ok(StepOutcome::Halted));

		engine.reheat(0.5).unwrap();
		assert_eq!(engine.state().unwrap().alpha(), 0.5);
		assert!(matches!(engine.step(0.016), Ok(StepOutcome::Advanced { .. })));
	}

	#[test]
	fn reheat_intent_only_raises_alpha() {
		let mut engine = engine_with(pair());
		let sender = engine.intent_sender();
		sender.send(Intent::Reheat(0.3));
		engine.step(0.016).unwrap();
		assert!(engine.state().unwrap().alpha() > 0.9);

		engine.run(1_000).unwrap();
		sender.send(Intent::Reheat(0.3));
		engine.step(1.0 / 60.0).unwrap();
		let alpha = engine.state().unwrap().alpha();
		assert!(alpha < 0.3 && alpha > 0.29);
	}

	#[test]
	fn pin_intent_fixes_position_immediately() {
		let mut engine = engine_with(pair());
		engine.run(1_000).unwrap();
		engine.intent_sender().send(Intent::Pin {
			id: "a".into(),
			x: 10.0,
			y: 20.0,
		});
		assert_eq!(engine.step(0.016), Ok(StepOutcome::Converged));
		assert_eq!(engine.position("a"), Some(Point::new(10.0, 20.0)));
	}

	#[test]
	fn unknown_intent_ids_are_ignored() {
		let mut engine = engine_with(pair());
		engine.intent_sender().send(Intent::Pin {
			id: "ghost".into(),
			x: 0.0,
			y: 0.0,
		});
		assert!(engine.step(0.016).is_ok());
		assert!(engine.state().unwrap().nodes().iter().all(|n| !n.is_pinned()));
	}

	#[test]
	fn initialize_drops_stale_intents() {
		let mut engine = engine_with(pair());
		engine.intent_sender().send(Intent::Pin {
			id: "a".into(),
			x: 0.0,
			y: 0.0,
		});
		engine.initialize(pair(), Bounds::default());
		engine.step(0.016).unwrap();
		assert!(!engine.state().unwrap().nodes()[0].is_pinned());
	}

	#[test]
	fn recenter_moves_barycenter_target() {
		let mut engine = engine_with(pair());
		engine.intent_sender().send(Intent::Recenter(Bounds::new(200.0, 100.0)));
		engine.step(0.016).unwrap();
		let state = engine.state().unwrap();
		assert_eq!(state.center(), Point::new(100.0, 50.0));
	}

	#[test]
	fn rebind_requires_same_identity() {
		let mut engine = ForceLayoutEngine::new(SimulationConfig::default());
		assert_eq!(engine.rebind(pair()), Err(InvalidStateError::NotInitialized));

		engine.initialize(pair(), Bounds::default());
		let other = Graph::build(&[GraphNode::new("a"), GraphNode::new("c")], &[]).unwrap();
		assert_eq!(engine.rebind(other), Err(InvalidStateError::IdentityMismatch));
		assert_eq!(engine.rebind(pair()), Ok(()));
	}

	#[test]
	fn link_distance_changes_rest_length() {
		let mut engine = ForceLayoutEngine::new(SimulationConfig {
			charge_strength: 0.0,
			..Default::default()
		});
		engine.initialize(pair(), Bounds::default());
		engine.set_link_distance(70.0);
		assert_eq!(engine.config().link_distance, 70.0);

		engine.run(1_000).unwrap();
		let d = engine.position("a").unwrap().distance(engine.position("b").unwrap());
		assert!((d - 70.0).abs() < 1.0, "distance {d}");
	}

	#[test]
	fn node_at_prefers_topmost() {
		let graph = Graph::build(&[GraphNode::new("a"), GraphNode::new("b")], &[]).unwrap();
		let mut engine = engine_with(graph);
		engine.run(1_000).unwrap();
		let sender = engine.intent_sender();
		sender.send(Intent::Pin { id: "a".into(), x: 0.0, y: 0.0 });
		sender.send(Intent::Pin { id: "b".into(), x: 3.0, y: 0.0 });
		assert_eq!(engine.step(0.016), Ok(StepOutcome::Converged));

		assert_eq!(engine.node_at(Point::new(1.0, 0.0), |_| 5.0), Some(1));
		assert_eq!(engine.node_at(Point::new(-4.0, 0.0), |_| 5.0), Some(0));
		assert_eq!(engine.node_at(Point::new(50.0, 50.0), |_| 5.0), None);
	}
}
