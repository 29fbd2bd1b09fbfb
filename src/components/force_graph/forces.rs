//! Individual force passes applied on every simulation tick.
//!
//! Each pass reads and writes node velocities (the centering pass shifts positions
//! directly). Pinned nodes take part in every pass, so their neighbours still feel
//! them; the pin is only enforced later, during integration.

use rand::Rng;
use rand::rngs::StdRng;

use super::engine::NodeState;
use super::model::Graph;

/// Tiny random offset used to separate exactly coincident nodes.
pub fn jiggle(rng: &mut StdRng) -> f64 {
	rng.gen_range(-0.5..0.5) * 1e-6
}

/// Precomputed spring for one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Spring {
	/// Source node index.
	pub source: usize,
	/// Target node index.
	pub target: usize,
	/// Rest length.
	pub distance: f64,
	/// Fraction of the length error corrected per tick at alpha 1.
	pub strength: f64,
	/// Share of the correction applied to the target (the rest goes to the source).
	pub bias: f64,
}

/// Builds one spring per non-loop edge.
///
/// Strength is normalised by the smaller distinct degree of the two endpoints so
/// hubs do not collapse, and scaled by the edge value relative to the mean value.
/// Duplicate edges produce separate springs and therefore add up.
pub fn springs(graph: &Graph, distance: f64, base_strength: f64) -> Vec<Spring> {
	let degrees = graph.distinct_degrees();
	let edges: Vec<_> = graph.edges().iter().filter(|e| !e.is_self_loop()).collect();
	if edges.is_empty() {
		return Vec::new();
	}
	let mean_value = edges.iter().map(|e| e.value).sum::<f64>() / edges.len() as f64;

	edges
		.into_iter()
		.map(|edge| {
			let (ds, dt) = (degrees[edge.source] as f64, degrees[edge.target] as f64);
			let weight = (edge.value / mean_value).clamp(0.5, 2.0);
			Spring {
				source: edge.source,
				target: edge.target,
				distance,
				strength: base_strength * weight / ds.min(dt),
				bias: ds / (ds + dt),
			}
		})
		.collect()
}

/// Pulls each edge's endpoints toward its rest length.
///
/// Uses positions one velocity step ahead, which keeps stiff springs stable.
pub fn apply_springs(nodes: &mut [NodeState], springs: &[Spring], alpha: f64, rng: &mut StdRng) {
	for spring in springs {
		let (s, t) = (&nodes[spring.source], &nodes[spring.target]);
		let mut dx = t.x + t.vx - s.x - s.vx;
		let mut dy = t.y + t.vy - s.y - s.vy;
		if dx == 0.0 {
			dx = jiggle(rng);
		}
		if dy == 0.0 {
			dy = jiggle(rng);
		}
		let l = (dx * dx + dy * dy).sqrt();
		let k = (l - spring.distance) / l * alpha * spring.strength;
		let (dx, dy) = (dx * k, dy * k);

		let target = &mut nodes[spring.target];
		target.vx -= dx * spring.bias;
		target.vy -= dy * spring.bias;
		let source = &mut nodes[spring.source];
		source.vx += dx * (1.0 - spring.bias);
		source.vy += dy * (1.0 - spring.bias);
	}
}

/// All-pairs charge. Negative `strength` repels.
///
/// Distances below `distance_min` are softened to avoid blow-ups when two nodes
/// nearly overlap.
pub fn apply_charge(
	nodes: &mut [NodeState],
	strength: f64,
	distance_min: f64,
	alpha: f64,
	rng: &mut StdRng,
) {
	if strength == 0.0 {
		return;
	}
	let min2 = distance_min * distance_min;
	let n = nodes.len();
	for i in 0..n {
		for j in (i + 1)..n {
			let mut dx = nodes[j].x - nodes[i].x;
			let mut dy = nodes[j].y - nodes[i].y;
			if dx == 0.0 {
				dx = jiggle(rng);
			}
			if dy == 0.0 {
				dy = jiggle(rng);
			}
			let mut l = dx * dx + dy * dy;
			if l < min2 {
				l = (min2 * l).sqrt();
			}
			if l == 0.0 {
				continue;
			}
			let w = strength * alpha / l;
			nodes[i].vx += dx * w;
			nodes[i].vy += dy * w;
			nodes[j].vx -= dx * w;
			nodes[j].vy -= dy * w;
		}
	}
}

/// Translates every node so the barycenter moves toward `(cx, cy)`.
pub fn apply_center(nodes: &mut [NodeState], cx: f64, cy: f64, strength: f64) {
	if nodes.is_empty() {
		return;
	}
	let n = nodes.len() as f64;
	let sx = nodes.iter().map(|node| node.x).sum::<f64>() / n;
	let sy = nodes.iter().map(|node| node.y).sum::<f64>() / n;
	let (shift_x, shift_y) = ((sx - cx) * strength, (sy - cy) * strength);
	for node in nodes.iter_mut() {
		node.x -= shift_x;
		node.y -= shift_y;
	}
}

/// Pushes apart nodes whose circles of `radius` overlap.
///
/// Works on predicted positions and splits the correction evenly, since every
/// node has the same radius.
pub fn apply_collide(nodes: &mut [NodeState], radius: f64, strength: f64, rng: &mut StdRng) {
	if radius <= 0.0 {
		return;
	}
	let r = radius * 2.0;
	let r2 = r * r;
	let n = nodes.len();
	for i in 0..n {
		for j in (i + 1)..n {
			let (a, b) = (&nodes[i], &nodes[j]);
			let mut dx = a.x + a.vx - b.x - b.vx;
			let mut dy = a.y + a.vy - b.y - b.vy;
			let mut l = dx * dx + dy * dy;
			if l >= r2 {
				continue;
			}
			if dx == 0.0 {
				dx = jiggle(rng);
				l += dx * dx;
			}
			if dy == 0.0 {
				dy = jiggle(rng);
				l += dy * dy;
			}
			let d = l.sqrt();
			let k = (r - d) / d * strength * 0.5;
			let (dx, dy) = (dx * k, dy * k);
			nodes[i].vx += dx;
			nodes[i].vy += dy;
			nodes[j].vx -= dx;
			nodes[j].vy -= dy;
		}
	}
}

/// Applies velocity decay and moves free axes; pinned axes snap to their pin.
pub fn integrate(nodes: &mut [NodeState], velocity_decay: f64) {
	let retain = 1.0 - velocity_decay;
	for node in nodes.iter_mut() {
		match node.fx {
			Some(fx) => {
				node.x = fx;
				node.vx = 0.0;
			}
			None => {
				node.vx *= retain;
				node.x += node.vx;
			}
		}
		match node.fy {
			Some(fy) => {
				node.y = fy;
				node.vy = 0.0;
			}
			None => {
				node.vy *= retain;
				node.y += node.vy;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;

	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn at(x: f64, y: f64) -> NodeState {
		NodeState::at(x, y)
	}

	#[test]
	fn charge_pushes_pair_apart_symmetrically() {
		let mut rng = StdRng::seed_from_u64(1);
		let mut nodes = vec![at(0.0, 0.0), at(10.0, 0.0)];
		apply_charge(&mut nodes, -400.0, 1.0, 1.0, &mut rng);
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);
		assert!((nodes[0].vx + nodes[1].vx).abs() < 1e-9);
	}

	#[test]
	fn stretched_spring_pulls_together() {
		let mut rng = StdRng::seed_from_u64(1);
		let graph = Graph::build(
			&[GraphNode::new("a"), GraphNode::new("b")],
			&[GraphLink::new("a", "b")],
		)
		.unwrap();
		let springs = springs(&graph, 10.0, 1.0);
		let mut nodes = vec![at(0.0, 0.0), at(50.0, 0.0)];
		apply_springs(&mut nodes, &springs, 1.0, &mut rng);
		assert!(nodes[0].vx > 0.0);
		assert!(nodes[1].vx < 0.0);
	}

	#[test]
	fn duplicate_edges_add_spring_strength() {
		let nodes = [GraphNode::new("a"), GraphNode::new("b")];
		let single = Graph::build(&nodes, &[GraphLink::new("a", "b")]).unwrap();
		let double = Graph::build(&nodes, &[GraphLink::new("a", "b"), GraphLink::new("a", "b")]).unwrap();

		let total = |g: &Graph| springs(g, 30.0, 1.0).iter().map(|s| s.strength).sum::<f64>();
		assert!((total(&double) - 2.0 * total(&single)).abs() < 1e-9);
	}

	#[test]
	fn self_loops_have_no_spring() {
		let graph = Graph::build(&[GraphNode::new("a")], &[GraphLink::new("a", "a")]).unwrap();
		assert!(springs(&graph, 30.0, 1.0).is_empty());
	}

	#[test]
	fn center_moves_barycenter() {
		let mut nodes = vec![at(0.0, 0.0), at(10.0, 20.0)];
		apply_center(&mut nodes, 100.0, 100.0, 1.0);
		let mx = (nodes[0].x + nodes[1].x) / 2.0;
		let my = (nodes[0].y + nodes[1].y) / 2.0;
		assert!((mx - 100.0).abs() < 1e-9);
		assert!((my - 100.0).abs() < 1e-9);
	}

	#[test]
	fn collide_separates_coincident_nodes() {
		let mut rng = StdRng::seed_from_u64(7);
		let mut nodes = vec![at(5.0, 5.0), at(5.0, 5.0)];
		apply_collide(&mut nodes, 30.0, 1.0, &mut rng);
		assert!(nodes[0].vx != nodes[1].vx || nodes[0].vy != nodes[1].vy);
	}

	#[test]
	fn integrate_respects_pins_per_axis() {
		let mut node = at(0.0, 0.0);
		node.vx = 10.0;
		node.vy = 10.0;
		node.fx = Some(3.0);
		let mut nodes = vec![node];
		integrate(&mut nodes, 0.4);
		assert_eq!(nodes[0].x, 3.0);
		assert_eq!(nodes[0].vx, 0.0);
		assert!((nodes[0].y - 6.0).abs() < 1e-9);
	}
}
