//! Force-directed simulation stepped explicitly, one tick per host frame.
//!
//! Four forces act on the nodes each tick: links pull endpoints toward the
//! configured distance, a many-body charge repels (or attracts) every pair,
//! centering shifts the mean position toward the viewport center, and
//! collision keeps node circles from overlapping. Velocities decay each tick
//! while `alpha` cools toward `alpha_target`; the simulation idles once alpha
//! drops below `ALPHA_MIN`.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;

use super::Viewport;
use super::scale::LinearScale;
use crate::graph::{Graph, GraphNode, GraphSettings, NodeSizing};

pub const ALPHA_MIN: f64 = 0.001;
/// Alpha target while a node is being dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
pub const VELOCITY_DECAY: f64 = 0.4;
pub const UNIFORM_RADIUS: f64 = 15.0;
pub const RADIUS_RANGE: (f64, f64) = (12.0, 28.0);
pub const COLLISION_PADDING: f64 = 8.0;

const INITIAL_RADIUS: f64 = 10.0;
const DISTANCE_MIN2: f64 = 1.0;

/// Node radius for the force view.
pub fn node_radius(node: &GraphNode, max_connections: usize, sizing: NodeSizing) -> f64 {
	match sizing {
		NodeSizing::Uniform => UNIFORM_RADIUS,
		NodeSizing::Connections => {
			let max = max_connections.max(1) as f64;
			LinearScale::new((0.0, max), RADIUS_RANGE).apply(node.connections as f64)
		}
	}
}

/// Deterministic jitter source used to separate coincident nodes.
#[derive(Clone, Debug)]
struct Lcg(u32);

impl Lcg {
	fn next(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

#[derive(Clone, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

#[derive(Clone, Debug)]
pub struct ForceSimulation {
	velocities: Vec<(f64, f64)>,
	radii: Vec<f64>,
	springs: Vec<Spring>,
	center: (f64, f64),
	link_distance: f64,
	charge_strength: f64,
	center_strength: f64,
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	physics: bool,
	running: bool,
	rng: Lcg,
}

impl ForceSimulation {
	/// Seeds node positions around the viewport center and prepares forces.
	pub fn new(graph: &mut Graph, viewport: Viewport, settings: &GraphSettings) -> Self {
		let (cx, cy) = viewport.center();
		let golden = PI * (3.0 - 5f64.sqrt());
		for (i, node) in graph.nodes.iter_mut().enumerate() {
			let r = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
			let angle = i as f64 * golden;
			node.x = cx + r * angle.cos();
			node.y = cy + r * angle.sin();
			node.unpin();
		}

		let max_connections = graph.max_connections();
		let radii = graph
			.nodes
			.iter()
			.map(|n| node_radius(n, max_connections, settings.node_size) + COLLISION_PADDING)
			.collect();

		let mut sim = Self {
			velocities: vec![(0.0, 0.0); graph.nodes.len()],
			radii,
			springs: Vec::new(),
			center: (cx, cy),
			link_distance: settings.link_distance,
			charge_strength: settings.charge_strength,
			center_strength: settings.center_force,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
			physics: settings.physics,
			running: settings.physics,
			rng: Lcg(1),
		};
		sim.sync_links(graph);
		sim
	}

	/// Recomputes springs from the graph's current link set and reheats, so
	/// newly linked nodes are pulled together.
	pub fn sync_links(&mut self, graph: &Graph) {
		let index = graph.index();
		let pairs: Vec<(usize, usize)> = graph
			.links
			.iter()
			.filter_map(|l| Some((*index.get(l.source.as_str())?, *index.get(l.target.as_str())?)))
			.filter(|(s, t)| s != t)
			.collect();

		let mut degree: HashMap<usize, f64> = HashMap::new();
		for &(s, t) in &pairs {
			*degree.entry(s).or_insert(0.0) += 1.0;
			*degree.entry(t).or_insert(0.0) += 1.0;
		}

		self.springs = pairs
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[&source], degree[&target]);
				Spring {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();
		self.reheat();
	}

	fn reheat(&mut self) {
		if self.physics {
			self.alpha = self.alpha.max(DRAG_ALPHA_TARGET);
			self.running = true;
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn physics(&self) -> bool {
		self.physics
	}

	/// Turning physics off halts iteration and keeps the last positions.
	pub fn set_physics(&mut self, on: bool) {
		self.physics = on;
		if on {
			self.alpha = self.alpha.max(DRAG_ALPHA_TARGET);
			self.running = true;
		} else {
			self.running = false;
			self.velocities.iter_mut().for_each(|v| *v = (0.0, 0.0));
		}
		debug!("force simulation physics {}", if on { "on" } else { "off" });
	}

	pub fn set_center(&mut self, viewport: Viewport) {
		self.center = viewport.center();
		self.reheat();
	}

	/// Advances the simulation by one tick. Returns whether it is still running.
	pub fn tick(&mut self, nodes: &mut [GraphNode]) -> bool {
		if !self.running || nodes.is_empty() || nodes.len() != self.velocities.len() {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		let alpha = self.alpha;

		self.apply_links(nodes, alpha);
		self.apply_charge(nodes, alpha);
		self.apply_center(nodes);
		self.apply_collision(nodes);

		for (node, v) in nodes.iter_mut().zip(self.velocities.iter_mut()) {
			match (node.fx, node.fy) {
				(Some(fx), Some(fy)) => {
					node.x = fx;
					node.y = fy;
					*v = (0.0, 0.0);
				}
				_ => {
					v.0 *= 1.0 - VELOCITY_DECAY;
					v.1 *= 1.0 - VELOCITY_DECAY;
					node.x += v.0;
					node.y += v.1;
				}
			}
		}

		if self.alpha < ALPHA_MIN {
			self.running = false;
		}
		self.running
	}

	fn apply_links(&mut self, nodes: &[GraphNode], alpha: f64) {
		for spring in &self.springs {
			let (sv, tv) = (self.velocities[spring.source], self.velocities[spring.target]);
			let (s, t) = (&nodes[spring.source], &nodes[spring.target]);
			let mut x = t.x + tv.0 - s.x - sv.0;
			let mut y = t.y + tv.1 - s.y - sv.1;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let mut l = (x * x + y * y).sqrt();
			l = (l - self.link_distance) / l * alpha * spring.strength;
			x *= l;
			y *= l;
			let b = spring.bias;
			self.velocities[spring.target].0 -= x * b;
			self.velocities[spring.target].1 -= y * b;
			self.velocities[spring.source].0 += x * (1.0 - b);
			self.velocities[spring.source].1 += y * (1.0 - b);
		}
	}

	fn apply_charge(&mut self, nodes: &[GraphNode], alpha: f64) {
		let strength = self.charge_strength;
		for i in 0..nodes.len() {
			for j in 0..nodes.len() {
				if i == j {
					continue;
				}
				let mut x = nodes[j].x - nodes[i].x;
				let mut y = nodes[j].y - nodes[i].y;
				if x == 0.0 {
					x = self.rng.jiggle();
				}
				if y == 0.0 {
					y = self.rng.jiggle();
				}
				let mut l = x * x + y * y;
				if l < DISTANCE_MIN2 {
					l = (DISTANCE_MIN2 * l).sqrt();
				}
				self.velocities[i].0 += x * strength * alpha / l;
				self.velocities[i].1 += y * strength * alpha / l;
			}
		}
	}

	fn apply_center(&self, nodes: &mut [GraphNode]) {
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let dx = (sx / n - self.center.0) * self.center_strength;
		let dy = (sy / n - self.center.1) * self.center_strength;
		for node in nodes.iter_mut() {
			node.x -= dx;
			node.y -= dy;
		}
	}

	fn apply_collision(&mut self, nodes: &[GraphNode]) {
		for i in 0..nodes.len() {
			let ri = self.radii[i];
			let ri2 = ri * ri;
			let xi = nodes[i].x + self.velocities[i].0;
			let yi = nodes[i].y + self.velocities[i].1;
			for j in (i + 1)..nodes.len() {
				let rj = self.radii[j];
				let r = ri + rj;
				let mut x = xi - nodes[j].x - self.velocities[j].0;
				let mut y = yi - nodes[j].y - self.velocities[j].1;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				let d = l.sqrt();
				let push = (r - d) / d;
				x *= push;
				y *= push;
				let share = rj * rj / (ri2 + rj * rj);
				self.velocities[i].0 += x * share;
				self.velocities[i].1 += y * share;
				self.velocities[j].0 -= x * (1.0 - share);
				self.velocities[j].1 -= y * (1.0 - share);
			}
		}
	}

	/// Pins `idx` at its current position and reheats the simulation.
	pub fn drag_start(&mut self, nodes: &mut [GraphNode], idx: usize) {
		let Some(node) = nodes.get_mut(idx) else {
			return;
		};
		node.pin(node.x, node.y);
		if self.physics {
			self.alpha_target = DRAG_ALPHA_TARGET;
			self.running = true;
		}
	}

	pub fn drag_to(&mut self, nodes: &mut [GraphNode], idx: usize, x: f64, y: f64) {
		let Some(node) = nodes.get_mut(idx) else {
			return;
		};
		node.pin(x, y);
		if !self.physics {
			node.x = x;
			node.y = y;
		}
	}

	/// Ends a drag. The pin is released unless `sticky`.
	pub fn drag_end(&mut self, nodes: &mut [GraphNode], idx: usize, sticky: bool) {
		if self.physics {
			self.alpha_target = 0.0;
		}
		if let Some(node) = nodes.get_mut(idx) {
			if !sticky {
				node.unpin();
			}
		}
	}
}
