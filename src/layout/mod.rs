//! Layout engines projecting a [`Graph`] into screen space.

pub mod force;
pub mod heatmap;
pub mod scale;
pub mod timeline;
pub mod tree;

use log::debug;

use crate::graph::{Graph, GraphLink, GraphNode, GraphSettings, LayoutMode};
pub use force::ForceSimulation;
pub use heatmap::HeatmapLayout;
pub use timeline::TimelineLayout;
pub use tree::TreeLayout;

/// Fallback size when the host reports a zero-sized container.
pub const DEFAULT_VIEWPORT: Viewport = Viewport {
	width: 1000.0,
	height: 700.0,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		if width > 0.0 && height > 0.0 {
			Self { width, height }
		} else {
			DEFAULT_VIEWPORT
		}
	}

	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	/// Whether a resize to `other` is large enough to warrant a relayout.
	pub fn differs_materially(&self, other: &Viewport) -> bool {
		(self.width - other.width).abs() >= 1.0 || (self.height - other.height).abs() >= 1.0
	}
}

/// A positioned glyph. `id` is the note id for glyphs that stand for a note.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
	pub id: Option<String>,
	pub label: String,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
}

impl PlacedNode {
	pub fn contains(&self, x: f64, y: f64) -> bool {
		let (dx, dy) = (self.x - x, self.y - y);
		dx * dx + dy * dy <= self.radius * self.radius
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedEdge {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub width: f64,
}

/// The active projection. Force positions live on the graph's nodes; the
/// other projections own their output.
#[derive(Clone, Debug)]
pub enum Scene {
	Empty,
	Force(ForceSimulation),
	Timeline(TimelineLayout),
	Tree(TreeLayout),
	Heatmap(HeatmapLayout),
}

impl Scene {
	pub fn build(
		mode: LayoutMode,
		graph: &mut Graph,
		viewport: Viewport,
		settings: &GraphSettings,
	) -> Self {
		debug!("laying out {} nodes as {}", graph.nodes.len(), mode.as_str());
		if graph.is_empty() {
			return Scene::Empty;
		}
		let scene = match mode {
			LayoutMode::Force => Some(Scene::Force(ForceSimulation::new(graph, viewport, settings))),
			LayoutMode::Timeline => timeline::layout(graph, viewport).map(Scene::Timeline),
			LayoutMode::Tree => tree::layout(graph, viewport).map(Scene::Tree),
			LayoutMode::Heatmap => heatmap::layout(graph, viewport).map(Scene::Heatmap),
		};
		scene.unwrap_or(Scene::Empty)
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Scene::Empty)
	}

	pub fn simulation_mut(&mut self) -> Option<&mut ForceSimulation> {
		match self {
			Scene::Force(sim) => Some(sim),
			_ => None,
		}
	}

	/// Id of the note drawn under `(x, y)`. Force coordinates are in graph
	/// space; `force_radius` gives each node's hit radius there.
	pub fn node_at<F>(&self, graph: &Graph, x: f64, y: f64, force_radius: F) -> Option<String>
	where
		F: Fn(&GraphNode) -> f64,
	{
		match self {
			Scene::Empty => None,
			Scene::Force(_) => graph
				.nodes
				.iter()
				.rev()
				.find(|n| {
					let (dx, dy) = (n.x - x, n.y - y);
					let r = force_radius(n);
					dx * dx + dy * dy <= r * r
				})
				.map(|n| n.id.clone()),
			Scene::Timeline(t) => hit(&t.nodes, x, y),
			Scene::Tree(t) => hit(&t.nodes, x, y),
			Scene::Heatmap(h) => h.note_at(x, y).map(str::to_owned),
		}
	}
}

fn hit(nodes: &[PlacedNode], x: f64, y: f64) -> Option<String> {
	nodes
		.iter()
		.rev()
		.filter(|n| n.contains(x, y))
		.find_map(|n| n.id.clone())
}

/// Endpoints of every link whose ends are both in `graph`, with stroke width
/// `sqrt(strength) + 1`.
pub fn link_segments(graph: &Graph) -> Vec<(&GraphLink, usize, usize, PlacedEdge)> {
	let index = graph.index();
	graph
		.links
		.iter()
		.filter_map(|l| {
			let (s, t) = (*index.get(l.source.as_str())?, *index.get(l.target.as_str())?);
			let (a, b) = (&graph.nodes[s], &graph.nodes[t]);
			Some((
				l,
				s,
				t,
				PlacedEdge {
					x1: a.x,
					y1: a.y,
					x2: b.x,
					y2: b.y,
					width: f64::from(l.strength).sqrt() + 1.0,
				},
			))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Note, build_graph};

	fn sample() -> Graph {
		build_graph(&[
			Note::new("A.md", "notes/A.md", Some("[[B]] #x")),
			Note::new("B.md", "notes/B.md", Some("#y")),
		])
	}

	#[test]
	fn every_mode_handles_empty_graph() {
		for mode in LayoutMode::ALL {
			let mut graph = Graph::default();
			let scene = Scene::build(mode, &mut graph, DEFAULT_VIEWPORT, &GraphSettings::default());
			assert!(scene.is_empty(), "{}", mode.as_str());
			assert_eq!(scene.node_at(&graph, 0.0, 0.0, |_| 10.0), None);
		}
	}

	#[test]
	fn every_mode_builds_for_sample() {
		for mode in LayoutMode::ALL {
			let mut graph = sample();
			let scene = Scene::build(mode, &mut graph, DEFAULT_VIEWPORT, &GraphSettings::default());
			assert!(!scene.is_empty(), "{}", mode.as_str());
		}
	}

	#[test]
	fn force_hit_test_uses_graph_positions() {
		let mut graph = sample();
		let scene = Scene::build(
			LayoutMode::Force,
			&mut graph,
			DEFAULT_VIEWPORT,
			&GraphSettings::default(),
		);
		let (x, y) = (graph.nodes[1].x, graph.nodes[1].y);
		assert_eq!(scene.node_at(&graph, x, y, |_| 1.0), Some("B.md".to_owned()));
		assert_eq!(scene.node_at(&graph, -500.0, -500.0, |_| 1.0), None);
	}

	#[test]
	fn zero_viewport_falls_back() {
		assert_eq!(Viewport::new(0.0, 0.0), DEFAULT_VIEWPORT);
		assert!(!DEFAULT_VIEWPORT.differs_materially(&Viewport::new(1000.4, 700.0)));
	}

	#[test]
	fn link_widths_follow_strength() {
		let graph = build_graph(&[
			Note::new("A.md", "A.md", Some("[[B]][[B]][[B]]")),
			Note::new("B.md", "B.md", Some("")),
		]);
		let segs = link_segments(&graph);
		assert_eq!(segs.len(), 3);
		assert!((segs[0].3.width - (3f64.sqrt() + 1.0)).abs() < 1e-12);
	}
}
