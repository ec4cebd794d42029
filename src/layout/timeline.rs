use super::scale::TimeScale;
use super::{PlacedNode, Viewport};
use crate::graph::Graph;

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 40.0;
const TICK_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct TimelineLayout {
	pub nodes: Vec<PlacedNode>,
	pub axis_y: f64,
	pub axis_span: (f64, f64),
	pub ticks: Vec<(f64, String)>,
}

pub fn timeline_radius(connections: usize) -> f64 {
	4.0 + connections.min(12) as f64
}

/// Places every node on one horizontal line, by modification time.
pub fn layout(graph: &Graph, viewport: Viewport) -> Option<TimelineLayout> {
	let range = (MARGIN_LEFT, viewport.width - MARGIN_RIGHT);
	let scale = TimeScale::extent(graph.nodes.iter().map(|n| n.modified), range)?;
	let axis_y = viewport.height / 2.0;

	let nodes = graph
		.nodes
		.iter()
		.map(|n| PlacedNode {
			id: Some(n.id.clone()),
			label: n.display_name().to_owned(),
			x: scale.apply(n.modified),
			y: axis_y,
			radius: timeline_radius(n.connections),
		})
		.collect();

	Some(TimelineLayout {
		nodes,
		axis_y,
		axis_span: range,
		ticks: scale.ticks(TICK_COUNT),
	})
}
