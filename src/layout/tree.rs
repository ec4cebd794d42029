//! Vault → cluster → note hierarchy, drawn left to right.

use super::{PlacedEdge, PlacedNode, Viewport};
use crate::graph::Graph;

pub const ROOT_LABEL: &str = "Vault";
pub const TREE_NODE_RADIUS: f64 = 4.0;

const OFFSET: (f64, f64) = (80.0, 40.0);
const MARGIN: (f64, f64) = (160.0, 80.0);

#[derive(Clone, Debug, PartialEq)]
pub struct TreeLayout {
	/// Root first, then each cluster followed by its leaves.
	pub nodes: Vec<PlacedNode>,
	pub depths: Vec<usize>,
	/// Parent → child, in screen space.
	pub edges: Vec<PlacedEdge>,
}

struct Cluster<'a> {
	name: &'a str,
	members: Vec<usize>,
}

fn group_by_cluster(graph: &Graph) -> Vec<Cluster<'_>> {
	let mut clusters: Vec<Cluster<'_>> = Vec::new();
	for (i, node) in graph.nodes.iter().enumerate() {
		match clusters.iter_mut().find(|c| c.name == node.cluster) {
			Some(c) => c.members.push(i),
			None => clusters.push(Cluster {
				name: &node.cluster,
				members: vec![i],
			}),
		}
	}
	clusters
}

/// Tidy layout of the synthetic tree. Leaves sharing a cluster sit one unit
/// apart, leaves of neighbouring clusters two units apart, and every parent
/// is centered over its children.
pub fn layout(graph: &Graph, viewport: Viewport) -> Option<TreeLayout> {
	if graph.is_empty() {
		return None;
	}
	let clusters = group_by_cluster(graph);

	// breadth (sibling axis) in layout units, per node in output order
	let mut breadth = vec![0.0];
	let mut depths = vec![0];
	let mut parents = vec![None];
	let mut labels = vec![(None, ROOT_LABEL.to_owned())];
	let mut cluster_breadth = Vec::with_capacity(clusters.len());
	let mut cursor: Option<f64> = None;

	for cluster in &clusters {
		let cluster_slot = breadth.len();
		breadth.push(0.0);
		depths.push(1);
		parents.push(Some(0));
		labels.push((None, cluster.name.to_owned()));

		let mut first = None;
		let mut last = 0.0;
		for (k, &member) in cluster.members.iter().enumerate() {
			let gap = if k == 0 { 2.0 } else { 1.0 };
			let pos = cursor.map_or(0.0, |c| c + gap);
			cursor = Some(pos);
			first.get_or_insert(pos);
			last = pos;

			let node = &graph.nodes[member];
			breadth.push(pos);
			depths.push(2);
			parents.push(Some(cluster_slot));
			labels.push((Some(node.id.clone()), node.display_name().to_owned()));
		}
		let mid = (first.unwrap_or(last) + last) / 2.0;
		breadth[cluster_slot] = mid;
		cluster_breadth.push(mid);
	}
	if let (Some(first), Some(last)) = (cluster_breadth.first(), cluster_breadth.last()) {
		breadth[0] = (first + last) / 2.0;
	}

	// normalise to the available size, leaving half the separation between
	// the outermost leaves at each edge (a whole unit for a lone leaf)
	let (lo, hi) = breadth
		.iter()
		.fold((f64::MAX, f64::MIN), |(lo, hi), &b| (lo.min(b), hi.max(b)));
	let leaves = graph.nodes.len();
	let edge_sep = match clusters.as_slice() {
		[only] if leaves > 1 && only.members.len() == leaves => 0.5,
		_ => 1.0,
	};
	let height = viewport.height - MARGIN.1;
	let width = viewport.width - MARGIN.0;
	let kx = height / (hi - lo + 2.0 * edge_sep);
	let max_depth = depths.iter().copied().max().unwrap_or(0).max(1) as f64;

	let nodes: Vec<PlacedNode> = labels
		.into_iter()
		.zip(breadth.iter().zip(depths.iter()))
		.map(|((id, label), (&b, &depth))| PlacedNode {
			id,
			label,
			x: OFFSET.0 + depth as f64 / max_depth * width,
			y: OFFSET.1 + (b - lo + edge_sep) * kx,
			radius: TREE_NODE_RADIUS,
		})
		.collect();

	let edges = parents
		.iter()
		.enumerate()
		.filter_map(|(child, parent)| {
			let (p, c) = (&nodes[(*parent)?], &nodes[child]);
			Some(PlacedEdge {
				x1: p.x,
				y1: p.y,
				x2: c.x,
				y2: c.y,
				width: 1.0,
			})
		})
		.collect();

	Some(TreeLayout {
		nodes,
		depths,
		edges,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Note, build_graph};

	fn graph() -> Graph {
		build_graph(&[
			Note::new("a.md", "work/a.md", Some("")),
			Note::new("b.md", "home/b.md", Some("")),
			Note::new("c.md", "work/c.md", Some("")),
			Note::new("d.md", "d.md", Some("#reading")),
		])
	}

	#[test]
	fn one_child_per_cluster_in_first_seen_order() {
		let t = layout(&graph(), Viewport::new(1000.0, 700.0)).unwrap();
		let labels: Vec<&str> = t.nodes.iter().map(|n| n.label.as_str()).collect();
		assert_eq!(
			labels,
			vec!["Vault", "work", "a", "c", "home", "b", "reading", "d"]
		);
		assert_eq!(t.depths, vec![0, 1, 2, 2, 1, 2, 1, 2]);
		assert_eq!(t.edges.len(), t.nodes.len() - 1);
	}

	#[test]
	fn leaves_carry_note_ids() {
		let t = layout(&graph(), Viewport::new(1000.0, 700.0)).unwrap();
		let ids: Vec<&str> = t.nodes.iter().filter_map(|n| n.id.as_deref()).collect();
		assert_eq!(ids, vec!["a.md", "c.md", "b.md", "d.md"]);
	}

	#[test]
	fn depth_runs_left_to_right() {
		let t = layout(&graph(), Viewport::new(1000.0, 700.0)).unwrap();
		assert_eq!(t.nodes[0].x, 80.0);
		assert_eq!(t.nodes[1].x, 80.0 + 420.0);
		assert_eq!(t.nodes[2].x, 80.0 + 840.0);
	}

	#[test]
	fn parents_are_centered_over_children() {
		let t = layout(&graph(), Viewport::new(1000.0, 700.0)).unwrap();
		let (work, a, c) = (&t.nodes[1], &t.nodes[2], &t.nodes[3]);
		assert!((work.y - (a.y + c.y) / 2.0).abs() < 1e-9);
		// cousins are spaced wider than siblings
		let sibling = c.y - a.y;
		let cousin = t.nodes[5].y - c.y;
		assert!((cousin - 2.0 * sibling).abs() < 1e-9);
	}

	#[test]
	fn stays_inside_viewport() {
		let t = layout(&graph(), Viewport::new(1000.0, 700.0)).unwrap();
		for n in &t.nodes {
			assert!(n.y >= 40.0 && n.y <= 660.0, "{} at {}", n.label, n.y);
		}
	}

	#[test]
	fn single_cluster_leaves_use_sibling_margin() {
		let graph = build_graph(&[
			Note::new("a.md", "work/a.md", Some("")),
			Note::new("b.md", "work/b.md", Some("")),
		]);
		let t = layout(&graph, Viewport::new(1000.0, 700.0)).unwrap();
		// two sibling leaves one unit apart plus half a unit at each edge
		assert!((t.nodes[2].y - 195.0).abs() < 1e-9);
		assert!((t.nodes[3].y - 505.0).abs() < 1e-9);
	}

	#[test]
	fn lone_leaf_sits_mid_height() {
		let graph = build_graph(&[Note::new("a.md", "a.md", Some(""))]);
		let t = layout(&graph, Viewport::new(1000.0, 700.0)).unwrap();
		assert!(t.nodes.iter().all(|n| (n.y - 350.0).abs() < 1e-9));
	}

	#[test]
	fn empty_graph_has_no_tree() {
		assert!(layout(&Graph::default(), Viewport::new(100.0, 100.0)).is_none());
	}
}
