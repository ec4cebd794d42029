use super::Viewport;
use super::scale::{BandScale, sequential_yl_gn_bu};
use crate::graph::Graph;

pub const MAX_TAGS: usize = 30;
pub const EMPTY_CELL: &str = "#161b22";

const CELL_SIZE: f64 = 18.0;
const PADDING: f64 = 0.05;
const LEFT: f64 = 120.0;
const RIGHT: f64 = 20.0;
const TOP: f64 = 40.0;
const BOTTOM: f64 = 20.0;

#[derive(Clone, Debug, PartialEq)]
pub struct HeatCell {
	pub note: String,
	pub tag: String,
	pub filled: bool,
	pub color: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl HeatCell {
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapLayout {
	/// Tag rows with the number of notes carrying each tag.
	pub tags: Vec<(String, usize)>,
	/// Row label anchors, one per tag.
	pub rows: Vec<(f64, String)>,
	pub cells: Vec<HeatCell>,
}

impl HeatmapLayout {
	/// The note under `(x, y)`, if it lands on a filled cell.
	pub fn note_at(&self, x: f64, y: f64) -> Option<&str> {
		self.cells
			.iter()
			.find(|c| c.filled && c.contains(x, y))
			.map(|c| c.note.as_str())
	}
}

/// Tags in first-encountered order with their note counts, capped at [`MAX_TAGS`].
pub fn tag_frequencies(graph: &Graph) -> Vec<(String, usize)> {
	let mut freq: Vec<(String, usize)> = Vec::new();
	for tag in graph.nodes.iter().flat_map(|n| n.tags.iter()) {
		match freq.iter_mut().find(|(t, _)| t == tag) {
			Some((_, count)) => *count += 1,
			None => freq.push((tag.clone(), 1)),
		}
	}
	freq.truncate(MAX_TAGS);
	freq
}

/// Note × tag incidence matrix; columns are notes, rows are tags.
pub fn layout(graph: &Graph, viewport: Viewport) -> Option<HeatmapLayout> {
	if graph.is_empty() {
		return None;
	}
	let tags = tag_frequencies(graph);
	let max = tags.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;

	let columns = BandScale::new(graph.nodes.len(), (LEFT, viewport.width - RIGHT), PADDING);
	let bottom = (viewport.height - BOTTOM).min(TOP + tags.len() as f64 * CELL_SIZE);
	let rows_scale = BandScale::new(tags.len(), (TOP, bottom), PADDING);

	let mut cells = Vec::with_capacity(tags.len() * graph.nodes.len());
	let mut rows = Vec::with_capacity(tags.len());
	for (r, (tag, count)) in tags.iter().enumerate() {
		let Some(y) = rows_scale.position(r) else {
			continue;
		};
		rows.push((y + rows_scale.bandwidth() / 2.0, tag.clone()));
		for (c, node) in graph.nodes.iter().enumerate() {
			let Some(x) = columns.position(c) else {
				continue;
			};
			let filled = node.tags.contains(tag);
			cells.push(HeatCell {
				note: node.id.clone(),
				tag: tag.clone(),
				filled,
				color: if filled {
					sequential_yl_gn_bu(*count as f64, max)
				} else {
					EMPTY_CELL.to_owned()
				},
				x,
				y,
				width: columns.bandwidth(),
				height: rows_scale.bandwidth(),
			});
		}
	}

	Some(HeatmapLayout { tags, rows, cells })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Note, build_graph};

	#[test]
	fn caps_tags_in_first_seen_order() {
		let content: String = (0..40).map(|i| format!("#t{i} ")).collect();
		let graph = build_graph(&[Note::new("a.md", "a.md", Some(&content))]);
		let tags = tag_frequencies(&graph);
		assert_eq!(tags.len(), MAX_TAGS);
		assert_eq!(tags[0].0, "t0");
		assert_eq!(tags[29].0, "t29");

		let h = layout(&graph, Viewport::new(1000.0, 700.0)).unwrap();
		assert_eq!(h.rows.len(), MAX_TAGS);
	}

	#[test]
	fn counts_notes_per_tag() {
		let graph = build_graph(&[
			Note::new("a.md", "a.md", Some("#x #y #x")),
			Note::new("b.md", "b.md", Some("#x")),
		]);
		assert_eq!(
			tag_frequencies(&graph),
			vec![("x".to_owned(), 2), ("y".to_owned(), 1)]
		);
	}

	#[test]
	fn cells_mark_incidence() {
		let graph = build_graph(&[
			Note::new("a.md", "a.md", Some("#x")),
			Note::new("b.md", "b.md", Some("#y")),
		]);
		let h = layout(&graph, Viewport::new(1000.0, 700.0)).unwrap();
		assert_eq!(h.cells.len(), 4);
		let filled: Vec<(&str, &str)> = h
			.cells
			.iter()
			.filter(|c| c.filled)
			.map(|c| (c.note.as_str(), c.tag.as_str()))
			.collect();
		assert_eq!(filled, vec![("a.md", "x"), ("b.md", "y")]);
		assert!(h.cells.iter().filter(|c| !c.filled).all(|c| c.color == EMPTY_CELL));
	}

	#[test]
	fn clicking_filled_cell_finds_note() {
		let graph = build_graph(&[
			Note::new("a.md", "a.md", Some("#x")),
			Note::new("b.md", "b.md", Some("")),
		]);
		let h = layout(&graph, Viewport::new(1000.0, 700.0)).unwrap();
		let hit = &h.cells[0];
		assert_eq!(h.note_at(hit.x + 1.0, hit.y + 1.0), Some("a.md"));
		let empty = &h.cells[1];
		assert_eq!(h.note_at(empty.x + 1.0, empty.y + 1.0), None);
	}

	#[test]
	fn notes_without_tags_still_get_columns() {
		let graph = build_graph(&[Note::new("a.md", "a.md", Some("plain"))]);
		let h = layout(&graph, Viewport::new(1000.0, 700.0)).unwrap();
		assert!(h.tags.is_empty());
		assert!(h.cells.is_empty());
	}
}
