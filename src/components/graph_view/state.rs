use std::collections::{HashMap, HashSet};

use log::debug;

use crate::graph::{ColorScheme, Graph, GraphNode, GraphSettings, LayoutMode, Note, build_graph};
use crate::interaction::{ContextMenu, GraphHost, InteractionController, MenuAction};
use crate::layout::force::node_radius;
use crate::layout::scale::{COLORS, OrdinalColors};
use crate::layout::{Scene, Viewport};

pub const ZOOM_EXTENT: (f64, f64) = (0.2, 5.0);
pub const HOVER_SCALE: f64 = 1.2;
pub const PLACEHOLDER: &str = "No notes to display in graph view";
const TOOLTIP_OFFSET: (f64, f64) = (15.0, -10.0);

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	pub neighbors: HashSet<String>,
	pub highlight_t: f64,
	pub prev_node: Option<String>,
	pub prev_neighbors: HashSet<String>,
	pub pointer: (f64, f64),
	delay_t: f64,
}

/// Hover card contents for the node under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub title: String,
	pub connections: usize,
	pub node_type: String,
	pub tags: String,
	pub modified: String,
	pub x: f64,
	pub y: f64,
}

/// Details panel contents for the selected node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	pub id: String,
	pub title: String,
	pub connections: usize,
	pub node_type: String,
	pub tags: String,
	pub size: usize,
	pub modified: String,
}

/// Everything the HTML overlay needs, snapshotted after each event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
	pub menu: ContextMenu,
	pub tooltip: Option<Tooltip>,
	pub details: Option<NodeDetails>,
	pub connecting: Option<String>,
	pub note_count: usize,
	pub link_count: usize,
}

fn tag_list(node: &GraphNode) -> String {
	if node.tags.is_empty() {
		"None".to_owned()
	} else {
		node.tags.join(", ")
	}
}

fn date_label(node: &GraphNode) -> String {
	node.modified.format("%Y-%m-%d").to_string()
}

pub struct GraphViewState {
	/// Builder output plus manual links; `graph` is derived from it.
	source: Graph,
	pub graph: Graph,
	pub settings: GraphSettings,
	pub scene: Scene,
	pub controller: InteractionController,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub hover: HoverState,
	pub viewport: Viewport,
	pub flow_time: f64,
	current_path: Option<String>,
	cluster_palette: HashMap<String, &'static str>,
	/// Notes handed over by the host, named or not.
	note_total: usize,
}

impl GraphViewState {
	pub fn new(
		notes: &[Note],
		current_path: Option<String>,
		settings: GraphSettings,
		viewport: Viewport,
	) -> Self {
		let mut state = Self {
			source: Graph::default(),
			graph: Graph::default(),
			settings,
			scene: Scene::Empty,
			controller: InteractionController::default(),
			transform: ViewTransform::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			viewport,
			flow_time: 0.0,
			current_path,
			cluster_palette: HashMap::new(),
			note_total: 0,
		};
		state.rebuild(notes);
		state
	}

	/// Replaces the graph wholesale from the note collection.
	pub fn rebuild(&mut self, notes: &[Note]) {
		self.note_total = notes.len();
		self.source = build_graph(notes);
		self.source.mark_current(self.current_path.as_deref());
		self.relayout();
	}

	fn relayout(&mut self) {
		self.graph = if self.settings.show_orphans {
			self.source.clone()
		} else {
			self.source.without_orphans()
		};
		self.scene = Scene::build(
			self.settings.layout_mode,
			&mut self.graph,
			self.viewport,
			&self.settings,
		);
		self.controller.reconcile(&self.graph);
		if self
			.hover
			.node
			.as_deref()
			.is_some_and(|id| !self.graph.contains(id))
		{
			self.set_hover(None);
		}
		self.pan.active = false;
		let mut colors = OrdinalColors::default();
		self.cluster_palette = self
			.graph
			.nodes
			.iter()
			.map(|n| (n.cluster.clone(), colors.color(&n.cluster)))
			.collect();
	}

	pub fn apply_settings(&mut self, settings: GraphSettings) {
		if settings == self.settings {
			return;
		}
		let relayout = self.settings.needs_relayout(&settings);
		let physics_changed = self.settings.physics != settings.physics;
		if settings.layout_mode != self.settings.layout_mode {
			debug!("layout mode -> {}", settings.layout_mode.as_str());
			self.transform = ViewTransform::default();
		}
		self.settings = settings;

		if relayout {
			self.relayout();
		} else if physics_changed {
			let physics = self.settings.physics;
			if let Some(sim) = self.scene.simulation_mut() {
				sim.set_physics(physics);
			}
		}
	}

	pub fn set_current(&mut self, path: Option<String>) {
		self.current_path = path;
		self.source.mark_current(self.current_path.as_deref());
		self.graph.mark_current(self.current_path.as_deref());
	}

	pub fn resize(&mut self, viewport: Viewport) {
		if !self.viewport.differs_materially(&viewport) {
			return;
		}
		self.viewport = viewport;
		match self.scene.simulation_mut() {
			Some(sim) => sim.set_center(viewport),
			None => {
				self.scene = Scene::build(
					self.settings.layout_mode,
					&mut self.graph,
					viewport,
					&self.settings,
				)
			}
		}
	}

	fn pans(&self) -> bool {
		self.settings.layout_mode == LayoutMode::Force
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		if !self.pans() {
			return (sx, sy);
		}
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn radius(&self, node: &GraphNode) -> f64 {
		node_radius(node, self.graph.max_connections(), self.settings.node_size)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (x, y) = self.screen_to_graph(sx, sy);
		let max = self.graph.max_connections();
		let sizing = self.settings.node_size;
		self.scene
			.node_at(&self.graph, x, y, |n| node_radius(n, max, sizing))
	}

	pub fn color(&self, node: &GraphNode) -> &'static str {
		match self.settings.color_scheme {
			ColorScheme::Category => node.node_type.color(),
			ColorScheme::Cluster => self
				.cluster_palette
				.get(&node.cluster)
				.copied()
				.unwrap_or(COLORS[0]),
		}
	}

	pub fn set_hover(&mut self, node: Option<String>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// keep the previous highlight around so it can fade out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.neighbors.clear();
		if let Some(id) = node.as_deref() {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			self.hover.neighbors = self
				.graph
				.neighbors(id)
				.into_iter()
				.map(str::to_owned)
				.collect();
		}
		self.controller.hover(node.as_deref());
		self.hover.node = node;
	}

	pub fn is_highlighted(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id)
			|| self.hover.neighbors.contains(id)
			|| self.hover.prev_node.as_deref() == Some(id)
			|| self.hover.prev_neighbors.contains(id)
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id) || self.hover.prev_node.as_deref() == Some(id)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if !self.pans() {
			return;
		}
		let hit = self.node_at_position(sx, sy);
		match (hit, self.scene.simulation_mut()) {
			(Some(id), Some(sim)) => {
				self.controller.begin_drag(&mut self.graph, sim, &id);
			}
			_ => {
				self.pan.active = true;
				self.pan.start_x = sx;
				self.pan.start_y = sy;
				self.pan.transform_start_x = self.transform.x;
				self.pan.transform_start_y = self.transform.y;
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		self.hover.pointer = (sx, sy);
		if self.controller.dragged().is_some() {
			let (x, y) = self.screen_to_graph(sx, sy);
			if let Some(sim) = self.scene.simulation_mut() {
				self.controller.drag_to(&mut self.graph, sim, x, y);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		} else {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
		}
	}

	/// `sticky` keeps a dragged node pinned where it was dropped.
	pub fn pointer_up(&mut self, sticky: bool) {
		if let Some(sim) = self.scene.simulation_mut() {
			self.controller.end_drag(&mut self.graph, sim, sticky);
		}
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up(false);
		self.set_hover(None);
	}

	pub fn click(&mut self, sx: f64, sy: f64, host: &mut dyn GraphHost) {
		match self.node_at_position(sx, sy) {
			Some(id) => {
				if self.controller.click_node(&mut self.graph, &id, host) {
					self.adopt_new_link();
				}
			}
			None => self.controller.click_background(),
		}
	}

	/// Right click at canvas position `(sx, sy)`; the menu opens at page
	/// position `(page_x, page_y)`. Returns whether a node was hit.
	pub fn context_menu(&mut self, sx: f64, sy: f64, page_x: f64, page_y: f64) -> bool {
		match self.node_at_position(sx, sy) {
			Some(id) => {
				self.controller.right_click_node(&self.graph, &id, page_x, page_y);
				true
			}
			None => {
				self.controller.close_context_menu();
				false
			}
		}
	}

	/// Closes the context menu after a click landed outside it. Returns
	/// whether a menu was open.
	pub fn dismiss_menu(&mut self) -> bool {
		let open = self.controller.context_menu().show;
		if open {
			self.controller.close_context_menu();
		}
		open
	}

	pub fn menu_action(&mut self, action: MenuAction, host: &mut dyn GraphHost) {
		if self.controller.menu_action(action, &mut self.graph, host) {
			self.adopt_new_link();
		}
	}

	pub fn node_action(&mut self, action: MenuAction, id: &str, host: &mut dyn GraphHost) {
		if self.controller.node_action(action, id, &mut self.graph, host) {
			self.adopt_new_link();
		}
	}

	fn adopt_new_link(&mut self) {
		if let Some(link) = self.graph.links.last() {
			self.source.links.push(link.clone());
		}
		if let Some(sim) = self.scene.simulation_mut() {
			sim.sync_links(&self.graph);
		}
	}

	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if !self.pans() {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(ZOOM_EXTENT.0, ZOOM_EXTENT.1);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f64) {
		if let Scene::Force(sim) = &mut self.scene {
			sim.tick(&mut self.graph.nodes);
		}
		self.flow_time += dt;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn tooltip(&self) -> Option<Tooltip> {
		let node = self.graph.node(self.hover.node.as_deref()?)?;
		Some(Tooltip {
			title: node.display_name().to_owned(),
			connections: node.connections,
			node_type: node.node_type.to_string(),
			tags: tag_list(node),
			modified: date_label(node),
			x: self.hover.pointer.0 + TOOLTIP_OFFSET.0,
			y: self.hover.pointer.1 + TOOLTIP_OFFSET.1,
		})
	}

	pub fn details(&self) -> Option<NodeDetails> {
		let node = self.graph.node(self.controller.selected()?)?;
		Some(NodeDetails {
			id: node.id.clone(),
			title: node.display_name().to_owned(),
			connections: node.connections,
			node_type: node.node_type.to_string(),
			tags: tag_list(node),
			size: node.size,
			modified: date_label(node),
		})
	}

	pub fn overlay(&self) -> Overlay {
		Overlay {
			menu: self.controller.context_menu().clone(),
			tooltip: self.tooltip(),
			details: self.details(),
			connecting: self.controller.source_node().map(str::to_owned),
			note_count: self.note_total,
			link_count: self.graph.links.len(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::interaction::InteractionState;
	use crate::interaction::tests::RecordingHost;

	fn notes() -> Vec<Note> {
		vec![
			Note::new("A.md", "A.md", Some("See [[B]] #project")),
			Note::new("B.md", "B.md", Some("TODO")),
			Note::new("Lonely.md", "Lonely.md", Some("")),
		]
	}

	// seeded positions overlap at default radii, so space the nodes out
	fn spread(s: &mut GraphViewState) {
		for (i, node) in s.graph.nodes.iter_mut().enumerate() {
			node.x = 150.0 + 250.0 * i as f64;
			node.y = 300.0;
		}
	}

	fn state() -> GraphViewState {
		let mut s = GraphViewState::new(
			&notes(),
			Some("B.md".into()),
			GraphSettings::default(),
			Viewport::new(800.0, 600.0),
		);
		spread(&mut s);
		s
	}

	fn screen_pos(s: &GraphViewState, id: &str) -> (f64, f64) {
		let n = s.graph.node(id).unwrap();
		(
			n.x * s.transform.k + s.transform.x,
			n.y * s.transform.k + s.transform.y,
		)
	}

	#[test]
	fn marks_current_note() {
		let s = state();
		assert!(s.graph.node("B.md").unwrap().is_current);
		assert!(!s.graph.node("A.md").unwrap().is_current);
	}

	#[test]
	fn orphan_filter_hides_unlinked_nodes() {
		let mut s = state();
		s.apply_settings(GraphSettings {
			show_orphans: false,
			..GraphSettings::default()
		});
		assert!(!s.graph.contains("Lonely.md"));
		assert_eq!(s.overlay().note_count, 3);
	}

	#[test]
	fn note_count_includes_unnamed_notes() {
		let mut vault = notes();
		vault.push(Note::new("", "untitled.md", Some("")));
		let s = GraphViewState::new(&vault, None, GraphSettings::default(), Viewport::new(800.0, 600.0));
		assert_eq!(s.graph.nodes.len(), 3);
		assert_eq!(s.overlay().note_count, 4);
	}

	#[test]
	fn outside_click_dismisses_menu() {
		let mut s = state();
		assert!(!s.dismiss_menu());
		let (x, y) = screen_pos(&s, "A.md");
		s.context_menu(x, y, 40.0, 50.0);
		assert!(s.overlay().menu.show);

		assert!(s.dismiss_menu());
		let overlay = s.overlay();
		assert!(!overlay.menu.show);
		assert_eq!(overlay.menu.node, None);
	}

	#[test]
	fn click_selects_and_reports_details() {
		let mut s = state();
		let mut host = RecordingHost::default();
		let (x, y) = screen_pos(&s, "B.md");
		s.click(x, y, &mut host);

		assert_eq!(host.opened, vec!["B.md"]);
		let details = s.details().unwrap();
		assert_eq!(details.title, "B");
		assert_eq!(details.node_type, "task");
		assert_eq!(details.connections, 1);
	}

	#[test]
	fn hover_produces_tooltip_near_pointer() {
		let mut s = state();
		let (x, y) = screen_pos(&s, "A.md");
		s.pointer_move(x, y);
		let tip = s.tooltip().unwrap();
		assert_eq!(tip.title, "A");
		assert_eq!(tip.tags, "project");
		assert_eq!((tip.x, tip.y), (x + 15.0, y - 10.0));
		assert!(s.is_highlighted("B.md"));

		s.pointer_leave();
		assert!(s.tooltip().is_none());
	}

	#[test]
	fn drag_and_release_through_pointer_events() {
		let mut s = state();
		let (x, y) = screen_pos(&s, "A.md");
		s.pointer_down(x, y);
		assert_eq!(s.controller.state(), InteractionState::Dragging);
		s.pointer_move(100.0, 120.0);
		s.tick(0.016);
		let a = s.graph.node("A.md").unwrap();
		assert_eq!((a.x, a.y), (100.0, 120.0));

		s.pointer_up(false);
		assert!(!s.graph.node("A.md").unwrap().is_pinned());
		s.tick(0.016);
		let a = s.graph.node("A.md").unwrap();
		assert_ne!((a.x, a.y), (100.0, 120.0));
	}

	#[test]
	fn background_drag_pans() {
		let mut s = state();
		s.pointer_down(5.0, 5.0);
		s.pointer_move(25.0, 45.0);
		s.pointer_up(false);
		assert_eq!((s.transform.x, s.transform.y), (20.0, 40.0));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state();
		for _ in 0..100 {
			s.zoom(0.0, 0.0, -1.0);
		}
		assert_eq!(s.transform.k, ZOOM_EXTENT.1);
		for _ in 0..100 {
			s.zoom(0.0, 0.0, 1.0);
		}
		assert_eq!(s.transform.k, ZOOM_EXTENT.0);
	}

	#[test]
	fn manual_link_survives_orphan_toggle() {
		let mut s = state();
		let mut host = RecordingHost::default();
		let (ax, ay) = screen_pos(&s, "Lonely.md");
		s.context_menu(ax, ay, 10.0, 10.0);
		s.menu_action(MenuAction::Connect, &mut host);
		let (bx, by) = screen_pos(&s, "A.md");
		s.click(bx, by, &mut host);
		assert_eq!(s.overlay().link_count, 2);

		s.apply_settings(GraphSettings {
			show_orphans: false,
			..GraphSettings::default()
		});
		assert!(s.graph.contains("Lonely.md"));
		assert_eq!(s.graph.links.len(), 2);
	}

	#[test]
	fn rebuild_after_delete_resets_selection() {
		let mut s = state();
		let mut host = RecordingHost {
			answer_confirm: true,
			..RecordingHost::default()
		};
		let (x, y) = screen_pos(&s, "A.md");
		s.click(x, y, &mut host);
		s.context_menu(x, y, 0.0, 0.0);
		s.menu_action(MenuAction::Delete, &mut host);
		assert_eq!(host.deleted, vec!["A.md"]);

		let remaining: Vec<Note> = notes().into_iter().filter(|n| n.name != "A.md").collect();
		s.rebuild(&remaining);
		spread(&mut s);
		assert_eq!(s.graph.nodes.len(), 2);
		assert_eq!(s.controller.state(), InteractionState::Idle);
	}

	#[test]
	fn projection_modes_ignore_pan() {
		let mut s = state();
		s.apply_settings(GraphSettings {
			layout_mode: LayoutMode::Timeline,
			..GraphSettings::default()
		});
		s.pointer_down(5.0, 5.0);
		s.pointer_move(50.0, 50.0);
		assert_eq!((s.transform.x, s.transform.y), (0.0, 0.0));
		assert!(matches!(s.scene, Scene::Timeline(_)));
	}

	#[test]
	fn cluster_scheme_colors_by_cluster() {
		let mut s = state();
		s.apply_settings(GraphSettings {
			color_scheme: ColorScheme::Cluster,
			..GraphSettings::default()
		});
		let a = s.graph.node("A.md").unwrap().clone();
		let b = s.graph.node("B.md").unwrap().clone();
		assert_ne!(s.color(&a), s.color(&b));
		assert_eq!(s.color(&a), crate::layout::scale::COLORS[0]);
	}

	#[test]
	fn empty_vault_shows_placeholder_scene() {
		let s = GraphViewState::new(&[], None, GraphSettings::default(), Viewport::new(0.0, 0.0));
		assert!(s.scene.is_empty());
		assert_eq!(s.overlay(), Overlay::default());
	}
}
