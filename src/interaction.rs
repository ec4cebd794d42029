//! Selection, context menu, connect mode and drag bookkeeping for the graph view.

use log::debug;

use crate::graph::{Graph, display_name};
use crate::layout::ForceSimulation;

/// Requests the graph view makes of its host. None of them mutate the graph;
/// the host changes the note collection and the graph is rebuilt from it.
pub trait GraphHost {
	fn open_note(&mut self, name: &str);
	fn create_note(&mut self, suggested_name: &str);
	fn delete_note(&mut self, path_or_name: &str);
	/// Yes/no prompt shown before destructive actions.
	fn confirm(&mut self, message: &str) -> bool;
	/// Free-text prompt; `None` when dismissed.
	fn prompt(&mut self, message: &str) -> Option<String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionState {
	Idle,
	NodeHovered,
	NodeSelected,
	Dragging,
	ConnectingSource,
	ContextMenuOpen,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContextMenu {
	pub show: bool,
	pub x: f64,
	pub y: f64,
	pub node: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
	Open,
	Connect,
	CreateConnected,
	LinkTo,
	Delete,
}

impl MenuAction {
	pub const ALL: [MenuAction; 5] = [
		MenuAction::Open,
		MenuAction::Connect,
		MenuAction::CreateConnected,
		MenuAction::LinkTo,
		MenuAction::Delete,
	];

	pub fn label(self) -> &'static str {
		match self {
			MenuAction::Open => "Open Note",
			MenuAction::Connect => "Connect",
			MenuAction::CreateConnected => "Create Connected Note",
			MenuAction::LinkTo => "Link To…",
			MenuAction::Delete => "Delete Note",
		}
	}

	pub fn is_destructive(self) -> bool {
		self == MenuAction::Delete
	}
}

/// Suggested name for a note created from `node_name`'s menu.
pub fn connected_note_name(node_name: &str) -> String {
	format!("Connected to {}", display_name(node_name))
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	selected: Option<String>,
	hovered: Option<String>,
	context_menu: ContextMenu,
	connecting_source: Option<String>,
	dragged: Option<(String, usize)>,
}

impl InteractionController {
	pub fn state(&self) -> InteractionState {
		if self.dragged.is_some() {
			InteractionState::Dragging
		} else if self.context_menu.show {
			InteractionState::ContextMenuOpen
		} else if self.connecting_source.is_some() {
			InteractionState::ConnectingSource
		} else if self.selected.is_some() {
			InteractionState::NodeSelected
		} else if self.hovered.is_some() {
			InteractionState::NodeHovered
		} else {
			InteractionState::Idle
		}
	}

	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	pub fn context_menu(&self) -> &ContextMenu {
		&self.context_menu
	}

	pub fn connecting_mode(&self) -> bool {
		self.connecting_source.is_some()
	}

	pub fn source_node(&self) -> Option<&str> {
		self.connecting_source.as_deref()
	}

	pub fn dragged(&self) -> Option<&str> {
		self.dragged.as_ref().map(|(id, _)| id.as_str())
	}

	pub fn hover(&mut self, node: Option<&str>) {
		self.hovered = node.map(str::to_owned);
	}

	/// Left click on a node. In connect mode this completes the connection
	/// instead of selecting. Returns whether a link was added.
	pub fn click_node(&mut self, graph: &mut Graph, id: &str, host: &mut dyn GraphHost) -> bool {
		self.close_context_menu();
		if !graph.contains(id) {
			return false;
		}

		if let Some(source) = self.connecting_source.take() {
			let linked = source != id && graph.add_manual_link(&source, id);
			debug!("connect {source} -> {id}: {}", if linked { "linked" } else { "skipped" });
			return linked;
		}

		debug!("select {id}");
		self.selected = Some(id.to_owned());
		host.open_note(id);
		false
	}

	/// Click that lands outside the menu and outside any node.
	pub fn click_background(&mut self) {
		self.close_context_menu();
	}

	pub fn right_click_node(&mut self, graph: &Graph, id: &str, screen_x: f64, screen_y: f64) {
		if !graph.contains(id) || self.dragged.is_some() {
			return;
		}
		debug!("context menu for {id}");
		self.context_menu = ContextMenu {
			show: true,
			x: screen_x,
			y: screen_y,
			node: Some(id.to_owned()),
		};
	}

	pub fn close_context_menu(&mut self) {
		self.context_menu = ContextMenu::default();
	}

	/// Runs a context-menu action against the menu's node. The menu always
	/// closes. Returns whether the graph's link set changed.
	pub fn menu_action(
		&mut self,
		action: MenuAction,
		graph: &mut Graph,
		host: &mut dyn GraphHost,
	) -> bool {
		let Some(id) = self.context_menu.node.take() else {
			self.close_context_menu();
			return false;
		};
		self.close_context_menu();
		self.node_action(action, &id, graph, host)
	}

	/// Runs `action` for `id` directly, as the details panel does.
	pub fn node_action(
		&mut self,
		action: MenuAction,
		id: &str,
		graph: &mut Graph,
		host: &mut dyn GraphHost,
	) -> bool {
		let Some(node) = graph.node(id) else {
			return false;
		};
		debug!("menu action {action:?} on {id}");

		match action {
			MenuAction::Open => {
				host.open_note(id);
				false
			}
			MenuAction::Connect => {
				self.connecting_source = Some(id.to_owned());
				false
			}
			MenuAction::CreateConnected => {
				host.create_note(&connected_note_name(id));
				false
			}
			MenuAction::LinkTo => {
				let Some(target) = host.prompt("Enter target note name:") else {
					return false;
				};
				let wanted = target.trim();
				let resolved = graph
					.nodes
					.iter()
					.find(|n| n.id == wanted || n.display_name() == wanted)
					.map(|n| n.id.clone());
				resolved.is_some_and(|target| graph.add_manual_link(id, &target))
			}
			MenuAction::Delete => {
				let path = node.path.clone();
				if host.confirm(&format!("Delete \"{id}\"?")) {
					host.delete_note(&path);
					self.forget(id);
				}
				false
			}
		}
	}

	pub fn clear_selection(&mut self) {
		self.selected = None;
	}

	/// Starts dragging `id` (force layout only).
	pub fn begin_drag(&mut self, graph: &mut Graph, sim: &mut ForceSimulation, id: &str) -> bool {
		let Some(idx) = graph.nodes.iter().position(|n| n.id == id) else {
			return false;
		};
		self.close_context_menu();
		sim.drag_start(&mut graph.nodes, idx);
		self.dragged = Some((id.to_owned(), idx));
		true
	}

	pub fn drag_to(&mut self, graph: &mut Graph, sim: &mut ForceSimulation, x: f64, y: f64) {
		if let Some((_, idx)) = self.dragged {
			sim.drag_to(&mut graph.nodes, idx, x, y);
		}
	}

	/// Ends the drag; `sticky` keeps the node pinned where it was dropped.
	pub fn end_drag(&mut self, graph: &mut Graph, sim: &mut ForceSimulation, sticky: bool) {
		if let Some((id, idx)) = self.dragged.take() {
			debug!("drop {id}{}", if sticky { " (pinned)" } else { "" });
			sim.drag_end(&mut graph.nodes, idx, sticky);
		}
	}

	/// Drops every reference to nodes that are not in the rebuilt `graph`.
	/// A connection whose source vanished is cancelled.
	pub fn reconcile(&mut self, graph: &Graph) {
		let stale = |id: &Option<String>| id.as_deref().is_some_and(|id| !graph.contains(id));
		if stale(&self.selected) {
			self.selected = None;
		}
		if stale(&self.hovered) {
			self.hovered = None;
		}
		if stale(&self.connecting_source) {
			debug!("connect source removed, leaving connect mode");
			self.connecting_source = None;
		}
		if stale(&self.context_menu.node) {
			self.close_context_menu();
		}
		// indices are not stable across rebuilds
		self.dragged = None;
	}

	fn forget(&mut self, id: &str) {
		for slot in [
			&mut self.selected,
			&mut self.hovered,
			&mut self.connecting_source,
		] {
			if slot.as_deref() == Some(id) {
				*slot = None;
			}
		}
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::graph::{GraphSettings, LinkKind, Note, build_graph};
	use crate::layout::DEFAULT_VIEWPORT;

	/// Records every host request; answers prompts from scripted values.
	#[derive(Debug, Default)]
	pub(crate) struct RecordingHost {
		pub opened: Vec<String>,
		pub created: Vec<String>,
		pub deleted: Vec<String>,
		pub confirms: Vec<String>,
		pub answer_confirm: bool,
		pub answer_prompt: Option<String>,
	}

	impl GraphHost for RecordingHost {
		fn open_note(&mut self, name: &str) {
			self.opened.push(name.to_owned());
		}

		fn create_note(&mut self, suggested_name: &str) {
			self.created.push(suggested_name.to_owned());
		}

		fn delete_note(&mut self, path_or_name: &str) {
			self.deleted.push(path_or_name.to_owned());
		}

		fn confirm(&mut self, message: &str) -> bool {
			self.confirms.push(message.to_owned());
			self.answer_confirm
		}

		fn prompt(&mut self, _message: &str) -> Option<String> {
			self.answer_prompt.clone()
		}
	}

	fn graph() -> Graph {
		build_graph(&[
			Note::new("A.md", "notes/A.md", Some("[[B]]")),
			Note::new("B.md", "notes/B.md", Some("")),
			Note::new("C.md", "notes/C.md", Some("")),
		])
	}

	#[test]
	fn click_selects_and_opens() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		let mut ctl = InteractionController::default();
		assert_eq!(ctl.state(), InteractionState::Idle);

		ctl.click_node(&mut g, "B.md", &mut host);
		assert_eq!(ctl.selected(), Some("B.md"));
		assert_eq!(ctl.state(), InteractionState::NodeSelected);
		assert_eq!(host.opened, vec!["B.md"]);
	}

	#[test]
	fn hover_is_transient() {
		let mut ctl = InteractionController::default();
		ctl.hover(Some("A.md"));
		assert_eq!(ctl.state(), InteractionState::NodeHovered);
		ctl.hover(None);
		assert_eq!(ctl.state(), InteractionState::Idle);
	}

	#[test]
	fn right_click_opens_menu_and_outside_click_closes() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		let mut ctl = InteractionController::default();
		ctl.click_node(&mut g, "A.md", &mut host);

		ctl.right_click_node(&g, "B.md", 120.0, 80.0);
		assert_eq!(ctl.state(), InteractionState::ContextMenuOpen);
		assert_eq!(
			ctl.context_menu(),
			&ContextMenu {
				show: true,
				x: 120.0,
				y: 80.0,
				node: Some("B.md".into()),
			}
		);

		ctl.click_background();
		assert!(!ctl.context_menu().show);
		assert_eq!(ctl.state(), InteractionState::NodeSelected);
	}

	#[test]
	fn connect_flow_adds_manual_link() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		let mut ctl = InteractionController::default();

		ctl.right_click_node(&g, "B.md", 0.0, 0.0);
		ctl.menu_action(MenuAction::Connect, &mut g, &mut host);
		assert_eq!(ctl.state(), InteractionState::ConnectingSource);
		assert_eq!(ctl.source_node(), Some("B.md"));

		assert!(ctl.click_node(&mut g, "C.md", &mut host));
		let last = g.links.last().unwrap();
		assert_eq!((last.source.as_str(), last.target.as_str()), ("B.md", "C.md"));
		assert_eq!(last.kind, LinkKind::Manual);
		assert!(!ctl.connecting_mode());
		assert!(host.opened.is_empty());
	}

	#[test]
	fn connecting_to_self_is_a_no_op() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		let links_before = g.links.len();
		let mut ctl = InteractionController::default();

		ctl.right_click_node(&g, "A.md", 0.0, 0.0);
		ctl.menu_action(MenuAction::Connect, &mut g, &mut host);
		assert!(!ctl.click_node(&mut g, "A.md", &mut host));
		assert_eq!(g.links.len(), links_before);
		assert!(!ctl.connecting_mode());
	}

	#[test]
	fn declined_delete_only_closes_menu() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		let nodes_before = g.nodes.clone();
		let mut ctl = InteractionController::default();
		ctl.click_node(&mut g, "A.md", &mut host);

		ctl.right_click_node(&g, "A.md", 5.0, 5.0);
		ctl.menu_action(MenuAction::Delete, &mut g, &mut host);

		assert_eq!(host.confirms.len(), 1);
		assert!(host.deleted.is_empty());
		assert_eq!(g.nodes, nodes_before);
		assert!(!ctl.context_menu().show);
		assert_eq!(ctl.selected(), Some("A.md"));
	}

	#[test]
	fn confirmed_delete_requests_by_path() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		host.answer_confirm = true;
		let mut ctl = InteractionController::default();
		ctl.click_node(&mut g, "A.md", &mut host);

		ctl.right_click_node(&g, "A.md", 5.0, 5.0);
		ctl.menu_action(MenuAction::Delete, &mut g, &mut host);

		assert_eq!(host.deleted, vec!["notes/A.md"]);
		assert_eq!(ctl.selected(), None);
		assert_eq!(ctl.state(), InteractionState::Idle);
		// the graph itself is only changed by a rebuild
		assert!(g.contains("A.md"));
	}

	#[test]
	fn create_connected_suggests_name_without_linking() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		let links_before = g.links.len();
		let mut ctl = InteractionController::default();

		ctl.right_click_node(&g, "B.md", 0.0, 0.0);
		ctl.menu_action(MenuAction::CreateConnected, &mut g, &mut host);
		assert_eq!(host.created, vec!["Connected to B"]);
		assert_eq!(g.links.len(), links_before);
	}

	#[test]
	fn link_to_accepts_display_name() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		host.answer_prompt = Some(" C ".into());
		let mut ctl = InteractionController::default();

		ctl.right_click_node(&g, "A.md", 0.0, 0.0);
		assert!(ctl.menu_action(MenuAction::LinkTo, &mut g, &mut host));
		assert_eq!(g.links.last().unwrap().target, "C.md");

		host.answer_prompt = Some("Missing".into());
		ctl.right_click_node(&g, "A.md", 0.0, 0.0);
		assert!(!ctl.menu_action(MenuAction::LinkTo, &mut g, &mut host));
	}

	#[test]
	fn rebuild_cancels_connection_to_deleted_source() {
		let (mut g, mut host) = (graph(), RecordingHost::default());
		let mut ctl = InteractionController::default();
		ctl.click_node(&mut g, "C.md", &mut host);
		ctl.right_click_node(&g, "B.md", 0.0, 0.0);
		ctl.menu_action(MenuAction::Connect, &mut g, &mut host);

		let rebuilt = build_graph(&[
			Note::new("A.md", "notes/A.md", Some("")),
			Note::new("C.md", "notes/C.md", Some("")),
		]);
		ctl.reconcile(&rebuilt);
		assert!(!ctl.connecting_mode());
		assert_eq!(ctl.selected(), Some("C.md"));
	}

	#[test]
	fn drag_pins_and_releases() {
		let mut g = graph();
		let mut sim = ForceSimulation::new(&mut g, DEFAULT_VIEWPORT, &GraphSettings::default());
		let mut ctl = InteractionController::default();

		assert!(ctl.begin_drag(&mut g, &mut sim, "A.md"));
		assert_eq!(ctl.state(), InteractionState::Dragging);
		ctl.drag_to(&mut g, &mut sim, 300.0, 200.0);
		assert_eq!(g.nodes[0].fx, Some(300.0));

		ctl.end_drag(&mut g, &mut sim, false);
		assert_eq!(ctl.dragged(), None);
		assert!(!g.nodes[0].is_pinned());
		sim.tick(&mut g.nodes);
		assert_ne!((g.nodes[0].x, g.nodes[0].y), (300.0, 200.0));
	}
}
