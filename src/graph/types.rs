use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note from the vault, as handed over by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
	pub name: String,
	pub path: String,
	/// Raw Markdown, `None` while the note is not loaded.
	pub content: Option<String>,
	pub modified: DateTime<Utc>,
}

impl Note {
	pub fn new(name: impl Into<String>, path: impl Into<String>, content: Option<&str>) -> Self {
		Self {
			name: name.into(),
			path: path.into(),
			content: content.map(str::to_owned),
			modified: DateTime::<Utc>::UNIX_EPOCH,
		}
	}

	pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
		self.modified = modified;
		self
	}

	/// Content as a string slice, empty when unloaded.
	pub fn text(&self) -> &str {
		self.content.as_deref().unwrap_or_default()
	}
}

/// Strips the trailing `.md` extension used by vault file names.
pub fn display_name(name: &str) -> &str {
	name.strip_suffix(".md").unwrap_or(name)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
	Hub,
	Task,
	Technical,
	Note,
}

impl NodeType {
	pub const ALL: [NodeType; 4] = [
		NodeType::Hub,
		NodeType::Task,
		NodeType::Technical,
		NodeType::Note,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			NodeType::Hub => "hub",
			NodeType::Task => "task",
			NodeType::Technical => "technical",
			NodeType::Note => "note",
		}
	}

	/// Fill color used by the `category` color scheme.
	pub fn color(self) -> &'static str {
		match self {
			NodeType::Hub => "#ff6b6b",
			NodeType::Task => "#4ecdc4",
			NodeType::Technical => "#45b7d1",
			NodeType::Note => "#96ceb4",
		}
	}
}

impl fmt::Display for NodeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub path: String,
	/// Incoming wiki-links resolved to this node.
	pub connections: usize,
	pub tags: Vec<String>,
	pub modified: DateTime<Utc>,
	pub size: usize,
	pub node_type: NodeType,
	pub cluster: String,
	pub is_current: bool,
	pub x: f64,
	pub y: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl GraphNode {
	pub fn display_name(&self) -> &str {
		display_name(&self.id)
	}

	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	pub fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
	#[default]
	Wiki,
	Manual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	/// 1..=5
	pub strength: u8,
	pub kind: LinkKind,
}

impl GraphLink {
	pub fn manual(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			strength: 1,
			kind: LinkKind::Manual,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl Graph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	/// Map from node id to its index in `nodes`.
	pub fn index(&self) -> HashMap<&str, usize> {
		self.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect()
	}

	/// Appends a manual link between two existing, distinct nodes.
	pub fn add_manual_link(&mut self, source: &str, target: &str) -> bool {
		if source == target || !self.contains(source) || !self.contains(target) {
			return false;
		}
		self.links.push(GraphLink::manual(source, target));
		true
	}

	pub fn neighbors(&self, id: &str) -> Vec<&str> {
		self.links
			.iter()
			.filter_map(|l| {
				if l.source == id {
					Some(l.target.as_str())
				} else if l.target == id {
					Some(l.source.as_str())
				} else {
					None
				}
			})
			.collect()
	}

	/// Copy of the graph without nodes that take part in no link.
	pub fn without_orphans(&self) -> Graph {
		let nodes = self
			.nodes
			.iter()
			.filter(|n| {
				self.links
					.iter()
					.any(|l| l.source == n.id || l.target == n.id)
			})
			.cloned()
			.collect();
		Graph {
			nodes,
			links: self.links.clone(),
		}
	}

	pub fn mark_current(&mut self, current_path: Option<&str>) {
		for node in &mut self.nodes {
			node.is_current = current_path == Some(node.path.as_str());
		}
	}

	pub fn max_connections(&self) -> usize {
		self.nodes.iter().map(|n| n.connections).max().unwrap_or(0)
	}
}
