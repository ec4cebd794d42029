//! Node type and cluster heuristics, expressed as ordered rule tables.

use super::types::{Note, NodeType};

/// Cluster used when a note has neither tags nor a folder.
pub const UNCATEGORIZED: &str = "uncategorized";

pub struct TypeRule {
	pub node_type: NodeType,
	pub matches: fn(&Note) -> bool,
}

/// First matching rule wins; notes matching none are plain `note`s.
pub const TYPE_RULES: &[TypeRule] = &[
	TypeRule {
		node_type: NodeType::Hub,
		matches: named_index,
	},
	TypeRule {
		node_type: NodeType::Task,
		matches: has_todo,
	},
	TypeRule {
		node_type: NodeType::Technical,
		matches: has_code_fence,
	},
];

fn named_index(note: &Note) -> bool {
	note.name.to_lowercase().contains("index")
}

fn has_todo(note: &Note) -> bool {
	note.text().contains("TODO")
}

fn has_code_fence(note: &Note) -> bool {
	note.text().contains("```")
}

pub fn classify_type(note: &Note) -> NodeType {
	TYPE_RULES
		.iter()
		.find(|rule| (rule.matches)(note))
		.map_or(NodeType::Note, |rule| rule.node_type)
}

type ClusterRule = fn(&Note, &[String]) -> Option<String>;

const CLUSTER_RULES: &[ClusterRule] = &[first_tag, top_folder];

fn first_tag(_: &Note, tags: &[String]) -> Option<String> {
	tags.first().cloned()
}

fn top_folder(note: &Note, _: &[String]) -> Option<String> {
	note.path
		.split_once(['/', '\\'])
		.map(|(folder, _)| folder.to_owned())
}

pub fn classify_cluster(note: &Note, tags: &[String]) -> String {
	CLUSTER_RULES
		.iter()
		.find_map(|rule| rule(note, tags))
		.unwrap_or_else(|| UNCATEGORIZED.to_owned())
}
