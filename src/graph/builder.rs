//! Turns the vault's note collection into a node/link graph.

use std::collections::HashMap;

use log::debug;

use super::classify::{classify_cluster, classify_type};
use super::extract::{extract_links, extract_tags, link_occurrences};
use super::types::{Graph, GraphLink, GraphNode, LinkKind, Note, display_name};

const MAX_STRENGTH: usize = 5;

/// Builds the graph for `notes`. Iteration follows input order, so the
/// result is deterministic for a given slice.
pub fn build_graph(notes: &[Note]) -> Graph {
	let named: Vec<&Note> = notes.iter().filter(|n| !n.name.is_empty()).collect();

	let mut links = Vec::new();
	for note in &named {
		let content = note.text();
		for raw in extract_links(content) {
			let Some(target) = resolve_target(raw, &named) else {
				continue;
			};
			let strength = link_occurrences(content, raw).clamp(1, MAX_STRENGTH);
			links.push(GraphLink {
				source: note.name.clone(),
				target: target.name.clone(),
				strength: strength as u8,
				kind: LinkKind::Wiki,
			});
		}
	}

	let mut in_degree: HashMap<&str, usize> = HashMap::new();
	for link in &links {
		*in_degree.entry(link.target.as_str()).or_insert(0) += 1;
	}

	let nodes = named
		.iter()
		.map(|note| {
			let tags = unique_tags(note.text());
			GraphNode {
				id: note.name.clone(),
				path: if note.path.is_empty() {
					note.name.clone()
				} else {
					note.path.clone()
				},
				connections: in_degree.get(note.name.as_str()).copied().unwrap_or(0),
				modified: note.modified,
				size: note.text().len(),
				node_type: classify_type(note),
				cluster: classify_cluster(note, &tags),
				tags,
				is_current: false,
				x: 0.0,
				y: 0.0,
				fx: None,
				fy: None,
			}
		})
		.collect::<Vec<_>>();

	debug!("built graph: {} nodes, {} links", nodes.len(), links.len());
	Graph { nodes, links }
}

/// First note whose name contains `raw`, or whose extension-less name is
/// contained in `raw`. A note named just `.md` has an empty stem and so
/// matches any link it is reached by.
pub fn resolve_target<'a>(raw: &str, notes: &[&'a Note]) -> Option<&'a Note> {
	notes.iter().copied().find(|note| {
		let stem = display_name(&note.name);
		note.name.contains(raw) || raw.contains(stem)
	})
}

fn unique_tags(content: &str) -> Vec<String> {
	let mut tags: Vec<String> = Vec::new();
	for tag in extract_tags(content) {
		if !tags.iter().any(|t| t == tag) {
			tags.push(tag.to_owned());
		}
	}
	tags
}

#[cfg(test)]
mod tests {
	use super::*;

	fn note(name: &str, content: &str) -> Note {
		Note::new(name, name, Some(content))
	}

	#[test]
	fn scenario_two_notes() {
		let graph = build_graph(&[note("A.md", "See [[B]]"), note("B.md", "#project")]);

		assert_eq!(graph.nodes.len(), 2);
		let a = graph.node("A.md").unwrap();
		let b = graph.node("B.md").unwrap();
		assert_eq!(a.connections, 0);
		assert_eq!(b.connections, 1);
		assert_eq!(b.cluster, "project");
		assert_eq!(
			graph.links,
			vec![GraphLink {
				source: "A.md".into(),
				target: "B.md".into(),
				strength: 1,
				kind: LinkKind::Wiki,
			}]
		);
	}

	#[test]
	fn one_node_per_named_note() {
		let notes = vec![
			note("A.md", ""),
			Note::new("", "orphan.md", Some("[[A]]")),
			Note::new("C.md", "C.md", None),
		];
		let graph = build_graph(&notes);
		assert_eq!(graph.nodes.len(), 2);
		assert!(graph.links.is_empty());
	}

	#[test]
	fn missing_collection_is_empty_graph() {
		let graph = build_graph(&[]);
		assert!(graph.nodes.is_empty());
		assert!(graph.links.is_empty());
	}

	#[test]
	fn connections_are_in_degree() {
		let notes = vec![
			note("Hub.md", "[[Leaf]] [[Other]]"),
			note("Leaf.md", "[[Hub]]"),
			note("Other.md", "[[Hub]] and [[Leaf]]"),
		];
		let graph = build_graph(&notes);
		for node in &graph.nodes {
			let incoming = graph.links.iter().filter(|l| l.target == node.id).count();
			assert_eq!(node.connections, incoming, "{}", node.id);
		}
		assert_eq!(graph.node("Hub.md").unwrap().connections, 2);
		assert_eq!(graph.node("Leaf.md").unwrap().connections, 2);
		assert_eq!(graph.node("Other.md").unwrap().connections, 1);
	}

	#[test]
	fn repeated_link_is_recorded_per_occurrence() {
		let graph = build_graph(&[note("A.md", "[[B]] [[B]] [[B]]"), note("B.md", "")]);
		assert_eq!(graph.links.len(), 3);
		assert!(graph.links.iter().all(|l| l.strength == 3));
		assert_eq!(graph.node("B.md").unwrap().connections, 3);
	}

	#[test]
	fn strength_caps_at_five() {
		let content = "[[B]]".repeat(7);
		let graph = build_graph(&[note("A.md", &content), note("B.md", "")]);
		assert!(graph.links.iter().all(|l| l.strength == 5));
	}

	#[test]
	fn unresolved_links_are_dropped() {
		let graph = build_graph(&[note("A.md", "[[Nowhere]]")]);
		assert!(graph.links.is_empty());
		assert_eq!(graph.nodes.len(), 1);
	}

	#[test]
	fn resolution_takes_first_substring_match() {
		// "A" is contained in "AB.md", which comes first.
		let notes = vec![note("AB.md", ""), note("A.md", ""), note("Src.md", "[[A]]")];
		let graph = build_graph(&notes);
		assert_eq!(graph.links.len(), 1);
		assert_eq!(graph.links[0].target, "AB.md");
	}

	#[test]
	fn resolution_matches_link_text_containing_stem() {
		let notes = vec![note("Rust.md", ""), note("Src.md", "[[Rust programming]]")];
		let graph = build_graph(&notes);
		assert_eq!(graph.links[0].target, "Rust.md");
		// strength counts the literal link text
		assert_eq!(graph.links[0].strength, 1);
	}

	#[test]
	fn build_is_idempotent() {
		let notes = vec![
			note("A.md", "[[B]] #x"),
			note("B.md", "[[C]] #y #x"),
			note("C.md", "TODO"),
		];
		assert_eq!(build_graph(&notes), build_graph(&notes));
	}

	#[test]
	fn tags_are_unique_in_first_seen_order() {
		let graph = build_graph(&[note("A.md", "#b #a #b")]);
		assert_eq!(graph.nodes[0].tags, vec!["b", "a"]);
		assert_eq!(graph.nodes[0].cluster, "b");
	}

	#[test]
	fn bare_extension_note_catches_every_link() {
		let graph = build_graph(&[note(".md", ""), note("Src.md", "[[Zzz]]")]);
		assert_eq!(graph.links.len(), 1);
		assert_eq!(graph.links[0].target, ".md");
		assert_eq!(graph.node(".md").unwrap().connections, 1);
	}

	#[test]
	fn path_falls_back_to_name() {
		let graph = build_graph(&[Note::new("A.md", "", Some(""))]);
		assert_eq!(graph.nodes[0].path, "A.md");
	}
}
