//! Graph data derived from the vault: extraction, building and classification.

pub mod builder;
pub mod classify;
pub mod extract;
pub mod settings;
mod types;

pub use builder::build_graph;
pub use settings::{ColorScheme, GraphSettings, LayoutMode, NodeSizing, SettingsStore};
pub use types::{Graph, GraphLink, GraphNode, LinkKind, Note, NodeType, display_name};
