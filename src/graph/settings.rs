//! Graph view settings and their persistence boundary.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSizing {
	#[default]
	Connections,
	Uniform,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
	#[default]
	Category,
	Cluster,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
	#[default]
	Force,
	Timeline,
	Tree,
	Heatmap,
}

impl LayoutMode {
	pub const ALL: [LayoutMode; 4] = [
		LayoutMode::Force,
		LayoutMode::Timeline,
		LayoutMode::Tree,
		LayoutMode::Heatmap,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			LayoutMode::Force => "force",
			LayoutMode::Timeline => "timeline",
			LayoutMode::Tree => "tree",
			LayoutMode::Heatmap => "heatmap",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.as_str() == s)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSettings {
	pub link_distance: f64,
	pub charge_strength: f64,
	pub center_force: f64,
	pub show_labels: bool,
	pub node_size: NodeSizing,
	pub color_scheme: ColorScheme,
	pub physics: bool,
	/// Reserved, not read by any layout.
	pub clustering: bool,
	pub layout_mode: LayoutMode,
	pub show_orphans: bool,
}

impl Default for GraphSettings {
	fn default() -> Self {
		Self {
			link_distance: 120.0,
			charge_strength: -400.0,
			center_force: 0.15,
			show_labels: true,
			node_size: NodeSizing::Connections,
			color_scheme: ColorScheme::Category,
			physics: true,
			clustering: true,
			layout_mode: LayoutMode::Force,
			show_orphans: true,
		}
	}
}

impl GraphSettings {
	pub const LINK_DISTANCE_RANGE: (f64, f64) = (60.0, 250.0);
	pub const CHARGE_RANGE: (f64, f64) = (-800.0, -100.0);

	/// Whether switching from `self` to `other` invalidates the current layout.
	pub fn needs_relayout(&self, other: &GraphSettings) -> bool {
		self.link_distance != other.link_distance
			|| self.charge_strength != other.charge_strength
			|| self.center_force != other.center_force
			|| self.node_size != other.node_size
			|| self.layout_mode != other.layout_mode
			|| self.show_orphans != other.show_orphans
	}
}

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("settings storage unavailable: {0}")]
	Storage(String),

	#[error("malformed settings: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Load-at-startup, persist-on-change storage for [`GraphSettings`].
pub trait SettingsStore {
	/// Returns `Ok(None)` when nothing was saved yet.
	fn load(&self) -> Result<Option<GraphSettings>, SettingsError>;
	fn save(&self, settings: &GraphSettings) -> Result<(), SettingsError>;
}

/// Serialized settings held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
	raw: RefCell<Option<String>>,
}

impl MemoryStore {
	pub fn with_raw(raw: impl Into<String>) -> Self {
		Self {
			raw: RefCell::new(Some(raw.into())),
		}
	}
}

impl SettingsStore for MemoryStore {
	fn load(&self) -> Result<Option<GraphSettings>, SettingsError> {
		self.raw
			.borrow()
			.as_deref()
			.map(serde_json::from_str::<GraphSettings>)
			.transpose()
			.map_err(SettingsError::from)
	}

	fn save(&self, settings: &GraphSettings) -> Result<(), SettingsError> {
		*self.raw.borrow_mut() = Some(serde_json::to_string(settings)?);
		Ok(())
	}
}

/// Loads settings, falling back to defaults when absent or unreadable.
pub fn load_or_default(store: &dyn SettingsStore) -> GraphSettings {
	match store.load() {
		Ok(Some(settings)) => settings,
		Ok(None) => GraphSettings::default(),
		Err(err) => {
			log::warn!("using default graph settings: {err}");
			GraphSettings::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_documented_values() {
		let s = GraphSettings::default();
		assert_eq!(s.link_distance, 120.0);
		assert_eq!(s.charge_strength, -400.0);
		assert_eq!(s.center_force, 0.15);
		assert_eq!(s.node_size, NodeSizing::Connections);
		assert!(s.physics);
	}

	#[test]
	fn store_round_trip_through_memory() {
		let store = MemoryStore::default();
		assert_eq!(store.load().unwrap(), None);

		let settings = GraphSettings {
			link_distance: 200.0,
			layout_mode: LayoutMode::Heatmap,
			..GraphSettings::default()
		};
		store.save(&settings).unwrap();
		assert_eq!(load_or_default(&store), settings);
	}

	#[test]
	fn partial_json_fills_defaults() {
		let store = MemoryStore::with_raw(r#"{"nodeSize":"uniform","physics":false}"#);
		let s = load_or_default(&store);
		assert_eq!(s.node_size, NodeSizing::Uniform);
		assert!(!s.physics);
		assert_eq!(s.link_distance, 120.0);
	}

	#[test]
	fn malformed_json_falls_back() {
		let store = MemoryStore::with_raw("{not json");
		assert!(matches!(store.load(), Err(SettingsError::Parse(_))));
		assert_eq!(load_or_default(&store), GraphSettings::default());
	}

	#[test]
	fn label_toggle_does_not_relayout() {
		let a = GraphSettings::default();
		let b = GraphSettings {
			show_labels: false,
			color_scheme: ColorScheme::Cluster,
			..a.clone()
		};
		assert!(!a.needs_relayout(&b));
		let c = GraphSettings {
			link_distance: 80.0,
			..a.clone()
		};
		assert!(a.needs_relayout(&c));
	}
}
