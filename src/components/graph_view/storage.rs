use web_sys::Storage;

use crate::graph::settings::{GraphSettings, SettingsError, SettingsStore};

pub const SETTINGS_KEY: &str = "vault-graph.settings";

/// Settings persisted in the browser's `localStorage`.
pub struct LocalStorageStore {
	key: &'static str,
}

impl Default for LocalStorageStore {
	fn default() -> Self {
		Self { key: SETTINGS_KEY }
	}
}

impl LocalStorageStore {
	fn storage(&self) -> Result<Storage, SettingsError> {
		web_sys::window()
			.ok_or_else(|| SettingsError::Storage("no window".into()))?
			.local_storage()
			.map_err(|e| SettingsError::Storage(format!("{e:?}")))?
			.ok_or_else(|| SettingsError::Storage("localStorage unavailable".into()))
	}
}

impl SettingsStore for LocalStorageStore {
	fn load(&self) -> Result<Option<GraphSettings>, SettingsError> {
		let raw = self
			.storage()?
			.get_item(self.key)
			.map_err(|e| SettingsError::Storage(format!("{e:?}")))?;
		raw.map(|raw| serde_json::from_str::<GraphSettings>(&raw).map_err(SettingsError::from))
			.transpose()
	}

	fn save(&self, settings: &GraphSettings) -> Result<(), SettingsError> {
		let raw = serde_json::to_string(settings)?;
		self.storage()?
			.set_item(self.key, &raw)
			.map_err(|e| SettingsError::Storage(format!("{e:?}")))
	}
}
