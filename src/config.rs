use serde::Deserialize;

/// Plugin configuration, read from `plugins.in-app-billing` in `tauri.conf.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Window the store's purchase dialogs are parented to.
    #[serde(default = "default_window_label")]
    pub window_label: String,
}

fn default_window_label() -> String {
    "main".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window_label: default_window_label(),
        }
    }
}
