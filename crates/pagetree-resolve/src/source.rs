//! A single config value and where it was declared.

use pagetree_core::LocationId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Whether a source lives in the project or in an extended package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "package", rename_all = "snake_case")]
pub enum Origin {
    Local,
    Package(String),
}

/// The value of a config: either literal data from `+config.toml`, or a
/// reference to the `+<name>` file that implements it (hooks, components).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigValue {
    Literal { value: serde_json::Value },
    File { import_path: String },
}

/// How the source declared its value. At one location a `+<name>` file
/// takes precedence over the same key in `+config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    ConfigFile,
    PlusFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigValueSource {
    pub config_name: String,
    pub value: ConfigValue,
    pub location_id: LocationId,
    /// `/pages/+config.toml` for project files, `vike-react/+config.toml`
    /// for package files.
    pub defined_at: String,
    pub kind: SourceKind,
    pub origin: Origin,
}

impl ConfigValueSource {
    pub fn literal_str(&self) -> Option<&str> {
        match &self.value {
            ConfigValue::Literal { value } => value.as_str(),
            ConfigValue::File { .. } => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.value, ConfigValue::File { .. })
    }

    /// Order of sources declared at the same location, weakest first.
    pub(crate) fn cmp_same_location(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.defined_at.cmp(&other.defined_at))
    }

    /// Short human-readable rendering of the value.
    pub fn display_value(&self) -> String {
        match &self.value {
            ConfigValue::Literal { value } => value.to_string(),
            ConfigValue::File { import_path } => import_path.clone(),
        }
    }
}
