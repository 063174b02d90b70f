//! Project settings for discovery and resolution.
//!
//! Load order: `.pagetree/config.toml` → environment variables → defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = ".pagetree";
const SETTINGS_FILE: &str = "config.toml";

/// Top-level pagetree settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PagetreeSettings {
    pub discovery: DiscoverySettings,
    pub resolve: ResolveSettings,
}

/// Which files count as `+` files and where to look for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Extensions a `+` file must carry (without the dot).
    pub extensions: Vec<String>,
    /// Glob patterns, relative to the project root, skipped while walking.
    /// `node_modules`, `dist` and `.git` are always skipped for local files.
    pub exclude: Vec<String>,
    /// Pull configuration from packages named in `extends`.
    pub follow_extends: bool,
}

/// Config merge behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveSettings {
    /// Config names whose values accumulate across locations instead of
    /// the highest-precedence value replacing the others.
    pub cumulative: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            extensions: ["js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "toml"]
                .into_iter()
                .map(String::from)
                .collect(),
            exclude: Vec::new(),
            follow_extends: true,
        }
    }
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            cumulative: ["Layout", "Wrapper", "Head"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Helper to parse an env var and apply it to a settings field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

fn env_list_override(var: &str, target: &mut Vec<String>) {
    if let Ok(v) = std::env::var(var) {
        *target = v
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

/// Path of the settings file for a project root.
pub fn settings_file(project_root: &Path) -> PathBuf {
    project_root.join(SETTINGS_DIR).join(SETTINGS_FILE)
}

impl PagetreeSettings {
    /// Load settings from `.pagetree/config.toml` in the project root, with
    /// env var overrides. Falls back to defaults if no file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = settings_file(project_root);

        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            tracing::debug!("loading settings from {}", path.display());
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        env_override(
            "PAGETREE_FOLLOW_EXTENDS",
            &mut self.discovery.follow_extends,
        );
        env_list_override("PAGETREE_EXTENSIONS", &mut self.discovery.extensions);
    }

    fn validate(&mut self) -> Result<()> {
        // Accept ".ts" as well as "ts".
        for ext in &mut self.discovery.extensions {
            if let Some(stripped) = ext.strip_prefix('.') {
                *ext = stripped.to_string();
            }
        }
        if self.discovery.extensions.is_empty() {
            anyhow::bail!("discovery.extensions must list at least one file extension");
        }
        Ok(())
    }

    pub fn is_cumulative(&self, config_name: &str) -> bool {
        self.resolve.cumulative.iter().any(|c| c == config_name)
    }

    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.discovery.extensions.iter().any(|e| e == ext)
    }
}
