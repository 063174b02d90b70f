//! Discovery of `+` files in a project and in the packages it extends.
//!
//! - `+config.toml`: every top-level key declares a config value at the
//!   file's location; `extends` names packages to pull config from.
//! - `+<name>.<ext>`: declares config `<name>`, the value being the file.
//!
//! Discovery always completes before resolution starts: global
//! classification and ordering need the full set of locations.

use crate::error::{ResolveError, Result};
use crate::source::{ConfigValue, ConfigValueSource, Origin, SourceKind};
use globset::{Glob, GlobSet, GlobSetBuilder};
use pagetree_core::paths::{npm_package_name, remove_filename};
use pagetree_core::{LocationId, PagetreeSettings};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

/// Top-level directories never searched for `+` files.
const ALWAYS_SKIPPED: &[&str] = &["node_modules", "dist", ".git"];

const CONFIG_FILE_NAME: &str = "config";
const EXTENDS_KEY: &str = "extends";

/// Everything discovery found, ready for [`crate::Resolver`].
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Sorted by location, then config name, then file.
    pub sources: Vec<ConfigValueSource>,
    /// Extended packages that were loaded, in load order.
    pub packages: Vec<String>,
}

impl Discovery {
    pub fn locations(&self) -> BTreeSet<&LocationId> {
        self.sources.iter().map(|s| &s.location_id).collect()
    }
}

/// A `+` file found on disk.
#[derive(Debug, Clone)]
struct PlusFile {
    abs_path: PathBuf,
    /// POSIX path relative to the walked root, with a leading `/`.
    rel_path: String,
    config_name: String,
    extension: String,
}

/// Where a set of plus files came from.
#[derive(Debug, Clone)]
enum Scope {
    Project,
    Package(String),
}

impl Scope {
    fn origin(&self) -> Origin {
        match self {
            Self::Project => Origin::Local,
            Self::Package(name) => Origin::Package(name.clone()),
        }
    }

    fn location_of(&self, rel_path: &str) -> Result<LocationId> {
        let location = match self {
            Self::Project => LocationId::try_from_file_path(rel_path),
            Self::Package(name) => match remove_filename(rel_path).as_str() {
                "/" => LocationId::parse(name),
                dir => LocationId::parse(&format!("{name}{dir}")),
            },
        };
        location.map_err(|source| ResolveError::InvalidLocation {
            path: self.defined_at(rel_path),
            source,
        })
    }

    fn defined_at(&self, rel_path: &str) -> String {
        match self {
            Self::Project => rel_path.to_string(),
            Self::Package(name) => format!("{name}{rel_path}"),
        }
    }
}

/// Config values and `extends` entries of one `+config.toml`.
struct ParsedConfigFile {
    defined_at: String,
    sources: Vec<ConfigValueSource>,
    extends: Vec<String>,
}

/// Discover every config source of the project rooted at `project_root`.
pub fn discover(project_root: &Path, settings: &PagetreeSettings) -> Result<Discovery> {
    let exclude = build_exclude_set(&settings.discovery.exclude)?;

    let mut sources = Vec::new();
    let mut packages = Vec::new();

    let files = find_plus_files(project_root, settings, &exclude, false);
    let mut pending = collect_sources(&Scope::Project, files, &mut sources)?;

    let mut seen = HashSet::new();
    while let Some((package, requested_by)) = pending.pop_front() {
        if !settings.discovery.follow_extends {
            tracing::debug!("not following extends `{package}` from {requested_by}");
            continue;
        }
        if !seen.insert(package.clone()) {
            continue;
        }
        let package_root = project_root.join("node_modules").join(&package);
        if !package_root.is_dir() {
            return Err(ResolveError::ExtendsNotFound {
                path: requested_by,
                package,
            });
        }
        tracing::debug!("loading config from package {package}");
        let files = find_plus_files(&package_root, settings, &exclude, true);
        pending.extend(collect_sources(
            &Scope::Package(package.clone()),
            files,
            &mut sources,
        )?);
        packages.push(package);
    }

    sources.sort_by(|a, b| {
        a.location_id
            .cmp(&b.location_id)
            .then_with(|| a.config_name.cmp(&b.config_name))
            .then_with(|| a.defined_at.cmp(&b.defined_at))
    });

    let discovery = Discovery { sources, packages };
    tracing::info!(
        "discovered {} config values at {} locations ({} extended packages)",
        discovery.sources.len(),
        discovery.locations().len(),
        discovery.packages.len()
    );
    Ok(discovery)
}

/// Turn plus files into sources, returning the `extends` requests found.
fn collect_sources(
    scope: &Scope,
    files: Vec<PlusFile>,
    sources: &mut Vec<ConfigValueSource>,
) -> Result<VecDeque<(String, String)>> {
    let (config_files, value_files): (Vec<PlusFile>, Vec<PlusFile>) = files
        .into_iter()
        .partition(|f| f.config_name == CONFIG_FILE_NAME);

    for file in value_files {
        let defined_at = scope.defined_at(&file.rel_path);
        tracing::debug!("found {} at {}", file.config_name, defined_at);
        sources.push(ConfigValueSource {
            config_name: file.config_name,
            value: ConfigValue::File {
                import_path: defined_at.clone(),
            },
            location_id: scope.location_of(&file.rel_path)?,
            defined_at,
            kind: SourceKind::PlusFile,
            origin: scope.origin(),
        });
    }

    let parsed: Vec<ParsedConfigFile> = config_files
        .par_iter()
        .filter(|f| {
            if f.extension == "toml" {
                true
            } else {
                tracing::warn!(
                    "skipping {}: only +config.toml can be read, found +config.{}",
                    scope.defined_at(&f.rel_path),
                    f.extension
                );
                false
            }
        })
        .map(|f| parse_config_file(scope, f))
        .collect::<Result<_>>()?;

    let mut extends = VecDeque::new();
    for file in parsed {
        sources.extend(file.sources);
        extends.extend(
            file.extends
                .into_iter()
                .map(|package| (package, file.defined_at.clone())),
        );
    }
    Ok(extends)
}

fn parse_config_file(scope: &Scope, file: &PlusFile) -> Result<ParsedConfigFile> {
    let defined_at = scope.defined_at(&file.rel_path);
    let content = std::fs::read_to_string(&file.abs_path).map_err(|source| ResolveError::Io {
        path: file.abs_path.clone(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&content).map_err(|source| ResolveError::Toml {
        path: defined_at.clone(),
        source,
    })?;

    let location_id = scope.location_of(&file.rel_path)?;
    let mut sources = Vec::new();
    let mut extends = Vec::new();
    for (key, value) in table {
        if key == EXTENDS_KEY {
            extends = parse_extends(&value).ok_or_else(|| ResolveError::InvalidExtends {
                path: defined_at.clone(),
            })?;
            continue;
        }
        sources.push(ConfigValueSource {
            config_name: key,
            value: ConfigValue::Literal {
                value: serde_json::to_value(&value)?,
            },
            location_id: location_id.clone(),
            defined_at: defined_at.clone(),
            kind: SourceKind::ConfigFile,
            origin: scope.origin(),
        });
    }
    tracing::debug!("parsed {} ({} values)", defined_at, sources.len());

    Ok(ParsedConfigFile {
        defined_at,
        sources,
        extends,
    })
}

/// `extends = "pkg"` or `extends = ["pkg", "@scope/pkg"]`. Entries must be
/// plain package names, without a sub-path.
fn parse_extends(value: &toml::Value) -> Option<Vec<String>> {
    let entries: Vec<&str> = match value {
        toml::Value::String(s) => vec![s.as_str()],
        toml::Value::Array(items) => items
            .iter()
            .map(|v| v.as_str())
            .collect::<Option<Vec<_>>>()?,
        _ => return None,
    };
    entries
        .into_iter()
        .map(|e| (npm_package_name(e) == Some(e)).then(|| e.to_string()))
        .collect()
}

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p)?);
    }
    Ok(builder.build()?)
}

/// Walk `root` for `+` files with an accepted extension.
fn find_plus_files(
    root: &Path,
    settings: &PagetreeSettings,
    exclude: &GlobSet,
    in_package: bool,
) -> Vec<PlusFile> {
    let walker = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(!in_package)
        .parents(!in_package)
        .add_custom_ignore_filename(".pagetreeignore")
        .filter_entry(|entry| {
            entry.depth() != 1
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| ALWAYS_SKIPPED.contains(&name))
        })
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((config_name, extension)) = split_plus_file_name(file_name) else {
            continue;
        };
        if !settings.accepts_extension(extension) {
            continue;
        }
        let Some(rel_path) = posix_relative(root, path) else {
            tracing::warn!("skipping non UTF-8 path {}", path.display());
            continue;
        };
        if rel_path.contains('\\') {
            tracing::warn!("skipping {rel_path}: backslash in path");
            continue;
        }
        if !in_package && exclude.is_match(rel_path.trim_start_matches('/')) {
            continue;
        }
        files.push(PlusFile {
            abs_path: path.to_path_buf(),
            rel_path,
            config_name: config_name.to_string(),
            extension: extension.to_string(),
        });
    }
    files
}

/// `+Page.client.tsx` -> (`Page`, `tsx`). `None` for non-`+` files.
fn split_plus_file_name(file_name: &str) -> Option<(&str, &str)> {
    let rest = file_name.strip_prefix('+')?;
    let config_name = rest.split('.').next()?;
    let (_, extension) = rest.rsplit_once('.')?;
    if config_name.is_empty() || extension.is_empty() {
        return None;
    }
    Some((config_name, extension))
}

/// `root/pages/+Page.js` -> `/pages/+Page.js`.
fn posix_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut out = String::new();
    for component in rel.components() {
        match component {
            Component::Normal(segment) => {
                out.push('/');
                out.push_str(segment.to_str()?);
            }
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plus_file_name() {
        assert_eq!(split_plus_file_name("+Page.tsx"), Some(("Page", "tsx")));
        assert_eq!(
            split_plus_file_name("+Page.client.tsx"),
            Some(("Page", "tsx"))
        );
        assert_eq!(split_plus_file_name("+config.toml"), Some(("config", "toml")));
        assert_eq!(split_plus_file_name("Page.tsx"), None);
        assert_eq!(split_plus_file_name("+.tsx"), None);
        assert_eq!(split_plus_file_name("+Page"), None);
    }

    #[test]
    fn test_posix_relative() {
        let root = Path::new("/project");
        assert_eq!(
            posix_relative(root, Path::new("/project/pages/about/+Page.js")).as_deref(),
            Some("/pages/about/+Page.js")
        );
        assert_eq!(posix_relative(root, Path::new("/elsewhere/+Page.js")), None);
    }

    #[test]
    fn test_parse_extends() {
        let single = toml::Value::String("vike-react".to_string());
        assert_eq!(parse_extends(&single), Some(vec!["vike-react".to_string()]));

        let list: toml::Table = toml::from_str(r#"e = ["vike-react", "@acme/ui"]"#).unwrap();
        assert_eq!(
            parse_extends(&list["e"]),
            Some(vec!["vike-react".to_string(), "@acme/ui".to_string()])
        );

        let subpath = toml::Value::String("vike-react/config".to_string());
        assert_eq!(parse_extends(&subpath), None);
        assert_eq!(parse_extends(&toml::Value::Integer(1)), None);
    }

    #[test]
    fn test_package_scope_locations() {
        let scope = Scope::Package("@acme/ui".to_string());
        assert_eq!(
            scope.location_of("/+config.toml").unwrap().as_str(),
            "@acme/ui"
        );
        assert_eq!(
            scope.location_of("/renderer/+onRenderHtml.js").unwrap().as_str(),
            "@acme/ui/renderer"
        );
        assert_eq!(
            scope.defined_at("/renderer/+onRenderHtml.js"),
            "@acme/ui/renderer/+onRenderHtml.js"
        );
    }

    #[test]
    fn test_package_scope_rejects_unusable_directory() {
        let scope = Scope::Package("vike-react".to_string());
        match scope.location_of("/my dir/+config.toml") {
            Err(ResolveError::InvalidLocation { path, source }) => {
                assert_eq!(path, "vike-react/my dir/+config.toml");
                assert!(matches!(
                    source,
                    pagetree_core::LocationIdError::InvalidPackage(_)
                ));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
