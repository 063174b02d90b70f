//! Per-page resolution: contributing locations, effective config and route.

use crate::discover::Discovery;
use crate::error::{ResolveError, Result};
use crate::source::{ConfigValue, ConfigValueSource, Origin};
use pagetree_core::{
    LocationId, LocationSet, PagetreeSettings, Precedence, RoutingRootEffect,
    apply_filesystem_routing_root_effect, explain_order, filesystem_route_defined_by,
    filesystem_route_string, is_inherited, sort_locations,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// The config that marks a location as a page.
pub const PAGE_CONFIG: &str = "Page";
/// Explicit route of a page. Only applies at the page's own location.
pub const ROUTE_CONFIG: &str = "route";
/// Remounts the filesystem routes below the declaring location.
pub const ROUTING_ROOT_CONFIG: &str = "filesystemRoutingRoot";

/// A location that contributes config to a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributingLocation {
    pub location_id: LocationId,
    /// Applies to every page of the project.
    pub is_global: bool,
    /// The ordering step that placed this location above the previous one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precedence: Option<Precedence>,
}

/// The effective value of one config for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedConfig {
    /// `winner` has the highest precedence; `overridden` is ordered from the
    /// next strongest to the weakest.
    Override {
        winner: ConfigValueSource,
        overridden: Vec<ConfigValueSource>,
    },
    /// Every value, weakest first.
    Cumulative { values: Vec<ConfigValueSource> },
}

impl ResolvedConfig {
    /// The strongest source.
    pub fn winner(&self) -> &ConfigValueSource {
        match self {
            Self::Override { winner, .. } => winner,
            Self::Cumulative { values } => values
                .last()
                .unwrap_or_else(|| unreachable!("cumulative config without values")),
        }
    }

    /// All sources, weakest first.
    pub fn sources(&self) -> Vec<&ConfigValueSource> {
        match self {
            Self::Override { winner, overridden } => overridden
                .iter()
                .rev()
                .chain(std::iter::once(winner))
                .collect(),
            Self::Cumulative { values } => values.iter().collect(),
        }
    }
}

/// How the route of a page is determined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageRoute {
    /// Derived from the page's location.
    Filesystem {
        route_string: String,
        defined_by: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        root_effect: Option<RoutingRootEffect>,
    },
    /// A literal `route` string.
    String {
        route_string: String,
        defined_at: String,
    },
    /// A `+route` file; matching happens at runtime.
    Function { defined_at: String },
}

impl PageRoute {
    pub fn route_string(&self) -> Option<&str> {
        match self {
            Self::Filesystem { route_string, .. } | Self::String { route_string, .. } => {
                Some(route_string)
            }
            Self::Function { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPage {
    pub location_id: LocationId,
    /// Filesystem route after any `filesystemRoutingRoot` rewrite.
    pub filesystem_route: String,
    pub route: PageRoute,
    /// Weakest first; the last location wins conflicts.
    pub contributing: Vec<ContributingLocation>,
    pub configs: BTreeMap<String, ResolvedConfig>,
}

/// Resolves pages against an immutable discovery snapshot.
#[derive(Debug, Clone)]
pub struct Resolver {
    sources: Vec<ConfigValueSource>,
    pages: LocationSet,
    cumulative: Vec<String>,
}

impl Resolver {
    pub fn new(discovery: Discovery, settings: &PagetreeSettings) -> Self {
        let pages = discovery
            .sources
            .iter()
            .filter(|s| s.config_name == PAGE_CONFIG && s.origin == Origin::Local)
            .map(|s| s.location_id.clone())
            .collect::<LocationSet>();
        tracing::debug!("{} pages found", pages.len());
        Self {
            sources: discovery.sources,
            pages,
            cumulative: settings.resolve.cumulative.clone(),
        }
    }

    pub fn pages(&self) -> &LocationSet {
        &self.pages
    }

    pub fn sources(&self) -> &[ConfigValueSource] {
        &self.sources
    }

    fn is_cumulative(&self, config_name: &str) -> bool {
        self.cumulative.iter().any(|c| c == config_name)
    }

    /// Resolve every page, sorted by location.
    pub fn resolve_all(&self) -> Result<Vec<ResolvedPage>> {
        let resolved = self
            .pages
            .iter()
            .map(|page| self.resolve_page(page))
            .collect::<Result<Vec<_>>>()?;

        let mut by_route: HashMap<&str, &LocationId> = HashMap::new();
        for page in &resolved {
            let Some(route) = page.route.route_string() else {
                continue;
            };
            if let Some(other) = by_route.insert(route, &page.location_id) {
                tracing::warn!(
                    "pages {} and {} share the route {}",
                    other,
                    page.location_id,
                    route
                );
            }
        }
        Ok(resolved)
    }

    pub fn resolve_page(&self, page: &LocationId) -> Result<ResolvedPage> {
        if !self.pages.contains(page) {
            return Err(ResolveError::UnknownPage(page.clone()));
        }

        let mut by_location: BTreeMap<&LocationId, Vec<&ConfigValueSource>> = BTreeMap::new();
        for source in &self.sources {
            if !is_inherited(&source.location_id, page) {
                continue;
            }
            if source.config_name == ROUTE_CONFIG && &source.location_id != page {
                continue;
            }
            by_location
                .entry(&source.location_id)
                .or_default()
                .push(source);
        }

        let mut locations: Vec<LocationId> = by_location.keys().map(|&l| l.clone()).collect();
        sort_locations(&mut locations, page);

        let contributing = locations
            .iter()
            .enumerate()
            .map(|(i, location)| ContributingLocation {
                location_id: location.clone(),
                is_global: self.pages.is_global(location),
                precedence: (i > 0).then(|| explain_order(&locations[i - 1], location, page).1),
            })
            .collect();

        // Weakest first, so later sources override earlier ones.
        let mut ordered: Vec<&ConfigValueSource> = Vec::new();
        for location in &locations {
            let mut at_location = by_location[location].clone();
            at_location.sort_by(|a, b| a.cmp_same_location(b));
            ordered.extend(at_location);
        }
        let configs = self.merge(&ordered);

        let (filesystem_route, root_effect) = filesystem_route_for(page, &configs)?;
        let route = match configs.get(ROUTE_CONFIG).map(ResolvedConfig::winner) {
            None => PageRoute::Filesystem {
                route_string: filesystem_route.clone(),
                defined_by: filesystem_route_defined_by(page),
                root_effect,
            },
            Some(source) => match &source.value {
                ConfigValue::File { .. } => PageRoute::Function {
                    defined_at: source.defined_at.clone(),
                },
                ConfigValue::Literal { value } => match value.as_str() {
                    Some(route_string) => PageRoute::String {
                        route_string: route_string.to_string(),
                        defined_at: source.defined_at.clone(),
                    },
                    None => {
                        return Err(ResolveError::InvalidRoute {
                            path: source.defined_at.clone(),
                        });
                    }
                },
            },
        };

        tracing::debug!(
            "resolved page {} ({} locations, {} configs)",
            page,
            locations.len(),
            configs.len()
        );

        Ok(ResolvedPage {
            location_id: page.clone(),
            filesystem_route,
            route,
            contributing,
            configs,
        })
    }

    fn merge(&self, ordered: &[&ConfigValueSource]) -> BTreeMap<String, ResolvedConfig> {
        let mut grouped: BTreeMap<&str, Vec<&ConfigValueSource>> = BTreeMap::new();
        for source in ordered {
            grouped
                .entry(source.config_name.as_str())
                .or_default()
                .push(source);
        }

        grouped
            .into_iter()
            .map(|(name, sources)| {
                let resolved = if self.is_cumulative(name) {
                    ResolvedConfig::Cumulative {
                        values: sources.into_iter().cloned().collect(),
                    }
                } else {
                    let mut strongest_first = sources.into_iter().rev().cloned();
                    let winner = strongest_first
                        .next()
                        .unwrap_or_else(|| unreachable!("config {name} without sources"));
                    ResolvedConfig::Override {
                        winner,
                        overridden: strongest_first.collect(),
                    }
                };
                (name.to_string(), resolved)
            })
            .collect()
    }
}

/// Filesystem route of `page`, rewritten by the effective
/// `filesystemRoutingRoot` if there is one.
fn filesystem_route_for(
    page: &LocationId,
    configs: &BTreeMap<String, ResolvedConfig>,
) -> Result<(String, Option<RoutingRootEffect>)> {
    let route = filesystem_route_string(page);
    let Some(source) = configs.get(ROUTING_ROOT_CONFIG).map(ResolvedConfig::winner) else {
        return Ok((route, None));
    };
    let after = source
        .literal_str()
        .filter(|s| s.starts_with('/'))
        .ok_or_else(|| ResolveError::InvalidRoutingRoot {
            path: source.defined_at.clone(),
            name: ROUTING_ROOT_CONFIG.to_string(),
        })?;
    let effect = RoutingRootEffect::from_config(&source.location_id, after);
    let rewritten = apply_filesystem_routing_root_effect(&route, &effect);
    Ok((rewritten, Some(effect)))
}
