//! Filesystem routing: the default URL of a page.

use crate::location::LocationId;
use crate::paths::{ROUTE_NEUTRAL_DIRS, normalize_route, path_starts_with, segments};
use serde::{Deserialize, Serialize};

/// Default route of a page located at `location`.
///
/// `/pages/about` -> `/about`, `/src/pages/index` -> `/`. For npm package
/// locations only the sub-path after the package name counts.
pub fn filesystem_route_string(location: &LocationId) -> String {
    location.logical_path(ROUTE_NEUTRAL_DIRS)
}

/// The directory that defines a filesystem route, for diagnostics
/// (`/pages/about` -> `/pages/about/`).
pub fn filesystem_route_defined_by(location: &LocationId) -> String {
    if location.is_root() {
        "/".to_string()
    } else {
        format!("{location}/")
    }
}

/// Remounts a routing subtree: routes under `before` move under `after`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRootEffect {
    pub before: String,
    pub after: String,
}

impl RoutingRootEffect {
    /// Effect of a `filesystemRoutingRoot` value declared at `defined_at`.
    pub fn from_config(defined_at: &LocationId, after: &str) -> Self {
        assert!(
            after.starts_with('/'),
            "filesystemRoutingRoot must start with '/', got {after:?}"
        );
        Self {
            before: filesystem_route_string(defined_at),
            after: after.to_string(),
        }
    }
}

/// Replace the `before` prefix of `route` with `after`, then normalize.
pub fn apply_filesystem_routing_root_effect(route: &str, effect: &RoutingRootEffect) -> String {
    let RoutingRootEffect { before, after } = effect;
    assert!(after.starts_with('/'), "routing root {after:?} must start with '/'");
    assert!(
        path_starts_with(route, before),
        "route {route:?} is not under routing root {before:?}"
    );
    let rest: Vec<&str> = segments(route).skip(segments(before).count()).collect();
    normalize_route(&format!("{after}/{}", rest.join("/")))
}
