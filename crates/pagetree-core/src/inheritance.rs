//! Which locations a page inherits configuration from.
//!
//! Inheritance is a segment-wise prefix relation on inheritance roots:
//! `/pages` applies to `/pages/about`, `/pages/about` does not apply to
//! `/pages/about2`. `renderer` directories are transparent, so
//! `/renderer/+onRenderHtml.js` applies to every page.

use crate::location::LocationId;
use crate::paths::path_starts_with;

/// True if configuration declared at `ancestor` applies to `descendant`.
pub fn is_inherited(ancestor: &LocationId, descendant: &LocationId) -> bool {
    path_starts_with(&descendant.inheritance_root(), &ancestor.inheritance_root())
}

/// True if configuration declared at `location` applies to every location in
/// `all`. Renderer directories are always global.
pub fn is_global_location(location: &LocationId, all: &[LocationId]) -> bool {
    location.is_renderer_dir() || all.iter().all(|other| is_inherited(location, other))
}

/// Immutable snapshot of every page location known after discovery.
///
/// Classification queries need the complete set, so the snapshot is built
/// once and never grows.
#[derive(Debug, Clone, Default)]
pub struct LocationSet {
    locations: Vec<LocationId>,
}

impl LocationSet {
    pub fn new(locations: impl IntoIterator<Item = LocationId>) -> Self {
        let mut locations: Vec<LocationId> = locations.into_iter().collect();
        locations.sort();
        locations.dedup();
        Self { locations }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, location: &LocationId) -> bool {
        self.locations.binary_search(location).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationId> {
        self.locations.iter()
    }

    /// See [`is_global_location`].
    pub fn is_global(&self, location: &LocationId) -> bool {
        is_global_location(location, &self.locations)
    }

    /// Members that inherit configuration declared at `location`.
    pub fn inheriting<'a>(
        &'a self,
        location: &'a LocationId,
    ) -> impl Iterator<Item = &'a LocationId> + 'a {
        self.locations
            .iter()
            .filter(move |other| is_inherited(location, other))
    }
}

impl FromIterator<LocationId> for LocationSet {
    fn from_iter<T: IntoIterator<Item = LocationId>>(iter: T) -> Self {
        Self::new(iter)
    }
}
