//! Deterministic precedence between locations that apply to the same page.
//!
//! Sorting ascending with [`sort_after_inheritance_order`] puts the weakest
//! location first; when two locations define the same config, the later one
//! wins. The cascade, each step only consulted on a tie:
//!
//! 1. deeper inheritance root wins
//! 2. project locations beat npm package locations
//! 3. non-renderer locations beat renderer directories
//! 4. longer id wins
//! 5. lexicographically greater id wins
//!
//! Steps 4 and 5 only make the order total.

use crate::inheritance::is_inherited;
use crate::location::LocationId;
use crate::paths::path_starts_with;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// The cascade step that separated two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    InheritanceDepth,
    NpmPackage,
    RendererDir,
    Length,
    Lexicographic,
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InheritanceDepth => "inheritance-depth",
            Self::NpmPackage => "npm-package",
            Self::RendererDir => "renderer-dir",
            Self::Length => "length",
            Self::Lexicographic => "lexicographic",
        };
        f.write_str(s)
    }
}

/// Compare two locations inherited by `page`. `Less` means `a` has lower
/// precedence than `b`. Never returns `Equal`.
pub fn sort_after_inheritance_order(
    a: &LocationId,
    b: &LocationId,
    page: &LocationId,
) -> Ordering {
    explain_order(a, b, page).0
}

/// Like [`sort_after_inheritance_order`], also naming the deciding step.
pub fn explain_order(a: &LocationId, b: &LocationId, page: &LocationId) -> (Ordering, Precedence) {
    assert!(
        is_inherited(a, page),
        "{a} is not inherited by page {page}"
    );
    assert!(
        is_inherited(b, page),
        "{b} is not inherited by page {page}"
    );

    let root_a = a.inheritance_root();
    let root_b = b.inheritance_root();
    if root_a != root_b {
        assert!(
            path_starts_with(&root_a, &root_b) || path_starts_with(&root_b, &root_a),
            "inheritance roots {root_a} and {root_b} are not nested"
        );
        assert_ne!(root_a.len(), root_b.len());
        return (root_a.len().cmp(&root_b.len()), Precedence::InheritanceDepth);
    }

    assert_ne!(a, b, "location {a} counted twice for page {page}");

    match (a.is_npm_package(), b.is_npm_package()) {
        (true, false) => return (Ordering::Less, Precedence::NpmPackage),
        (false, true) => return (Ordering::Greater, Precedence::NpmPackage),
        _ => {}
    }

    match (a.is_renderer_dir(), b.is_renderer_dir()) {
        (true, false) => return (Ordering::Less, Precedence::RendererDir),
        (false, true) => return (Ordering::Greater, Precedence::RendererDir),
        _ => {}
    }

    let by_len = a.as_str().len().cmp(&b.as_str().len());
    if by_len != Ordering::Equal {
        return (by_len, Precedence::Length);
    }

    (a.as_str().cmp(b.as_str()), Precedence::Lexicographic)
}

/// Sort `locations` so the highest-precedence location for `page` is last.
pub fn sort_locations(locations: &mut [LocationId], page: &LocationId) {
    locations.sort_by(|a, b| sort_after_inheritance_order(a, b, page));
}
