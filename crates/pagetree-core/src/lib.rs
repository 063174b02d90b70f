//! Core resolution logic for pagetree's filesystem routing.
//!
//! Maps `+` files to [`location::LocationId`]s, decides which locations a page
//! inherits configuration from ([`inheritance`]), orders competing locations
//! deterministically ([`ordering`]) and derives the default route of a page
//! ([`routing`]). Everything here is pure; discovery on disk lives in
//! `pagetree-resolve`.
//!
//! Contract violations (malformed paths, ordering locations a page does not
//! inherit) panic. They are bugs in the caller, not user errors.

pub mod inheritance;
pub mod location;
pub mod ordering;
pub mod paths;
pub mod routing;
pub mod settings;

pub use inheritance::{LocationSet, is_global_location, is_inherited};
pub use location::{LocationId, LocationIdError};
pub use ordering::{Precedence, explain_order, sort_after_inheritance_order, sort_locations};
pub use routing::{
    RoutingRootEffect, apply_filesystem_routing_root_effect, filesystem_route_defined_by,
    filesystem_route_string,
};
pub use settings::PagetreeSettings;
