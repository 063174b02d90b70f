//! Configuration discovery and page resolution.
//!
//! [`discover::discover`] walks a project for `+` files and the packages
//! they extend. [`resolve::Resolver`] turns the result into one
//! [`resolve::ResolvedPage`] per page: its contributing locations in
//! precedence order, its effective config values, and its route.

pub mod discover;
pub mod error;
pub mod resolve;
pub mod source;

pub use discover::{Discovery, discover};
pub use error::ResolveError;
pub use resolve::{ContributingLocation, PageRoute, ResolvedConfig, ResolvedPage, Resolver};
pub use source::{ConfigValue, ConfigValueSource, Origin, SourceKind};
