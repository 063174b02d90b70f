//! Location identifiers: where a piece of configuration was declared.
//!
//! A [`LocationId`] is either an absolute project directory (`/`,
//! `/pages/about`) or a directory inside an npm package (`vike-react`,
//! `@acme/ui/renderer`). It never ends with `/` unless it is the root.

use crate::paths::{
    INHERITANCE_NEUTRAL_DIRS, has_dot_segment, is_npm_package_import, npm_package_name,
    npm_package_subpath, remove_directories, remove_filename,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a string was rejected as a [`LocationId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationIdError {
    #[error("location id is empty")]
    Empty,
    #[error("location id {0:?} is not a POSIX path")]
    NotPosix(String),
    #[error("location id {0:?} ends with a slash")]
    TrailingSlash(String),
    #[error("location id {0:?} contains an empty segment")]
    EmptySegment(String),
    #[error("path {0:?} is not normalized: it has a `.` or `..` segment")]
    NotNormalized(String),
    #[error("path {0:?} does not start with `/`")]
    NotAbsolute(String),
    #[error("path {0:?} does not end with a filename")]
    MissingFilename(String),
    #[error("location id {0:?} is neither an absolute path nor an npm package import")]
    InvalidPackage(String),
}

/// Canonical identifier of a configuration location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationId(String);

impl LocationId {
    /// Location of a project file, given its project-relative POSIX path
    /// (`/pages/about/+Page.js` -> `/pages/about`).
    ///
    /// Panics on a malformed path; see [`Self::try_from_file_path`].
    pub fn from_file_path(file_path: &str) -> Self {
        match Self::try_from_file_path(file_path) {
            Ok(id) => id,
            Err(e) => panic!("malformed file path: {e}"),
        }
    }

    /// Fallible [`Self::from_file_path`] for paths that come from users.
    pub fn try_from_file_path(file_path: &str) -> Result<Self, LocationIdError> {
        if file_path.contains('\\') {
            return Err(LocationIdError::NotPosix(file_path.to_string()));
        }
        let Some((_, filename)) = file_path
            .rsplit_once('/')
            .filter(|_| file_path.starts_with('/'))
        else {
            return Err(LocationIdError::NotAbsolute(file_path.to_string()));
        };
        if has_dot_segment(file_path) {
            return Err(LocationIdError::NotNormalized(file_path.to_string()));
        }
        if !filename.contains('.') {
            return Err(LocationIdError::MissingFilename(file_path.to_string()));
        }
        Self::parse(&remove_filename(file_path))
    }

    /// Location of a directory inside an npm package (`vike-react/renderer`).
    pub fn from_npm_import(import_dir: &str) -> Self {
        assert!(
            is_npm_package_import(import_dir),
            "expected an npm package import, got {import_dir:?}"
        );
        Self::assert_valid(import_dir.to_string())
    }

    /// Validate untrusted input such as a CLI argument.
    pub fn parse(s: &str) -> Result<Self, LocationIdError> {
        if s.is_empty() {
            return Err(LocationIdError::Empty);
        }
        if s.contains('\\') {
            return Err(LocationIdError::NotPosix(s.to_string()));
        }
        if s == "/" {
            return Ok(Self(s.to_string()));
        }
        if s.ends_with('/') {
            return Err(LocationIdError::TrailingSlash(s.to_string()));
        }
        if let Some(rest) = s.strip_prefix('/') {
            if rest.split('/').any(str::is_empty) {
                return Err(LocationIdError::EmptySegment(s.to_string()));
            }
            if has_dot_segment(rest) {
                return Err(LocationIdError::NotNormalized(s.to_string()));
            }
            return Ok(Self(s.to_string()));
        }
        if s.split('/').any(str::is_empty) {
            return Err(LocationIdError::EmptySegment(s.to_string()));
        }
        if !is_npm_package_import(s) {
            return Err(LocationIdError::InvalidPackage(s.to_string()));
        }
        if has_dot_segment(s) {
            return Err(LocationIdError::NotNormalized(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    fn assert_valid(s: String) -> Self {
        match Self::parse(&s) {
            Ok(id) => id,
            Err(e) => panic!("malformed location id: {e}"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Declared inside an npm package rather than the project.
    pub fn is_npm_package(&self) -> bool {
        !self.0.starts_with('/')
    }

    /// Package name for npm-origin locations.
    pub fn package_name(&self) -> Option<&str> {
        if self.is_npm_package() {
            npm_package_name(&self.0)
        } else {
            None
        }
    }

    /// Any segment is literally `renderer`.
    pub fn is_renderer_dir(&self) -> bool {
        self.0.split('/').any(|s| s == "renderer")
    }

    /// Absolute path this location covers: the location itself for project
    /// directories, the sub-path after the package name for npm locations.
    fn project_path(&self) -> String {
        if self.is_npm_package() {
            match npm_package_subpath(&self.0) {
                Some(sub) => sub,
                None => unreachable!("validated npm location {:?}", self.0),
            }
        } else {
            self.0.clone()
        }
    }

    /// The path used for inheritance checks (`renderer` segments removed).
    pub fn inheritance_root(&self) -> String {
        self.logical_path(INHERITANCE_NEUTRAL_DIRS)
    }

    /// The project path with the given neutral directories removed.
    pub fn logical_path(&self, neutral_dirs: &[&str]) -> String {
        remove_directories(&self.project_path(), neutral_dirs)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocationId {
    type Err = LocationIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LocationId {
    type Error = LocationIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LocationId> for String {
    fn from(id: LocationId) -> Self {
        id.0
    }
}

impl AsRef<str> for LocationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_path() {
        assert_eq!(
            LocationId::from_file_path("/pages/about/+Page.js").as_str(),
            "/pages/about"
        );
        assert_eq!(LocationId::from_file_path("/+config.toml").as_str(), "/");
        assert_eq!(
            LocationId::from_file_path("/renderer/+onRenderHtml.tsx").as_str(),
            "/renderer"
        );
    }

    #[test]
    #[should_panic(expected = "does not end with a filename")]
    fn test_from_file_path_without_filename() {
        LocationId::from_file_path("/pages/about");
    }

    #[test]
    #[should_panic(expected = "does not start with `/`")]
    fn test_from_file_path_rejects_npm_import() {
        LocationId::from_file_path("vike-react/+config.toml");
    }

    #[test]
    #[should_panic(expected = "empty segment")]
    fn test_from_file_path_rejects_double_slash() {
        LocationId::from_file_path("/pages//about/+Page.js");
    }

    #[test]
    #[should_panic(expected = "not normalized")]
    fn test_from_file_path_rejects_current_dir_segment() {
        LocationId::from_file_path("/pages/./about/+Page.js");
    }

    #[test]
    #[should_panic(expected = "not normalized")]
    fn test_from_file_path_rejects_parent_dir_segment() {
        LocationId::from_file_path("/pages/../admin/+Page.js");
    }

    #[test]
    fn test_try_from_file_path() {
        assert_eq!(
            LocationId::try_from_file_path("/pages/admin/+Page.js")
                .unwrap()
                .as_str(),
            "/pages/admin"
        );
        assert!(matches!(
            LocationId::try_from_file_path("/pages/.."),
            Err(LocationIdError::NotNormalized(_))
        ));
        assert!(matches!(
            LocationId::try_from_file_path("pages/+Page.js"),
            Err(LocationIdError::NotAbsolute(_))
        ));
        assert!(matches!(
            LocationId::try_from_file_path("+Page.js"),
            Err(LocationIdError::NotAbsolute(_))
        ));
        assert!(matches!(
            LocationId::try_from_file_path("/pages/about"),
            Err(LocationIdError::MissingFilename(_))
        ));
        assert!(matches!(
            LocationId::try_from_file_path("\\pages\\+Page.js"),
            Err(LocationIdError::NotPosix(_))
        ));
    }

    #[test]
    fn test_parse() {
        assert!(LocationId::parse("/").is_ok());
        assert!(LocationId::parse("/pages/about").is_ok());
        assert!(LocationId::parse("@acme/ui/renderer").is_ok());
        assert_eq!(LocationId::parse(""), Err(LocationIdError::Empty));
        assert!(matches!(
            LocationId::parse("/pages/"),
            Err(LocationIdError::TrailingSlash(_))
        ));
        assert!(matches!(
            LocationId::parse("/pages//x"),
            Err(LocationIdError::EmptySegment(_))
        ));
        assert!(matches!(
            LocationId::parse("\\pages"),
            Err(LocationIdError::NotPosix(_))
        ));
        assert!(matches!(
            LocationId::parse("./pages"),
            Err(LocationIdError::InvalidPackage(_))
        ));
        assert!(matches!(
            LocationId::parse("/pages/./about"),
            Err(LocationIdError::NotNormalized(_))
        ));
        assert!(matches!(
            LocationId::parse("/pages/../admin"),
            Err(LocationIdError::NotNormalized(_))
        ));
        assert!(matches!(
            LocationId::parse("vike-react/../renderer"),
            Err(LocationIdError::NotNormalized(_))
        ));
        assert!(matches!(
            LocationId::parse("vike-react/my dir"),
            Err(LocationIdError::InvalidPackage(_))
        ));
    }

    #[test]
    fn test_npm_location() {
        let id = LocationId::from_npm_import("@acme/ui/renderer");
        assert!(id.is_npm_package());
        assert!(id.is_renderer_dir());
        assert_eq!(id.package_name(), Some("@acme/ui"));
        assert_eq!(id.inheritance_root(), "/");

        let local = LocationId::from_file_path("/pages/+Page.js");
        assert!(!local.is_npm_package());
        assert_eq!(local.package_name(), None);
    }

    #[test]
    fn test_inheritance_root_keeps_pages() {
        let id = LocationId::parse("/renderer/pages/admin").unwrap();
        assert_eq!(id.inheritance_root(), "/pages/admin");
    }

    #[test]
    fn test_renderer_must_be_whole_segment() {
        assert!(!LocationId::parse("/renderers").unwrap().is_renderer_dir());
        assert!(LocationId::parse("/pages/renderer").unwrap().is_renderer_dir());
    }

    #[test]
    fn test_try_from_string_validates() {
        let id = LocationId::try_from("/pages/about".to_string()).unwrap();
        assert_eq!(String::from(id), "/pages/about");
        assert!(LocationId::try_from("/pages/".to_string()).is_err());
        assert!("vike-react".parse::<LocationId>().is_ok());
    }
}
