//! Property-based tests for the resolver's algebraic guarantees.
//!
//! - Location ids never end with `/` except the root
//! - Inheritance is reflexive and transitive
//! - The inheritance order is antisymmetric and never reports a tie
//! - Renderer directories are always global

use pagetree_core::*;
use proptest::prelude::*;
use std::cmp::Ordering;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("pages".to_string()),
        Just("renderer".to_string()),
        Just("src".to_string()),
        Just("index".to_string()),
        prop::string::string_regex("[a-z][a-z0-9-]{0,6}").unwrap(),
    ]
}

fn dir_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment_strategy(), 0..5)
}

fn local_location_strategy() -> impl Strategy<Value = LocationId> {
    dir_strategy().prop_map(|segs| LocationId::parse(&format!("/{}", segs.join("/"))).unwrap())
}

fn npm_location_strategy() -> impl Strategy<Value = LocationId> {
    (
        prop_oneof![
            Just("vike-react".to_string()),
            Just("@acme/ui".to_string()),
            Just("pkg".to_string()),
        ],
        dir_strategy(),
    )
        .prop_map(|(pkg, segs)| {
            let id = if segs.is_empty() {
                pkg
            } else {
                format!("{}/{}", pkg, segs.join("/"))
            };
            LocationId::from_npm_import(&id)
        })
}

fn location_strategy() -> impl Strategy<Value = LocationId> {
    prop_oneof![local_location_strategy(), npm_location_strategy()]
}

fn file_path_strategy() -> impl Strategy<Value = String> {
    (dir_strategy(), prop::string::string_regex("\\+[A-Za-z]{1,8}\\.(js|ts|toml)").unwrap())
        .prop_map(|(segs, file)| {
            if segs.is_empty() {
                format!("/{}", file)
            } else {
                format!("/{}/{}", segs.join("/"), file)
            }
        })
}

/// How to derive an ancestor from a page path: keep the first `cut`
/// segments, optionally append `renderer`, optionally move into a package.
fn ancestor_choice() -> impl Strategy<Value = (usize, Option<&'static str>, bool)> {
    (
        0usize..6,
        prop::option::of(prop::sample::select(vec!["vike-react", "@acme/ui", "pkg"])),
        any::<bool>(),
    )
}

fn ancestor_of(page_segs: &[String], (cut, pkg, renderer): (usize, Option<&str>, bool)) -> LocationId {
    let mut segs: Vec<&str> = page_segs[..cut % (page_segs.len() + 1)]
        .iter()
        .map(String::as_str)
        .collect();
    if renderer {
        segs.push("renderer");
    }
    match pkg {
        Some(pkg) if segs.is_empty() => LocationId::from_npm_import(pkg),
        Some(pkg) => LocationId::from_npm_import(&format!("{}/{}", pkg, segs.join("/"))),
        None => LocationId::parse(&format!("/{}", segs.join("/"))).unwrap(),
    }
}

/// A page plus two distinct locations it inherits from.
fn binding_strategy() -> impl Strategy<Value = (LocationId, LocationId, LocationId)> {
    (dir_strategy(), ancestor_choice(), ancestor_choice()).prop_filter_map(
        "locations must be distinct",
        |(segs, choice_a, choice_b)| {
            let page = LocationId::parse(&format!("/{}", segs.join("/"))).unwrap();
            let a = ancestor_of(&segs, choice_a);
            let b = ancestor_of(&segs, choice_b);
            (a != b).then_some((a, b, page))
        },
    )
}

// =============================================================================
// LOCATION ID PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn location_id_has_no_trailing_slash(path in file_path_strategy()) {
        let id = LocationId::from_file_path(&path);
        prop_assert!(id.as_str() == "/" || !id.as_str().ends_with('/'));
        prop_assert!(id.as_str().starts_with('/'));
    }

    #[test]
    fn route_string_is_normalized(loc in location_strategy()) {
        let route = filesystem_route_string(&loc);
        prop_assert!(route.starts_with('/'));
        prop_assert!(!route.contains("//"));
        prop_assert!(route == "/" || !route.ends_with('/'));
    }
}

// =============================================================================
// INHERITANCE PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn inheritance_is_reflexive(loc in location_strategy()) {
        prop_assert!(is_inherited(&loc, &loc));
    }

    #[test]
    fn inheritance_is_transitive(
        a in location_strategy(),
        b in location_strategy(),
        c in location_strategy(),
    ) {
        if is_inherited(&a, &b) && is_inherited(&b, &c) {
            prop_assert!(is_inherited(&a, &c));
        }
    }

    #[test]
    fn renderer_dirs_are_global(
        mut segs in dir_strategy(),
        pages in prop::collection::vec(local_location_strategy(), 0..6),
    ) {
        segs.push("renderer".to_string());
        let renderer = LocationId::parse(&format!("/{}", segs.join("/"))).unwrap();
        prop_assert!(is_global_location(&renderer, &pages));
    }

    #[test]
    fn ancestors_are_inherited((a, b, page) in binding_strategy()) {
        prop_assert!(is_inherited(&a, &page));
        prop_assert!(is_inherited(&b, &page));
    }
}

// =============================================================================
// ORDERING PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn order_is_antisymmetric((a, b, page) in binding_strategy()) {
        let ab = sort_after_inheritance_order(&a, &b, &page);
        let ba = sort_after_inheritance_order(&b, &a, &page);
        prop_assert_ne!(ab, Ordering::Equal);
        prop_assert_eq!(ab, ba.reverse());
    }

    #[test]
    fn deeper_root_always_wins((a, b, page) in binding_strategy()) {
        let (ra, rb) = (a.inheritance_root(), b.inheritance_root());
        if ra.len() > rb.len() {
            prop_assert_eq!(sort_after_inheritance_order(&a, &b, &page), Ordering::Greater);
        }
    }
}
