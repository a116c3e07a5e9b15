//! Building the split tunneling app list from a JSON app index.

use std::path::{Path, PathBuf};

use mullvad_catalog::split_tunneling::{
    FilterContext, StaticIndex, Warning, build_applications, filter_applications,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn index() -> StaticIndex {
    StaticIndex::load(&fixture("apps.json")).unwrap()
}

fn names(ctx: &FilterContext) -> Vec<String> {
    build_applications(&index(), ctx)
        .unwrap()
        .into_iter()
        .map(|app| app.name)
        .collect()
}

#[test]
fn gnome_session() {
    let ctx = FilterContext::new("ubuntu:GNOME", Some("en_US.UTF-8"), None);
    assert_eq!(names(&ctx), ["Firefox", "Foo", "Maps"]);
}

#[test]
fn kde_session() {
    let ctx = FilterContext::new("KDE", None, None);
    assert_eq!(names(&ctx), ["Firefox", "Foo", "Konsole"]);
}

#[test]
fn hidden_and_no_display_never_shown() {
    for desktop in ["", "GNOME", "KDE"] {
        let names = names(&FilterContext::new(desktop, None, None));
        assert!(!names.iter().any(|n| n == "Secret" || n == "Helper"));
    }
}

#[test]
fn same_path_listed_once() {
    let apps = build_applications(&index(), &FilterContext::default()).unwrap();
    let foo: Vec<_> = apps
        .iter()
        .filter(|app| app.absolute_path == "/usr/share/applications/foo.desktop")
        .collect();
    assert_eq!(foo.len(), 1);
    assert_eq!(foo[0].name, "Foo");
    assert_eq!(foo[0].exec.as_deref(), Some("/usr/bin/foo"));
}

#[test]
fn warnings_only_for_singleton_launchers() {
    let apps = build_applications(&index(), &FilterContext::default()).unwrap();
    for app in &apps {
        let expected = match app.name.as_str() {
            "Firefox" | "Maps" => Some(Warning::LaunchesInExistingProcess),
            _ => None,
        };
        assert_eq!(app.warning, expected, "{}", app.name);
    }
}

#[test]
fn localized_name() {
    let ctx = FilterContext::new("", Some("sv_SE.UTF-8"), None);
    let apps = build_applications(&index(), &ctx).unwrap();
    let firefox = apps
        .iter()
        .find(|app| app.absolute_path.ends_with("firefox.desktop"))
        .unwrap();
    assert_eq!(firefox.name, "Firefox webbläsare");
    assert_eq!(firefox.icon.as_deref(), Some("firefox"));
}

#[test]
fn repeated_builds_are_identical() {
    let ctx = FilterContext::new("GNOME", None, None);
    let first = build_applications(&index(), &ctx).unwrap();
    let second = build_applications(&index(), &ctx).unwrap();
    assert_eq!(first, second);
}

#[test]
fn search_results() {
    let apps = build_applications(&index(), &FilterContext::default()).unwrap();
    let found = filter_applications(&apps, "FO");
    let names: Vec<_> = found.iter().map(|app| app.name.as_str()).collect();
    assert_eq!(names, ["Firefox", "Foo"]);
}

#[test]
fn candidate_json_shape() {
    let apps = build_applications(&index(), &FilterContext::default()).unwrap();
    let json = serde_json::to_value(&apps[0]).unwrap();
    assert_eq!(json["name"], "Firefox");
    assert_eq!(json["warning"], "launches-in-existing-process");

    let foo = serde_json::to_value(&apps[1]).unwrap();
    assert!(foo.get("warning").is_none());
}
