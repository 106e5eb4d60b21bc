//! Rebuild behavior against file-backed storage: idempotence, persistence
//! across instances, the edit-then-reload cycle and corruption recovery.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use waypoint_cache::{CacheError, FileStorage, RouteStorage, RouterCache};
use waypoint_conformance::{set_mtime, CountingLoader, Fixture};
use waypoint_loader::TomlRouteLoader;

type Cache = RouterCache<FileStorage, CountingLoader<TomlRouteLoader>>;

const ROUTES: &str = r#"
[routes.home]
path = "/"
methods = ["GET"]

[routes.blog]
path = "/blog/{slug}"
[routes.blog.requirements]
slug = "[a-z0-9-]+"
"#;

fn open(fx: &Fixture, resources: Vec<PathBuf>, debug: bool) -> Cache {
    RouterCache::new(
        resources,
        fx.manifest_dir(),
        FileStorage::new(fx.cache_file()),
        CountingLoader::toml(),
        debug,
    )
}

#[test]
fn unchanged_resources_rebuild_exactly_once() {
    for debug in [false, true] {
        let fx = Fixture::new();
        let routes = fx.write("routes.toml", ROUTES);
        let mut cache = open(&fx, vec![routes], debug);

        let first = cache.load().unwrap();
        let second = cache.load().unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.loader().loads(), 1, "debug = {debug}");
    }
}

#[test]
fn new_instance_reuses_persisted_collection() {
    for debug in [false, true] {
        let fx = Fixture::new();
        let routes = fx.write("routes.toml", ROUTES);
        let built = open(&fx, vec![routes.clone()], debug).load().unwrap();

        let mut restarted = open(&fx, vec![routes], debug);
        let reused = restarted.load().unwrap();
        assert_eq!(reused, built);
        assert_eq!(restarted.loader().loads(), 0, "debug = {debug}");
    }
}

#[test]
fn touched_resource_triggers_rebuild_with_newer_write() {
    let fx = Fixture::new();
    let routes = fx.write("routes.toml", ROUTES);
    let mut cache = open(&fx, vec![routes.clone()], false);

    let original = cache.load().unwrap();
    assert!(cache.is_valid());
    assert!(original.get("contact").is_none());

    // Pretend the cache was written an hour ago and the resource edited since.
    let t1 = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&fx.cache_file(), t1);
    std::fs::write(
        &routes,
        format!("{ROUTES}\n[routes.contact]\npath = \"/contact\"\n"),
    )
    .unwrap();
    let t2 = t1 + Duration::from_secs(60);
    set_mtime(&routes, t2);
    assert!(!cache.is_valid());

    let rebuilt = cache.load().unwrap();
    assert_eq!(cache.loader().loads(), 2);
    assert!(rebuilt.get("contact").is_some());

    let t3 = cache.storage().last_write_time().unwrap();
    assert!(t3 > t2);
    assert!(cache.is_valid());
}

#[test]
fn later_resources_override_earlier_ones() {
    let fx = Fixture::new();
    let a = fx.write(
        "a.toml",
        "[routes.home]\npath = \"/a\"\n\n[routes.only_a]\npath = \"/only-a\"\n",
    );
    let b = fx.write("b.toml", "[routes.home]\npath = \"/b\"\n");
    let mut cache = open(&fx, vec![a, b], false);

    let routes = cache.load().unwrap();
    assert_eq!(routes.get("home").unwrap().path, "/b");
    assert_eq!(routes.names().collect::<Vec<_>>(), vec!["only_a", "home"]);
}

#[test]
fn corrupt_entry_is_rebuilt() {
    let fx = Fixture::new();
    let routes = fx.write("routes.toml", ROUTES);
    let mut cache = open(&fx, vec![routes], false);
    let built = cache.load().unwrap();

    std::fs::write(fx.cache_file(), b"definitely not a route cache").unwrap();
    assert!(cache.is_valid(), "timestamps alone cannot see the damage");

    let recovered = cache.load().unwrap();
    assert_eq!(recovered, built);
    assert_eq!(cache.loader().loads(), 2);
    assert_eq!(cache.storage().read().unwrap(), built);
}

#[test]
fn failed_write_surfaces_from_load() {
    let fx = Fixture::new();
    let routes = fx.write("routes.toml", ROUTES);
    let blocker = fx.write("blocked", "a file where a directory should be");

    let mut cache = RouterCache::new(
        routes,
        fx.manifest_dir(),
        FileStorage::new(blocker.join("routes.bin")),
        CountingLoader::toml(),
        false,
    );
    let err = cache.load().unwrap_err();
    assert!(matches!(err, CacheError::CreateDir { .. }));
}

#[test]
fn failed_manifest_write_surfaces_from_load() {
    let fx = Fixture::new();
    let routes = fx.write("routes.toml", ROUTES);
    let blocker = fx.write("manifests", "a file where a directory should be");

    let mut cache = RouterCache::new(
        routes,
        blocker,
        FileStorage::new(fx.cache_file()),
        CountingLoader::toml(),
        true,
    );
    let err = cache.load().unwrap_err();
    assert!(matches!(err, CacheError::CreateDir { .. }));
    assert!(!cache.storage().exists());
}

#[test]
fn broken_resource_surfaces_load_error() {
    let fx = Fixture::new();
    let routes = fx.write("routes.toml", "[routes.home]\npath = \"no-leading-slash\"\n");
    let mut cache = open(&fx, vec![routes], true);

    let err = cache.load().unwrap_err();
    assert!(matches!(err, CacheError::Load(_)));
    assert!(!cache.storage().exists());
}
