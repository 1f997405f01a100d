//! Diagnostics options loaded from TOML.

use crate::prelude::*;
use similar_asserts::assert_eq;
use std::time::Duration;

const LISTENER: &str = "ConfigOptions";

fn write_options(dir: &tempfile::TempDir, toml: &str) -> std::path::PathBuf {
    let path = dir.path().join("diagnostics.toml");
    std::fs::write(&path, toml).unwrap();
    path
}

fn counting_router(options: &DiagnosticsOptions, calls: &Recorded<()>) -> ChannelRegistry {
    let on_tick = calls.push();
    let registry = ChannelRegistry::new();
    let observer = HandlerObserver::new(LISTENER)
        .handler(EventHandler0::new("Tick", move || on_tick(())).unwrap());
    ListenerRouter::new(options).observer(observer).attach(&registry);
    registry
}

#[test]
fn options_file_sets_the_cache_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_options(&dir, "enabled = true\ncache_ttl = \"5s\"\n");

    let options = DiagnosticsOptions::load(&path).unwrap();
    let source = DiagnosticSource::builder(LISTENER)
        .options(&options)
        .build(&ChannelRegistry::new())
        .unwrap();

    assert_eq!(source.cache_ttl(), Duration::from_secs(5));
}

#[test]
fn disabled_options_leave_sources_unobserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_options(&dir, "enabled = false\n");
    let options = DiagnosticsOptions::load(&path).unwrap();
    let calls = Recorded::new();

    let registry = counting_router(&options, &calls);
    let source = DiagnosticSource::new(&registry, LISTENER).unwrap();
    source.channel().write("Tick", &ItemBag::new()).unwrap();

    assert!(!source.is_enabled("Tick"));
    assert!(calls.values().is_empty());
}

#[test]
fn missing_keys_take_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_options(&dir, "");
    let options = DiagnosticsOptions::load(&path).unwrap();
    let calls = Recorded::new();

    let registry = counting_router(&options, &calls);
    let source = DiagnosticSource::new(&registry, LISTENER).unwrap();
    source.channel().write("Tick", &ItemBag::new()).unwrap();

    assert_eq!(options, DiagnosticsOptions::default());
    assert!(source.is_enabled("Tick"));
    assert_eq!(calls.values(), vec![()]);
}

#[test]
fn malformed_options_are_configuration_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_options(&dir, "cache_ttl = \"soon\"\n");

    let err = DiagnosticsOptions::load(&path).unwrap_err();

    assert!(err.is_configuration(), "{err}");
}
