//! Lazily created process-wide tracer
//!
//! `global::instance()` reads its configuration from the environment on
//! first use. The exit test re-runs this binary as a child process so the
//! tracer is created and finalized by a real process exit.

use std::process::Command;

use figment::Jail;
use tempfile::TempDir;
use tracefile_core::prelude::*;

const CHILD_MARKER: &str = "TRACEFILE_TEST_EXIT_CHILD";

#[test]
fn test_instance_created_from_environment() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lazy.json");

    Jail::expect_with(|jail| {
        jail.set_env("TRACEFILE_ENABLED", "1");
        jail.set_env("TRACEFILE_FILE", path.display());
        jail.set_env("TRACEFILE_BUFFER_SIZE", "2");

        let tracer = global::instance();
        assert_eq!(tracer.path(), Some(path.as_path()));
        assert_eq!(tracer.capacity(), 2);

        // Configuration is not re-read once the tracer exists
        jail.set_env("TRACEFILE_BUFFER_SIZE", "99");
        assert!(std::ptr::eq(tracer, global::instance()));
        assert_eq!(global::instance().capacity(), 2);

        global::event("A", TraceEvent::INSTANT);
        global::event("B", TraceEvent::INSTANT);
        let partial = std::fs::read_to_string(&path).unwrap();
        assert!(partial.starts_with('['));
        assert!(!partial.ends_with(']'));

        global::event("C", TraceEvent::INSTANT);
        let stats = global::shutdown().unwrap();
        assert_eq!(stats.events_written, 3);
        Ok(())
    });

    let names: Vec<String> = read_trace(&path)
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn test_instance_finalized_at_exit() {
    if std::env::var_os(CHILD_MARKER).is_some() {
        // Child: record without calling shutdown and let the process exit
        global::instance();
        global::event("recorded-before-exit", TraceEvent::INSTANT);
        return;
    }

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exit.json");
    let status = Command::new(std::env::current_exe().unwrap())
        .args(["test_instance_finalized_at_exit", "--exact", "--test-threads=1"])
        .current_dir(dir.path())
        .env(CHILD_MARKER, "1")
        .env("TRACEFILE_FILE", &path)
        .env("TRACEFILE_BUFFER_SIZE", "64")
        .env_remove("TRACEFILE_CONFIG_PATH")
        .status()
        .unwrap();
    assert!(status.success());

    let events = read_trace(&path).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "recorded-before-exit");
}
