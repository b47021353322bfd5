//! Reuse decisions against real endpoint files and sockets.

use std::time::Duration;

use codeport_core::{Coordinator, EndpointFile, EndpointId, ProbeResult};
use codeport_test_utils::{EnvBuilder, FakeInstance, TestWorkspace, init_test_tracing};
use pretty_assertions::assert_eq;

fn coordinator(ws: &TestWorkspace) -> Coordinator {
    Coordinator::new(EndpointFile::from_paths(ws.paths())).with_probe_timeout(Duration::from_millis(500))
}

#[tokio::test]
async fn reuse_window_returns_recorded_endpoint_without_probing() {
    init_test_tracing();
    let ws = TestWorkspace::new();
    let file = EndpointFile::from_paths(ws.paths());
    let dead = EndpointId::new(ws.root().join("dead.sock").display().to_string());
    file.record(&dead).unwrap();

    let env = EnvBuilder::new().build();
    for flag in ["--reuse-window", "-n"] {
        let resolved = ws.resolve(&[flag], &env);
        let reuse = coordinator(&ws).should_reuse_existing(&resolved, &env).await.unwrap();
        assert_eq!(reuse, Some(dead.clone()), "{flag}");
    }
}

#[tokio::test]
async fn reuse_window_without_recorded_endpoint() {
    let ws = TestWorkspace::new();
    let env = EnvBuilder::new().build();
    let resolved = ws.resolve(&["-r", "src"], &env);
    assert_eq!(coordinator(&ws).should_reuse_existing(&resolved, &env).await.unwrap(), None);
}

#[tokio::test]
async fn explicit_port_starts_a_new_instance() {
    let ws = TestWorkspace::new();
    let instance = FakeInstance::start(ws.root());
    instance.record(&EndpointFile::from_paths(ws.paths()));

    let env = EnvBuilder::new().build();
    let resolved = ws.resolve(&["--port", "9000", "src"], &env);
    assert_eq!(coordinator(&ws).should_reuse_existing(&resolved, &env).await.unwrap(), None);
}

#[tokio::test]
async fn environment_port_does_not_count_as_explicit() {
    let ws = TestWorkspace::new();
    let instance = FakeInstance::start(ws.root());
    instance.record(&EndpointFile::from_paths(ws.paths()));

    let env = EnvBuilder::new().port(9000).build();
    let resolved = ws.resolve(&["src"], &env);
    assert_eq!(
        coordinator(&ws).should_reuse_existing(&resolved, &env).await.unwrap(),
        Some(instance.endpoint())
    );
}

#[tokio::test]
async fn positionals_with_live_endpoint_reuse_it() {
    let ws = TestWorkspace::new();
    let instance = FakeInstance::start(ws.root());
    instance.record(&EndpointFile::from_paths(ws.paths()));

    let env = EnvBuilder::new().build();
    let resolved = ws.resolve(&["src", "README.md"], &env);
    assert_eq!(
        coordinator(&ws).should_reuse_existing(&resolved, &env).await.unwrap(),
        Some(instance.endpoint())
    );
}

#[tokio::test]
async fn no_positionals_means_nothing_to_hand_off() {
    let ws = TestWorkspace::new();
    let instance = FakeInstance::start(ws.root());
    instance.record(&EndpointFile::from_paths(ws.paths()));

    let env = EnvBuilder::new().build();
    let resolved = ws.resolve(&[], &env);
    assert_eq!(coordinator(&ws).should_reuse_existing(&resolved, &env).await.unwrap(), None);
}

#[test_log::test(tokio::test)]
async fn stale_endpoint_is_not_reused() {
    let ws = TestWorkspace::new();
    let file = EndpointFile::from_paths(ws.paths());
    let instance = FakeInstance::start(ws.root());
    instance.record(&file);
    let stale = instance.stop();

    let c = coordinator(&ws);
    assert_eq!(c.check_recorded().await.unwrap(), ProbeResult::Unreachable(stale));

    let env = EnvBuilder::new().build();
    let resolved = ws.resolve(&["src"], &env);
    assert_eq!(c.should_reuse_existing(&resolved, &env).await.unwrap(), None);
}

#[tokio::test]
async fn inherited_endpoint_wins_over_everything() {
    let ws = TestWorkspace::new();
    let env = EnvBuilder::new().ipc_hook("/run/user/1000/vscode-ipc.sock").build();
    let resolved = ws.resolve(&["--port", "9000"], &env);
    assert_eq!(
        coordinator(&ws).should_reuse_existing(&resolved, &env).await.unwrap(),
        Some(EndpointId::new("/run/user/1000/vscode-ipc.sock"))
    );
}

#[tokio::test]
async fn unreadable_endpoint_file_is_fatal() {
    let ws = TestWorkspace::new();
    std::fs::create_dir_all(ws.paths().endpoint_file()).unwrap();

    let env = EnvBuilder::new().build();
    let resolved = ws.resolve(&["src"], &env);
    assert!(coordinator(&ws).should_reuse_existing(&resolved, &env).await.is_err());
}
