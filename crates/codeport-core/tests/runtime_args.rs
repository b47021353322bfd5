//! Positional classification through the full resolve path.

use codeport_core::{OpenRequest, OpenRequestError, to_runtime_args};
use codeport_test_utils::{EnvBuilder, TestWorkspace};
use pretty_assertions::assert_eq;

#[test]
fn classifies_positionals_first_match_wins() {
    let ws = TestWorkspace::new();
    let app = ws.dir("app");
    let lib = ws.dir("lib");
    let main = ws.file("app/main.rs", "fn main() {}");
    let ws1 = ws.file("one.code-workspace", "{}");
    let ws2 = ws.file("two.code-workspace", "{}");

    let env = EnvBuilder::new().build();
    let resolved = ws.resolve(
        &["app", "one.code-workspace", "app/main.rs", "lib", "two.code-workspace", "new-dir"],
        &env,
    );
    let args = to_runtime_args(&resolved);

    assert_eq!(args.folder, Some(app));
    assert_eq!(args.workspace, Some(ws1));
    assert_eq!(args.files, vec![main]);
    assert_eq!(args.paths, vec![lib, ws2, ws.root().join("new-dir")]);
    assert_eq!(
        args.positionals,
        vec!["app", "one.code-workspace", "app/main.rs", "lib", "two.code-workspace", "new-dir"]
    );
}

#[test]
fn missing_path_is_a_folder() {
    let ws = TestWorkspace::new();
    let resolved = ws.resolve(&["not-yet"], &EnvBuilder::new().build());
    let args = to_runtime_args(&resolved);
    assert_eq!(args.folder, Some(ws.root().join("not-yet")));
}

#[test]
fn runtime_args_carry_resolved_options() {
    let ws = TestWorkspace::new();
    ws.config("locale = \"de\"\ndisable-telemetry = true\n");
    let env = EnvBuilder::new().log_level("debug").build();
    let resolved = ws.resolve(&["--install-extension", "ms-python.python", "--extensions-dir", "ext"], &env);
    let args = to_runtime_args(&resolved);

    assert_eq!(args.locale.as_deref(), Some("de"));
    assert!(args.disable_telemetry);
    assert_eq!(args.install_extension, vec!["ms-python.python"]);
    assert_eq!(args.extensions_dir, ws.root().join("ext"));
    assert_eq!(args.user_data_dir, ws.paths().data);

    let json = serde_json::to_value(&args).unwrap();
    assert_eq!(json["log"], "debug");
    assert_eq!(json["install-extension"][0], "ms-python.python");
    assert_eq!(json["_"], serde_json::json!([]));
}

#[test]
fn open_request_from_classified_paths() {
    let ws = TestWorkspace::new();
    let app = ws.dir("app");
    let notes = ws.file("notes.md", "");

    let env = EnvBuilder::new().build();
    let request = OpenRequest::from_runtime_args(&to_runtime_args(&ws.resolve(&["app", "notes.md"], &env))).unwrap();
    assert_eq!(request.folder_uris, vec![app.display().to_string()]);
    assert_eq!(request.file_uris, vec![notes.display().to_string()]);

    let err = OpenRequest::from_runtime_args(&to_runtime_args(&ws.resolve(&["-n", "notes.md"], &env))).unwrap_err();
    assert_eq!(err, OpenRequestError::NewWindowWithFiles);
}

#[test]
fn open_request_carries_every_folder() {
    let ws = TestWorkspace::new();
    let a = ws.dir("a");
    let b = ws.dir("b");

    let args = to_runtime_args(&ws.resolve(&["a", "b"], &EnvBuilder::new().build()));
    assert_eq!(args.folder, Some(a.clone()));
    assert_eq!(args.paths, vec![b.clone()]);

    let request = OpenRequest::from_runtime_args(&args).unwrap();
    assert_eq!(
        request.folder_uris,
        vec![a.display().to_string(), b.display().to_string()]
    );
    assert!(request.file_uris.is_empty());
}

#[test]
fn stdin_marker_is_not_opened() {
    let ws = TestWorkspace::new();
    let app = ws.dir("app");

    let args = to_runtime_args(&ws.resolve(&["-", "app"], &EnvBuilder::new().build()));
    assert_eq!(args.folder, Some(app.clone()));
    assert_eq!(args.paths, vec![std::path::PathBuf::from("-")]);

    let request = OpenRequest::from_runtime_args(&args).unwrap();
    assert_eq!(request.folder_uris, vec![app.display().to_string()]);
}
