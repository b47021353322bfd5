#![deny(unsafe_code)]

//! codeport core: what happens after configuration is resolved.
//!
//! Decides whether to hand an invocation to a running editor instance,
//! builds the arguments for the editor runtime, and talks to an instance
//! over its IPC socket.

/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Editor IPC client and request types.
pub mod ipc;
/// Endpoint file, liveness probe, and the reuse decision.
pub mod instance;
/// Tracing subscriber setup.
pub mod logging;
/// Positional classification and runtime arguments.
pub mod runtime;

pub use instance::{Coordinator, EndpointFile, EndpointId, InstanceError, ProbeResult};
pub use ipc::{EditorClient, EditorClientError, OpenRequest, OpenRequestError};
pub use runtime::{PathKind, RuntimeArgs, to_runtime_args};
