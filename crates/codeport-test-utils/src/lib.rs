#![deny(unsafe_code)]

//! Shared test utilities for the codeport workspace.
//!
//! Provides environment builders, sandboxed directory layouts, a fake
//! running editor instance, and tracing helpers so that individual crate
//! tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! codeport-test-utils = { workspace = true }
//! ```

pub mod env;
pub mod instance;
pub mod tracing_setup;
pub mod workspace;

pub use env::EnvBuilder;
pub use instance::FakeInstance;
pub use tracing_setup::init_test_tracing;
pub use workspace::TestWorkspace;
