//! IPC with a running editor instance.
//!
//! ```text
//! ┌──────────┐         Unix socket        ┌──────────────────┐
//! │ codeport │───────────────────────────▶│ editor instance  │
//! │          │  HTTP/1.1 + JSON           │ (endpoint file)  │
//! └──────────┘                            └──────────────────┘
//! ```

pub mod client;
pub mod types;

pub use client::{EditorClient, EditorClientError};
pub use types::{ErrorResponse, OpenRequest, OpenRequestError, RequestKind};
