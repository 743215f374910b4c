//! Tether Core Library
//!
//! Host-agnostic pieces of the Tether connector adapter: drag ancestry
//! tracking, render-mode selection, and the services a host element tree
//! has to provide.

pub mod config;
pub mod drag;
pub mod error;
pub mod host;
pub mod render_mode;

pub use config::AdapterConfig;
pub use drag::{ChildMap, DragManager, EndpointRecord, TrackedChild};
pub use error::{ConfigError, ConfigResult};
pub use host::{DragHost, ElementLookup, ElementTree, IdentityService, NodeKind, OffsetMode, OffsetQuery};
pub use render_mode::{RenderCapabilities, RenderMode, RenderProbe};
