//! Tether DOM Adapter
//!
//! An in-memory element tree that provides the host services the Tether
//! core needs, and the adapter surface (classes, positions, offsets,
//! attributes, render modes) the rest of a connector library calls into.

pub mod adapter;
pub mod class_list;
pub mod document;
pub mod error;
pub mod node;
pub mod probe;
pub mod target;

pub use adapter::DomAdapter;
pub use document::Document;
pub use error::{DomError, DomResult};
pub use node::{ElementData, InlineStyle, LayoutBox, Namespace, Node, NodeData, NodeId};
pub use probe::EnvironmentProbe;
pub use target::Target;
