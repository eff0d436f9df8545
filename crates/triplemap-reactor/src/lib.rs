//! triplemap Reactor - Typed object mapping over graph stores
//!
//! Application objects are views onto a subject in a [`GraphHandle`]:
//!
//! - [`codec`] converts values to and from graph nodes
//! - [`bridge`] performs typed property reads and writes, with optional
//!   cardinality bounds
//! - [`ReactorBase`] binds a subject to a declared class and exposes the
//!   bridge operations as methods
//! - [`ReactorResult`] is a restartable, lazily decoded view over a pattern
//! - [`reactor_class!`] generates typed wrappers for schema classes, and
//!   [`ClassRegistry`] maps them to class IRIs
//!
//! Wrappers hold no property state of their own. Two wrappers over the same
//! subject observe each other's writes immediately.
//!
//! [`GraphHandle`]: triplemap_core::GraphHandle

pub use triplemap_core;

pub mod base;
pub mod bridge;
pub mod class;
pub mod codec;
mod macros;
pub mod registry;
pub mod result;
pub mod schema;

pub use base::{ReactorBase, TypedInstance};
pub use class::ReactorClass;
pub use codec::{FromNode, ToNode};
pub use registry::{ClassEntry, ClassRegistry};
pub use result::{ReactorIter, ReactorResult};
pub use schema::{ObjectProperty, OwlClass};
