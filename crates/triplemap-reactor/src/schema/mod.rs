//! Built-in schema classes

pub mod owl;

pub use owl::{ObjectProperty, OwlClass};
