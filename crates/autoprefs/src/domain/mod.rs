//! Domain types: namespaces, backend kinds, and stored values.
//!
//! Nothing in here touches the file system.

pub mod kind;
pub mod namespace;
pub mod value;

pub use kind::{BackendKind, ParseBackendKindError};
pub use namespace::Namespace;
pub use value::{FromValue, ParseValueError, Value, ValueType};
