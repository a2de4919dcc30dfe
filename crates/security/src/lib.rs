//! Security module for Orangutan: the project-root path sandbox.
//!
//! Every tool that touches the filesystem or spawns a process resolves its
//! path through [`resolve`] first. This is the only trust boundary in the
//! system: a path either normalizes to somewhere under the project root, or
//! it is rejected before any I/O happens.

pub mod path;

pub use path::{normalize, resolve, PathEscapeError};
