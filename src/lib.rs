pub mod application;
pub mod commands;
pub mod error;
pub mod manifest;
pub mod package;
pub mod plan;
pub mod runtime;
pub mod source;
pub mod version;
mod xml;

pub use error::{ErrorKind, UpdateError, UpdateResult};
