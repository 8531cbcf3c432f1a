//! babymaker: generate ROOT n-tuple reduction programs from a YAML
//! configuration and a branch schema.
//!
//! The pipeline runs config → `ir` (per-unit directives) → `codegen`
//! (emission nodes, then C++ text) and is driven by [`api::generate`].

pub mod api;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod ident;
pub mod ir;
pub mod matcher;
pub mod span;

pub use api::{generate, write_artifact, GenerateOptions, Generated, Resolved};
pub use config::{BranchSchema, GeneratorConfig};
pub use error::{ConfigError, GenerateError};
