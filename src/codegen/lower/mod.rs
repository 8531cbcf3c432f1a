//! Lowering: consumes `EmitOp`s and produces source text lines.

mod cpp;

use super::EmitOp;

pub use cpp::CppLowering;

/// Renders emission nodes as source lines.
pub trait Lowering {
    /// Convert a sequence of emission nodes into text lines.
    fn lower(&self, ops: &[EmitOp]) -> Vec<String>;
}
