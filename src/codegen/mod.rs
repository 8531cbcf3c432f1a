//! Emission nodes between the directive IR and C++ text.
//!
//! A `GenerationUnit` is first turned into a `Routine`: a list of typed
//! `EmitOp`s with every identifier already allocated and checked. A
//! `Lowering` then renders the ops as text. Nothing in this module formats
//! C++ directly; that is the lowering's job.

pub mod lower;
pub mod routine;

use std::collections::HashSet;
use std::fmt;

use crate::error::GenerateError;

pub use lower::{CppLowering, Lowering};
pub use routine::RoutineBuilder;

// ─── Emission nodes ───────────────────────────────────────────────

/// One emitted construct. Flat ops are single statements; `EventLoop` and
/// `IfOnly` carry nested bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmitOp {
    // ── File level ──
    Comment(String),
    SystemInclude(String),
    UserInclude(String),
    BlankLine,

    // ── Routine structure ──
    /// `void name(TFile *input_file, TFile *output_file) {`
    FnStart { name: String },
    /// `int main(int argc, char **argv) {`
    MainStart,
    FnEnd,

    // ── Declarations ──
    /// Make `file` the current directory so new trees attach to it.
    SelectFile { file: String },
    /// `TTree var("name", "name");`
    TreeDecl { var: String, name: String },
    /// `TTreeReader var("tree", file);`
    ReaderDecl {
        var: String,
        tree: String,
        file: String,
    },
    /// `datatype var;`
    VarDecl { datatype: String, var: String },
    /// `tree.Branch("branch", &var);`
    WriteBinding {
        tree: String,
        branch: String,
        var: String,
    },
    /// `TTreeReaderValue<datatype> var(reader, "branch");`
    ReadBinding {
        datatype: String,
        var: String,
        reader: String,
        branch: String,
    },

    // ── Event loop ──
    /// `while (reader.Next()) { body }`
    EventLoop { reader: String, body: Vec<EmitOp> },
    /// `if (predicate) { then_body }`
    IfOnly {
        predicate: Predicate,
        then_body: Vec<EmitOp>,
    },
    /// `var = *binding;`
    Assign { var: String, binding: String },
    /// `var = functor(*arg0, *arg1, ...);`
    Compute {
        var: String,
        functor: String,
        bindings: Vec<String>,
    },
    /// `tree.Fill();`
    Fill { tree: String },
    /// `tree.Write();`
    WriteTree { tree: String },

    // ── Driver ──
    /// Reject any invocation without exactly `expected` path arguments.
    ArgCountGuard { expected: u32 },
    /// `TFile *var = new TFile(argv[index], "mode");`
    OpenFile {
        var: String,
        argv_index: u32,
        mode: String,
    },
    /// `name(arg, ...);`
    Call { name: String, args: Vec<String> },
    /// `var->Close();`
    CloseFile { var: String },
    /// `delete var;`
    DeleteFile { var: String },
    /// `return code;`
    Return(i32),
}

/// Conjunction of per-branch conditions, each applied to a read binding.
///
/// An empty predicate is the constant `true`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Predicate {
    /// (read binding, condition text) in directive order.
    pub terms: Vec<(String, String)>,
}

impl Predicate {
    pub fn is_trivial(&self) -> bool {
        self.terms.is_empty()
    }
}

/// One generated processing routine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Routine {
    pub name: String,
    pub ops: Vec<EmitOp>,
}

impl Routine {
    /// Check the structural invariants the IR builder promises: every
    /// declared identifier is unique and every dereferenced binding was
    /// declared as a read binding first.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let mut declared = HashSet::new();
        let mut readers = HashSet::new();
        check_ops(&self.name, &self.ops, &mut declared, &mut readers)
    }
}

fn check_ops(
    routine: &str,
    ops: &[EmitOp],
    declared: &mut HashSet<String>,
    readers: &mut HashSet<String>,
) -> Result<(), GenerateError> {
    for op in ops {
        match op {
            EmitOp::TreeDecl { var, .. }
            | EmitOp::ReaderDecl { var, .. }
            | EmitOp::VarDecl { var, .. } => declare(routine, declared, var)?,
            EmitOp::ReadBinding { var, .. } => {
                declare(routine, declared, var)?;
                readers.insert(var.clone());
            }
            EmitOp::EventLoop { body, .. } => check_ops(routine, body, declared, readers)?,
            EmitOp::IfOnly {
                predicate,
                then_body,
            } => {
                for (binding, _) in &predicate.terms {
                    require(routine, readers, binding)?;
                }
                check_ops(routine, then_body, declared, readers)?;
            }
            EmitOp::Assign { binding, .. } => require(routine, readers, binding)?,
            EmitOp::Compute { bindings, .. } => {
                for binding in bindings {
                    require(routine, readers, binding)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn declare(routine: &str, declared: &mut HashSet<String>, var: &str) -> Result<(), GenerateError> {
    if declared.insert(var.to_string()) {
        Ok(())
    } else {
        Err(GenerateError::Internal(format!(
            "identifier '{}' declared twice in '{}'",
            var, routine
        )))
    }
}

fn require(routine: &str, readers: &HashSet<String>, binding: &str) -> Result<(), GenerateError> {
    if readers.contains(binding) {
        Ok(())
    } else {
        Err(GenerateError::Internal(format!(
            "'{}' reads undeclared binding '{}'",
            routine, binding
        )))
    }
}

// ─── Display ──────────────────────────────────────────────────────

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "true");
        }
        for (i, (binding, condition)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "*{} {}", binding, condition)?;
        }
        Ok(())
    }
}

impl fmt::Display for EmitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitOp::Comment(text) => write!(f, "comment {}", text),
            EmitOp::SystemInclude(h) => write!(f, "include <{}>", h),
            EmitOp::UserInclude(h) => write!(f, "include \"{}\"", h),
            EmitOp::BlankLine => write!(f, ""),
            EmitOp::FnStart { name } => write!(f, "fn_start {}", name),
            EmitOp::MainStart => write!(f, "main_start"),
            EmitOp::FnEnd => write!(f, "fn_end"),
            EmitOp::SelectFile { file } => write!(f, "select_file {}", file),
            EmitOp::TreeDecl { var, name } => write!(f, "tree {} = {}", var, name),
            EmitOp::ReaderDecl { var, tree, file } => {
                write!(f, "reader {} = {}:{}", var, file, tree)
            }
            EmitOp::VarDecl { datatype, var } => write!(f, "var {}: {}", var, datatype),
            EmitOp::WriteBinding { tree, branch, var } => {
                write!(f, "write {}.{} <- {}", tree, branch, var)
            }
            EmitOp::ReadBinding {
                datatype,
                var,
                reader,
                branch,
            } => write!(f, "read {}: {} <- {}.{}", var, datatype, reader, branch),
            EmitOp::EventLoop { reader, body } => {
                write!(f, "event_loop {}(body={})", reader, body.len())
            }
            EmitOp::IfOnly {
                predicate,
                then_body,
            } => write!(f, "if_only {}(then={})", predicate, then_body.len()),
            EmitOp::Assign { var, binding } => write!(f, "assign {} <- *{}", var, binding),
            EmitOp::Compute {
                var,
                functor,
                bindings,
            } => write!(f, "compute {} <- {}({})", var, functor, bindings.join(", ")),
            EmitOp::Fill { tree } => write!(f, "fill {}", tree),
            EmitOp::WriteTree { tree } => write!(f, "write_tree {}", tree),
            EmitOp::ArgCountGuard { expected } => write!(f, "arg_count_guard {}", expected),
            EmitOp::OpenFile {
                var,
                argv_index,
                mode,
            } => write!(f, "open {} = argv[{}] ({})", var, argv_index, mode),
            EmitOp::Call { name, args } => write!(f, "call {}({})", name, args.join(", ")),
            EmitOp::CloseFile { var } => write!(f, "close {}", var),
            EmitOp::DeleteFile { var } => write!(f, "delete {}", var),
            EmitOp::Return(code) => write!(f, "return {}", code),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
