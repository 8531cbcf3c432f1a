//! C++ lowering against the ROOT I/O classes.

use super::Lowering;
use crate::codegen::EmitOp;
use crate::ident::{INPUT_FILE, OUTPUT_FILE};

/// Produces C++ from emission nodes.
///
/// Routine bodies and nested blocks are indented by `indent` per level;
/// blank lines carry no indentation.
pub struct CppLowering {
    indent: String,
}

impl Default for CppLowering {
    fn default() -> Self {
        Self::new()
    }
}

impl CppLowering {
    pub fn new() -> Self {
        Self::with_indent(2)
    }

    pub fn with_indent(width: usize) -> Self {
        Self {
            indent: " ".repeat(width),
        }
    }

    fn push(&self, out: &mut Vec<String>, depth: usize, text: String) {
        out.push(format!("{}{}", self.indent.repeat(depth), text));
    }

    fn lower_block(&self, ops: &[EmitOp], depth: &mut usize, out: &mut Vec<String>) {
        for op in ops {
            self.lower_op(op, depth, out);
        }
    }

    fn lower_op(&self, op: &EmitOp, depth: &mut usize, out: &mut Vec<String>) {
        let d = *depth;
        match op {
            // ── File level ──
            EmitOp::Comment(text) => self.push(out, d, format!("// {}", text)),
            EmitOp::SystemInclude(h) => self.push(out, d, format!("#include <{}>", h)),
            EmitOp::UserInclude(h) => self.push(out, d, format!("#include {}", quote(h))),
            EmitOp::BlankLine => out.push(String::new()),

            // ── Routine structure ──
            EmitOp::FnStart { name } => {
                self.push(
                    out,
                    d,
                    format!(
                        "void {}(TFile *{}, TFile *{}) {{",
                        name, INPUT_FILE, OUTPUT_FILE
                    ),
                );
                *depth += 1;
            }
            EmitOp::MainStart => {
                self.push(out, d, "int main(int argc, char **argv) {".to_string());
                *depth += 1;
            }
            EmitOp::FnEnd => {
                *depth = depth.saturating_sub(1);
                self.push(out, *depth, "}".to_string());
            }

            // ── Declarations ──
            EmitOp::SelectFile { file } => self.push(out, d, format!("{}->cd();", file)),
            EmitOp::TreeDecl { var, name } => {
                let name = quote(name);
                self.push(out, d, format!("TTree {}({}, {});", var, name, name));
            }
            EmitOp::ReaderDecl { var, tree, file } => {
                self.push(
                    out,
                    d,
                    format!("TTreeReader {}({}, {});", var, quote(tree), file),
                );
            }
            EmitOp::VarDecl { datatype, var } => self.push(out, d, format!("{} {};", datatype, var)),
            EmitOp::WriteBinding { tree, branch, var } => {
                self.push(out, d, format!("{}.Branch({}, &{});", tree, quote(branch), var));
            }
            EmitOp::ReadBinding {
                datatype,
                var,
                reader,
                branch,
            } => self.push(
                out,
                d,
                format!(
                    "TTreeReaderValue<{}> {}({}, {});",
                    datatype,
                    var,
                    reader,
                    quote(branch)
                ),
            ),

            // ── Event loop ──
            EmitOp::EventLoop { reader, body } => {
                self.push(out, d, format!("while ({}.Next()) {{", reader));
                let mut inner = d + 1;
                self.lower_block(body, &mut inner, out);
                self.push(out, d, "}".to_string());
            }
            EmitOp::IfOnly {
                predicate,
                then_body,
            } => {
                self.push(out, d, format!("if ({}) {{", predicate));
                let mut inner = d + 1;
                self.lower_block(then_body, &mut inner, out);
                self.push(out, d, "}".to_string());
            }
            EmitOp::Assign { var, binding } => self.push(out, d, format!("{} = *{};", var, binding)),
            EmitOp::Compute {
                var,
                functor,
                bindings,
            } => {
                let args: Vec<String> = bindings.iter().map(|b| format!("*{}", b)).collect();
                self.push(out, d, format!("{} = {}({});", var, functor, args.join(", ")));
            }
            EmitOp::Fill { tree } => self.push(out, d, format!("{}.Fill();", tree)),
            EmitOp::WriteTree { tree } => self.push(out, d, format!("{}.Write();", tree)),

            // ── Driver ──
            EmitOp::ArgCountGuard { expected } => {
                self.push(out, d, format!("if (argc != {}) {{", expected + 1));
                self.push(
                    out,
                    d + 1,
                    "std::cerr << \"usage: \" << argv[0] << \" <input file> <output file>\" << std::endl;"
                        .to_string(),
                );
                self.push(out, d + 1, "return 1;".to_string());
                self.push(out, d, "}".to_string());
            }
            EmitOp::OpenFile {
                var,
                argv_index,
                mode,
            } => self.push(
                out,
                d,
                format!(
                    "TFile *{} = new TFile(argv[{}], {});",
                    var,
                    argv_index,
                    quote(mode)
                ),
            ),
            EmitOp::Call { name, args } => {
                self.push(out, d, format!("{}({});", name, args.join(", ")));
            }
            EmitOp::CloseFile { var } => self.push(out, d, format!("{}->Close();", var)),
            EmitOp::DeleteFile { var } => self.push(out, d, format!("delete {};", var)),
            EmitOp::Return(code) => self.push(out, d, format!("return {};", code)),
        }
    }
}

impl Lowering for CppLowering {
    fn lower(&self, ops: &[EmitOp]) -> Vec<String> {
        let mut out = Vec::new();
        let mut depth = 0;
        self.lower_block(ops, &mut depth, &mut out);
        out
    }
}

/// A C++ string literal for `text`.
fn quote(text: &str) -> String {
    let mut lit = String::with_capacity(text.len() + 2);
    lit.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            lit.push('\\');
        }
        lit.push(c);
    }
    lit.push('"');
    lit
}
