//! C++ identifier construction from tree and branch names.

use std::collections::HashSet;

/// Parameter names every generated routine takes.
pub const INPUT_FILE: &str = "input_file";
pub const OUTPUT_FILE: &str = "output_file";

/// Replace path separators in `name` with `_` and wrap it in `prefix`/`suffix`.
///
/// `sanitize("Dst/DecayTree", "generator_", "")` is `generator_Dst_DecayTree`.
pub fn sanitize(name: &str, prefix: &str, suffix: &str) -> String {
    let mut ident = String::with_capacity(prefix.len() + name.len() + suffix.len());
    ident.push_str(prefix);
    ident.extend(name.chars().map(|c| if c == '/' { '_' } else { c }));
    ident.push_str(suffix);
    ident
}

/// C++ keywords and the ROOT classes a routine names. A variable with one
/// of these names would not compile or would hide the type.
const RESERVED: &[&str] = &[
    "auto", "bool", "break", "case", "char", "class", "const", "continue", "default", "delete",
    "do", "double", "else", "enum", "extern", "false", "float", "for", "goto", "if", "int",
    "long", "namespace", "new", "nullptr", "operator", "private", "protected", "public",
    "register", "return", "short", "signed", "sizeof", "static", "struct", "switch", "template",
    "this", "true", "typedef", "union", "unsigned", "using", "virtual", "void", "volatile",
    "while", "std", "TFile", "TTree", "TTreeReader", "TTreeReaderValue", "TBranch",
];

/// Turn a sanitized name into a legal C++ identifier: characters outside
/// `[A-Za-z0-9_]` (e.g. the `.` of split branches) become `_`, and a
/// leading digit gets a `_` in front.
fn legalize(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Hands out identifiers that are unique within one generated routine.
///
/// Two names can sanitize to the same identifier (`a/b` and `a_b`), and an
/// output tree may share its name with an input tree. The first request
/// keeps the plain form; later ones get `_1`, `_2`, ... appended. Keywords,
/// ROOT class names and anything passed to [`IdentAllocator::reserve`] are
/// never handed out.
#[derive(Debug)]
pub struct IdentAllocator {
    taken: HashSet<String>,
}

impl Default for IdentAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentAllocator {
    pub fn new() -> Self {
        let mut taken = HashSet::new();
        taken.insert(INPUT_FILE.to_string());
        taken.insert(OUTPUT_FILE.to_string());
        taken.extend(RESERVED.iter().map(|kw| kw.to_string()));
        Self { taken }
    }

    /// Keep `ident` away from every later `alloc`, e.g. a function the
    /// routine calls.
    pub fn reserve(&mut self, ident: &str) {
        self.taken.insert(ident.to_string());
    }

    pub fn alloc(&mut self, name: &str, prefix: &str, suffix: &str) -> String {
        let base = legalize(&sanitize(name, prefix, suffix));
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn is_taken(&self, ident: &str) -> bool {
        self.taken.contains(ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize("Dst/DecayTree", "", ""), "Dst_DecayTree");
        assert_eq!(sanitize("a/b/c", "", ""), "a_b_c");
    }

    #[test]
    fn test_sanitize_prefix_suffix() {
        assert_eq!(
            sanitize("Y/DecayTree", "generator_", ""),
            "generator_Y_DecayTree"
        );
        assert_eq!(sanitize("Y_PT", "", "_src"), "Y_PT_src");
    }

    #[test]
    fn test_sanitize_plain_name_unchanged() {
        assert_eq!(sanitize("Y_PT", "", ""), "Y_PT");
    }

    #[test]
    fn test_alloc_collision_gets_suffix() {
        let mut alloc = IdentAllocator::new();
        assert_eq!(alloc.alloc("a/b", "", ""), "a_b");
        assert_eq!(alloc.alloc("a_b", "", ""), "a_b_1");
        assert_eq!(alloc.alloc("a/b", "", ""), "a_b_2");
    }

    #[test]
    fn test_alloc_reserves_parameters() {
        let mut alloc = IdentAllocator::new();
        assert!(alloc.is_taken(INPUT_FILE));
        assert_eq!(alloc.alloc("output_file", "", ""), "output_file_1");
    }

    #[test]
    fn test_alloc_avoids_reserved() {
        let mut alloc = IdentAllocator::new();
        alloc.reserve("add");
        assert!(alloc.is_taken("add"));
        assert_eq!(alloc.alloc("add", "", ""), "add_1");
        assert_eq!(alloc.alloc("float", "", ""), "float_1");
        assert_eq!(alloc.alloc("TTree", "", ""), "TTree_1");
    }

    #[test]
    fn test_alloc_legalizes_identifiers() {
        let mut alloc = IdentAllocator::new();
        assert_eq!(alloc.alloc("fP.fX", "", ""), "fP_fX");
        assert_eq!(alloc.alloc("2body", "", "_src"), "_2body_src");
        assert_eq!(alloc.alloc("a-b", "", ""), "a_b");
        assert_eq!(alloc.alloc("a/b", "", ""), "a_b_1");
    }

    #[test]
    fn test_sanitize_only_rewrites_separators() {
        assert_eq!(sanitize("fP.fX", "", ""), "fP.fX");
    }

    #[test]
    fn test_alloc_is_deterministic() {
        let names = ["T", "T", "x/y", "x_y", "T"];
        let run = || {
            let mut alloc = IdentAllocator::new();
            names
                .iter()
                .map(|n| alloc.alloc(n, "", ""))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
        assert_eq!(run(), vec!["T", "T_1", "x_y", "x_y_1", "T_2"]);
    }
}
