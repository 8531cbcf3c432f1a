//! Parsing of calculation instructions: `functor(arg, arg, ...)`.

/// A parsed calculation instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call<'a> {
    pub functor: &'a str,
    pub arguments: Vec<&'a str>,
}

/// Parse `functor(a, b, ...)`.
///
/// The functor must be a bare identifier and there must be at least one
/// argument; arguments are split on commas and trimmed. Returns `None` for
/// anything else.
pub fn parse_call(instruction: &str) -> Option<Call<'_>> {
    let text = instruction.trim();
    let open = text.find('(')?;
    let inner = text[open + 1..].strip_suffix(')')?;

    let functor = text[..open].trim_end();
    if !is_identifier(functor) {
        return None;
    }

    let arguments: Vec<&str> = inner.split(',').map(str::trim).collect();
    if arguments.iter().any(|a| a.is_empty()) {
        return None;
    }

    Some(Call { functor, arguments })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
