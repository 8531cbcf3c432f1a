/// A byte range inside a configuration document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Locate the first occurrence of `needle` in `source`, searching only
    /// after the first occurrence of each `anchor` in turn.
    ///
    /// serde_yaml does not keep value positions, so config diagnostics are
    /// pinned to the text they quote. `locate(src, &["Out", "calculation"], "f(x)")`
    /// finds `f(x)` inside the `Out` block rather than an earlier tree.
    pub fn locate(source: &str, anchors: &[&str], needle: &str) -> Span {
        if needle.is_empty() {
            return Span::dummy();
        }
        let mut offset = 0;
        for anchor in anchors {
            match source[offset..].find(anchor) {
                Some(pos) => offset += pos + anchor.len(),
                None => break,
            }
        }
        let found = source[offset..]
            .find(needle)
            .map(|pos| offset + pos)
            .or_else(|| source.find(needle));
        match found {
            Some(start) => Span::new(start as u32, (start + needle.len()) as u32),
            None => Span::dummy(),
        }
    }
}
