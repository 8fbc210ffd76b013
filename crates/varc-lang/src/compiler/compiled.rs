//! Compiled template representation.
//!
//! A [`CompiledVariable`] holds no per-context state and only refers to
//! registry and field table entries by index, so one compiled template can
//! be interpreted concurrently for any number of contexts.
use std::fmt::{self, Display, Formatter};

/// One piece of a compiled template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Byte span into the template's literal text.
    Literal { start: u32, len: u32 },
    /// A plain variable, by registry index.
    Variable { index: u32 },
    /// A field of a fieldable variable, by registry and field table index.
    Field { variable: u32, field: u32 },
}

impl Segment {
    pub fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledVariable {
    raw: Box<str>,
    text: Box<str>,
    segments: Box<[Segment]>,
}

impl CompiledVariable {
    pub(crate) fn new(raw: &str, text: String, segments: Vec<Segment>) -> Self {
        Self {
            raw: raw.into(),
            text: text.into_boxed_str(),
            segments: segments.into_boxed_slice(),
        }
    }

    /// The template as it was written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `true` when the template has no variable references, in which case
    /// [`CompiledVariable::text`] is the whole result.
    pub fn is_const(&self) -> bool {
        self.segments.iter().all(Segment::is_literal)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All literal text with `$$` unescaped, in template order.
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn literal(&self, start: u32, len: u32) -> &str {
        let start = start as usize;
        &self.text[start..start + len as usize]
    }

    pub fn references(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|segment| !segment.is_literal())
    }
}

impl Display for CompiledVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
