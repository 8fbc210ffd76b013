use nom_locate::LocatedSpan;

pub type Span<'a> = LocatedSpan<&'a str>;

/// A location inside a template string.
///
/// `line` and `column` are 1-based and counted in characters, `offset` is
/// the 0-based byte offset into the template.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub struct Position {
    pub line: u32,
    pub column: usize,
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl Position {
    pub fn new(line: u32, column: usize, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }

    /// Byte length of the range, never less than one so that diagnostics
    /// always have something to underline.
    pub fn len(&self) -> usize {
        std::cmp::max(self.end.offset.saturating_sub(self.start.offset), 1)
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.start.offset <= position.offset && position.offset <= self.end.offset
    }
}

impl<'a> From<Span<'a>> for Position {
    fn from(span: Span<'a>) -> Self {
        Position {
            line: span.location_line(),
            column: span.get_utf8_column(),
            offset: span.location_offset(),
        }
    }
}

impl<'a> From<Span<'a>> for Range {
    fn from(span: Span<'a>) -> Self {
        let start = Position::from(span);
        let fragment = span.fragment();
        let lines = fragment.matches('\n').count() as u32;
        let column = match fragment.rfind('\n') {
            Some(i) => fragment[i + 1..].chars().count() + 1,
            None => start.column + fragment.chars().count(),
        };

        Range {
            start,
            end: Position {
                line: start.line + lines,
                column,
                offset: start.offset + fragment.len(),
            },
        }
    }
}
