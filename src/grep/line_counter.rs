/// Translates byte offsets into 1-based line numbers.
///
/// Each query adjusts the line count by the newlines between the previous
/// position and the new one, so scanning matches left to right touches every
/// byte once. Queries may also move backwards.
pub struct LineCounter<'a> {
    source: &'a str,
    current_line: usize,
    current_pos: usize,
}

impl<'a> LineCounter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            current_line: 1,
            current_pos: 0,
        }
    }

    /// Line number of `pos`. Offsets past the end are clamped.
    pub fn count_to(&mut self, pos: usize) -> usize {
        let pos = pos.min(self.source.len());
        if self.current_pos <= pos {
            self.current_line += count_newlines(&self.source.as_bytes()[self.current_pos..pos]);
        } else {
            self.current_line -= count_newlines(&self.source.as_bytes()[pos..self.current_pos]);
        }
        self.current_pos = pos;
        self.current_line
    }

    pub fn current_pos(&self) -> usize {
        self.current_pos
    }
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}
