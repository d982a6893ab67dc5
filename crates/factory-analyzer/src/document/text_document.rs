use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

/// Snapshot of a single open text document.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    /// Language id announced by the client in `didOpen`.
    pub language_id: String,
    pub text: String,
    pub version: i32,
    /// Byte offset of each line start, rebuilt on every mutation.
    line_offsets: Vec<usize>,
}

impl Document {
    pub fn new(
        uri: Url,
        text: String,
        version: i32,
    ) -> Self {
        Self::with_language(uri, String::new(), text, version)
    }

    pub fn with_language(
        uri: Url,
        language_id: String,
        text: String,
        version: i32,
    ) -> Self {
        let line_offsets = Self::compute_line_offsets(&text);
        Self {
            uri,
            language_id,
            text,
            version,
            line_offsets,
        }
    }

    /// Ruby sources get factory links; anything else is ignored.
    ///
    /// Falls back to the file extension when the client sent no language id.
    pub fn is_ruby(&self) -> bool {
        if !self.language_id.is_empty() {
            return self.language_id == "ruby";
        }
        self.uri.path().ends_with(".rb")
    }

    /// Convert an LSP `Position` (UTF-16 columns) to a byte offset.
    pub fn offset_of(
        &self,
        pos: Position,
    ) -> Option<usize> {
        let line = pos.line as usize;
        let line_start = *self.line_offsets.get(line)?;
        let line_end = self.line_offsets.get(line + 1).copied().unwrap_or(self.text.len());
        let line_text = &self.text[line_start..line_end];

        let mut utf16_offset: u32 = 0;
        let mut byte_offset = line_start;
        for ch in line_text.chars() {
            if utf16_offset >= pos.character {
                break;
            }
            utf16_offset += ch.len_utf16() as u32;
            byte_offset += ch.len_utf8();
        }
        Some(byte_offset)
    }

    /// Convert a byte offset to an LSP `Position`.
    pub fn position_of(
        &self,
        offset: usize,
    ) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(ins) => ins.saturating_sub(1),
        };
        let line_start = self.line_offsets[line];
        let character = self.text[line_start..offset].chars().map(|c| c.len_utf16() as u32).sum::<u32>();
        Position {
            line: line as u32,
            character,
        }
    }

    /// Apply incremental or full-content changes in order.
    pub fn apply_changes(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        for change in changes {
            if let Some(range) = change.range {
                if let (Some(start), Some(end)) = (self.offset_of(range.start), self.offset_of(range.end)) {
                    self.text.replace_range(start..end, &change.text);
                    self.line_offsets = Self::compute_line_offsets(&self.text);
                }
            } else {
                self.text = change.text;
                self.line_offsets = Self::compute_line_offsets(&self.text);
            }
        }
        self.version = version;
    }

    fn compute_line_offsets(text: &str) -> Vec<usize> {
        let mut offsets = vec![0usize];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(i + 1);
            }
        }
        offsets
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/text_document_tests.rs"]
mod tests;
