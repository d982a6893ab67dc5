use std::ops::Range;

/// A `factory :name` declaration found in a factory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionOccurrence {
    pub name: String,
    /// Byte offset of the `factory` keyword.
    pub offset: usize,
}

/// A `create(:name)` / `build :name` call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageOccurrence {
    pub name: String,
    /// Byte range of the `:name` token, colon included.
    pub range: Range<usize>,
}
