//! Text scanning for FactoryBot definitions and usages.
//!
//! This is not a Ruby parser. Both scanners are plain regex
//! passes over the raw text: they know nothing about comments, string
//! literals, heredocs or nesting, so `# create(:user)` in a comment is
//! reported like any other call. Keyword matches are not word-bounded
//! either (`rebuild(:cache)` is seen as a `build` call).

mod scanner;
mod types;

pub use scanner::{find_definitions, find_usages, line_of_offset, usage_at};
pub use types::{DefinitionOccurrence, UsageOccurrence};
