mod definition_index;
mod types;

pub use definition_index::DefinitionIndex;
pub use types::{DefinitionLocation, IndexGeneration, IndexStats};
