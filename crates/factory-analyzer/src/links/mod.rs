mod lsp;
mod provider;

pub use lsp::{definition_target_uri, to_document_link, to_location};
pub use provider::{FactoryLink, LinkProvider};
