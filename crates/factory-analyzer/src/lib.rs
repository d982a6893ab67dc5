pub mod document;
pub mod index;
pub mod links;
pub mod pattern;
pub mod server;
pub mod supervisor;
pub mod workspace;

pub use document::{Document, DocumentStore};
pub use index::{DefinitionIndex, DefinitionLocation};
pub use links::{FactoryLink, LinkProvider};
pub use server::{FactoryLanguageServer, ServerSettings};
pub use supervisor::{ChangeSupervisor, RebuildTrigger, SupervisorStatus};
pub use workspace::{DiskFs, FactoryScope, WorkspaceFs};
