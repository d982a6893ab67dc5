pub(crate) mod handler;
pub mod settings;
pub(crate) mod state;
pub(crate) mod watcher;

pub use settings::ServerSettings;
pub use state::FactoryLanguageServer;
