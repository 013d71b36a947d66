pub mod assistant;
pub mod blob;
pub mod db;

pub use assistant::OpenAiAssistantAdapter;
pub use blob::FsBlobStore;
pub use db::DbAdapter;
