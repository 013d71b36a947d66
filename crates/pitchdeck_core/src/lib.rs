pub mod catalog;
pub mod domain;
pub mod ports;
pub mod prompt;

pub use catalog::{SlideSpec, SlideType};
pub use domain::{DocumentMeta, Language, Phase, Project, Slide};
pub use ports::{AssistantService, BlobStore, PortError, PortResult, ProjectStore};
