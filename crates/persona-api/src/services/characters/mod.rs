//! Character lifecycle: multipart form handling and the service that ties the
//! repository to the upload pipeline.

pub mod form;
pub mod service;

pub use form::{CharacterForm, FilePart};
pub use service::CharacterService;
