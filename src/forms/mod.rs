pub mod file_upload;
pub mod form_handler;

pub use file_upload::FileUpload;
pub use form_handler::{FormHandler, SubmitResult};
