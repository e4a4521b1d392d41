pub mod file_service;

pub use file_service::{FileScope, FileService};
