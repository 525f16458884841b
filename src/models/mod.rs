//! Resource models.

pub mod file;

pub use file::{DownloadedFile, File, FileJson};
