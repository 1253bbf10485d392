//! The ordered import handlers: archive expansion and single-file import.

mod archive;
mod import_file;

pub use archive::ExtractArchiveHandler;
pub use import_file::ImportSingleFileHandler;
