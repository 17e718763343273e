mod artifact_files_iterator;

pub use artifact_files_iterator::*;
