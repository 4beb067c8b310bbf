//! Title directory enumeration and filesystem helpers.
//!
//! This module provides:
//! - The File Set Resolver: pages and thumbnails of a title in natural order
//! - The Directory Scanner: title directories of a content root
//! - Bulk deletion through the bounded scheduler

mod error;
mod ops;
mod resolver;

pub use error::FilesError;
pub use ops::{
    delete_files, extension_of, file_name, file_size, remove_if_exists, write_atomic,
    DELETE_WORKERS,
};
pub use resolver::{
    extension_patterns, resolve_file_set, scan_titles, search_files, sort_naturally, FileSet,
    CANONICAL_IMAGE_EXTENSIONS, RAW_IMAGE_EXTENSIONS, THUMBNAIL_PREFIX,
};
