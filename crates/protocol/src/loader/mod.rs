//! Filesystem source loader with hot-reload via `notify` watcher.
//!
//! Indicator documents and patches are read from two directory trees.
//! Documents are keyed by their location (`<parent dir>/<file stem>`);
//! patches form a single ordered set, sorted by path.

mod core;
mod error;
mod watcher;


pub use self::core::SourceLoader;
pub use self::error::{LoadResult, LoadStatus, SourceKind};
