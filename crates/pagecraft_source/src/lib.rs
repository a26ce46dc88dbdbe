//! # pagecraft_source
//!
//! Read-only hierarchical file sources for pagecraft.
//!
//! Templates can come from three interchangeable backends behind the
//! [`FileSource`] trait:
//!
//! - [`DiskSource`]: a directory read at request time
//! - [`EmbeddedSource`]: a directory compiled into the binary via `include_dir`
//! - [`MemorySource`]: an in-memory map, handy for tests
//!
//! All backends list entries in the same pre-order, name-sorted walk order
//! and report missing paths the same way, so code built on top of them
//! behaves identically whichever one is selected at startup.
//!
//! ## Example
//!
//! ```rust
//! use pagecraft_source::{FileSource, MemorySource};
//!
//! let source = MemorySource::new()
//!     .with_file("layouts/base.html", "<html>{% block body %}{% endblock %}</html>")
//!     .with_file("index.html", "{% extends \"layouts/base.html\" %}");
//!
//! let paths: Vec<_> = source.list("").unwrap().into_iter().map(|e| e.path).collect();
//! assert_eq!(paths, vec!["index.html", "layouts", "layouts/base.html"]);
//! ```

pub mod disk;
pub mod embedded;
pub mod error;
pub mod memory;
pub mod source;

pub use disk::DiskSource;
pub use embedded::EmbeddedSource;
pub use error::{SourceError, SourceResult};
pub use memory::MemorySource;
pub use source::{base_name, normalize_path, walk_order, FileSource, SourceEntry};
