//! # pagecraft_templates
//!
//! Template composition and rendering for pagecraft.
//!
//! This crate turns a directory of template fragments into one shared
//! namespace (a *layout*) and renders pages against it:
//!
//! - [`Composer`] walks a [`FileSource`](pagecraft_source::FileSource),
//!   keeps files whose base name matches a glob pattern and parses them into a
//!   [`TemplateSet`]. The first match in walk order is the primary fragment.
//! - [`TemplateSet`] holds the parsed fragments; they can include, extend and
//!   import each other by name.
//! - [`Renderer`] clones the layout for every request, injects the page
//!   fragment and streams the output to any `std::io::Write`.
//!
//! Templates use [Tera](https://keats.github.io/tera/) syntax.
//!
//! ## Example
//!
//! ```rust
//! use pagecraft_source::MemorySource;
//! use pagecraft_templates::{Composer, Renderer};
//! use serde_json::json;
//!
//! let source = MemorySource::new()
//!     .with_file("base.html", "<main>{% block content %}{% endblock %}</main>");
//!
//! let layout = Composer::new(["*.html"]).unwrap().compose(&source).unwrap();
//! let renderer = Renderer::new(layout);
//!
//! let mut out = Vec::new();
//! renderer
//!     .render_str(
//!         "{% extends \"base.html\" %}{% block content %}{{ msg }}{% endblock %}",
//!         "index.html",
//!         &json!({ "msg": "hi" }),
//!         &mut out,
//!     )
//!     .unwrap();
//! assert_eq!(out, b"<main>hi</main>");
//! ```

pub mod composer;
pub mod error;
pub mod renderer;
pub mod set;

pub use composer::{compose, Composer};
pub use error::{TemplateError, TemplateResult};
pub use renderer::Renderer;
pub use set::{Fragment, TemplateSet};
