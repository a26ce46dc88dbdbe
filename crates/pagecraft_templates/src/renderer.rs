//! Per-request rendering against a shared layout.

use std::io::Write;
use std::sync::Arc;

use pagecraft_source::FileSource;
use serde::Serialize;
use tracing::debug;

use crate::composer::Composer;
use crate::error::{TemplateError, TemplateResult};
use crate::set::TemplateSet;

/// Renders page fragments against an immutable layout.
///
/// The layout is shared behind an `Arc` and never modified: every render
/// works on its own clone, so any number of renders may run concurrently.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    layout: Option<Arc<TemplateSet>>,
}

impl Renderer {
    /// Create a renderer over a composed layout.
    pub fn new(layout: impl Into<Arc<TemplateSet>>) -> Self {
        Self {
            layout: Some(layout.into()),
        }
    }

    /// A renderer with no layout. Every render fails with
    /// [`TemplateError::EmptyLayout`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compose a layout from `source` and wrap it in a renderer.
    pub fn from_source<S: AsRef<str>>(
        source: &dyn FileSource,
        patterns: &[S],
    ) -> TemplateResult<Self> {
        let layout = Composer::new(patterns)?.compose(source)?;
        Ok(Self::new(layout))
    }

    pub fn layout(&self) -> Option<&Arc<TemplateSet>> {
        self.layout.as_ref()
    }

    fn require_layout(&self) -> TemplateResult<&Arc<TemplateSet>> {
        self.layout.as_ref().ok_or(TemplateError::EmptyLayout)
    }

    /// Render the page at `path`, registering it under its own path.
    ///
    /// Fails with the same errors as [`render_as`](Self::render_as).
    pub fn render<T, W>(
        &self,
        source: &dyn FileSource,
        path: &str,
        data: &T,
        sink: W,
    ) -> TemplateResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        self.render_as(source, path, path, data, sink)
    }

    /// Read the page at `path`, register it as `target_name` in a clone of the
    /// layout and execute `target_name`.
    ///
    /// Nothing is written to `sink` unless execution starts. Before that point
    /// the page can fail with [`TemplateError::Source`] when it cannot be read,
    /// [`TemplateError::Parse`] when its text is malformed, and
    /// [`TemplateError::Link`] when it `extends` or imports macros from a
    /// fragment the layout does not have.
    pub fn render_as<T, W>(
        &self,
        source: &dyn FileSource,
        path: &str,
        target_name: &str,
        data: &T,
        sink: W,
    ) -> TemplateResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        let layout = self.require_layout()?;
        let text = source.read_to_string(path)?;
        debug!("Read page {} from {} source", path, source.kind());
        Self::inject_and_execute(layout, &text, target_name, data, sink)
    }

    /// Like [`render_as`](Self::render_as) with the fragment text given directly.
    pub fn render_str<T, W>(
        &self,
        fragment: &str,
        target_name: &str,
        data: &T,
        sink: W,
    ) -> TemplateResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        let layout = self.require_layout()?;
        Self::inject_and_execute(layout, fragment, target_name, data, sink)
    }

    /// Execute a fragment that is already part of the layout.
    pub fn render_named<T, W>(&self, name: &str, data: &T, sink: W) -> TemplateResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        self.require_layout()?.execute(name, data, sink)
    }

    fn inject_and_execute<T, W>(
        layout: &TemplateSet,
        fragment: &str,
        target_name: &str,
        data: &T,
        sink: W,
    ) -> TemplateResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        debug!("Rendering {} against layout {}", target_name, layout.primary());
        let page = layout.clone().with_fragment(target_name, fragment)?;
        page.execute(target_name, data, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_source::MemorySource;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Page {
        msg: String,
    }

    fn renderer() -> Renderer {
        let source = MemorySource::new()
            .with_file("layout.html", "<body>{% include \"page\" %}</body>")
            .with_file("partials/title.html", "<h1>{{ title | default(value=\"Home\") }}</h1>");
        Renderer::from_source(&source, &["*.html"]).unwrap()
    }

    #[test]
    fn test_render_str_round_trip() {
        let renderer = renderer();
        let mut out = Vec::new();
        renderer
            .render_str(
                "<p>{{ msg }}</p>",
                "page",
                &Page {
                    msg: "hi".to_string(),
                },
                &mut out,
            )
            .unwrap();
        assert_eq!(out, b"<p>hi</p>");
        assert!(!String::from_utf8_lossy(&out).contains("{{"));
    }

    #[test]
    fn test_page_extends_layout() {
        let source = MemorySource::new().with_file(
            "base.html",
            "<html>{% block content %}{% endblock %}{% include \"partials/footer.html\" %}</html>",
        );
        let layout = Composer::new(["*.html"]).unwrap().compose(&source).unwrap();
        let layout = layout
            .with_fragment("partials/footer.html", "<footer>{{ year }}</footer>")
            .unwrap();
        let renderer = Renderer::new(layout);

        let mut out = Vec::new();
        renderer
            .render_str(
                "{% extends \"base.html\" %}{% block content %}<p>{{ msg }}</p>{% endblock %}",
                "pages/about.html",
                &json!({ "msg": "hi", "year": 2024 }),
                &mut out,
            )
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<html><p>hi</p><footer>2024</footer></html>"
        );
    }

    #[test]
    fn test_render_leaves_layout_untouched() {
        let renderer = renderer();
        renderer
            .render_str("{{ msg }}", "page", &json!({ "msg": "x" }), &mut Vec::new())
            .unwrap();

        let layout = renderer.layout().unwrap();
        assert!(!layout.contains("page"));
        assert_eq!(layout.names(), vec!["layout.html", "partials/title.html"]);
    }

    #[test]
    fn test_empty_layout_writes_nothing() {
        let renderer = Renderer::empty();
        let mut out = Vec::new();
        let err = renderer
            .render_str("hello", "page", &json!({}), &mut out)
            .unwrap_err();
        assert!(matches!(err, TemplateError::EmptyLayout));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_page_is_source_error() {
        let renderer = renderer();
        let pages = MemorySource::new();
        let mut out = Vec::new();
        let err = renderer
            .render(&pages, "pages/missing.html", &json!({}), &mut out)
            .unwrap_err();
        assert!(matches!(err, TemplateError::Source(ref e) if e.is_not_found()));
        assert!(out.is_empty());
    }

    #[test]
    fn test_page_extending_missing_parent_is_link_error() {
        let renderer = renderer();
        let pages =
            MemorySource::new().with_file("orphan.html", "{% extends \"missing.html\" %}");
        let mut out = Vec::new();
        let err = renderer
            .render(&pages, "orphan.html", &json!({}), &mut out)
            .unwrap_err();
        assert!(matches!(err, TemplateError::Link { ref name, .. } if name == "orphan.html"));
        assert!(out.is_empty());
        assert!(!renderer.layout().unwrap().contains("orphan.html"));
    }

    #[test]
    fn test_page_parse_error() {
        let renderer = renderer();
        let err = renderer
            .render_str("{% if %}", "page", &json!({}), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, TemplateError::Parse { ref path, .. } if path == "page"));
    }

    #[test]
    fn test_render_named_uses_layout_fragment() {
        let renderer = renderer();
        let mut out = Vec::new();
        renderer
            .render_named("partials/title.html", &json!({ "title": "About" }), &mut out)
            .unwrap();
        assert_eq!(out, b"<h1>About</h1>");
    }
}
