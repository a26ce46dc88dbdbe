//! Integration tests for composition and rendering.

use std::fs;
use std::sync::Arc;
use std::thread;

use pagecraft_source::{DiskSource, FileSource, MemorySource};
use pagecraft_templates::{Composer, Renderer, TemplateError, TemplateSet};
use serde_json::json;
use tempfile::tempdir;

fn site() -> MemorySource {
    MemorySource::new()
        .with_file(
            "base.html",
            "<html><body>{% include \"page\" %}</body></html>",
        )
        .with_file("partials/nav.html", "<nav>{{ site }}</nav>")
        .with_file("partials/macros.html", "{% macro shout(text) %}{{ text | upper }}!{% endmacro %}")
        .with_file("README.md", "# not a template")
}

fn layout() -> TemplateSet {
    Composer::new(["*.html"]).unwrap().compose(&site()).unwrap()
}

#[test]
fn test_composition_is_deterministic() {
    let first = layout();
    let second = layout();

    assert_eq!(first.names(), second.names());
    assert_eq!(first.primary(), second.primary());
    assert_eq!(first.primary(), "base.html");
    assert_eq!(
        first.names(),
        vec!["base.html", "partials/macros.html", "partials/nav.html"]
    );
}

#[test]
fn test_disk_and_memory_compose_identically() {
    let temp = tempdir().unwrap();
    let memory = site();
    for entry in memory.list("").unwrap().into_iter().filter(|e| !e.is_dir) {
        let target = temp.path().join(&entry.path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, memory.read(&entry.path).unwrap()).unwrap();
    }

    let composer = Composer::new(["*.html"]).unwrap();
    let from_disk = composer.compose(&DiskSource::new(temp.path())).unwrap();
    let from_memory = composer.compose(&memory).unwrap();

    assert_eq!(from_disk.names(), from_memory.names());
    assert_eq!(from_disk.primary(), from_memory.primary());
}

#[test]
fn test_clone_isolation() {
    let layout = layout();
    let before: Vec<String> = layout.names().into_iter().map(String::from).collect();

    let mut clone = layout.clone();
    clone.add_fragment("x", "extra").unwrap();

    let after: Vec<String> = layout.names().into_iter().map(String::from).collect();
    assert_eq!(before, after);
    assert!(!layout.contains("x"));
    assert!(clone.contains("x"));
}

#[test]
fn test_override_seen_by_callers() {
    let composer = Composer::new(["*.html"]).unwrap();
    let base = composer
        .compose(
            &MemorySource::new()
                .with_file("index.html", "original")
                .with_file("wrapper.html", "<div>{% include \"index.html\" %}</div>"),
        )
        .unwrap();

    let overridden = composer
        .extend(&base, &MemorySource::new().with_file("index.html", "specialized"))
        .unwrap();

    assert_eq!(overridden.primary(), "index.html");
    assert_eq!(overridden.get("index.html").unwrap().source(), "specialized");
    assert_eq!(
        overridden.execute_to_string("wrapper.html", &json!({})).unwrap(),
        "<div>specialized</div>"
    );
    assert_eq!(base.get("index.html").unwrap().source(), "original");
}

#[test]
fn test_render_round_trip() {
    let renderer = Renderer::new(layout());
    let mut out = Vec::new();
    renderer
        .render_str("<p>{{ msg }}</p>", "page", &json!({ "msg": "hi" }), &mut out)
        .unwrap();

    let html = String::from_utf8(out).unwrap();
    assert!(html.contains("hi"));
    assert!(!html.contains("{{"));
}

#[test]
fn test_page_can_use_layout_fragments() {
    let renderer = Renderer::new(layout());
    let pages = MemorySource::new().with_file(
        "pages/home.html",
        "{% import \"partials/macros.html\" as m %}{% include \"partials/nav.html\" %}{{ m::shout(text=msg) }}",
    );

    let mut out = Vec::new();
    renderer
        .render(
            &pages,
            "pages/home.html",
            &json!({ "site": "pagecraft", "msg": "hello" }),
            &mut out,
        )
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<nav>pagecraft</nav>HELLO!"
    );
}

#[test]
fn test_render_as_injects_under_target_name() {
    let renderer = Renderer::new(layout());
    let pages = MemorySource::new().with_file("about.html", "<p>about {{ who }}</p>");

    let mut out = Vec::new();
    renderer
        .render_as(&pages, "about.html", "page", &json!({ "who": "us" }), &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "<p>about us</p>");
}

#[test]
fn test_error_surfacing() {
    let mut out = Vec::new();
    let err = Renderer::empty()
        .render_str("x", "page", &json!({}), &mut out)
        .unwrap_err();
    assert!(matches!(err, TemplateError::EmptyLayout));
    assert!(out.is_empty());

    let temp = tempdir().unwrap();
    let err = Renderer::new(layout())
        .render(
            &DiskSource::new(temp.path()),
            "missing.html",
            &json!({}),
            &mut out,
        )
        .unwrap_err();
    assert!(matches!(err, TemplateError::Source(_)));
    assert!(out.is_empty());
}

#[test]
fn test_execution_error_surfaces() {
    let renderer = Renderer::new(layout());
    let mut out = Vec::new();
    let err = renderer
        .render_str(
            "before{% include \"does-not-exist.html\" %}",
            "page",
            &json!({}),
            &mut out,
        )
        .unwrap_err();
    assert!(matches!(err, TemplateError::Execution { .. }));
}

#[test]
fn test_parse_failure_returns_no_set() {
    let source = site().with_file("partials/broken.html", "{% block %}");
    let err = Composer::new(["*.html"]).unwrap().compose(&source).unwrap_err();
    match err {
        TemplateError::Parse { path, .. } => assert_eq!(path, "partials/broken.html"),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn test_concurrent_renders_share_layout() {
    let renderer = Renderer::new(Arc::new(layout()));

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let renderer = renderer.clone();
                scope.spawn(move || {
                    let mut out = Vec::new();
                    renderer
                        .render_str(
                            "{{ n }}",
                            &format!("page-{i}"),
                            &json!({ "n": i }),
                            &mut out,
                        )
                        .unwrap();
                    String::from_utf8(out).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), i.to_string());
        }
    });

    let layout = renderer.layout().unwrap();
    assert!(layout.names().iter().all(|n| !n.starts_with("page-")));
}
