//! Named fragments sharing one cross-reference namespace.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};

/// A single named unit of template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    name: String,
    source: Arc<str>,
}

impl Fragment {
    pub fn new(name: impl Into<String>, source: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw template text the fragment was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A collection of parsed fragments that can reference each other by name.
///
/// Includes, `extends` and macro imports resolve when a fragment executes,
/// against whichever set it belongs to at that moment. Cloning is cheap on
/// sources (they are shared) and always yields an independent set: adding a
/// fragment to a clone never affects the original.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    primary: String,
    fragments: BTreeMap<String, Fragment>,
    tera: Tera,
}

impl TemplateSet {
    /// Create an empty set whose entry point will be `primary`.
    pub(crate) fn with_primary(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fragments: BTreeMap::new(),
            tera: Tera::default(),
        }
    }

    /// Name of the designated entry-point fragment.
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Look up a fragment by name.
    pub fn get(&self, name: &str) -> TemplateResult<&Fragment> {
        self.fragments
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// All fragment names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.fragments.keys().map(String::as_str).collect()
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Parse `source` and insert it as `name`, replacing any existing fragment.
    ///
    /// On error the set is left exactly as it was.
    pub fn add_fragment(&mut self, name: &str, source: &str) -> TemplateResult<()> {
        let staged = self.clone().with_fragment(name, source)?;
        *self = staged;
        Ok(())
    }

    /// Consuming form of [`add_fragment`](Self::add_fragment).
    pub fn with_fragment(self, name: &str, source: &str) -> TemplateResult<Self> {
        self.with_fragments(vec![Fragment::new(name, source)])
    }

    /// Insert a batch of fragments, linking them in one step.
    ///
    /// Inheritance between members of the batch works regardless of order.
    pub(crate) fn with_fragments(mut self, batch: Vec<Fragment>) -> TemplateResult<Self> {
        if batch.is_empty() {
            return Ok(self);
        }

        let first = batch[0].name.clone();
        self.tera
            .add_raw_templates(batch.iter().map(|f| (f.name.as_str(), f.source())))
            .map_err(|e| {
                let names_offender = matches!(
                    e.kind,
                    tera::ErrorKind::MissingParent { .. } | tera::ErrorKind::CircularExtend { .. }
                );
                match TemplateError::from_tera_add(&first, e) {
                    TemplateError::Link { message, .. } if !names_offender => TemplateError::Link {
                        name: self.link_offender(&batch).unwrap_or_else(|| first.clone()),
                        message,
                    },
                    other => other,
                }
            })?;

        for fragment in batch {
            debug!("Registered fragment {}", fragment.name);
            self.fragments.insert(fragment.name.clone(), fragment);
        }

        Ok(self)
    }

    /// Find the batch member whose references fail to link.
    ///
    /// Each candidate is linked alone against empty stand-ins for every other
    /// name, so only its own imports can be missing.
    fn link_offender(&self, batch: &[Fragment]) -> Option<String> {
        let mut names: BTreeSet<&str> = self.fragments.keys().map(String::as_str).collect();
        names.extend(batch.iter().map(|f| f.name.as_str()));

        batch
            .iter()
            .find(|candidate| {
                let stubs = names
                    .iter()
                    .filter(|name| **name != candidate.name)
                    .map(|name| (*name, ""));
                let mut scratch = Tera::default();
                scratch
                    .add_raw_templates(
                        stubs.chain(std::iter::once((candidate.name.as_str(), candidate.source()))),
                    )
                    .is_err()
            })
            .map(|f| f.name.clone())
    }

    /// Execute fragment `name` against `data`, streaming output to `sink`.
    ///
    /// `data` must serialize to a map. Output already written when an error
    /// occurs stays written.
    pub fn execute<T, W>(&self, name: &str, data: &T, sink: W) -> TemplateResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        if !self.contains(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        let context = Context::from_serialize(data).map_err(|e| TemplateError::Execution {
            name: name.to_string(),
            source: e,
        })?;

        self.execute_context(name, &context, sink)
    }

    /// Like [`execute`](Self::execute) with a prepared Tera context.
    pub fn execute_context<W: Write>(
        &self,
        name: &str,
        context: &Context,
        sink: W,
    ) -> TemplateResult<()> {
        if !self.contains(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        self.tera
            .render_to(name, context, sink)
            .map_err(|e| TemplateError::Execution {
                name: name.to_string(),
                source: e,
            })
    }

    /// Execute into a `String`.
    pub fn execute_to_string<T>(&self, name: &str, data: &T) -> TemplateResult<String>
    where
        T: Serialize + ?Sized,
    {
        let mut out = Vec::new();
        self.execute(name, data, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Check a fragment's syntax in isolation.
///
/// Only syntax errors are reported; references to fragments that are not
/// loaded yet are resolved later, when the whole batch is linked.
pub(crate) fn check_syntax(name: &str, source: &str) -> TemplateResult<()> {
    let mut scratch = Tera::default();
    match scratch.add_raw_template(name, source) {
        Ok(()) => Ok(()),
        Err(e) => match TemplateError::from_tera_add(name, e) {
            err @ TemplateError::Parse { .. } => Err(err),
            _ => Ok(()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layout() -> TemplateSet {
        TemplateSet::with_primary("base.html")
            .with_fragments(vec![
                Fragment::new("base.html", "<main>{% include \"page\" %}</main>"),
                Fragment::new("page", "default"),
            ])
            .unwrap()
    }

    #[test]
    fn test_names_sorted() {
        let set = layout();
        assert_eq!(set.names(), vec!["base.html", "page"]);
        assert_eq!(set.primary(), "base.html");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let set = layout();
        assert!(matches!(set.get("nope"), Err(TemplateError::NotFound(n)) if n == "nope"));
        assert_eq!(set.get("page").unwrap().source(), "default");
    }

    #[test]
    fn test_clone_isolation() {
        let set = layout();
        let mut clone = set.clone();
        clone.add_fragment("x", "extra").unwrap();
        clone.add_fragment("page", "overridden").unwrap();

        assert!(!set.contains("x"));
        assert_eq!(set.names(), vec!["base.html", "page"]);
        assert_eq!(
            set.execute_to_string("base.html", &json!({})).unwrap(),
            "<main>default</main>"
        );
        assert_eq!(
            clone.execute_to_string("base.html", &json!({})).unwrap(),
            "<main>overridden</main>"
        );
    }

    #[test]
    fn test_failed_add_leaves_set_unchanged() {
        let mut set = layout();
        let err = set.add_fragment("page", "{% if %}").unwrap_err();
        assert!(err.is_parse());
        assert_eq!(set.get("page").unwrap().source(), "default");
    }

    #[test]
    fn test_missing_parent_is_link_error() {
        let mut set = layout();
        let err = set
            .add_fragment("child.html", "{% extends \"missing.html\" %}")
            .unwrap_err();
        assert!(matches!(err, TemplateError::Link { name, .. } if name == "child.html"));
        assert!(!set.contains("child.html"));
    }

    #[test]
    fn test_missing_macro_import_names_importer() {
        let err = TemplateSet::with_primary("a.html")
            .with_fragments(vec![
                Fragment::new("a.html", "fine"),
                Fragment::new("b.html", "{% import \"macros.html\" as m %}{{ m::x() }}"),
            ])
            .unwrap_err();
        assert!(matches!(err, TemplateError::Link { ref name, .. } if name == "b.html"));
    }

    #[test]
    fn test_execute_missing_include_fails() {
        let mut set = layout();
        set.add_fragment("broken.html", "{% include \"nowhere\" %}")
            .unwrap();
        let err = set.execute_to_string("broken.html", &json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::Execution { .. }));
    }

    #[test]
    fn test_execute_rejects_non_map_data() {
        let set = layout();
        let err = set.execute_to_string("page", &42).unwrap_err();
        assert!(matches!(err, TemplateError::Execution { .. }));
    }

    #[test]
    fn test_check_syntax_ignores_unresolved_parent() {
        assert!(check_syntax("child.html", "{% extends \"base.html\" %}").is_ok());
        assert!(check_syntax("bad.html", "{{ unclosed").unwrap_err().is_parse());
    }
}
