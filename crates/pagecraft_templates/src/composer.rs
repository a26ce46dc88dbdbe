//! Discovery of template fragments and their composition into a set.
//!
//! Composition walks a [`FileSource`] in its fixed pre-order, keeps files
//! whose base name matches one of the glob patterns, and registers each under
//! its full relative path. The first match becomes the set's primary fragment.

use glob::Pattern;
use pagecraft_source::{FileSource, SourceEntry};
use tracing::{debug, info, warn};

use crate::error::{TemplateError, TemplateResult};
use crate::set::{check_syntax, Fragment, TemplateSet};

/// Builds [`TemplateSet`]s from file sources.
#[derive(Debug, Clone)]
pub struct Composer {
    patterns: Vec<Pattern>,
    root: String,
}

impl Composer {
    /// Create a composer for the given base-name glob patterns.
    pub fn new<I, S>(patterns: I) -> TemplateResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|source| TemplateError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<TemplateResult<Vec<_>>>()?;

        if patterns.is_empty() {
            return Err(TemplateError::NoPatterns);
        }

        Ok(Self {
            patterns,
            root: String::new(),
        })
    }

    /// Only walk below `root` instead of the whole source.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }

    /// Whether a base name matches any pattern.
    pub fn matches(&self, base_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(base_name))
    }

    /// Compose a fresh set from `source`.
    ///
    /// Fails with [`TemplateError::EmptySet`] when nothing matches.
    pub fn compose(&self, source: &dyn FileSource) -> TemplateResult<TemplateSet> {
        let fragments = self.discover(source)?;

        let Some(first) = fragments.first() else {
            return Err(TemplateError::EmptySet);
        };

        let primary = first.name().to_string();
        let set = TemplateSet::with_primary(&primary).with_fragments(fragments)?;

        info!(
            "Composed {} fragment(s) from {} source, primary {}",
            set.len(),
            source.kind(),
            primary
        );
        Ok(set)
    }

    /// Compose `source` on top of an existing set, returning a new set.
    ///
    /// A file named like `base`'s primary replaces the primary's body; any
    /// other file is added or replaces the fragment of the same name. `base`
    /// itself is never modified.
    pub fn extend(
        &self,
        base: &TemplateSet,
        source: &dyn FileSource,
    ) -> TemplateResult<TemplateSet> {
        let fragments = self.discover(source)?;

        if fragments.is_empty() {
            warn!(
                "No templates matched in {} source, keeping {} unchanged",
                source.kind(),
                base.primary()
            );
            return Ok(base.clone());
        }

        for fragment in &fragments {
            if fragment.name() == base.primary() {
                info!("Overriding primary fragment {}", fragment.name());
            } else if base.contains(fragment.name()) {
                debug!("Replacing fragment {}", fragment.name());
            }
        }

        let count = fragments.len();
        let set = base.clone().with_fragments(fragments)?;
        info!("Extended {} with {} fragment(s)", set.primary(), count);
        Ok(set)
    }

    fn discover(&self, source: &dyn FileSource) -> TemplateResult<Vec<Fragment>> {
        let mut fragments = Vec::new();

        for entry in source.list(&self.root)? {
            if entry.is_dir {
                continue;
            }
            if !self.matches(entry.base_name()) {
                debug!("Skipping {} (no pattern matched)", entry.path);
                continue;
            }
            fragments.push(self.load(source, &entry)?);
        }

        Ok(fragments)
    }

    fn load(&self, source: &dyn FileSource, entry: &SourceEntry) -> TemplateResult<Fragment> {
        let text = source.read_to_string(&entry.path)?;
        check_syntax(&entry.path, &text)?;
        debug!("Loaded fragment {}", entry.path);
        Ok(Fragment::new(entry.path.as_str(), text))
    }
}

/// Compose `source` with `patterns` in one call.
pub fn compose<S: AsRef<str>>(
    source: &dyn FileSource,
    patterns: &[S],
) -> TemplateResult<TemplateSet> {
    Composer::new(patterns)?.compose(source)
}
