//! Template Registry - style id to renderable template
//!
//! A [`Template`] is a pure function from a [`Record`] to a [`Composition`].
//! The [`TemplateRegistry`] only dispatches: templates are registered up
//! front and resolved by style. The built-in library lives in [`builtin`].
//!
//! # Resolution
//!
//! ```text
//!   resolve(style)
//!        │
//!        ├── registered ──────────────► that template
//!        │
//!        └── missing ── debug_assert! ─► simple template (release)
//! ```
//!
//! A blank artifact is never produced: if even the fallback is missing the
//! registry hands out a minimal built-in card.

pub mod builtin;

use std::collections::HashMap;
use std::sync::Arc;

use crate::composition::Composition;
use crate::model::{ArtifactStyle, CanvasSpec, Record};

/// Style-specific layout function
pub trait Template: Send + Sync {
    /// Build the composition for a record. Must be side-effect free.
    fn layout(&self, record: &Record) -> Composition;

    /// Canvas this template lays out on
    fn canvas(&self) -> CanvasSpec;

    /// Short human label
    fn name(&self) -> &str;
}

/// Dispatch table from style to template
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: HashMap<ArtifactStyle, Arc<dyn Template>>,
    fallback: Arc<dyn Template>,
}

impl TemplateRegistry {
    /// Registry with nothing registered
    ///
    /// Resolution still succeeds through the minimal fallback card.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            fallback: Arc::new(builtin::LetterTemplate::new(ArtifactStyle::Simple)),
        }
    }

    /// Registry with the full built-in template library
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        for style in ArtifactStyle::ALL {
            registry.register(style, builtin::template_for(style));
        }
        registry
    }

    /// Register (or replace) the template for a style
    pub fn register(&mut self, style: ArtifactStyle, template: Arc<dyn Template>) {
        if self.templates.insert(style, template).is_some() {
            tracing::debug!(style = %style, "Replaced template registration");
        }
    }

    /// Resolve the template for a style
    ///
    /// An unregistered style is a programming error and trips a debug
    /// assertion; release builds fall back to the `simple` template.
    #[must_use]
    pub fn resolve(&self, style: ArtifactStyle) -> Arc<dyn Template> {
        debug_assert!(
            self.templates.contains_key(&style),
            "no template registered for style {style}"
        );
        self.resolve_lenient(style)
    }

    /// Resolve without the debug assertion
    ///
    /// For styles that come from outside the process (persisted records
    /// from a newer version, hand-edited sidecars).
    #[must_use]
    pub fn resolve_lenient(&self, style: ArtifactStyle) -> Arc<dyn Template> {
        if let Some(template) = self.templates.get(&style) {
            return Arc::clone(template);
        }
        tracing::warn!(style = %style, "No template registered, falling back to simple");
        self.simple()
    }

    /// Resolve a style by its string id
    ///
    /// Unknown ids fall back to the `simple` template.
    #[must_use]
    pub fn resolve_id(&self, id: &str) -> Arc<dyn Template> {
        match id.parse::<ArtifactStyle>() {
            Ok(style) => self.resolve_lenient(style),
            Err(err) => {
                tracing::warn!(error = %err, "Unknown style id, falling back to simple");
                self.simple()
            }
        }
    }

    fn simple(&self) -> Arc<dyn Template> {
        self.templates
            .get(&ArtifactStyle::Simple)
            .map_or_else(|| Arc::clone(&self.fallback), Arc::clone)
    }

    /// Whether a style has its own registration
    #[must_use]
    pub fn contains(&self, style: ArtifactStyle) -> bool {
        self.templates.contains_key(&style)
    }

    /// Registered styles, in catalogue order
    #[must_use]
    pub fn registered_styles(&self) -> Vec<ArtifactStyle> {
        ArtifactStyle::ALL
            .into_iter()
            .filter(|style| self.templates.contains_key(style))
            .collect()
    }

    /// Number of registrations
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("styles", &self.registered_styles())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{layout, Color, Node};
    use crate::model::Draft;

    struct Blank;

    impl Template for Blank {
        fn layout(&self, _record: &Record) -> Composition {
            Composition {
                background: Color::PAPER,
                min_aspect: 1.0,
                root: Node::column(0.0, Vec::new()),
            }
        }

        fn canvas(&self) -> CanvasSpec {
            CanvasSpec::CARD
        }

        fn name(&self) -> &str {
            "blank"
        }
    }

    #[test]
    fn test_builtin_covers_catalogue() {
        let registry = TemplateRegistry::with_builtin();
        assert_eq!(registry.len(), ArtifactStyle::ALL.len());
        assert_eq!(registry.registered_styles(), ArtifactStyle::ALL.to_vec());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TemplateRegistry::with_builtin();
        registry.register(ArtifactStyle::Vault, Arc::new(Blank));
        assert_eq!(registry.resolve(ArtifactStyle::Vault).name(), "blank");
    }

    #[test]
    fn test_partial_registry_falls_back_to_simple() {
        let mut registry = TemplateRegistry::empty();
        registry.register(
            ArtifactStyle::Simple,
            builtin::template_for(ArtifactStyle::Simple),
        );

        let template = registry.resolve_lenient(ArtifactStyle::MusicBox);
        let mut draft = Draft::new();
        draft.content = "hello".to_string();
        let list = layout(&template.layout(&draft.preview()), 350.0);
        assert!(!list.ops.is_empty());
        assert!(list.height > 0.0);
    }

    #[test]
    fn test_unknown_id_resolves_to_simple() {
        let registry = TemplateRegistry::with_builtin();
        assert_eq!(
            registry.resolve_id("hologram").name(),
            registry.resolve(ArtifactStyle::Simple).name()
        );
        assert_eq!(registry.resolve_id("vault").name(), "vault");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no template registered")]
    fn test_strict_resolve_asserts_in_debug() {
        let registry = TemplateRegistry::empty();
        let _ = registry.resolve(ArtifactStyle::Vault);
    }

    #[test]
    fn test_empty_registry_still_resolves() {
        let registry = TemplateRegistry::empty();
        let template = registry.resolve_lenient(ArtifactStyle::Cassette);
        let list = layout(&template.layout(&Draft::new().preview()), 300.0);
        assert!(!list.ops.is_empty());
    }
}
