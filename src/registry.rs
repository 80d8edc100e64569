//! Construction of classifiers by tag.
//!
//! The registry maps short string tags to constructor functions so callers
//! can build classifier sets from configuration. Registering a tag twice
//! replaces the earlier constructor; iteration order is otherwise the order
//! of first registration.

use crate::classifier::RegionClassifier;
use crate::content::ContentClassifier;
use crate::layout::LayoutClassifier;
use crate::size::SizeClassifier;
use crate::structural::StructuralClassifier;
use crate::style::StyleClassifier;

/// Options forwarded to a classifier constructor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierOptions {
    /// Overrides the classifier's built-in priority when set.
    pub priority: Option<i32>,
}

/// Builds a classifier from options.
pub type ClassifierConstructor = fn(&ClassifierOptions) -> Box<dyn RegionClassifier>;

/// Tag-to-constructor registry with last-write-wins registration.
pub struct ClassifierRegistry {
    entries: Vec<(&'static str, ClassifierConstructor)>,
}

impl ClassifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A registry preloaded with the five built-in classifier tags.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("content", |opts| {
            Box::new(apply_priority(ContentClassifier::new(), opts, ContentClassifier::with_priority))
        });
        registry.register("style", |opts| {
            Box::new(apply_priority(StyleClassifier::new(), opts, StyleClassifier::with_priority))
        });
        registry.register("layout", |opts| {
            Box::new(apply_priority(LayoutClassifier::new(), opts, LayoutClassifier::with_priority))
        });
        registry.register("size", |opts| {
            Box::new(apply_priority(SizeClassifier::new(), opts, SizeClassifier::with_priority))
        });
        registry.register("structural", |opts| {
            Box::new(apply_priority(
                StructuralClassifier::new(),
                opts,
                StructuralClassifier::with_priority,
            ))
        });
        registry
    }

    /// Registers `constructor` under `tag`, replacing any earlier entry for
    /// the same tag in place.
    pub fn register(&mut self, tag: &'static str, constructor: ClassifierConstructor) {
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == tag) {
            entry.1 = constructor;
        } else {
            self.entries.push((tag, constructor));
        }
    }

    /// Builds the classifier registered under `tag`, or `None` for an
    /// unknown tag.
    #[must_use]
    pub fn create(
        &self,
        tag: &str,
        options: &ClassifierOptions,
    ) -> Option<Box<dyn RegionClassifier>> {
        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, constructor)| constructor(options))
    }

    /// Builds one of every registered classifier, in registration order.
    #[must_use]
    pub fn create_all(&self, options: &ClassifierOptions) -> Vec<Box<dyn RegionClassifier>> {
        self.entries
            .iter()
            .map(|(_, constructor)| constructor(options))
            .collect()
    }

    /// Registered tags in registration order.
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(tag, _)| *tag).collect()
    }
}

impl Default for ClassifierRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn apply_priority<C>(classifier: C, options: &ClassifierOptions, with: fn(C, i32) -> C) -> C {
    match options.priority {
        Some(priority) => with(classifier, priority),
        None => classifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassificationResult, RegionClassifier};
    use crate::region::{AnalysisContext, DifferenceRegion};

    struct Inert(i32);

    impl RegionClassifier for Inert {
        fn name(&self) -> &'static str {
            "inert"
        }

        fn priority(&self) -> i32 {
            self.0
        }

        fn can_classify(&self, _: &DifferenceRegion, _: &AnalysisContext<'_>) -> bool {
            false
        }

        fn classify(
            &self,
            _: &DifferenceRegion,
            _: &AnalysisContext<'_>,
        ) -> Option<ClassificationResult> {
            None
        }
    }

    #[test]
    fn test_default_tags() {
        let registry = ClassifierRegistry::with_defaults();
        assert_eq!(
            registry.tags(),
            vec!["content", "style", "layout", "size", "structural"]
        );
    }

    #[test]
    fn test_create_known_and_unknown() {
        let registry = ClassifierRegistry::with_defaults();
        let options = ClassifierOptions::default();
        let layout = registry.create("layout", &options).unwrap();
        assert_eq!(layout.name(), "layout");
        assert!(registry.create("nonsense", &options).is_none());
    }

    #[test]
    fn test_priority_override() {
        let registry = ClassifierRegistry::with_defaults();
        let classifier = registry
            .create(
                "content",
                &ClassifierOptions {
                    priority: Some(42),
                },
            )
            .unwrap();
        assert_eq!(classifier.priority(), 42);
    }

    #[test]
    fn test_last_registration_wins_in_place() {
        let mut registry = ClassifierRegistry::with_defaults();
        registry.register("style", |_| Box::new(Inert(99)));
        // Tag order is unchanged, but the constructor is replaced.
        assert_eq!(
            registry.tags(),
            vec!["content", "style", "layout", "size", "structural"]
        );
        let replaced = registry
            .create("style", &ClassifierOptions::default())
            .unwrap();
        assert_eq!(replaced.name(), "inert");
        assert_eq!(replaced.priority(), 99);
    }

    #[test]
    fn test_create_all_in_registration_order() {
        let registry = ClassifierRegistry::with_defaults();
        let all = registry.create_all(&ClassifierOptions::default());
        let names: Vec<&str> = all.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["content", "style", "layout", "size", "structural"]);
    }
}
