//! Classifier dispatch and batch aggregation.
//!
//! The manager holds an ordered set of classifiers and resolves each region
//! with a first-match policy: classifiers are consulted in descending
//! priority order and the first verdict that clears the confidence floor
//! wins. Regions nothing can explain fall back to `Unknown`.

use std::cmp::Reverse;

use serde::Serialize;

use crate::classifier::{ClassificationResult, DifferenceType, RegionClassifier};
use crate::consts::DEFAULT_MIN_CONFIDENCE;
use crate::content::ContentClassifier;
use crate::layout::LayoutClassifier;
use crate::region::{AnalysisContext, DifferenceRegion};
use crate::size::SizeClassifier;
use crate::structural::StructuralClassifier;
use crate::style::StyleClassifier;
use crate::ClassificationError;

/// One region together with its resolved classification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionClassification {
    pub region: DifferenceRegion,
    pub classification: ClassificationResult,
    /// Name of the classifier that produced the verdict, or `"none"` for
    /// the fallback.
    pub classifier: String,
}

/// Counts of resolved regions per difference type.
///
/// Wire keys mirror the `type` tag set, so the two multi-word counters stay
/// snake_case unlike the rest of the summary.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TypeCounts {
    pub content: u32,
    pub style: u32,
    pub layout: u32,
    pub size: u32,
    pub structural: u32,
    pub new_element: u32,
    pub removed_element: u32,
    pub unknown: u32,
}

impl TypeCounts {
    fn record(&mut self, kind: DifferenceType) {
        let slot = match kind {
            DifferenceType::Content => &mut self.content,
            DifferenceType::Style => &mut self.style,
            DifferenceType::Layout => &mut self.layout,
            DifferenceType::Size => &mut self.size,
            DifferenceType::Structural => &mut self.structural,
            DifferenceType::NewElement => &mut self.new_element,
            DifferenceType::RemovedElement => &mut self.removed_element,
            DifferenceType::Unknown => &mut self.unknown,
        };
        *slot += 1;
    }

    fn total(&self) -> u32 {
        self.content
            + self.style
            + self.layout
            + self.size
            + self.structural
            + self.new_element
            + self.removed_element
            + self.unknown
    }
}

/// Confidence statistics over the classified (non-unknown) regions.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceStats {
    pub min: f32,
    pub avg: f32,
    pub max: f32,
}

/// Aggregate outcome of classifying a batch of regions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationSummary {
    pub total_regions: u32,
    pub classified_regions: u32,
    pub unclassified_regions: u32,
    pub by_type: TypeCounts,
    pub confidence: ConfidenceStats,
    pub regions: Vec<RegionClassification>,
}

impl ClassificationSummary {
    /// Human-readable one-paragraph summary of the batch.
    #[must_use]
    pub fn summary_text(&self) -> String {
        if self.total_regions == 0 {
            return "No difference regions to classify.".to_owned();
        }
        let mut parts = Vec::new();
        let named: [(&str, u32); 8] = [
            ("content", self.by_type.content),
            ("style", self.by_type.style),
            ("layout", self.by_type.layout),
            ("size", self.by_type.size),
            ("structural", self.by_type.structural),
            ("new element", self.by_type.new_element),
            ("removed element", self.by_type.removed_element),
            ("unknown", self.by_type.unknown),
        ];
        for (label, count) in named {
            if count > 0 {
                parts.push(format!("{count} {label}"));
            }
        }
        let pct = 100.0 * self.classified_regions as f32 / self.total_regions as f32;
        format!(
            "Classified {} of {} difference region(s) ({pct:.0}%): {}. Average confidence {:.2}.",
            self.classified_regions,
            self.total_regions,
            parts.join(", "),
            self.confidence.avg,
        )
    }
}

/// Priority-ordered classifier dispatcher.
pub struct ClassifierManager {
    classifiers: Vec<Box<dyn RegionClassifier>>,
    min_confidence: f32,
}

impl ClassifierManager {
    /// An empty manager: every region resolves to `Unknown` until
    /// classifiers are registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classifiers: Vec::new(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// A manager preloaded with the five built-in classifiers.
    #[must_use]
    pub fn with_default_classifiers() -> Self {
        let mut manager = Self::new();
        manager.register(Box::new(StructuralClassifier::new()));
        manager.register(Box::new(LayoutClassifier::new()));
        manager.register(Box::new(ContentClassifier::new()));
        manager.register(Box::new(StyleClassifier::new()));
        manager.register(Box::new(SizeClassifier::new()));
        manager
    }

    /// Registers a classifier. Dispatch order is descending priority;
    /// classifiers sharing a priority keep their registration order.
    pub fn register(&mut self, classifier: Box<dyn RegionClassifier>) {
        self.classifiers.push(classifier);
        self.classifiers.sort_by_key(|c| Reverse(c.priority()));
    }

    /// Names of the registered classifiers in dispatch order.
    #[must_use]
    pub fn classifier_names(&self) -> Vec<&'static str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }

    /// Sets the confidence floor a verdict must clear to be accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::InvalidConfidenceThreshold`] when
    /// `value` is outside `[0.0, 1.0]` or not finite.
    pub fn set_min_confidence(&mut self, value: f32) -> Result<(), ClassificationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ClassificationError::InvalidConfidenceThreshold { value });
        }
        self.min_confidence = value;
        Ok(())
    }

    #[must_use]
    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Resolves a single region to the first sufficiently confident verdict.
    #[must_use]
    pub fn classify_region(
        &self,
        region: &DifferenceRegion,
        ctx: &AnalysisContext<'_>,
    ) -> RegionClassification {
        for classifier in &self.classifiers {
            if !classifier.can_classify(region, ctx) {
                continue;
            }
            if let Some(result) = classifier.classify(region, ctx) {
                if result.confidence >= self.min_confidence {
                    return RegionClassification {
                        region: region.clone(),
                        classification: result,
                        classifier: classifier.name().to_owned(),
                    };
                }
            }
        }
        RegionClassification {
            region: region.clone(),
            classification: ClassificationResult::unknown(
                "no classifier produced a sufficiently confident result",
            ),
            classifier: "none".to_owned(),
        }
    }

    /// Classifies a batch of regions and aggregates the outcome.
    #[must_use]
    pub fn classify_regions(
        &self,
        regions: &[DifferenceRegion],
        ctx: &AnalysisContext<'_>,
    ) -> ClassificationSummary {
        let resolved: Vec<RegionClassification> = regions
            .iter()
            .map(|region| self.classify_region(region, ctx))
            .collect();

        let mut by_type = TypeCounts::default();
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f32;
        let mut classified = 0u32;
        for rc in &resolved {
            by_type.record(rc.classification.kind);
            if rc.classification.kind != DifferenceType::Unknown {
                classified += 1;
                let c = rc.classification.confidence;
                min = min.min(c);
                max = max.max(c);
                sum += c;
            }
        }
        let confidence = if classified == 0 {
            ConfidenceStats::default()
        } else {
            ConfidenceStats {
                min,
                avg: sum / classified as f32,
                max,
            }
        };

        ClassificationSummary {
            total_regions: resolved.len() as u32,
            classified_regions: classified,
            unclassified_regions: by_type.unknown,
            by_type,
            confidence,
            regions: resolved,
        }
    }
}

impl Default for ClassifierManager {
    fn default() -> Self {
        Self::with_default_classifiers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassificationDetails;
    use crate::region::Bounds;
    use imgref::Img;
    use rgb::RGBA8;

    fn rgba(v: u8) -> RGBA8 {
        RGBA8::new(v, v, v, 255)
    }

    fn uniform(w: usize, h: usize, v: u8) -> Img<Vec<RGBA8>> {
        Img::new(vec![rgba(v); w * h], w, h)
    }

    /// Test double that always answers with a fixed verdict.
    struct Fixed {
        name: &'static str,
        priority: i32,
        confidence: f32,
    }

    impl RegionClassifier for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn can_classify(&self, _: &DifferenceRegion, _: &AnalysisContext<'_>) -> bool {
            true
        }

        fn classify(
            &self,
            _: &DifferenceRegion,
            _: &AnalysisContext<'_>,
        ) -> Option<ClassificationResult> {
            Some(ClassificationResult::new(
                DifferenceType::Content,
                self.confidence,
            ))
        }
    }

    fn any_region() -> DifferenceRegion {
        DifferenceRegion::new(1, Bounds::new(0, 0, 10, 10), 100, 50, 50.0)
    }

    #[test]
    fn test_empty_manager_falls_back_to_unknown() {
        let img = uniform(10, 10, 128);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let manager = ClassifierManager::new();

        let rc = manager.classify_region(&any_region(), &ctx);
        assert_eq!(rc.classification.kind, DifferenceType::Unknown);
        assert_eq!(rc.classifier, "none");
        match rc.classification.details {
            Some(ClassificationDetails::Unclassified { .. }) => {}
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_higher_priority_wins() {
        let img = uniform(10, 10, 128);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let mut manager = ClassifierManager::new();
        manager.register(Box::new(Fixed {
            name: "low",
            priority: 1,
            confidence: 0.9,
        }));
        manager.register(Box::new(Fixed {
            name: "high",
            priority: 10,
            confidence: 0.9,
        }));

        let rc = manager.classify_region(&any_region(), &ctx);
        assert_eq!(rc.classifier, "high");
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let img = uniform(10, 10, 128);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let mut manager = ClassifierManager::new();
        manager.register(Box::new(Fixed {
            name: "first",
            priority: 5,
            confidence: 0.9,
        }));
        manager.register(Box::new(Fixed {
            name: "second",
            priority: 5,
            confidence: 0.9,
        }));

        assert_eq!(manager.classifier_names(), vec!["first", "second"]);
        let rc = manager.classify_region(&any_region(), &ctx);
        assert_eq!(rc.classifier, "first");
    }

    #[test]
    fn test_confidence_floor_skips_weak_verdicts() {
        let img = uniform(10, 10, 128);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let mut manager = ClassifierManager::new();
        manager.register(Box::new(Fixed {
            name: "weak",
            priority: 10,
            confidence: 0.4,
        }));
        manager.register(Box::new(Fixed {
            name: "strong",
            priority: 1,
            confidence: 0.8,
        }));

        let rc = manager.classify_region(&any_region(), &ctx);
        assert_eq!(rc.classifier, "strong");

        // Lowering the floor lets the higher-priority weak verdict through.
        manager.set_min_confidence(0.3).unwrap();
        let rc = manager.classify_region(&any_region(), &ctx);
        assert_eq!(rc.classifier, "weak");
    }

    #[test]
    fn test_raising_floor_above_all_verdicts_yields_unknown() {
        let img = uniform(10, 10, 128);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let mut manager = ClassifierManager::new();
        manager.register(Box::new(Fixed {
            name: "fixed",
            priority: 5,
            confidence: 0.8,
        }));

        let rc = manager.classify_region(&any_region(), &ctx);
        assert_eq!(rc.classifier, "fixed");

        manager.set_min_confidence(0.9).unwrap();
        let rc = manager.classify_region(&any_region(), &ctx);
        assert_eq!(rc.classification.kind, DifferenceType::Unknown);
        assert_eq!(rc.classifier, "none");

        manager.set_min_confidence(0.5).unwrap();
        let rc = manager.classify_region(&any_region(), &ctx);
        assert_eq!(rc.classifier, "fixed");
    }

    #[test]
    fn test_set_min_confidence_rejects_out_of_range() {
        let mut manager = ClassifierManager::new();
        assert!(manager.set_min_confidence(-0.1).is_err());
        assert!(manager.set_min_confidence(1.1).is_err());
        assert!(manager.set_min_confidence(f32::NAN).is_err());
        assert!(manager.set_min_confidence(0.0).is_ok());
        assert!(manager.set_min_confidence(1.0).is_ok());
    }

    #[test]
    fn test_summary_counts_are_consistent() {
        let img = uniform(10, 10, 128);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let mut manager = ClassifierManager::new();
        manager.register(Box::new(Fixed {
            name: "fixed",
            priority: 5,
            confidence: 0.75,
        }));

        let mut other = any_region();
        other.id = 2;
        let summary = manager.classify_regions(&[any_region(), other], &ctx);
        assert_eq!(summary.total_regions, 2);
        assert_eq!(summary.classified_regions, 2);
        assert_eq!(summary.unclassified_regions, 0);
        assert_eq!(summary.by_type.total(), summary.total_regions);
        assert!((summary.confidence.avg - 0.75).abs() < 1e-6);
        assert!((summary.confidence.min - summary.confidence.max).abs() < 1e-6);
    }

    #[test]
    fn test_summary_with_no_regions() {
        let img = uniform(10, 10, 128);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let manager = ClassifierManager::with_default_classifiers();

        let summary = manager.classify_regions(&[], &ctx);
        assert_eq!(summary.total_regions, 0);
        assert_eq!(summary.confidence.avg, 0.0);
        assert_eq!(summary.summary_text(), "No difference regions to classify.");
    }

    #[test]
    fn test_identical_images_resolve_to_unknown() {
        let img = uniform(40, 40, 200);
        let ctx = AnalysisContext::new(img.as_ref(), img.as_ref()).unwrap();
        let manager = ClassifierManager::with_default_classifiers();

        let region = DifferenceRegion::new(1, Bounds::new(0, 0, 40, 40), 1600, 0, 0.0);
        let rc = manager.classify_region(&region, &ctx);
        assert_eq!(rc.classification.kind, DifferenceType::Unknown);
        assert_eq!(rc.classifier, "none");
    }

    #[test]
    fn test_default_dispatch_order() {
        let manager = ClassifierManager::with_default_classifiers();
        assert_eq!(
            manager.classifier_names(),
            vec!["structural", "layout", "content", "style", "size"]
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let a = uniform(40, 40, 255);
        let mut b_pixels = vec![rgba(255); 40 * 40];
        for y in 10..30 {
            for x in 10..30 {
                b_pixels[y * 40 + x] = rgba(80);
            }
        }
        let b = Img::new(b_pixels, 40, 40);
        let ctx = AnalysisContext::new(a.as_ref(), b.as_ref()).unwrap();
        let manager = ClassifierManager::with_default_classifiers();
        let region = DifferenceRegion::new(1, Bounds::new(5, 5, 30, 30), 900, 400, 44.4);

        let first = manager.classify_region(&region, &ctx);
        let second = manager.classify_region(&region, &ctx);
        assert_eq!(first.classifier, second.classifier);
        assert_eq!(first.classification.kind, second.classification.kind);
        assert!(
            (first.classification.confidence - second.classification.confidence).abs() < f32::EPSILON
        );
    }
}
