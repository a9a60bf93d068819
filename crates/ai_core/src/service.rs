//! Request-scoped prediction pipeline

use crate::context::InferenceContext;
use crate::errors::Result;
use forestsathi_types::{EcologicalZone, Location, PredictionResult, ZoneSource};
use std::sync::Arc;
use tracing::debug;

/// Cheap to clone; clones share the same immutable context.
#[derive(Debug, Clone)]
pub struct PredictionService {
    context: Arc<InferenceContext>,
}

impl PredictionService {
    pub fn new(context: InferenceContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    pub fn from_shared(context: Arc<InferenceContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &InferenceContext {
        &self.context
    }

    /// Bounds, zone, features, prediction, insight. The first failure ends
    /// the request.
    pub fn predict(&self, location: &Location, month: u8) -> Result<PredictionResult> {
        let ctx = &*self.context;

        let (zone, zone_source) = self.zone(location)?;

        let stats = ctx.stats.stats_for(zone);
        let vector = ctx.features.build(zone, month, Some(stats))?;
        debug!(features = ?vector.values(), "feature vector built");

        let (probabilities, predicted_label) = ctx.classifier.classify(&vector)?;
        let insight = ctx.composer.compose(zone, &probabilities, stats, month)?;

        debug!(%zone, %predicted_label, month, "prediction complete");

        Ok(PredictionResult {
            zone,
            zone_source,
            probabilities,
            predicted_label,
            confidence: probabilities.confidence(),
            insight,
            region_stats: stats.clone(),
            model_version: ctx.classifier.model_version().to_string(),
        })
    }

    /// Zone assignment only, after the bounds check.
    pub fn zone(&self, location: &Location) -> Result<(EcologicalZone, ZoneSource)> {
        self.context.zones.assign(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::fixtures;
    use forestsathi_types::RiskLabel;

    fn service() -> PredictionService {
        PredictionService::new(fixtures::context().unwrap())
    }

    #[test]
    fn terai_in_march() {
        let result = service()
            .predict(&Location::with_elevation(26.6, 87.9, 120.0), 3)
            .unwrap();
        assert_eq!(result.zone, EcologicalZone::Terai);
        assert_eq!(result.zone_source, ZoneSource::Elevation);
        assert_eq!(result.predicted_label, RiskLabel::High);
        assert!(result
            .insight
            .narrative
            .contains("agricultural/grassland burning"));
        assert_eq!(result.model_version, fixtures::MODEL_VERSION);
        assert_eq!(result.confidence, result.probabilities.confidence());
    }

    #[test]
    fn himalaya_in_april_is_within_window() {
        let result = service()
            .predict(&Location::with_elevation(27.9, 86.9, 3500.0), 4)
            .unwrap();
        assert_eq!(result.zone, EcologicalZone::Himalaya);
        assert_eq!(result.insight.peak_month, Some(4));
        assert!(result.insight.within_high_risk_window);
        assert!(result
            .insight
            .narrative
            .contains("falls within the zone's historical high-risk window"));
    }

    #[test]
    fn coordinate_fallback_is_reported() {
        let result = service().predict(&Location::new(27.7172, 85.3240), 7).unwrap();
        assert_eq!(result.zone, EcologicalZone::Mahabharat);
        assert_eq!(result.zone_source, ZoneSource::CoordinateLookup);
        assert_eq!(result.predicted_label, RiskLabel::Low);
    }

    #[test]
    fn failures_short_circuit_with_typed_errors() {
        let service = service();
        let outside = service
            .predict(&Location::with_elevation(35.0, 85.0, 100.0), 3)
            .unwrap_err();
        assert_eq!(outside.kind(), ErrorKind::OutOfBounds);

        // bounds are checked before the month
        let outside_bad_month = service
            .predict(&Location::with_elevation(35.0, 85.0, 100.0), 13)
            .unwrap_err();
        assert_eq!(outside_bad_month.kind(), ErrorKind::OutOfBounds);

        let bad_month = service
            .predict(&Location::with_elevation(27.0, 85.0, 100.0), 0)
            .unwrap_err();
        assert_eq!(bad_month.kind(), ErrorKind::Validation);
    }

    #[test]
    fn clones_share_context() {
        let a = service();
        let b = a.clone();
        assert!(std::ptr::eq(a.context(), b.context()));
    }
}
