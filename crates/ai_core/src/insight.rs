//! Narrative insight for a prediction
//!
//! Output is fully determined by the inputs; sentences are assembled from
//! fixed templates in a fixed order.

use crate::errors::{Result, RiskError};
use forestsathi_types::{
    is_valid_month, month_name, ClassProbabilities, EcologicalZone, Insight, RegionStats, Season,
};
use std::fmt::Write as _;

/// Default fraction of the peak frequency a month needs to be in the
/// high-risk window.
pub const DEFAULT_WINDOW_RATIO: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct InsightComposer {
    window_ratio: f64,
    national_detections: u64,
}

impl Default for InsightComposer {
    fn default() -> Self {
        Self {
            window_ratio: DEFAULT_WINDOW_RATIO,
            national_detections: 0,
        }
    }
}

impl InsightComposer {
    /// `window_ratio` must lie in `(0, 1]`; other values fall back to the
    /// default. Config validation rejects them before this point.
    pub fn new(window_ratio: f64, national_detections: u64) -> Self {
        let window_ratio = if window_ratio.is_finite() && window_ratio > 0.0 && window_ratio <= 1.0 {
            window_ratio
        } else {
            DEFAULT_WINDOW_RATIO
        };
        Self {
            window_ratio,
            national_detections,
        }
    }

    pub fn window_ratio(&self) -> f64 {
        self.window_ratio
    }

    pub fn compose(
        &self,
        zone: EcologicalZone,
        probabilities: &ClassProbabilities,
        stats: &RegionStats,
        month: u8,
    ) -> Result<Insight> {
        let (season, month_label) = match (Season::from_month(month), month_name(month)) {
            (Some(season), Some(name)) => (season, name),
            _ => {
                return Err(RiskError::Validation(format!(
                    "month must be between 1 and 12, got {month}"
                )))
            }
        };

        let label = probabilities.predicted_label();
        let confidence = probabilities.confidence();
        let dominant = stats.dominant_cause();
        let dominant_share = stats.dominant_cause_share();
        let peak_month = stats.peak_month();
        let window = stats.high_risk_window(self.window_ratio);
        let within = window.contains(&month);
        let zone_share = if self.national_detections > 0 {
            Some(stats.total_historical_fires as f64 / self.national_detections as f64)
        } else {
            None
        };

        let mut narrative = String::new();
        let _ = write!(
            narrative,
            "{label} fire risk predicted for the {zone} zone ({}) in {month_label}, with {:.0}% confidence.",
            zone.elevation_band(),
            confidence * 100.0
        );

        match dominant {
            Some(cause) => {
                let _ = write!(
                    narrative,
                    " Historically the dominant ignition source here is {}",
                    cause.cause
                );
                match dominant_share {
                    Some(share) => {
                        let _ = write!(
                            narrative,
                            " ({:.0}% of attributed causes; {} detections recorded).",
                            share * 100.0,
                            group_thousands(stats.total_historical_fires)
                        );
                    }
                    None => narrative.push('.'),
                }
            }
            None => narrative.push_str(" No dominant ignition source is recorded for this zone."),
        }

        match peak_month.and_then(month_name) {
            Some(peak_name) => {
                let position = if within { "within" } else { "outside" };
                let _ = write!(
                    narrative,
                    " {month_label} falls {position} the zone's historical high-risk window ({}), which peaks in {peak_name}.",
                    render_window(&window)
                );
            }
            None => narrative.push_str(" No seasonal fire history is recorded for this zone."),
        }

        narrative.push(' ');
        narrative.push_str(season.description());
        narrative.push(' ');
        narrative.push_str(zone_context(zone));

        let intensity = stats.fire_intensity();
        if let Some(level) = intensity {
            let averages = match (stats.avg_brightness_k, stats.avg_frp_mw) {
                (Some(k), Some(mw)) => format!("{k:.1} K brightness and {mw:.1} MW radiative power"),
                (Some(k), None) => format!("{k:.1} K brightness"),
                (None, Some(mw)) => format!("{mw:.1} MW radiative power"),
                (None, None) => String::new(),
            };
            let _ = write!(
                narrative,
                " Detections here average {averages}, a {level} intensity fire pattern."
            );
        }

        if let Some(share) = zone_share {
            let _ = write!(
                narrative,
                " The {zone} accounts for {:.1}% of the country's recorded fire detections.",
                share * 100.0
            );
        }

        Ok(Insight {
            zone,
            month,
            season,
            dominant_cause: dominant.map(|c| c.cause.clone()),
            dominant_cause_share: dominant_share,
            peak_month,
            month_to_peak_ratio: stats.peak_ratio(month),
            high_risk_window: window,
            within_high_risk_window: within,
            zone_share_of_detections: zone_share,
            fire_intensity: intensity,
            narrative,
        })
    }
}

fn zone_context(zone: EcologicalZone) -> &'static str {
    match zone {
        EcologicalZone::Terai => {
            "Lowland sal forest and grassland in the Terai burn readily where crop residue is cleared with fire."
        }
        EcologicalZone::Mahabharat => {
            "Chir pine needle litter on the Mahabharat hills builds a heavy surface fuel load through the dry season."
        }
        EcologicalZone::Himalaya => {
            "In the Himalaya, alpine shrubs and strong valley winds can spread fire quickly despite sparse fuel."
        }
    }
}

/// Renders ascending months as contiguous ranges, joining a run that ends
/// in December with one that starts in January. Values outside 1-12 are
/// skipped.
pub(crate) fn render_window(months: &[u8]) -> String {
    let mut runs: Vec<(u8, u8)> = Vec::new();
    for &month in months.iter().filter(|&&m| is_valid_month(m)) {
        match runs.last_mut() {
            Some((_, end)) if end.checked_add(1) == Some(month) => *end = month,
            _ => runs.push((month, month)),
        }
    }

    if runs.len() > 1 {
        let first = runs[0];
        let last = runs[runs.len() - 1];
        if first.0 == 1 && last.1 == 12 {
            runs.remove(0);
            if let Some(wrapped) = runs.last_mut() {
                wrapped.1 = first.1;
            }
        }
    }

    runs.iter()
        .filter_map(|&(start, end)| {
            let start_name = month_name(start)?;
            if start == end {
                Some(start_name.to_string())
            } else {
                Some(format!("{start_name}-{}", month_name(end)?))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
