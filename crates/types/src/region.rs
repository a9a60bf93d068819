use crate::FireIntensity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ignition cause and how often it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauseFrequency {
    pub cause: String,
    pub frequency: f64,
}

/// Historical fire statistics for one ecological zone, precomputed at
/// training time from the satellite detection archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub total_historical_fires: u64,
    /// Most frequent first once loaded through the region-statistics store.
    pub dominant_causes: Vec<CauseFrequency>,
    /// Month (1-12) to relative fire frequency. Missing months count as 0.
    pub seasonal_distribution: BTreeMap<u8, f64>,
    /// Mean brightness temperature of detections, Kelvin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_brightness_k: Option<f64>,
    /// Mean fire radiative power of detections, MW.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_frp_mw: Option<f64>,
}

impl RegionStats {
    /// Sorts causes by descending frequency. Equal frequencies keep their
    /// artifact order.
    pub fn sort_causes(&mut self) {
        self.dominant_causes
            .sort_by(|a, b| b.frequency.total_cmp(&a.frequency));
    }

    /// Historical fire intensity from the detection averages.
    pub fn fire_intensity(&self) -> Option<FireIntensity> {
        FireIntensity::from_averages(self.avg_brightness_k, self.avg_frp_mw)
    }

    pub fn dominant_cause(&self) -> Option<&CauseFrequency> {
        self.dominant_causes.first()
    }

    /// Dominant cause frequency relative to all recorded causes.
    pub fn dominant_cause_share(&self) -> Option<f64> {
        let dominant = self.dominant_cause()?;
        let total: f64 = self.dominant_causes.iter().map(|c| c.frequency).sum();
        if total > 0.0 {
            Some(dominant.frequency / total)
        } else {
            None
        }
    }

    pub fn seasonal_frequency(&self, month: u8) -> f64 {
        self.seasonal_distribution
            .get(&month)
            .copied()
            .unwrap_or(0.0)
    }

    /// Share of the zone's yearly activity falling in `month`.
    pub fn seasonal_share(&self, month: u8) -> f64 {
        let total: f64 = self.seasonal_distribution.values().sum();
        if total > 0.0 {
            self.seasonal_frequency(month) / total
        } else {
            0.0
        }
    }

    /// Month with the highest frequency; the earliest one wins a tie.
    pub fn peak_month(&self) -> Option<u8> {
        let mut peak: Option<(u8, f64)> = None;
        for month in 1..=12u8 {
            let frequency = self.seasonal_frequency(month);
            if frequency <= 0.0 {
                continue;
            }
            match peak {
                Some((_, best)) if frequency <= best => {}
                _ => peak = Some((month, frequency)),
            }
        }
        peak.map(|(month, _)| month)
    }

    pub fn peak_frequency(&self) -> f64 {
        self.peak_month()
            .map(|month| self.seasonal_frequency(month))
            .unwrap_or(0.0)
    }

    /// Frequency of `month` relative to the peak month, in `[0, 1]`.
    pub fn peak_ratio(&self, month: u8) -> f64 {
        let peak = self.peak_frequency();
        if peak > 0.0 {
            self.seasonal_frequency(month) / peak
        } else {
            0.0
        }
    }

    /// Months whose frequency reaches `ratio` of the peak, ascending.
    pub fn high_risk_window(&self, ratio: f64) -> Vec<u8> {
        let peak = self.peak_frequency();
        if peak <= 0.0 {
            return Vec::new();
        }
        let cutoff = peak * ratio;
        (1..=12u8)
            .filter(|&month| {
                let frequency = self.seasonal_frequency(month);
                frequency > 0.0 && frequency >= cutoff
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(distribution: &[(u8, f64)]) -> RegionStats {
        RegionStats {
            total_historical_fires: 1000,
            dominant_causes: vec![
                CauseFrequency {
                    cause: "lightning".into(),
                    frequency: 0.1,
                },
                CauseFrequency {
                    cause: "agricultural burning".into(),
                    frequency: 0.6,
                },
                CauseFrequency {
                    cause: "campfire".into(),
                    frequency: 0.3,
                },
            ],
            seasonal_distribution: distribution.iter().copied().collect(),
            avg_brightness_k: None,
            avg_frp_mw: None,
        }
    }

    #[test]
    fn sorting_puts_most_frequent_cause_first() {
        let mut s = stats(&[]);
        s.sort_causes();
        assert_eq!(s.dominant_cause().unwrap().cause, "agricultural burning");
        assert_eq!(s.dominant_causes[2].cause, "lightning");
        assert!((s.dominant_cause_share().unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn peak_month_prefers_earliest_on_tie() {
        let s = stats(&[(3, 0.3), (4, 0.3), (5, 0.2)]);
        assert_eq!(s.peak_month(), Some(3));
        assert!((s.peak_ratio(5) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.peak_ratio(8), 0.0);
    }

    #[test]
    fn empty_distribution_has_no_peak() {
        let s = stats(&[]);
        assert_eq!(s.peak_month(), None);
        assert_eq!(s.seasonal_share(4), 0.0);
        assert!(s.high_risk_window(0.6).is_empty());
    }

    #[test]
    fn window_uses_ratio_of_peak() {
        let s = stats(&[(2, 0.1), (3, 0.25), (4, 0.4), (5, 0.2), (12, 0.05)]);
        assert_eq!(s.high_risk_window(0.6), vec![3, 4]);
        assert_eq!(s.high_risk_window(0.5), vec![3, 4, 5]);
        assert!((s.seasonal_share(4) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn month_keys_round_trip_through_json() {
        let s = stats(&[(4, 0.5), (11, 0.5)]);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"11\":0.5"));
        let back: RegionStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seasonal_frequency(11), 0.5);
    }
}
