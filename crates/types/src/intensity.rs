use core::fmt;
use serde::{Deserialize, Serialize};

/// Mean brightness above which detections read as high intensity, Kelvin.
pub const HIGH_BRIGHTNESS_K: f64 = 345.0;
/// Mean brightness above which detections read as moderate intensity, Kelvin.
pub const MODERATE_BRIGHTNESS_K: f64 = 338.0;
/// Mean fire radiative power above which detections read as high intensity, MW.
pub const HIGH_FRP_MW: f64 = 15.0;
/// Mean fire radiative power above which detections read as moderate intensity, MW.
pub const MODERATE_FRP_MW: f64 = 10.0;

/// How intensely a zone's fires historically burn, from detection averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FireIntensity {
    Low,
    Moderate,
    High,
}

impl FireIntensity {
    pub fn from_brightness(brightness_k: f64) -> Self {
        if brightness_k > HIGH_BRIGHTNESS_K {
            FireIntensity::High
        } else if brightness_k > MODERATE_BRIGHTNESS_K {
            FireIntensity::Moderate
        } else {
            FireIntensity::Low
        }
    }

    pub fn from_frp(frp_mw: f64) -> Self {
        if frp_mw > HIGH_FRP_MW {
            FireIntensity::High
        } else if frp_mw > MODERATE_FRP_MW {
            FireIntensity::Moderate
        } else {
            FireIntensity::Low
        }
    }

    /// The higher of the two readings; `None` when neither average is known.
    pub fn from_averages(brightness_k: Option<f64>, frp_mw: Option<f64>) -> Option<Self> {
        let by_brightness = brightness_k.map(Self::from_brightness);
        let by_frp = frp_mw.map(Self::from_frp);
        by_brightness.max(by_frp)
    }

    pub const fn name(self) -> &'static str {
        match self {
            FireIntensity::Low => "low",
            FireIntensity::Moderate => "moderate",
            FireIntensity::High => "high",
        }
    }
}

impl fmt::Display for FireIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
