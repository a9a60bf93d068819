use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Maximum allowed deviation of a probability sum from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Predicted risk category, ordered by severity: `Low < Moderate < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Moderate,
    High,
}

impl RiskLabel {
    /// All labels in ascending severity.
    pub const ALL: [RiskLabel; 3] = [RiskLabel::Low, RiskLabel::Moderate, RiskLabel::High];

    pub const fn index(self) -> usize {
        match self {
            RiskLabel::Low => 0,
            RiskLabel::Moderate => 1,
            RiskLabel::High => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Moderate => "Moderate",
            RiskLabel::High => "High",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk label '{0}'")]
pub struct UnknownLabel(pub String);

impl FromStr for RiskLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let stem = lowered.strip_suffix(" risk").unwrap_or(&lowered);
        match stem {
            "low" => Ok(RiskLabel::Low),
            "moderate" | "medium" => Ok(RiskLabel::Moderate),
            "high" => Ok(RiskLabel::High),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbabilityError {
    #[error("probability for {label} is {value}, expected a finite value in [0, 1]")]
    OutOfRange { label: RiskLabel, value: f64 },
    #[error("probabilities sum to {sum}, expected 1 within {PROBABILITY_TOLERANCE}")]
    BadSum { sum: f64 },
}

/// Probability per risk label. Each value lies in `[0, 1]` and the three sum
/// to 1 within [`PROBABILITY_TOLERANCE`]; the constructor enforces both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProbabilities")]
pub struct ClassProbabilities {
    low: f64,
    moderate: f64,
    high: f64,
}

/// Unchecked wire form; deserialization goes through [`ClassProbabilities::new`].
#[derive(Deserialize)]
struct RawProbabilities {
    low: f64,
    moderate: f64,
    high: f64,
}

impl TryFrom<RawProbabilities> for ClassProbabilities {
    type Error = ProbabilityError;

    fn try_from(raw: RawProbabilities) -> Result<Self, Self::Error> {
        ClassProbabilities::new(raw.low, raw.moderate, raw.high)
    }
}

impl ClassProbabilities {
    pub fn new(low: f64, moderate: f64, high: f64) -> Result<Self, ProbabilityError> {
        for (label, value) in [
            (RiskLabel::Low, low),
            (RiskLabel::Moderate, moderate),
            (RiskLabel::High, high),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ProbabilityError::OutOfRange { label, value });
            }
        }

        let sum = low + moderate + high;
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ProbabilityError::BadSum { sum });
        }

        Ok(Self {
            low,
            moderate,
            high,
        })
    }

    pub fn get(&self, label: RiskLabel) -> f64 {
        match label {
            RiskLabel::Low => self.low,
            RiskLabel::Moderate => self.moderate,
            RiskLabel::High => self.high,
        }
    }

    /// `(label, probability)` pairs in ascending severity.
    pub fn iter(&self) -> impl Iterator<Item = (RiskLabel, f64)> + '_ {
        RiskLabel::ALL.into_iter().map(move |label| (label, self.get(label)))
    }

    pub fn sum(&self) -> f64 {
        self.low + self.moderate + self.high
    }

    /// Argmax over the labels. Exact ties go to the more severe label.
    pub fn predicted_label(&self) -> RiskLabel {
        // Ascending severity with `>=` lets a later (more severe) label win a tie.
        let mut best = RiskLabel::Low;
        for (label, probability) in self.iter() {
            if probability >= self.get(best) {
                best = label;
            }
        }
        best
    }

    /// Probability of the predicted label.
    pub fn confidence(&self) -> f64 {
        self.get(self.predicted_label())
    }
}
