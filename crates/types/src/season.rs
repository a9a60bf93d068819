use core::fmt;
use serde::{Deserialize, Serialize};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// True for calendar months `1..=12`.
pub fn is_valid_month(month: u8) -> bool {
    (1..=12).contains(&month)
}

/// English month name, `None` outside `1..=12`.
pub fn month_name(month: u8) -> Option<&'static str> {
    if is_valid_month(month) {
        Some(MONTH_NAMES[usize::from(month) - 1])
    } else {
        None
    }
}

/// National fire calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// March to May.
    PreMonsoonPeak,
    /// February and June, entering or leaving the fire season.
    Transition,
    /// July to September.
    Monsoon,
    /// October.
    PostMonsoon,
    /// November to January.
    Winter,
}

impl Season {
    pub fn from_month(month: u8) -> Option<Season> {
        match month {
            3..=5 => Some(Season::PreMonsoonPeak),
            2 | 6 => Some(Season::Transition),
            7..=9 => Some(Season::Monsoon),
            10 => Some(Season::PostMonsoon),
            11 | 12 | 1 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Season::PreMonsoonPeak => {
                "This is the national pre-monsoon fire season (March-May), when fuels are driest."
            }
            Season::Transition => "Fire activity is ramping up or winding down around the peak season.",
            Season::Monsoon => "Monsoon rains usually suppress ignitions during this period.",
            Season::PostMonsoon => "Post-monsoon vegetation is still moist and ignitions are uncommon.",
            Season::Winter => "Dry winter conditions allow occasional fires while temperatures stay low.",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::PreMonsoonPeak => "pre-monsoon peak",
            Season::Transition => "transition",
            Season::Monsoon => "monsoon",
            Season::PostMonsoon => "post-monsoon",
            Season::Winter => "winter",
        };
        f.write_str(name)
    }
}
