//! Advisory monthly price band for a facility, derived from square footage
//! and cleaning frequency. The figures are a guide for the visitor and never
//! a binding price.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Facilities smaller than this do not get an estimate.
pub const MIN_SQUARE_FOOTAGE: u32 = 1_000;

/// Average number of weeks in a month used to scale weekly rates.
pub const WEEKS_PER_MONTH: f64 = 4.33;

const BAND_LOW_FACTOR: f64 = 0.9;
const BAND_HIGH_FACTOR: f64 = 1.1;

/// How often the facility is cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    ThreeTimesWeekly,
    TwiceWeekly,
    Weekly,
    Biweekly,
}

impl Frequency {
    /// Every frequency, densest first.
    pub const ALL: [Frequency; 5] = [
        Frequency::Daily,
        Frequency::ThreeTimesWeekly,
        Frequency::TwiceWeekly,
        Frequency::Weekly,
        Frequency::Biweekly,
    ];

    /// Price per square foot per week for this frequency.
    pub fn rate_per_sq_ft(self) -> f64 {
        match self {
            Frequency::Daily => 0.12,
            Frequency::ThreeTimesWeekly => 0.08,
            Frequency::TwiceWeekly => 0.06,
            Frequency::Weekly => 0.04,
            Frequency::Biweekly => 0.025,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::ThreeTimesWeekly => "3x-week",
            Frequency::TwiceWeekly => "2x-week",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::ThreeTimesWeekly => "3x per week",
            Frequency::TwiceWeekly => "2x per week",
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Bi-weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Frequency::ALL
            .into_iter()
            .find(|freq| {
                freq.slug() == normalized || freq.label().to_ascii_lowercase() == normalized
            })
            .ok_or_else(|| format!("unknown cleaning frequency `{}`", s.trim()))
    }
}

/// Monthly price range in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimateBand {
    pub monthly: u64,
    pub low: u64,
    pub high: u64,
}

impl EstimateBand {
    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) as f64 / 2.0
    }
}

impl fmt::Display for EstimateBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${} - ${} per month",
            group_thousands(self.low),
            group_thousands(self.high)
        )
    }
}

/// Computes the advisory band, or `None` when an input is missing or the
/// facility is below [`MIN_SQUARE_FOOTAGE`].
pub fn estimate(square_footage: Option<u32>, frequency: Option<Frequency>) -> Option<EstimateBand> {
    let square_footage = square_footage.filter(|sq_ft| *sq_ft >= MIN_SQUARE_FOOTAGE)?;
    let frequency = frequency?;

    let monthly = f64::from(square_footage) * frequency.rate_per_sq_ft() * WEEKS_PER_MONTH;
    Some(EstimateBand {
        monthly: monthly.round() as u64,
        low: (monthly * BAND_LOW_FACTOR).round() as u64,
        high: (monthly * BAND_HIGH_FACTOR).round() as u64,
    })
}

/// Same as [`estimate`] but starting from raw, possibly half-typed input.
pub fn estimate_from_raw(square_footage: &str, frequency: &str) -> Option<EstimateBand> {
    let sq_ft = parse_square_footage(square_footage);
    let freq = frequency.parse::<Frequency>().ok();
    estimate(sq_ft, freq)
}

/// Accepts `5000`, `5,000` and surrounding whitespace.
pub fn parse_square_footage(raw: &str) -> Option<u32> {
    crate::utils::parse_grouped_number(raw)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
