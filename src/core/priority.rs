use serde::{Deserialize, Deserializer, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;
pub const DEFAULT_RATING: u8 = 5;

/// One of the four rated criteria feeding the priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Importance,
    Urgency,
    Effort,
    Impact,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Importance,
        Criterion::Urgency,
        Criterion::Effort,
        Criterion::Impact,
    ];

    /// Fixed relative weight. The four weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Importance => 0.4,
            Self::Urgency => 0.3,
            Self::Effort => 0.2,
            Self::Impact => 0.1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Importance => "Importance",
            Self::Urgency => "Urgency",
            Self::Effort => "Effort",
            Self::Impact => "Impact",
        }
    }
}

/// Four bounded ratings, each in `[MIN_RATING, MAX_RATING]`. Stored values
/// outside the range are clamped on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priority {
    #[serde(deserialize_with = "stored_rating")]
    pub importance: u8,
    #[serde(deserialize_with = "stored_rating")]
    pub urgency: u8,
    #[serde(deserialize_with = "stored_rating")]
    pub effort: u8,
    #[serde(deserialize_with = "stored_rating")]
    pub impact: u8,
}

impl Default for Priority {
    fn default() -> Self {
        Self {
            importance: DEFAULT_RATING,
            urgency: DEFAULT_RATING,
            effort: DEFAULT_RATING,
            impact: DEFAULT_RATING,
        }
    }
}

impl Priority {
    pub fn new(importance: u8, urgency: u8, effort: u8, impact: u8) -> Self {
        Self {
            importance: clamp_rating(importance),
            urgency: clamp_rating(urgency),
            effort: clamp_rating(effort),
            impact: clamp_rating(impact),
        }
    }

    pub fn rating(&self, criterion: Criterion) -> u8 {
        match criterion {
            Criterion::Importance => self.importance,
            Criterion::Urgency => self.urgency,
            Criterion::Effort => self.effort,
            Criterion::Impact => self.impact,
        }
    }

    /// Set one rating, clamped into range like the slider it comes from.
    pub fn set(&mut self, criterion: Criterion, value: u8) {
        let value = clamp_rating(value);
        match criterion {
            Criterion::Importance => self.importance = value,
            Criterion::Urgency => self.urgency = value,
            Criterion::Effort => self.effort = value,
            Criterion::Impact => self.impact = value,
        }
    }

    /// Weighted sum of the four ratings, always within `[1.0, 10.0]`.
    pub fn score(&self) -> f64 {
        Criterion::ALL
            .iter()
            .map(|c| f64::from(self.rating(*c)) * c.weight())
            .sum()
    }
}

fn clamp_rating(value: u8) -> u8 {
    value.clamp(MIN_RATING, MAX_RATING)
}

fn stored_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(f64::from(MIN_RATING), f64::from(MAX_RATING)) as u8)
}

/// Display form of a score, two decimal places.
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}
