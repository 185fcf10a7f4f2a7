use super::{Entity, Sentiment, SyntaxToken, ValidReview};
use chrono::{DateTime, Duration, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Timestamp prefix of a review id (`2024/05/01 13:45:10-<uuid>`)
pub const REVIEW_ID_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Largest shift, in days, applied to simulated review dates
const SIMULATED_DAY_SPREAD: i64 = 15;

/// How review dates are stamped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateMode {
    #[default]
    Now,
    /// Spread reviews over +/- 15 days around now, for dashboards fed by
    /// replayed traffic
    Simulated,
}

impl DateMode {
    pub fn from_flag(simulated: bool) -> Self {
        if simulated {
            DateMode::Simulated
        } else {
            DateMode::Now
        }
    }

    pub fn stamp(&self) -> DateTime<Local> {
        let now = Local::now();
        match self {
            DateMode::Now => now,
            DateMode::Simulated => {
                let days = rand::thread_rng().gen_range(-SIMULATED_DAY_SPREAD..=SIMULATED_DAY_SPREAD);
                now + Duration::days(days)
            }
        }
    }
}

/// A scored review as stored in the review table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewItem {
    pub product_id: String,
    pub review_id: String,
    pub review: String,
    /// Unix seconds
    pub timestamp: i64,
    pub sentiment: Sentiment,
}

impl ReviewItem {
    pub fn new(review: ValidReview, sentiment: Sentiment, date_mode: DateMode) -> Self {
        Self::at(review, sentiment, date_mode.stamp())
    }

    pub fn at(review: ValidReview, sentiment: Sentiment, stamped: DateTime<Local>) -> Self {
        let review_id = format!(
            "{}-{}",
            stamped.format(REVIEW_ID_TIME_FORMAT),
            uuid::Uuid::new_v4().simple()
        );

        Self {
            product_id: review.product_id,
            review_id,
            review: review.review,
            timestamp: stamped.timestamp(),
            sentiment,
        }
    }

    pub fn enrich(self, entities: Vec<Entity>, syntax: Vec<SyntaxToken>) -> EnrichedReview {
        EnrichedReview {
            product_id: self.product_id,
            review_id: self.review_id,
            timestamp: self.timestamp,
            review: self.review,
            sentiment: self.sentiment,
            entities,
            syntax,
        }
    }
}

/// A review after entity and syntax extraction, as published downstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnrichedReview {
    pub product_id: String,
    pub review_id: String,
    pub timestamp: i64,
    pub review: String,
    pub sentiment: Sentiment,
    pub entities: Vec<Entity>,
    pub syntax: Vec<SyntaxToken>,
}
