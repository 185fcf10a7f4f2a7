mod item;
mod request;
mod sentiment;


pub use item::{DateMode, EnrichedReview, ReviewItem, REVIEW_ID_TIME_FORMAT};
pub use request::{ReviewRequest, ValidReview, ValidationError, DEFAULT_LANGUAGE};
pub use sentiment::{Entity, PartOfSpeech, Sentiment, SentimentLabel, SentimentScore, SyntaxToken};
