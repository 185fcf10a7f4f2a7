use crate::review::ReviewItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventName {
    Insert,
    Modify,
    Remove,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Insert => "INSERT",
            EventName::Modify => "MODIFY",
            EventName::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(EventName::Insert),
            "MODIFY" => Ok(EventName::Modify),
            "REMOVE" => Ok(EventName::Remove),
            other => anyhow::bail!("unknown change event name: {}", other),
        }
    }
}

/// One entry of the review table's change feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeEvent {
    pub sequence: i64,
    pub event_name: EventName,
    pub product_id: String,
    pub review_id: String,
    /// Item after the write; absent for REMOVE
    pub new_image: Option<ReviewItem>,
    /// Item before the write; absent for INSERT
    pub old_image: Option<ReviewItem>,
}

impl ChangeEvent {
    /// The freshly written item, if this event is an insert
    pub fn inserted(&self) -> Option<&ReviewItem> {
        match self.event_name {
            EventName::Insert => self.new_image.as_ref(),
            EventName::Modify | EventName::Remove => None,
        }
    }
}
