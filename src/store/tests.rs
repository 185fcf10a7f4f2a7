use super::*;
use crate::review::{DateMode, ReviewRequest, Sentiment, SentimentLabel, SentimentScore};

fn sentiment(label: SentimentLabel) -> Sentiment {
    Sentiment {
        sentiment: label,
        sentiment_score: SentimentScore {
            positive: 0.7,
            negative: 0.1,
            neutral: 0.1,
            mixed: 0.1,
        },
    }
}

fn item(product_id: &str, text: &str) -> ReviewItem {
    let valid = ReviewRequest::write(product_id, text).validate().unwrap();
    ReviewItem::new(valid, sentiment(SentimentLabel::Positive), DateMode::Now)
}

fn store() -> ReviewStore {
    ReviewStore::new_in_memory(DEFAULT_TABLE_NAME).unwrap()
}

#[test]
fn test_put_and_get_item() {
    let store = store();
    let review = item("p-1", "Works great");

    assert_eq!(store.put_item(&review).unwrap(), EventName::Insert);

    let loaded = store.get_item("p-1", &review.review_id).unwrap();
    assert_eq!(loaded, Some(review));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_get_missing_item() {
    let store = store();
    assert!(store.get_item("p-1", "nope").unwrap().is_none());
}

#[test]
fn test_put_existing_key_is_modify() {
    let store = store();
    let mut review = item("p-1", "Works great");
    store.put_item(&review).unwrap();

    review.sentiment = sentiment(SentimentLabel::Mixed);
    assert_eq!(store.put_item(&review).unwrap(), EventName::Modify);
    assert_eq!(store.count().unwrap(), 1);

    let changes = store.changes_since(0, 10).unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].event_name, EventName::Modify);
    assert_eq!(
        changes[1].old_image.as_ref().unwrap().sentiment.sentiment,
        SentimentLabel::Positive
    );
    assert!(changes[1].inserted().is_none());
}

#[test]
fn test_change_feed_is_ordered_and_paged() {
    let store = store();
    let reviews: Vec<ReviewItem> = (0..5).map(|i| item("p-1", &format!("review {}", i))).collect();
    for review in &reviews {
        store.put_item(review).unwrap();
    }

    let first = store.changes_since(0, 3).unwrap();
    assert_eq!(first.len(), 3);
    let rest = store.changes_since(first[2].sequence, 10).unwrap();
    assert_eq!(rest.len(), 2);

    let texts: Vec<&str> = first
        .iter()
        .chain(rest.iter())
        .map(|e| e.inserted().unwrap().review.as_str())
        .collect();
    assert_eq!(texts, vec!["review 0", "review 1", "review 2", "review 3", "review 4"]);
}

#[test]
fn test_delete_records_remove() {
    let store = store();
    let review = item("p-1", "Broke after a week");
    store.put_item(&review).unwrap();

    let removed = store.delete_item("p-1", &review.review_id).unwrap();
    assert_eq!(removed.as_ref(), Some(&review));
    assert!(store.delete_item("p-1", &review.review_id).unwrap().is_none());

    let changes = store.changes_since(0, 10).unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].event_name, EventName::Remove);
    assert!(changes[1].new_image.is_none());
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_query_product_filters_by_partition() {
    let store = store();
    store.put_item(&item("p-1", "a")).unwrap();
    store.put_item(&item("p-2", "b")).unwrap();
    store.put_item(&item("p-1", "c")).unwrap();

    let reviews = store.query_product("p-1").unwrap();
    assert_eq!(reviews.len(), 2);
    assert!(reviews.iter().all(|r| r.product_id == "p-1"));
    assert!(reviews[0].review_id <= reviews[1].review_id);
}

#[test]
fn test_checkpoints() {
    let store = store();
    assert_eq!(store.checkpoint("analysis").unwrap(), 0);

    store.save_checkpoint("analysis", 7).unwrap();
    store.save_checkpoint("analysis", 9).unwrap();
    assert_eq!(store.checkpoint("analysis").unwrap(), 9);
    assert_eq!(store.checkpoint("other").unwrap(), 0);
}

#[test]
fn test_store_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviews.db");
    let path = path.to_str().unwrap();
    let review = item("p-9", "Solid");

    {
        let store = ReviewStore::open(path, "ReviewServiceDev-ReviewHistoryTable").unwrap();
        store.put_item(&review).unwrap();
    }

    let store = ReviewStore::open(path, "ReviewServiceDev-ReviewHistoryTable").unwrap();
    assert_eq!(store.get_item("p-9", &review.review_id).unwrap(), Some(review));
}

#[test]
fn test_table_name_validation() {
    assert!(validate_table_name("ReviewHistoryTable").is_ok());
    assert!(validate_table_name("ReviewServiceDev-ReviewBackendStack-ReviewHistoryTable").is_ok());
    assert!(validate_table_name("").is_err());
    assert!(validate_table_name("x\"; DROP TABLE y; --").is_err());
    assert!(ReviewStore::new_in_memory("bad name").is_err());
}

#[test]
fn test_event_name_parsing() {
    assert_eq!("INSERT".parse::<EventName>().unwrap(), EventName::Insert);
    assert_eq!(EventName::Remove.to_string(), "REMOVE");
    assert!("UPSERT".parse::<EventName>().is_err());
}
