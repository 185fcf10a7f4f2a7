use super::*;

fn record(key: &str, data: &str) -> StreamRecord {
    StreamRecord {
        data: data.to_string(),
        partition_key: key.to_string(),
    }
}

#[test]
fn test_shard_for_is_stable() {
    let (a, hash_a) = shard_for("B002LHA74O", 4);
    let (b, hash_b) = shard_for("B002LHA74O", 4);
    assert_eq!(a, b);
    assert_eq!(hash_a, hash_b);
    assert_eq!(hash_a.len(), 32);
    assert!(a < 4);
    assert_eq!(shard_for("anything", 1).0, 0);
}

#[test]
fn test_zero_shards_rejected() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(JsonlStream::open(dir.path(), 0), Err(StreamError::NoShards)));
}

#[test]
fn test_append_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let stream = JsonlStream::open(dir.path(), 1).unwrap();

    let output = stream
        .append("reviews", vec![record("p-1", "{\"a\":1}"), record("p-2", "{\"b\":2}")])
        .unwrap();
    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[0].shard_id, "shardId-000000000000");
    assert_eq!(output.records[0].sequence_number, format!("{:020}", 0));
    assert_eq!(output.records[1].sequence_number, format!("{:020}", 1));

    let stored = stream.read_all("reviews").unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].partition_key, "p-1");
    assert_eq!(stored[1].data, "{\"b\":2}");
}

#[test]
fn test_same_key_keeps_order_within_shard() {
    let dir = tempfile::tempdir().unwrap();
    let stream = JsonlStream::open(dir.path(), 8).unwrap();

    let records: Vec<StreamRecord> = (0..6).map(|i| record("p-7", &i.to_string())).collect();
    stream.append("reviews", records).unwrap();

    let (shard, _) = shard_for("p-7", 8);
    let stored = stream.read_shard("reviews", shard).unwrap();
    let data: Vec<&str> = stored.iter().map(|r| r.data.as_str()).collect();
    assert_eq!(data, vec!["0", "1", "2", "3", "4", "5"]);
}

#[test]
fn test_sequence_resumes_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let stream = JsonlStream::open(dir.path(), 1).unwrap();
        stream.append("reviews", vec![record("p", "first")]).unwrap();
    }

    let stream = JsonlStream::open(dir.path(), 1).unwrap();
    let output = stream.append("reviews", vec![record("p", "second")]).unwrap();
    assert_eq!(output.records[0].sequence_number, format!("{:020}", 1));
}

#[test]
fn test_invalid_stream_name() {
    let dir = tempfile::tempdir().unwrap();
    let stream = JsonlStream::open(dir.path(), 1).unwrap();
    let result = stream.append("../escape", vec![record("p", "x")]);
    assert!(matches!(result, Err(StreamError::InvalidStreamName(_))));
}

#[test]
fn test_read_missing_stream_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let stream = JsonlStream::open(dir.path(), 2).unwrap();
    assert!(stream.read_all("never-written").unwrap().is_empty());
}

#[tokio::test]
async fn test_publisher_trait() {
    let dir = tempfile::tempdir().unwrap();
    let stream = JsonlStream::open(dir.path(), 2).unwrap();

    let output = stream
        .put_records(DEFAULT_STREAM_NAME, vec![record("p-1", "{}")])
        .await
        .unwrap();
    assert_eq!(output.records.len(), 1);
    assert_eq!(stream.read_all(DEFAULT_STREAM_NAME).unwrap().len(), 1);
}

#[test]
fn test_mixed_keys_get_contiguous_sequences_per_shard() {
    let dir = tempfile::tempdir().unwrap();
    let stream = JsonlStream::open(dir.path(), 4).unwrap();

    let keys = ["p-1", "p-2", "p-3", "p-1", "p-2", "p-3", "p-1"];
    let records: Vec<StreamRecord> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| record(key, &i.to_string()))
        .collect();
    let output = stream.append("reviews", records).unwrap();
    assert_eq!(output.records.len(), keys.len());

    for shard in 0..4 {
        let stored = stream.read_shard("reviews", shard).unwrap();
        let sequences: Vec<String> = stored.iter().map(|r| r.sequence_number.clone()).collect();
        let expected: Vec<String> = (0..stored.len()).map(|i| format!("{:020}", i)).collect();
        assert_eq!(sequences, expected);
    }

    let (shard, _) = shard_for("p-1", 4);
    let data: Vec<String> = stream
        .read_shard("reviews", shard)
        .unwrap()
        .into_iter()
        .filter(|r| r.partition_key == "p-1")
        .map(|r| r.data)
        .collect();
    assert_eq!(data, vec!["0", "3", "6"]);
}

#[tokio::test]
async fn test_publisher_calls_continue_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let stream = JsonlStream::open(dir.path(), 1).unwrap();

    stream
        .put_records(DEFAULT_STREAM_NAME, vec![record("p", "a"), record("p", "b")])
        .await
        .unwrap();
    let output = stream
        .put_records(DEFAULT_STREAM_NAME, vec![record("p", "c")])
        .await
        .unwrap();

    assert_eq!(output.records[0].sequence_number, format!("{:020}", 2));
    assert_eq!(stream.read_all(DEFAULT_STREAM_NAME).unwrap().len(), 3);
}
