// jsonl.rs - directory-backed stream, one JSON-lines file per shard
use super::{PutRecordResult, PutRecordsOutput, StreamError, StreamPublisher, StreamRecord};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One line of a shard file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredRecord {
    pub sequence_number: String,
    pub shard_id: String,
    pub partition_key: String,
    pub hash_key: String,
    pub data: String,
    pub approximate_arrival_timestamp: String,
}

/// Shard index and hex hash key for a partition key
pub fn shard_for(partition_key: &str, shard_count: u32) -> (u32, String) {
    let digest = Sha256::digest(partition_key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let shard = (u64::from_be_bytes(prefix) % u64::from(shard_count)) as u32;
    (shard, hex::encode(&digest[..16]))
}

fn shard_id(shard: u32) -> String {
    format!("shardId-{:012}", shard)
}

/// A local stream: `<root>/<stream name>/shardId-XXXXXXXXXXXX.jsonl`.
///
/// Records with the same partition key always land in the same shard and
/// keep their publish order there. Clones share sequence state.
#[derive(Clone)]
pub struct JsonlStream {
    root: PathBuf,
    shard_count: u32,
    /// Next sequence number per shard file, loaded lazily from disk
    next_sequence: Arc<Mutex<HashMap<PathBuf, u64>>>,
}

impl JsonlStream {
    pub fn open(root: impl Into<PathBuf>, shard_count: u32) -> Result<Self, StreamError> {
        if shard_count == 0 {
            return Err(StreamError::NoShards);
        }
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            shard_count,
            next_sequence: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn shard_count(&self) -> u32 {
        self.shard_count
    }

    fn stream_dir(&self, stream_name: &str) -> Result<PathBuf, StreamError> {
        let valid = !stream_name.is_empty()
            && stream_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && stream_name != "."
            && stream_name != "..";
        if !valid {
            return Err(StreamError::InvalidStreamName(stream_name.to_string()));
        }
        Ok(self.root.join(stream_name))
    }

    fn shard_path(dir: &Path, shard: u32) -> PathBuf {
        dir.join(format!("{}.jsonl", shard_id(shard)))
    }

    /// Append records and return where each one landed.
    ///
    /// Lines are grouped per shard and each shard file is opened once per
    /// call. Sequence numbers only advance for shards that were written.
    pub fn append(
        &self,
        stream_name: &str,
        records: Vec<StreamRecord>,
    ) -> Result<PutRecordsOutput, StreamError> {
        let dir = self.stream_dir(stream_name)?;
        fs::create_dir_all(&dir)?;

        let mut next_sequence = self
            .next_sequence
            .lock()
            .map_err(|_| StreamError::LockPoisoned)?;
        let arrival = Utc::now().to_rfc3339();
        let mut output = PutRecordsOutput::default();
        // shard path -> (next sequence, pending lines), in first-seen order
        let mut pending: Vec<(PathBuf, u64, String)> = Vec::new();

        for record in records {
            let (shard, hash_key) = shard_for(&record.partition_key, self.shard_count);
            let path = Self::shard_path(&dir, shard);

            let slot = match pending.iter().position(|(p, _, _)| *p == path) {
                Some(slot) => slot,
                None => {
                    let start = match next_sequence.get(&path) {
                        Some(seq) => *seq,
                        None => count_lines(&path)?,
                    };
                    pending.push((path, start, String::new()));
                    pending.len() - 1
                }
            };
            let (_, sequence, lines) = &mut pending[slot];

            let stored = StoredRecord {
                sequence_number: format!("{:020}", sequence),
                shard_id: shard_id(shard),
                partition_key: record.partition_key,
                hash_key,
                data: record.data,
                approximate_arrival_timestamp: arrival.clone(),
            };
            lines.push_str(&serde_json::to_string(&stored)?);
            lines.push('\n');
            *sequence += 1;

            output.records.push(PutRecordResult {
                shard_id: stored.shard_id,
                sequence_number: stored.sequence_number,
            });
        }

        for (path, next, lines) in pending {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(lines.as_bytes())?;
            next_sequence.insert(path, next);
        }

        Ok(output)
    }

    /// Every record in one shard, oldest first
    pub fn read_shard(&self, stream_name: &str, shard: u32) -> Result<Vec<StoredRecord>, StreamError> {
        let path = Self::shard_path(&self.stream_dir(stream_name)?, shard);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Every record in the stream, shard by shard
    pub fn read_all(&self, stream_name: &str) -> Result<Vec<StoredRecord>, StreamError> {
        let mut all = Vec::new();
        for shard in 0..self.shard_count {
            all.extend(self.read_shard(stream_name, shard)?);
        }
        Ok(all)
    }
}

fn count_lines(path: &Path) -> Result<u64, StreamError> {
    if !path.exists() {
        return Ok(0);
    }
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines() {
        if !line?.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

impl StreamPublisher for JsonlStream {
    async fn put_records(
        &self,
        stream_name: &str,
        records: Vec<StreamRecord>,
    ) -> Result<PutRecordsOutput, StreamError> {
        let stream = self.clone();
        let name = stream_name.to_string();
        let output = tokio::task::spawn_blocking(move || stream.append(&name, records)).await??;
        tracing::debug!(stream = stream_name, records = output.records.len(), "records appended");
        Ok(output)
    }
}
