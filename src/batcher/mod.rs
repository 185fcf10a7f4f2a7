mod error;
mod report;


pub use error::BatchError;
pub use report::BatchReport;

use std::convert::Infallible;
use std::future::Future;

/// Default number of records per downstream bulk call
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Upper bound on the capacity reserved up front for one batch buffer
const MAX_RESERVED_CAPACITY: usize = 1024;

/// Groups an ordered input into consecutive, non-overlapping batches of at
/// most `max_batch_size` records and hands each one to a sink.
///
/// A `Batcher` is only configuration; every `process` call owns its own
/// buffer and leaves nothing behind when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batcher {
    max_batch_size: usize,
}

impl Batcher {
    pub fn new(max_batch_size: usize) -> Result<Self, BatchError<Infallible>> {
        if max_batch_size == 0 {
            return Err(BatchError::Configuration { max_batch_size: 0 });
        }
        Ok(Self { max_batch_size })
    }

    /// Build from a signed size, e.g. one parsed from an environment variable
    pub fn try_from_signed(max_batch_size: i64) -> Result<Self, BatchError<Infallible>> {
        if max_batch_size < 1 {
            return Err(BatchError::Configuration { max_batch_size });
        }
        // Any positive size is valid; one wider than the address space means
        // "everything in one batch".
        let size = usize::try_from(max_batch_size).unwrap_or(usize::MAX);
        Self::new(size)
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Number of batches `len` records produce: `ceil(len / max_batch_size)`
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.max_batch_size)
    }

    /// Borrowed view of the batches, without invoking anything
    pub fn split<'a, T>(&self, items: &'a [T]) -> Vec<&'a [T]> {
        items.chunks(self.max_batch_size).collect()
    }

    fn buffer<T>(&self) -> Vec<T> {
        Vec::with_capacity(self.max_batch_size.min(MAX_RESERVED_CAPACITY))
    }

    /// Dispatch `records` to `sink`, one owned batch per call.
    ///
    /// The sink is called strictly in input order and never with an empty
    /// batch. The first error it returns stops the pass; batches after the
    /// failing one are never formed.
    pub fn process<T, E, I, F>(&self, records: I, mut sink: F) -> Result<BatchReport, BatchError<E>>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(Vec<T>) -> Result<(), E>,
    {
        let mut report = BatchReport::default();
        let mut buffer = self.buffer();

        for record in records {
            buffer.push(record);
            if buffer.len() == self.max_batch_size {
                let batch = std::mem::replace(&mut buffer, self.buffer());
                report.record(batch.len());
                sink(batch).map_err(BatchError::Sink)?;
            }
        }

        if !buffer.is_empty() {
            report.record(buffer.len());
            sink(buffer).map_err(BatchError::Sink)?;
        }

        Ok(report)
    }

    /// Same contract as [`Batcher::process`] for a sink that does async I/O.
    ///
    /// Each batch's future is awaited to completion before the next batch is
    /// built, so the sink never has two batches in flight.
    pub async fn process_async<T, E, I, F, Fut>(
        &self,
        records: I,
        mut sink: F,
    ) -> Result<BatchReport, BatchError<E>>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(Vec<T>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let mut report = BatchReport::default();
        let mut buffer = self.buffer();

        for record in records {
            buffer.push(record);
            if buffer.len() == self.max_batch_size {
                let batch = std::mem::replace(&mut buffer, self.buffer());
                report.record(batch.len());
                sink(batch).await.map_err(BatchError::Sink)?;
            }
        }

        if !buffer.is_empty() {
            report.record(buffer.len());
            sink(buffer).await.map_err(BatchError::Sink)?;
        }

        Ok(report)
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// One-shot form of [`Batcher::process`] taking the size as given by a caller.
///
/// A size below one fails with [`BatchError::Configuration`] before the sink
/// is ever called.
pub fn process<T, E, I, F>(records: I, max_batch_size: i64, sink: F) -> Result<BatchReport, BatchError<E>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(Vec<T>) -> Result<(), E>,
{
    let batcher = Batcher::try_from_signed(max_batch_size).map_err(BatchError::widen)?;
    batcher.process(records, sink)
}
