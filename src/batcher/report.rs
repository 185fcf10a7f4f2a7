use serde::Serialize;

/// What a completed pass dispatched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub batches: usize,
    pub records: usize,
}

impl BatchReport {
    pub(crate) fn record(&mut self, batch_len: usize) {
        self.batches += 1;
        self.records += batch_len;
    }
}
