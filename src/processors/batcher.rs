use crate::models::SampleRecord;

/// Bounded accumulator for ingestion batches. Records are appended in
/// tower order within a band, bands in ascending order; the caller
/// flushes when `push` reports the bound was reached and once more at
/// end-of-file for the remainder.
pub struct BatchAccumulator {
    records: Vec<SampleRecord>,
    capacity: usize,
}

impl BatchAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
        }
    }

    /// Append a record. Returns true when the batch has reached its
    /// bound and must be flushed before further accumulation.
    pub fn push(&mut self, record: SampleRecord) -> bool {
        self.records.push(record);
        self.records.len() >= self.capacity
    }

    /// Hand over the accumulated records, leaving the batch empty.
    pub fn take(&mut self) -> Vec<SampleRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
