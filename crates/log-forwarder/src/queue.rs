// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::record::LogRecord;
use std::collections::VecDeque;
use std::sync::Mutex;

/// FIFO of records waiting to be forwarded.
///
/// Shared by the producer and every worker of a cycle. Order is only kept
/// among operations serialized by the internal lock: once several workers
/// pull concurrently there is no ordering across them.
#[derive(Debug, Default)]
pub struct RecordQueue {
    records: Mutex<VecDeque<LogRecord>>,
}

#[allow(clippy::expect_used)]
impl RecordQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, record: LogRecord) {
        self.records.lock().expect("lock poisoned").push_back(record);
    }

    pub fn enqueue_batch<I>(&self, records: I)
    where
        I: IntoIterator<Item = LogRecord>,
    {
        self.records.lock().expect("lock poisoned").extend(records);
    }

    /// Pops the oldest record, returning `None` right away when empty.
    pub fn try_dequeue(&self) -> Option<LogRecord> {
        self.records.lock().expect("lock poisoned").pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
