//! Process-local sequence generation for opaque generated ids.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::mutex::Mutex;

use modelayer_core::{error::ConnectorResult, generator::IdGenerator};

/// Hands out per-model sequence values starting at 1.
///
/// Clones share their counters.
#[derive(Default, Clone, Debug)]
pub struct SequenceGenerator {
    sequences: Arc<Mutex<HashMap<String, i64>>>,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdGenerator for SequenceGenerator {
    async fn next_sequence(&self, model: &str) -> ConnectorResult<i64> {
        let mut sequences = self.sequences.lock().await;
        let next = sequences
            .entry(model.to_string())
            .or_insert(0);
        *next += 1;

        Ok(*next)
    }
}
