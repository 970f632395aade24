//! Parallel codec runs over independent messages
//!
//! Messages share nothing but the read-only [`Profile`], so a batch is split
//! across a dedicated rayon pool. Results keep input order.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::debug;

use crate::error::CodecResult;
use crate::message::{parse_message_with, serialize_message_with, Message};
use crate::profile::Profile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Worker threads; defaults to the number of logical CPUs
    pub threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }
}

pub struct BatchParser {
    pool: ThreadPool,
    profile: Profile,
}

impl BatchParser {
    pub fn new(config: BatchConfig, profile: Profile) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads.max(1))
            .thread_name(|index| format!("gbsip-batch-{}", index))
            .build()?;
        Ok(BatchParser { pool, profile })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Parse every raw message; one result per input, in input order.
    pub fn parse_all<S>(&self, raws: &[S]) -> Vec<CodecResult<Message>>
    where
        S: AsRef<str> + Sync,
    {
        debug!(count = raws.len(), threads = self.threads(), "parsing batch");
        let profile = &self.profile;
        self.pool.install(|| {
            raws.par_iter()
                .map(|raw| parse_message_with(raw.as_ref(), profile))
                .collect()
        })
    }

    pub fn serialize_all(&self, messages: &[Message]) -> Vec<CodecResult<String>> {
        debug!(count = messages.len(), threads = self.threads(), "serializing batch");
        let profile = &self.profile;
        self.pool.install(|| {
            messages
                .par_iter()
                .map(|message| serialize_message_with(message, profile))
                .collect()
        })
    }
}
