//! Batch processing
//!
//! Fans the single-document pipeline out over a corpus under a semaphore
//! bound. Documents complete in any order; results are returned in input
//! order, and the progress callback fires on each completion with the
//! document's original index.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use veil_core::{DocumentStatus, IdentifierType, RedactionPolicy};

use crate::engine::{RedactionEngine, RedactionOutcome};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Documents in flight at once.
    pub max_concurrency: usize,
    /// When false, a failed document stops the batch: nothing new is
    /// scheduled, documents already in flight run to completion.
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            continue_on_error: true,
        }
    }
}

/// Completion notice for one document, delivered in completion order.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Index of the document in the input corpus.
    pub index: usize,
    /// Documents finished so far, this one included.
    pub completed: usize,
    pub total: usize,
    pub status: DocumentStatus,
}

pub type ProgressFn = dyn Fn(BatchProgress) + Send + Sync;

#[derive(Debug)]
pub struct BatchItemResult {
    pub index: usize,
    pub outcome: RedactionOutcome,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Documents never scheduled because the batch stopped on an error.
    pub skipped: usize,
    /// Applied spans per identifier type across the whole batch.
    pub entity_counts: HashMap<IdentifierType, usize>,
    pub total_ms: u64,
}

pub struct BatchProcessor {
    engine: Arc<RedactionEngine>,
    config: BatchConfig,
    progress: Option<Arc<ProgressFn>>,
}

impl BatchProcessor {
    pub fn new(engine: Arc<RedactionEngine>, config: BatchConfig) -> Self {
        Self {
            engine,
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<ProgressFn>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Process a corpus. Results come back sorted by input index and cover
    /// only the documents that actually ran.
    pub async fn process(
        &self,
        documents: Vec<String>,
        policy: &RedactionPolicy,
    ) -> (Vec<BatchItemResult>, BatchReport) {
        let started = Instant::now();
        let total = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let stopped = Arc::new(AtomicBool::new(false));
        let mut set = JoinSet::new();

        for (index, document) in documents.into_iter().enumerate() {
            let engine = Arc::clone(&self.engine);
            let policy = policy.clone();
            let semaphore = Arc::clone(&semaphore);
            let stopped = Arc::clone(&stopped);
            let continue_on_error = self.config.continue_on_error;

            set.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return None;
                };
                if stopped.load(Ordering::SeqCst) {
                    return None;
                }
                let outcome = engine.redact(&document, &policy).await;
                if !continue_on_error && outcome.report.status.is_failed() {
                    stopped.store(true, Ordering::SeqCst);
                }
                Some(BatchItemResult { index, outcome })
            });
        }

        let mut results = Vec::new();
        let mut completed = 0usize;
        let mut skipped = 0usize;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Some(item)) => {
                    completed += 1;
                    if let Some(progress) = &self.progress {
                        progress(BatchProgress {
                            index: item.index,
                            completed,
                            total,
                            status: item.outcome.report.status,
                        });
                    }
                    results.push(item);
                }
                Ok(None) => skipped += 1,
                Err(join_err) => {
                    tracing::error!(error = %join_err, "batch task join failed");
                    skipped += 1;
                }
            }
        }
        results.sort_by_key(|item| item.index);

        let mut entity_counts: HashMap<IdentifierType, usize> = HashMap::new();
        let mut failed = 0usize;
        for item in &results {
            if item.outcome.report.status.is_failed() {
                failed += 1;
                continue;
            }
            for span in item.outcome.spans.iter().filter(|s| s.applied()) {
                *entity_counts.entry(span.identifier).or_insert(0) += 1;
            }
        }

        let report = BatchReport {
            total,
            succeeded: results.len() - failed,
            failed,
            skipped,
            entity_counts,
            total_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "batch finished"
        );
        (results, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use veil_accel::AccelFlags;
    use veil_core::Span;
    use veil_filters::{DetectionContext, Filter, FilterRegistry};

    use crate::engine::EngineConfig;

    struct AlwaysFails;

    impl Filter for AlwaysFails {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn identifier(&self) -> veil_core::IdentifierType {
            veil_core::IdentifierType::Custom
        }
        fn detect(
            &self,
            _text: &str,
            _policy: &RedactionPolicy,
            _context: &DetectionContext,
        ) -> anyhow::Result<Vec<Span>> {
            anyhow::bail!("detector exploded")
        }
    }

    fn default_engine() -> Arc<RedactionEngine> {
        let registry = FilterRegistry::with_defaults(AccelFlags::default());
        Arc::new(RedactionEngine::new(
            Arc::new(registry),
            EngineConfig::default(),
        ))
    }

    fn failing_engine() -> Arc<RedactionEngine> {
        let mut registry = FilterRegistry::new();
        registry.register(Arc::new(AlwaysFails));
        Arc::new(RedactionEngine::new(
            Arc::new(registry),
            EngineConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_results_come_back_in_input_order() {
        let processor = BatchProcessor::new(default_engine(), BatchConfig::default());
        let docs = vec![
            "SSN 111-22-3333".to_string(),
            "no identifiers".to_string(),
            "email a@b.org".to_string(),
        ];
        let (results, report) = processor.process(docs, &RedactionPolicy::default()).await;
        assert_eq!(results.len(), 3);
        assert_eq!(
            results.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_progress_fires_per_completion() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_in_hook = Arc::clone(&seen);
        let processor = BatchProcessor::new(default_engine(), BatchConfig::default())
            .with_progress(Arc::new(move |p: BatchProgress| {
                seen_in_hook.lock().unwrap().push(p.index);
            }));
        let docs = vec!["a".to_string(), "b".to_string()];
        processor.process(docs, &RedactionPolicy::default()).await;
        let mut indices = seen.lock().unwrap().clone();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_stop_on_error_skips_remaining() {
        let config = BatchConfig {
            max_concurrency: 1,
            continue_on_error: false,
        };
        let processor = BatchProcessor::new(failing_engine(), config);
        let docs = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let (results, report) = processor.process(docs, &RedactionPolicy::default()).await;
        // Sequential scheduling: the first failure stops the rest.
        assert_eq!(results.len(), 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 2);
    }

    #[tokio::test]
    async fn test_continue_on_error_processes_everything() {
        let processor = BatchProcessor::new(failing_engine(), BatchConfig::default());
        let docs = vec!["one".to_string(), "two".to_string()];
        let (results, report) = processor.process(docs, &RedactionPolicy::default()).await;
        assert_eq!(results.len(), 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.skipped, 0);
    }

    #[tokio::test]
    async fn test_entity_counts_aggregate_across_documents() {
        let processor = BatchProcessor::new(default_engine(), BatchConfig::default());
        let docs = vec![
            "SSN 111-22-3333".to_string(),
            "SSN 444-55-6666".to_string(),
        ];
        let (_, report) = processor.process(docs, &RedactionPolicy::default()).await;
        assert_eq!(
            report.entity_counts.get(&veil_core::IdentifierType::Ssn),
            Some(&2)
        );
    }
}
