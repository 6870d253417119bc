//! Single-document pipeline
//!
//! Scanning fans filters out over blocking worker threads and joins them
//! with a per-filter timeout; one slow or broken detector costs its own
//! results, never the document. The source text is immutable until every
//! filter has reported, so filters never observe partial redactions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use uuid::Uuid;

use veil_accel::{AccelFlags, SpliceOp, Splicer};
use veil_consistency::ConsistencyManager;
use veil_core::{
    DocumentStatus, ExecutionReport, FilterReport, NoopHook, RedactionPolicy, Span, Stage,
    TraceHook,
};
use veil_filters::{DetectionContext, FilterRegistry};

use crate::merge::resolve_overlaps;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Budget for one filter's detect call. Overruns are recorded as that
    /// filter's error.
    pub filter_timeout: Duration,
    /// Budget for the whole document. At the deadline, unfinished filters
    /// are abandoned and recorded as errors.
    pub document_timeout: Duration,
    pub flags: AccelFlags,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter_timeout: Duration::from_secs(5),
            document_timeout: Duration::from_secs(30),
            flags: AccelFlags::default(),
        }
    }
}

/// Result of redacting one document. `spans` holds every candidate that
/// survived policy filtering, winners and ignored losers both, with the
/// original source slices scrubbed.
#[derive(Debug)]
pub struct RedactionOutcome {
    pub document_id: Uuid,
    pub text: String,
    pub spans: Vec<Span>,
    pub report: ExecutionReport,
}

pub struct RedactionEngine {
    registry: Arc<FilterRegistry>,
    consistency: Option<Arc<ConsistencyManager>>,
    config: EngineConfig,
    hook: Arc<dyn TraceHook>,
}

impl RedactionEngine {
    pub fn new(registry: Arc<FilterRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            consistency: None,
            config,
            hook: Arc::new(NoopHook),
        }
    }

    /// Attach a consistency manager. Without one, splicing uses policy
    /// templates even when the policy asks for consistent tokens.
    pub fn with_consistency(mut self, manager: Arc<ConsistencyManager>) -> Self {
        self.consistency = Some(manager);
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn TraceHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Redact one document with a fresh document id.
    pub async fn redact(&self, text: &str, policy: &RedactionPolicy) -> RedactionOutcome {
        self.redact_document(Uuid::new_v4(), text, policy).await
    }

    /// Redact one document with a caller-chosen id, so batch members keep
    /// their identity across retries and reports.
    pub async fn redact_document(
        &self,
        document_id: Uuid,
        text: &str,
        policy: &RedactionPolicy,
    ) -> RedactionOutcome {
        self.run_pipeline(document_id, text, policy).await
    }

    async fn run_pipeline(
        &self,
        document_id: Uuid,
        text: &str,
        policy: &RedactionPolicy,
    ) -> RedactionOutcome {
        let started = Instant::now();

        // Scanning
        self.hook.stage_started(document_id, Stage::Scanning);
        let scan_started = Instant::now();
        let (candidates, per_filter) = self.scan(document_id, text, policy).await;
        self.hook.stage_finished(
            document_id,
            Stage::Scanning,
            candidates.len(),
            scan_started.elapsed(),
        );

        let filters_executed = per_filter.len();
        let errors = per_filter.iter().filter(|r| r.error.is_some()).count();
        let total_spans_detected = candidates.len();

        if filters_executed > 0 && errors == filters_executed {
            tracing::error!(%document_id, filters = filters_executed, "every filter failed");
            return RedactionOutcome {
                document_id,
                text: text.to_string(),
                spans: Vec::new(),
                report: ExecutionReport {
                    document_id,
                    status: DocumentStatus::Failed,
                    filters_executed,
                    total_spans_detected: 0,
                    spans_applied: 0,
                    total_execution_ms: started.elapsed().as_millis() as u64,
                    per_filter,
                },
            };
        }

        // Merging
        self.hook.stage_started(document_id, Stage::Merging);
        let merge_started = Instant::now();
        let registry = Arc::clone(&self.registry);
        let index_of =
            move |source: &str| registry.registration_index(source).unwrap_or(usize::MAX);
        let mut spans = resolve_overlaps(candidates, self.config.flags, &index_of);
        let winner_count = spans.iter().filter(|s| !s.ignored).count();
        self.hook.stage_finished(
            document_id,
            Stage::Merging,
            winner_count,
            merge_started.elapsed(),
        );

        // Splicing
        self.hook.stage_started(document_id, Stage::Splicing);
        let splice_started = Instant::now();
        let (redacted, spans_applied) = self.splice(document_id, text, policy, &mut spans);
        self.hook.stage_finished(
            document_id,
            Stage::Splicing,
            spans_applied,
            splice_started.elapsed(),
        );

        for span in &mut spans {
            span.scrub_original();
        }

        let status = if errors == 0 {
            DocumentStatus::FullyProcessed
        } else {
            DocumentStatus::ProcessedWithErrors { errors }
        };

        RedactionOutcome {
            document_id,
            text: redacted,
            spans,
            report: ExecutionReport {
                document_id,
                status,
                filters_executed,
                total_spans_detected,
                spans_applied,
                total_execution_ms: started.elapsed().as_millis() as u64,
                per_filter,
            },
        }
    }

    /// Run every enabled filter concurrently against the immutable source.
    /// The document deadline abandons stragglers: unfinished filters are
    /// recorded as errors and merging proceeds with whatever arrived.
    async fn scan(
        &self,
        document_id: Uuid,
        text: &str,
        policy: &RedactionPolicy,
    ) -> (Vec<Span>, Vec<FilterReport>) {
        let deadline = tokio::time::Instant::now() + self.config.document_timeout;
        let shared_text: Arc<str> = Arc::from(text);
        let shared_policy = Arc::new(policy.clone());
        let mut expected: Vec<(&'static str, veil_core::IdentifierType)> = Vec::new();
        let mut set = JoinSet::new();

        for filter in self.registry.filters() {
            if !policy.is_enabled(filter.identifier()) {
                continue;
            }
            expected.push((filter.name(), filter.identifier()));
            let filter = Arc::clone(filter);
            let task_text = Arc::clone(&shared_text);
            let task_policy = Arc::clone(&shared_policy);
            let budget = self.config.filter_timeout;

            set.spawn(async move {
                let filter_started = Instant::now();
                let name = filter.name();
                let identifier = filter.identifier();
                let priority = filter.priority();

                let handle = tokio::task::spawn_blocking(move || {
                    let context = DetectionContext::new(document_id);
                    filter
                        .detect(&task_text, &task_policy, &context)
                        .map(|mut spans| {
                            for span in &mut spans {
                                span.priority = priority;
                            }
                            spans
                        })
                });
                let result = match tokio::time::timeout(budget, handle).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => Err(anyhow::anyhow!("detector panicked: {join_err}")),
                    Err(_) => Err(anyhow::anyhow!("detector timed out after {budget:?}")),
                };
                (name, identifier, result, filter_started.elapsed())
            });
        }

        let mut candidates = Vec::new();
        let mut reports = Vec::new();
        loop {
            let joined = match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) => break,
                Err(_) => {
                    // Deadline hit: abandon stragglers, merge what arrived.
                    set.abort_all();
                    for &(name, identifier) in &expected {
                        if reports.iter().any(|r: &FilterReport| r.filter == name) {
                            continue;
                        }
                        tracing::warn!(%document_id, filter = name, "abandoned at document deadline");
                        reports.push(FilterReport {
                            filter: name.to_string(),
                            identifier,
                            span_count: 0,
                            execution_ms: self.config.document_timeout.as_millis() as u64,
                            error: Some("abandoned at document deadline".to_string()),
                        });
                    }
                    break;
                }
            };
            let (name, identifier, result, elapsed) = match joined {
                Ok(tuple) => tuple,
                Err(join_err) => {
                    tracing::error!(%document_id, error = %join_err, "scan task join failed");
                    continue;
                }
            };
            match result {
                Ok(spans) => {
                    let before = candidates.len();
                    self.admit(document_id, text, policy, spans, &mut candidates);
                    reports.push(FilterReport {
                        filter: name.to_string(),
                        identifier,
                        span_count: candidates.len() - before,
                        execution_ms: elapsed.as_millis() as u64,
                        error: None,
                    });
                }
                Err(err) => {
                    tracing::warn!(%document_id, filter = name, error = %err, "filter failed");
                    reports.push(FilterReport {
                        filter: name.to_string(),
                        identifier,
                        span_count: 0,
                        execution_ms: elapsed.as_millis() as u64,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        // Join order is completion order; sort reports for stable output.
        reports.sort_by(|a, b| a.filter.cmp(&b.filter));
        (candidates, reports)
    }

    /// Gate detected spans on integrity and policy before they become
    /// merge candidates. Malformed spans are dropped with a warning.
    fn admit(
        &self,
        document_id: Uuid,
        text: &str,
        policy: &RedactionPolicy,
        spans: Vec<Span>,
        candidates: &mut Vec<Span>,
    ) {
        for span in spans {
            if let Err(err) = span.validate(text) {
                tracing::warn!(%document_id, source = %span.source, error = %err, "span dropped");
                continue;
            }
            if !policy.is_enabled(span.identifier) {
                continue;
            }
            if span.confidence < policy.threshold_for(span.identifier) {
                continue;
            }
            candidates.push(span);
        }
    }

    /// Assign replacements to winners and rewrite the text. Precedence:
    /// filter-provided replacement, then consistency token, then policy
    /// template.
    fn splice(
        &self,
        document_id: Uuid,
        text: &str,
        policy: &RedactionPolicy,
        spans: &mut [Span],
    ) -> (String, usize) {
        let mut ops = Vec::new();
        let mut op_span_indices = Vec::new();

        for (i, span) in spans.iter_mut().enumerate() {
            if span.ignored {
                continue;
            }
            if span.replacement.is_none() {
                let replacement = match (&self.consistency, policy.consistent_tokens) {
                    (Some(manager), true) => {
                        let token =
                            manager.token_for(span.identifier, &span.original_value, document_id);
                        span.salt = Some(manager.salt_fingerprint());
                        token
                    }
                    _ => policy.template_for(span.identifier),
                };
                if let Err(err) = span.set_replacement(replacement) {
                    tracing::error!(%document_id, error = %err, "replacement rejected");
                    continue;
                }
            }
            let Some(replacement) = span.replacement.clone() else {
                continue;
            };
            ops.push(SpliceOp {
                start: span.start,
                end: span.end,
                replacement,
            });
            op_span_indices.push(i);
        }

        let outcome = Splicer::new(self.config.flags).apply(text, &ops);
        for &op_index in &outcome.applied {
            let span = &mut spans[op_span_indices[op_index]];
            if let Err(err) = span.mark_applied() {
                tracing::error!(%document_id, error = %err, "span state error");
            }
        }
        for &op_index in &outcome.dropped {
            let span = &spans[op_span_indices[op_index]];
            tracing::warn!(
                %document_id,
                start = span.start,
                end = span.end,
                "winner dropped at splice time"
            );
        }

        (outcome.text, outcome.applied.len())
    }
}
