use crate::analysis::AnalysisResult;
use crate::analyzer::{AnalyzeError, Analyzer};
use crate::chunker;
use crate::config::{AnalysisOptions, OptionsError};
use crate::merger;
use crate::refiner;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid analysis options: {0}")]
    Options(#[from] OptionsError),
    #[error("no memo text provided")]
    EmptyInput,
    #[error("memo produced no content to analyze")]
    NoContent,
    #[error("analysis failed: {0}")]
    Analysis(#[source] AnalyzeError),
    #[error("chunk {index}/{total} failed: {source}")]
    Chunk {
        index: usize,
        total: usize,
        #[source]
        source: AnalyzeError,
    },
    #[error("refine pass failed: {0}")]
    Refine(#[source] AnalyzeError),
}

impl PipelineError {
    /// Short name of the stage that failed.
    pub fn stage(&self) -> String {
        match self {
            PipelineError::Options(_) => "options".to_string(),
            PipelineError::EmptyInput => "input".to_string(),
            PipelineError::NoContent => "chunking".to_string(),
            PipelineError::Analysis(_) => "analysis".to_string(),
            PipelineError::Chunk { index, total, .. } => format!("chunk {index}/{total}"),
            PipelineError::Refine(_) => "refine".to_string(),
        }
    }

    pub fn is_input_error(&self) -> bool {
        matches!(self, PipelineError::EmptyInput)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Analyzing,
    Chunk { index: usize, total: usize },
    Refining,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Analyzing => write!(f, "analyzing"),
            ProgressEvent::Chunk { index, total } => write!(f, "chunk {index}/{total}"),
            ProgressEvent::Refining => write!(f, "refining"),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards progress.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards progress to the log.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, event: ProgressEvent) {
        info!(progress = %event, "analysis progress");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Single { result: AnalysisResult },
    Refined { result: AnalysisResult, chunks: usize },
}

impl AnalysisOutcome {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            AnalysisOutcome::Single { result } | AnalysisOutcome::Refined { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            AnalysisOutcome::Single { result } | AnalysisOutcome::Refined { result, .. } => result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    ProcessingSingle,
    ProcessingChunked,
    Refining,
    Complete,
    Failed,
}

/// Per-request state: where the pipeline is and, once done, what it produced.
/// Export and audio actions read the result from here.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    state: PipelineState,
    outcome: Option<AnalysisOutcome>,
    failure: Option<String>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        self.outcome.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.outcome.as_ref().map(AnalysisOutcome::result)
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn transition(&mut self, next: PipelineState) {
        info!(from = ?self.state, to = ?next, "pipeline state");
        self.state = next;
    }
}

pub struct Pipeline {
    analyzer: Arc<dyn Analyzer>,
    options: AnalysisOptions,
}

impl Pipeline {
    pub fn new(analyzer: Arc<dyn Analyzer>, options: AnalysisOptions) -> Self {
        Self { analyzer, options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub async fn run(
        &self,
        memo: &str,
        progress: &dyn ProgressSink,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let mut ctx = AnalysisContext::new();
        self.run_in(&mut ctx, memo, progress).await
    }

    /// Runs the pipeline, recording state transitions and the outcome in `ctx`.
    pub async fn run_in(
        &self,
        ctx: &mut AnalysisContext,
        memo: &str,
        progress: &dyn ProgressSink,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let res = self.drive(ctx, memo, progress).await;
        match &res {
            Ok(outcome) => {
                ctx.outcome = Some(outcome.clone());
                ctx.failure = None;
                ctx.transition(PipelineState::Complete);
            }
            Err(err) => {
                error!(stage = %err.stage(), "analysis failed: {}", err);
                ctx.failure = Some(err.to_string());
                ctx.transition(PipelineState::Failed);
            }
        }
        res
    }

    async fn drive(
        &self,
        ctx: &mut AnalysisContext,
        memo: &str,
        progress: &dyn ProgressSink,
    ) -> Result<AnalysisOutcome, PipelineError> {
        self.options.validate()?;
        if memo.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let length = memo.chars().count();
        if length <= self.options.chunk_trigger_size {
            ctx.transition(PipelineState::ProcessingSingle);
            info!(chars = length, "analyzing memo in a single call");
            progress.report(ProgressEvent::Analyzing);
            let result = self
                .analyzer
                .analyze_unit(memo)
                .await
                .map_err(PipelineError::Analysis)?;
            return Ok(AnalysisOutcome::Single { result });
        }

        ctx.transition(PipelineState::ProcessingChunked);
        let chunks = chunker::chunk_text(
            memo,
            self.options.target_chunk_size,
            self.options.max_chunk_size,
        );
        if chunks.is_empty() {
            return Err(PipelineError::NoContent);
        }
        let total = chunks.len();
        info!(chars = length, chunks = total, "memo split into chunks");

        let mut partials = Vec::with_capacity(total);
        for (i, chunk) in chunks.iter().enumerate() {
            let index = i + 1;
            progress.report(ProgressEvent::Chunk { index, total });
            info!(index, total, chars = chunk.char_len(), "analyzing chunk");
            let partial = self
                .analyzer
                .analyze_unit(&chunk.text)
                .await
                .map_err(|source| PipelineError::Chunk {
                    index,
                    total,
                    source,
                })?;
            partials.push(partial);
        }

        ctx.transition(PipelineState::Refining);
        progress.report(ProgressEvent::Refining);
        let merged = merger::merge(&partials);
        let result = refiner::refine(&*self.analyzer, &merged, self.options.refine_field_cap)
            .await
            .map_err(PipelineError::Refine)?;

        Ok(AnalysisOutcome::Refined {
            result,
            chunks: total,
        })
    }
}
