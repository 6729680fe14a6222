//! Core library: memo chunking, per-unit analysis, merge + refine, and the
//! orchestrating pipeline, plus provider wiring, memo loading and audio.

pub mod analysis;
pub mod analyzer;
pub mod audio;
pub mod chunker;
pub mod config;
pub mod memo;
pub mod merger;
pub mod parse;
pub mod pipeline;
pub mod refiner;
pub mod registry;
pub mod render;
pub mod status;

pub use analysis::{AnalysisResult, Field, NOT_AVAILABLE};
pub use analyzer::{AnalyzeError, Analyzer, LlmAnalyzer};
pub use pipeline::{AnalysisContext, AnalysisOutcome, Pipeline, PipelineError, ProgressEvent};
