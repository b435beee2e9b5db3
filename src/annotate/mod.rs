//! Two-stage table annotation.
//!
//! The annotator composes the generator and the response parser into one
//! `annotate(sample)` operation: describe the sample, ask for role-specific
//! questions conditioned on that description, then classify whatever came
//! back. There is no branching between the stages; a failed description
//! stage still feeds its error-marker string into the question stage, so
//! every sample produces a result.

pub mod generator;
pub mod parser;

use crate::ai::ChatService;
use crate::config::GenerationConfig;
use crate::sample::DataSample;
use serde::{Deserialize, Serialize};

pub use generator::Generator;
pub use parser::{ParsedQuestions, RawQuestions, parse};

/// One table's annotation, persisted verbatim as the `.analysis.json`
/// artifact.
///
/// Each question list is a sequence of non-empty strings (possibly empty).
/// `description` is non-empty unless generation failed, in which case it
/// holds the error-marker string; failure is encoded in data, never raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub description: String,
    pub administrative_questions: Vec<String>,
    pub research_questions: Vec<String>,
    pub clinical_questions: Vec<String>,
}

impl AnalysisResult {
    /// Total number of questions across the three categories.
    pub fn question_count(&self) -> usize {
        self.administrative_questions.len()
            + self.research_questions.len()
            + self.clinical_questions.len()
    }
}

/// Composes [`Generator`] and the response parser into the two-stage
/// chained-prompting protocol.
pub struct Annotator<S> {
    generator: Generator<S>,
}

impl<S: ChatService> Annotator<S> {
    pub fn new(service: S, config: GenerationConfig) -> Self {
        Self {
            generator: Generator::new(service, config),
        }
    }

    /// Run both stages over one sample and assemble the result.
    pub async fn annotate(&self, sample: &DataSample) -> AnalysisResult {
        let description = self.generator.describe(sample).await;
        let raw = self.generator.ask(sample, &description).await;
        let questions = parser::parse(RawQuestions::from(raw));

        AnalysisResult {
            description,
            administrative_questions: questions.administrative,
            research_questions: questions.research,
            clinical_questions: questions.clinical,
        }
    }
}
