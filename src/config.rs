//! Generation settings for the annotation pipeline.

use serde::{Deserialize, Serialize};

/// Environment variable holding the required API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable that overrides the default model name.
pub const MODEL_VAR: &str = "TABLESCRIBE_MODEL";

/// Settings for the two-stage generation protocol.
///
/// The description stage runs cooler than the question stage: descriptions
/// should be faithful to the sample, while question sets benefit from a
/// little more variety.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub describe_temperature: f32,
    pub question_temperature: f32,
    pub max_tokens: u32,
    /// Number of leading rows included in each data sample.
    pub sample_rows: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_owned(),
            describe_temperature: 0.5,
            question_temperature: 0.7,
            max_tokens: 2048,
            sample_rows: 20,
        }
    }
}

impl GenerationConfig {
    /// Default configuration, with the model name overridable via
    /// `TABLESCRIBE_MODEL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var(MODEL_VAR)
            && !model.trim().is_empty()
        {
            config.model = model;
        }
        config
    }
}
