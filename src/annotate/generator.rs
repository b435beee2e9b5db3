//! The two generation stages of the chained-prompting protocol.
//!
//! `describe` and `ask` are independent calls with fixed role-specific system
//! prompts. Transport and service failures never propagate: the failing stage
//! returns a string embedding the error message, so one flaky call degrades a
//! single record instead of blocking the batch.

use crate::ai::ChatService;
use crate::config::GenerationConfig;
use crate::sample::DataSample;

const DESCRIBE_SYSTEM_PROMPT: &str = r#"You are a healthcare data analysis expert. Your goal is to read tabular hospital data and provide a clear and comprehensive description of the data.

#Precise Instructions
You will be provided with hospital data (headers and sample rows).
Generate a detailed description of the data that includes:
1. The purpose/function of this dataset in a hospital context
2. Description of key columns, examples of data points/values and their significance
3. The type of data captured and how it would be used in a hospital setting
4. Explain any abbreviations or acronyms used in the data

Your description should be thorough (1-2 paragraphs) and demonstrate a deep understanding of healthcare data."#;

const QUESTIONS_SYSTEM_PROMPT: &str = r#"You are a healthcare data analysis expert. Your goal is to generate 3 types of questions based on the description and the data sample.

#Precise Instructions
You will be provided with:
1. Hospital data (headers and sample rows)
2. A description of the data

Based on this information, generate a comprehensive LIST of questions that:
- A doctor might ask to gain clinical insights for a specific individual patient
- A hospital administrator might ask for operational/management insights
- A researcher might ask to identify biomedically relevant patterns or research opportunities

#Examples of questions
## Administrative questions
- How many patients were admitted with a certain diagnosis?
- How many patients were readmitted with a certain diagnosis?
- Average length of stay for patients with a certain diagnosis?
- Average length of stay in a certain unit?

## Research questions
- What is the relationship between the length of stay and the severity of the illness?
- Demographics of patients with a certain diagnosis?
- What is the relationship between the length of stay and the mortality rate?
- What is the relationship between the length of stay and the readmission rate?

## Clinical questions
- How long has patient X been in the hospital?
- What are lab values for patient X?
- How many previous admissions has patient X had?
- What procedures has patient X had?

Focus on questions that would require analysis of the data and would provide actionable insights to the doctor, administrator, or researcher.
The questions should be specific to the data columns available and overall relevant to the description of the data.

Return your response as a JSON object with three keys, each containing an array of strings with the questions.
For example:
{
    "administrative_questions": ["Question 1?", "Question 2?", "Question 3?"],
    "research_questions": ["Question 4?", "Question 5?", "Question 6?"],
    "clinical_questions": ["Question 7?", "Question 8?", "Question 9?"]
}

Do not include any other text in your response - ONLY output the JSON object."#;

/// Drives the two generation stages against a [`ChatService`].
pub struct Generator<S> {
    pub(super) service: S,
    config: GenerationConfig,
}

impl<S: ChatService> Generator<S> {
    pub fn new(service: S, config: GenerationConfig) -> Self {
        Self { service, config }
    }

    /// Stage one: generate a description of the sampled table.
    ///
    /// On any service failure the returned string embeds the error message;
    /// the caller proceeds regardless.
    pub async fn describe(&self, sample: &DataSample) -> String {
        tracing::info!("Generating description for {}", sample.filename);

        let user_prompt = format!("File: {}\n\n{}", sample.filename, sample.rendered);

        match self
            .service
            .complete(
                DESCRIBE_SYSTEM_PROMPT,
                &user_prompt,
                self.config.describe_temperature,
            )
            .await
        {
            Ok(description) => {
                tracing::info!(
                    "Description generated for {} ({} chars)",
                    sample.filename,
                    description.len()
                );
                description
            }
            Err(e) => {
                tracing::error!("Error generating description for {}: {e}", sample.filename);
                format!("Error generating description: {e}")
            }
        }
    }

    /// Stage two: generate the three-category question payload, conditioned
    /// on stage one's description. Returns the raw response unparsed; the
    /// response parser owns classification.
    pub async fn ask(&self, sample: &DataSample, description: &str) -> String {
        tracing::info!("Generating questions for {}", sample.filename);

        let user_prompt = format!(
            "File: {}\n\nDATA SAMPLE:\n{}\n\nDESCRIPTION OF THE DATA:\n{}",
            sample.filename, sample.rendered, description
        );

        match self
            .service
            .complete(
                QUESTIONS_SYSTEM_PROMPT,
                &user_prompt,
                self.config.question_temperature,
            )
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Error generating questions for {}: {e}", sample.filename);
                format!("Error generating questions: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::Mutex;

    struct RecordingChat {
        prompts: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl ChatService for RecordingChat {
        async fn complete(
            &self,
            system_prompt: &str,
            user_prompt: &str,
            _temperature: f32,
        ) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_owned(), user_prompt.to_owned()));
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok("ok".to_owned())
        }
    }

    fn sample() -> DataSample {
        DataSample {
            filename: "admissions.csv".to_owned(),
            header: vec!["subject_id".to_owned()],
            rows: vec![vec!["1".to_owned()]],
            rendered: "Header: [subject_id]\n\nFirst 1 rows:\nsubject_id\n1".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_describe_failure_embeds_error() {
        let generator = Generator::new(
            RecordingChat {
                prompts: Mutex::new(Vec::new()),
                fail: true,
            },
            GenerationConfig::default(),
        );

        let description = generator.describe(&sample()).await;
        assert!(description.starts_with("Error generating description:"));
        assert!(description.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_ask_is_conditioned_on_description() {
        let chat = RecordingChat {
            prompts: Mutex::new(Vec::new()),
            fail: false,
        };
        let generator = Generator::new(chat, GenerationConfig::default());

        let raw = generator
            .ask(&sample(), "Admissions table for one hospital stay per row.")
            .await;
        assert_eq!(raw, "ok");

        let prompts = generator.service.prompts.lock().unwrap();
        let (system, user) = &prompts[0];
        assert!(system.contains("administrative_questions"));
        assert!(user.contains("DESCRIPTION OF THE DATA:"));
        assert!(user.contains("Admissions table for one hospital stay per row."));
        assert!(user.contains("DATA SAMPLE:"));
    }
}
