//! Typed feature requests and the prompt builder.

use std::fmt;

use crate::error::{Result, UnravelerError};
use crate::prompts;

pub const PLANNING_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CITATION_STYLE: &str = "APA";
const UNNAMED_FILE: &str = "uploaded file";

/// Bare tag shared by requests and results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Planning,
    Analysis,
    Citation,
    Synthesis,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Planning => "planning",
            Feature::Analysis => "analysis",
            Feature::Citation => "citation",
            Feature::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One research operation requested by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureRequest {
    Planning {
        topic: String,
    },
    Analysis {
        topic: String,
    },
    Citation {
        topic: String,
        style: String,
        file_content: Option<String>,
        file_name: Option<String>,
    },
    Synthesis {
        context: String,
    },
}

impl FeatureRequest {
    pub fn feature(&self) -> Feature {
        match self {
            FeatureRequest::Planning { .. } => Feature::Planning,
            FeatureRequest::Analysis { .. } => Feature::Analysis,
            FeatureRequest::Citation { .. } => Feature::Citation,
            FeatureRequest::Synthesis { .. } => Feature::Synthesis,
        }
    }
}

/// Fully rendered instructions for one model call
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: Option<f32>,
}

/// Renders a [`FeatureRequest`] into a [`PromptSpec`] for a fixed model.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    model: String,
}

impl RequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    pub fn build(&self, request: &FeatureRequest) -> Result<PromptSpec> {
        let feature = request.feature();
        let (user_prompt, temperature) = match request {
            FeatureRequest::Planning { topic } => {
                let topic = require(topic, "Topic is required and must be a non-empty string")?;
                (prompts::planning_user_prompt(topic), Some(PLANNING_TEMPERATURE))
            }
            FeatureRequest::Analysis { topic } => {
                let topic = require(topic, "Topic is required and must be a non-empty string")?;
                (prompts::analysis_user_prompt(topic), None)
            }
            FeatureRequest::Citation {
                topic,
                style,
                file_content,
                file_name,
            } => {
                let style = non_blank(style).unwrap_or(DEFAULT_CITATION_STYLE);
                let prompt = match file_content.as_deref().and_then(non_blank) {
                    // File contents are embedded verbatim; only blank checks use the trimmed view.
                    Some(_) => prompts::citation_file_prompt(
                        file_name.as_deref().and_then(non_blank).unwrap_or(UNNAMED_FILE),
                        file_content.as_deref().unwrap_or_default(),
                        style,
                    ),
                    None => {
                        let topic =
                            require(topic, "Please enter a research topic or upload a file")?;
                        prompts::citation_topic_prompt(topic, style)
                    }
                };
                (prompt, None)
            }
            FeatureRequest::Synthesis { context } => {
                let context =
                    require(context, "Research context is required and must be non-empty")?;
                (prompts::synthesis_user_prompt(context), None)
            }
        };

        Ok(PromptSpec {
            system_prompt: prompts::system_prompt(feature).to_string(),
            user_prompt,
            model: self.model.clone(),
            temperature,
        })
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn require<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    non_blank(value).ok_or_else(|| UnravelerError::InputMissing {
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("google/gemini-2.5-flash")
    }

    fn citation(topic: &str, content: Option<&str>, name: Option<&str>) -> FeatureRequest {
        FeatureRequest::Citation {
            topic: topic.into(),
            style: "MLA".into(),
            file_content: content.map(Into::into),
            file_name: name.map(Into::into),
        }
    }

    #[test]
    fn test_planning_carries_fixed_temperature() {
        let prompt = builder()
            .build(&FeatureRequest::Planning {
                topic: "quantum computing".into(),
            })
            .unwrap();
        assert_eq!(prompt.temperature, Some(PLANNING_TEMPERATURE));
        assert!(prompt.user_prompt.starts_with("Research topic: quantum computing"));
        assert_eq!(prompt.system_prompt, prompts::PLANNING_SYSTEM_PROMPT);
        assert_eq!(prompt.model, "google/gemini-2.5-flash");
    }

    #[test]
    fn test_other_features_omit_temperature() {
        let requests = [
            FeatureRequest::Analysis { topic: "x".into() },
            citation("x", None, None),
            FeatureRequest::Synthesis {
                context: "x".into(),
            },
        ];
        for req in &requests {
            assert_eq!(builder().build(req).unwrap().temperature, None);
        }
    }

    #[test]
    fn test_blank_inputs_are_missing() {
        let requests = [
            FeatureRequest::Planning {
                topic: "   ".into(),
            },
            FeatureRequest::Analysis {
                topic: "\n\t".into(),
            },
            citation("", None, None),
            citation(" ", Some("  "), Some("notes.txt")),
            FeatureRequest::Synthesis {
                context: String::new(),
            },
        ];
        for req in &requests {
            let err = builder().build(req).unwrap_err();
            assert!(
                matches!(err, UnravelerError::InputMissing { .. }),
                "expected InputMissing for {:?}",
                req
            );
        }
    }

    #[test]
    fn test_citation_branches_on_file_content() {
        let topic_only = builder().build(&citation("climate policy", None, None)).unwrap();
        assert_eq!(
            topic_only.user_prompt,
            "Generate properly formatted citations in MLA style for research on: climate policy"
        );

        let with_file = builder()
            .build(&citation("", Some("year,value\n2020,4"), Some("data.csv")))
            .unwrap();
        assert!(with_file.user_prompt.starts_with("File uploaded: data.csv"));
        assert!(with_file.user_prompt.contains("year,value\n2020,4"));
        assert!(with_file.user_prompt.contains("generate MLA style citations"));
    }

    #[test]
    fn test_citation_defaults() {
        let req = FeatureRequest::Citation {
            topic: String::new(),
            style: "  ".into(),
            file_content: Some("body".into()),
            file_name: None,
        };
        let prompt = builder().build(&req).unwrap();
        assert!(prompt.user_prompt.starts_with("File uploaded: uploaded file"));
        assert!(prompt.user_prompt.contains("APA style citations"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let req = FeatureRequest::Synthesis {
            context: "LLM evaluation methods".into(),
        };
        assert_eq!(builder().build(&req).unwrap(), builder().build(&req).unwrap());
    }
}
