//! Typed, schema-checked outputs. Field names serialize in camelCase to match the wire format.

use serde::{Deserialize, Serialize};

use crate::request::Feature;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
    pub title: String,
    pub description: String,
    pub importance: String,
    pub action_steps: Vec<String>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtopicsResult {
    pub subtopics: Vec<Subtopic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub summary: String,
}

/// Side-by-side comparison; `options` and `details` always have equal length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub aspect: String,
    pub options: Vec<String>,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visualization {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub insights: Vec<Insight>,
    pub comparisons: Vec<Comparison>,
    pub visualizations: Vec<Visualization>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub reference: String,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationResult {
    pub citations: Vec<Citation>,
    /// Only meaningful for file-backed requests; never required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInsight {
    pub title: String,
    pub content: String,
    pub visual: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    pub executive_summary: String,
    pub key_insights: Vec<KeyInsight>,
    pub implications: String,
    pub recommendations: Vec<String>,
}

/// Output of one successful invocation; serializes as the bare inner object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidatedResult {
    Subtopics(SubtopicsResult),
    Analysis(AnalysisResult),
    Citation(CitationResult),
    Synthesis(SynthesisResult),
}

impl ValidatedResult {
    pub fn feature(&self) -> Feature {
        match self {
            ValidatedResult::Subtopics(_) => Feature::Planning,
            ValidatedResult::Analysis(_) => Feature::Analysis,
            ValidatedResult::Citation(_) => Feature::Citation,
            ValidatedResult::Synthesis(_) => Feature::Synthesis,
        }
    }
}
