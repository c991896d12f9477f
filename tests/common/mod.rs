//! Shared helpers for integration tests: a scripted in-process gateway and reply fixtures.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use topic_unraveler::PromptSpec;
use topic_unraveler::clients::{GatewayError, ModelGateway, RawModelResponse};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Status(u16, String),
    /// Never answers within any reasonable deadline
    Hang,
}

/// Gateway that replays queued replies, then repeats the fallback (if any)
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<Reply>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<PromptSpec>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: Reply) -> Self {
        Self {
            fallback: Some(reply),
            ..Self::new(Vec::new())
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Reply::Text(text.into())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<PromptSpec> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, prompt: &PromptSpec) -> Result<RawModelResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone());
        match next {
            Some(Reply::Text(text)) => Ok(RawModelResponse::new(text)),
            Some(Reply::Status(status, body)) => Err(GatewayError::Status { status, body }),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GatewayError::Transport("hung".into()))
            }
            None => Err(GatewayError::Transport("script exhausted".into())),
        }
    }
}

pub fn fenced(value: &Value) -> String {
    format!(
        "Here is your structured output:\n\n```json\n{}\n```\n\nLet me know if you need more.",
        serde_json::to_string_pretty(value).unwrap()
    )
}

pub fn planning_payload(subtopics: usize, steps: usize) -> Value {
    let items: Vec<Value> = (0..subtopics)
        .map(|i| {
            json!({
                "title": format!("Subtopic {}", i + 1),
                "description": "A focused research area with concrete sources.",
                "importance": "Directly shapes the research question.",
                "actionSteps": (0..steps).map(|s| format!("Step {}", s + 1)).collect::<Vec<_>>(),
                "category": "Technical Framework"
            })
        })
        .collect();
    json!({ "subtopics": items })
}

pub fn analysis_payload() -> Value {
    json!({
        "insights": [
            { "title": "Adoption is uneven", "summary": "Large labs lead; startups lag." }
        ],
        "comparisons": [
            { "aspect": "Qubit modality", "options": ["Superconducting", "Trapped ion"],
              "details": ["Fast gates", "Long coherence"] }
        ],
        "visualizations": [
            { "type": "Line chart", "description": "Qubit counts by year", "purpose": "Show growth" }
        ]
    })
}

pub fn citation_payload() -> Value {
    json!({
        "citations": [
            { "reference": "Preskill, J. (2018). Quantum Computing in the NISQ era and beyond. Quantum, 2, 79.",
              "style": "APA" }
        ],
        "summary": "The file reports steady growth.",
        "chartSuggestion": "Bar chart"
    })
}

pub fn synthesis_payload() -> Value {
    json!({
        "executiveSummary": "Quantum advantage remains narrow but is widening.",
        "keyInsights": [
            { "title": "Error rates fall", "content": "Two-qubit fidelity passed 99.9%.",
              "visual": "Line chart of fidelity over time" }
        ],
        "implications": "Cryptographic migration should begin now.",
        "recommendations": ["Inventory RSA usage", "Fund error-correction research"]
    })
}
