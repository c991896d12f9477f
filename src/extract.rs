//! Locates the JSON payload inside a model's free-form reply.
//!
//! Rules are tried in order and the first hit wins:
//! 1. a fenced block tagged `json`
//! 2. an untagged fenced block
//! 3. everything from the first `{` to the last `}`
//!
//! No repair is attempted. A brace span that swallows unrelated prose braces is handed to the
//! validator as-is and fails there.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, UnravelerError};

static TAGGED_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[ \t]*(?i:json)[ \t]*\r?\n(.*?)\r?\n?[ \t]*```").unwrap());
static UNTAGGED_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[ \t]*\r?\n(.*?)\r?\n?[ \t]*```").unwrap());

/// Which rule produced a [`Candidate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    TaggedFence,
    Fence,
    BraceSpan,
}

/// Substring of the reply believed to hold a JSON object. Not yet parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub text: &'a str,
    pub source: CandidateSource,
}

pub fn extract_candidate(text: &str) -> Result<Candidate<'_>> {
    if let Some(body) = fenced(&TAGGED_FENCE_RE, text) {
        return Ok(Candidate {
            text: body,
            source: CandidateSource::TaggedFence,
        });
    }
    if let Some(body) = fenced(&UNTAGGED_FENCE_RE, text) {
        return Ok(Candidate {
            text: body,
            source: CandidateSource::Fence,
        });
    }
    if let Some(span) = brace_span(text) {
        return Ok(Candidate {
            text: span,
            source: CandidateSource::BraceSpan,
        });
    }
    Err(UnravelerError::Extraction {
        message: "Invalid response format from AI: no JSON payload found".to_string(),
    })
}

fn fenced<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
