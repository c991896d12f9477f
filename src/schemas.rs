//! Per-feature structural validation of model payloads.
//!
//! Validation walks the raw `serde_json::Value` first and records every violation with its
//! field path. Only a payload with zero violations is deserialized into the typed result, so a
//! partially valid reply never produces a partial result.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Result, SchemaViolation, UnravelerError};
use crate::request::Feature;
use crate::results::{
    AnalysisResult, CitationResult, SubtopicsResult, SynthesisResult, ValidatedResult,
};

/// Shape check for one feature's payload
pub trait FeatureSchema: DeserializeOwned {
    const FEATURE: Feature;

    /// Record every violation found in `root`.
    fn check(root: &Map<String, Value>, v: &mut Violations);

    fn into_result(self) -> ValidatedResult;
}

/// Parse the candidate text and validate it against the schema for `feature`.
pub fn validate_candidate(candidate: &str, feature: Feature) -> Result<ValidatedResult> {
    let value: Value = serde_json::from_str(candidate)?;
    validate_value(value, feature)
}

pub fn validate_value(value: Value, feature: Feature) -> Result<ValidatedResult> {
    match feature {
        Feature::Planning => validate::<SubtopicsResult>(value),
        Feature::Analysis => validate::<AnalysisResult>(value),
        Feature::Citation => validate::<CitationResult>(value),
        Feature::Synthesis => validate::<SynthesisResult>(value),
    }
}

fn validate<S: FeatureSchema>(value: Value) -> Result<ValidatedResult> {
    let mut v = Violations::default();
    match value.as_object() {
        Some(root) => S::check(root, &mut v),
        None => v.push("$", "expected a JSON object"),
    }
    if !v.is_empty() {
        tracing::debug!(
            "{} payload failed validation with {} violation(s)",
            S::FEATURE,
            v.items.len()
        );
        return Err(UnravelerError::Schema {
            violations: v.into_inner(),
        });
    }
    let typed: S = serde_json::from_value(value).map_err(|e| UnravelerError::Schema {
        violations: vec![SchemaViolation::new("$", e.to_string())],
    })?;
    Ok(typed.into_result())
}

/// Violation collector with path-aware field checks
#[derive(Debug, Default)]
pub struct Violations {
    items: Vec<SchemaViolation>,
}

impl Violations {
    pub fn push(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.items.push(SchemaViolation::new(path, reason));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_inner(self) -> Vec<SchemaViolation> {
        self.items
    }

    /// Require `obj[key]` to be a string, optionally non-blank.
    fn string(&mut self, obj: &Map<String, Value>, parent: &str, key: &str, non_empty: bool) {
        let path = join(parent, key);
        match obj.get(key) {
            None => self.push(path, "is required"),
            Some(Value::String(s)) if non_empty && s.trim().is_empty() => {
                self.push(path, "must be a non-empty string")
            }
            Some(Value::String(_)) => {}
            Some(other) => self.push(path, format!("expected string, found {}", type_name(other))),
        }
    }

    /// Allow `obj[key]` to be absent or null; otherwise it must be a string.
    fn optional_string(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) {
        match obj.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => self.push(
                join(parent, key),
                format!("expected string, found {}", type_name(other)),
            ),
        }
    }

    /// Require `obj[key]` to be an array, possibly empty.
    fn list<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'v Vec<Value>> {
        match obj.get(key) {
            None => {
                self.push(join(parent, key), "is required");
                None
            }
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                self.push(
                    join(parent, key),
                    format!("expected array, found {}", type_name(other)),
                );
                None
            }
        }
    }

    /// Require `obj[key]` to be a non-empty array.
    fn array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'v Vec<Value>> {
        let items = self.list(obj, parent, key)?;
        if items.is_empty() {
            self.push(join(parent, key), "must not be empty");
            return None;
        }
        Some(items)
    }

    /// Require a non-empty array of strings; returns its length when the array itself is valid.
    fn string_array(
        &mut self,
        obj: &Map<String, Value>,
        parent: &str,
        key: &str,
        non_empty_items: bool,
    ) -> Option<usize> {
        let items = self.array(obj, parent, key)?;
        self.strings(items, &join(parent, key), non_empty_items);
        Some(items.len())
    }

    /// Like [`Violations::string_array`], but an empty array is fine.
    fn string_list(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) -> Option<usize> {
        let items = self.list(obj, parent, key)?;
        self.strings(items, &join(parent, key), false);
        Some(items.len())
    }

    fn strings(&mut self, items: &[Value], path: &str, non_empty_items: bool) {
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) if non_empty_items && s.trim().is_empty() => {
                    self.push(index(path, i), "must be a non-empty string")
                }
                Value::String(_) => {}
                other => self.push(
                    index(path, i),
                    format!("expected string, found {}", type_name(other)),
                ),
            }
        }
    }

    /// Run `each` on every element of the non-empty array `obj[key]` that is an object.
    fn objects(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        mut each: impl FnMut(&mut Self, &Map<String, Value>, &str),
    ) {
        let Some(items) = self.array(obj, "", key) else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let path = index(key, i);
            match item.as_object() {
                Some(inner) => each(self, inner, &path),
                None => self.push(path, format!("expected object, found {}", type_name(item))),
            }
        }
    }
}

impl FeatureSchema for SubtopicsResult {
    const FEATURE: Feature = Feature::Planning;

    fn check(root: &Map<String, Value>, v: &mut Violations) {
        v.objects(root, "subtopics", |v, item, path| {
            for key in ["title", "description", "importance", "category"] {
                v.string(item, path, key, true);
            }
            v.string_array(item, path, "actionSteps", false);
        });
    }

    fn into_result(self) -> ValidatedResult {
        ValidatedResult::Subtopics(self)
    }
}

impl FeatureSchema for AnalysisResult {
    const FEATURE: Feature = Feature::Analysis;

    fn check(root: &Map<String, Value>, v: &mut Violations) {
        v.objects(root, "insights", |v, item, path| {
            v.string(item, path, "title", false);
            v.string(item, path, "summary", false);
        });
        v.objects(root, "comparisons", |v, item, path| {
            v.string(item, path, "aspect", false);
            let options = v.string_list(item, path, "options");
            let details = v.string_list(item, path, "details");
            if let (Some(o), Some(d)) = (options, details)
                && o != d
            {
                v.push(
                    path,
                    format!("options has {o} entries but details has {d}; lengths must match"),
                );
            }
        });
        v.objects(root, "visualizations", |v, item, path| {
            for key in ["type", "description", "purpose"] {
                v.string(item, path, key, false);
            }
        });
    }

    fn into_result(self) -> ValidatedResult {
        ValidatedResult::Analysis(self)
    }
}

impl FeatureSchema for CitationResult {
    const FEATURE: Feature = Feature::Citation;

    fn check(root: &Map<String, Value>, v: &mut Violations) {
        v.objects(root, "citations", |v, item, path| {
            v.string(item, path, "reference", false);
            v.string(item, path, "style", false);
        });
        v.optional_string(root, "", "summary");
        v.optional_string(root, "", "chartSuggestion");
    }

    fn into_result(self) -> ValidatedResult {
        ValidatedResult::Citation(self)
    }
}

impl FeatureSchema for SynthesisResult {
    const FEATURE: Feature = Feature::Synthesis;

    fn check(root: &Map<String, Value>, v: &mut Violations) {
        v.string(root, "", "executiveSummary", true);
        v.objects(root, "keyInsights", |v, item, path| {
            for key in ["title", "content", "visual"] {
                v.string(item, path, key, false);
            }
        });
        v.string(root, "", "implications", true);
        v.string_array(root, "", "recommendations", true);
    }

    fn into_result(self) -> ValidatedResult {
        ValidatedResult::Synthesis(self)
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violations(value: Value, feature: Feature) -> Vec<SchemaViolation> {
        match validate_value(value, feature) {
            Err(UnravelerError::Schema { violations }) => violations,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    fn paths(vs: &[SchemaViolation]) -> Vec<&str> {
        vs.iter().map(|v| v.path.as_str()).collect()
    }

    fn subtopic(steps: Value) -> Value {
        json!({
            "title": "Error correction",
            "description": "Surface codes and their overheads.",
            "importance": "Gates practical machines.",
            "actionSteps": steps,
            "category": "Technical Framework"
        })
    }

    #[test]
    fn test_planning_valid() {
        let result = validate_value(
            json!({ "subtopics": [subtopic(json!(["Read the 2023 surface-code papers"]))] }),
            Feature::Planning,
        )
        .unwrap();
        match result {
            ValidatedResult::Subtopics(r) => {
                assert_eq!(r.subtopics[0].action_steps.len(), 1);
                assert_eq!(r.subtopics[0].category, "Technical Framework");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_planning_empty_collections() {
        let vs = violations(json!({ "subtopics": [] }), Feature::Planning);
        assert_eq!(paths(&vs), vec!["subtopics"]);

        let vs = violations(
            json!({ "subtopics": [subtopic(json!(["ok"])), subtopic(json!([]))] }),
            Feature::Planning,
        );
        assert_eq!(paths(&vs), vec!["subtopics[1].actionSteps"]);
    }

    #[test]
    fn test_planning_reports_all_violations() {
        let vs = violations(
            json!({ "subtopics": [
                { "title": "", "description": 3, "importance": "i", "actionSteps": ["a", 1] },
                "not an object"
            ]}),
            Feature::Planning,
        );
        assert_eq!(
            paths(&vs),
            vec![
                "subtopics[0].title",
                "subtopics[0].description",
                "subtopics[0].category",
                "subtopics[0].actionSteps[1]",
                "subtopics[1]",
            ]
        );
    }

    fn analysis(comparisons: Value) -> Value {
        json!({
            "insights": [{ "title": "t", "summary": "s" }],
            "comparisons": comparisons,
            "visualizations": [{ "type": "Line chart", "description": "d", "purpose": "p" }]
        })
    }

    #[test]
    fn test_analysis_mismatched_comparison() {
        let vs = violations(
            analysis(json!([{ "aspect": "X", "options": ["a", "b"], "details": ["only one"] }])),
            Feature::Analysis,
        );
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].path, "comparisons[0]");
        assert!(vs[0].reason.contains("options has 2"));
    }

    #[test]
    fn test_analysis_valid_and_missing_sections() {
        assert!(
            validate_value(
                analysis(json!([{ "aspect": "X", "options": ["a"], "details": ["b"] }])),
                Feature::Analysis
            )
            .is_ok()
        );

        let vs = violations(json!({ "insights": [] }), Feature::Analysis);
        assert_eq!(paths(&vs), vec!["insights", "comparisons", "visualizations"]);
    }

    #[test]
    fn test_analysis_empty_comparison_lists_are_valid() {
        let result = validate_value(
            analysis(json!([{ "aspect": "X", "options": [], "details": [] }])),
            Feature::Analysis,
        )
        .unwrap();
        match result {
            ValidatedResult::Analysis(a) => {
                assert!(a.comparisons[0].options.is_empty());
                assert!(a.comparisons[0].details.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }

        let vs = violations(
            analysis(json!([{ "aspect": "X", "options": [], "details": ["d"] }])),
            Feature::Analysis,
        );
        assert_eq!(paths(&vs), vec!["comparisons[0]"]);
    }

    #[test]
    fn test_analysis_item_fields() {
        let cases = [
            (
                json!({
                    "insights": [{ "title": "t", "summary": "s" }],
                    "comparisons": [{ "aspect": "X", "options": ["a"], "details": ["b"] }],
                    "visualizations": [{ "type": "Bar chart", "description": "d" }]
                }),
                vec!["visualizations[0].purpose"],
            ),
            (
                analysis(json!([{ "options": ["a"], "details": "b" }])),
                vec!["comparisons[0].aspect", "comparisons[0].details"],
            ),
        ];
        for (payload, expected) in cases {
            assert_eq!(paths(&violations(payload, Feature::Analysis)), expected);
        }
    }

    #[test]
    fn test_citation_required_fields() {
        let cases = [
            (json!({ "citations": [] }), vec!["citations"]),
            (json!({ "summary": "s" }), vec!["citations"]),
            (
                json!({ "citations": [{ "style": "APA" }] }),
                vec!["citations[0].reference"],
            ),
            (
                json!({ "citations": [{ "reference": "r" }, { "reference": "r2", "style": "MLA" }] }),
                vec!["citations[0].style"],
            ),
        ];
        for (payload, expected) in cases {
            assert_eq!(paths(&violations(payload, Feature::Citation)), expected);
        }
    }

    #[test]
    fn test_citation_optionals() {
        let ok = validate_value(
            json!({ "citations": [{ "reference": "r", "style": "APA" }], "summary": null }),
            Feature::Citation,
        )
        .unwrap();
        assert_eq!(
            ok,
            ValidatedResult::Citation(CitationResult {
                citations: vec![crate::results::Citation {
                    reference: "r".into(),
                    style: "APA".into()
                }],
                summary: None,
                chart_suggestion: None,
            })
        );

        let vs = violations(
            json!({ "citations": [{ "reference": "r", "style": "APA" }], "chartSuggestion": 4 }),
            Feature::Citation,
        );
        assert_eq!(paths(&vs), vec!["chartSuggestion"]);
    }

    #[test]
    fn test_synthesis_rules() {
        let vs = violations(
            json!({
                "executiveSummary": " ",
                "keyInsights": [{ "title": "t", "content": "c" }],
                "implications": "i",
                "recommendations": ["do this", ""]
            }),
            Feature::Synthesis,
        );
        assert_eq!(
            paths(&vs),
            vec![
                "executiveSummary",
                "keyInsights[0].visual",
                "recommendations[1]"
            ]
        );
    }

    #[test]
    fn test_synthesis_required_sections() {
        let base = json!({
            "executiveSummary": "Summary",
            "keyInsights": [{ "title": "t", "content": "c", "visual": "v" }],
            "implications": "Implications",
            "recommendations": ["Act"]
        });
        assert!(validate_value(base.clone(), Feature::Synthesis).is_ok());

        let cases: [(&str, Option<Value>, &str); 4] = [
            ("keyInsights", Some(json!([])), "keyInsights"),
            ("implications", None, "implications"),
            ("implications", Some(json!("   ")), "implications"),
            ("recommendations", Some(json!([])), "recommendations"),
        ];
        for (key, replacement, expected) in cases {
            let mut payload = base.clone();
            let root = payload.as_object_mut().unwrap();
            match replacement {
                Some(value) => {
                    root.insert(key.to_string(), value);
                }
                None => {
                    root.remove(key);
                }
            }
            assert_eq!(
                paths(&violations(payload, Feature::Synthesis)),
                vec![expected],
                "{key}"
            );
        }
    }

    #[test]
    fn test_root_must_be_object() {
        let vs = violations(json!([1, 2]), Feature::Synthesis);
        assert_eq!(paths(&vs), vec!["$"]);
    }

    #[test]
    fn test_unparseable_candidate_is_parse_error() {
        let err = validate_candidate("{\"subtopics\": [", Feature::Planning).unwrap_err();
        assert!(matches!(err, UnravelerError::Parse { .. }));
    }

    #[test]
    fn test_schema_features_line_up() {
        assert_eq!(SubtopicsResult::FEATURE, Feature::Planning);
        assert_eq!(AnalysisResult::FEATURE, Feature::Analysis);
        assert_eq!(CitationResult::FEATURE, Feature::Citation);
        assert_eq!(SynthesisResult::FEATURE, Feature::Synthesis);
    }
}
