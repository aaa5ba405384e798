//! Wire types for the `/refine-prompt` endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RefineError;

/// Subject area the refined prompt should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Architecture,
    Development,
    Infrastructure,
    Security,
    General,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Architecture => "architecture",
            Domain::Development => "development",
            Domain::Infrastructure => "infrastructure",
            Domain::Security => "security",
            Domain::General => "general",
        }
    }
}

/// Audience level the refined prompt is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl ExpertiseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Beginner => "beginner",
            ExpertiseLevel::Intermediate => "intermediate",
            ExpertiseLevel::Expert => "expert",
        }
    }
}

/// Shape of the refined prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Simple,
    Detailed,
    Tutorial,
    Checklist,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Simple => "simple",
            OutputFormat::Detailed => "detailed",
            OutputFormat::Tutorial => "tutorial",
            OutputFormat::Checklist => "checklist",
        }
    }
}

macro_rules! impl_str_enum {
    ($ty:ident, $what:literal, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = RefineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_lowercase();
                $(
                    if lower == $ty::$variant.as_str() {
                        return Ok($ty::$variant);
                    }
                )+
                Err(RefineError::Validation(format!("unknown {}: {}", $what, s)))
            }
        }
    };
}

impl_str_enum!(Domain, "domain", [Architecture, Development, Infrastructure, Security, General]);
impl_str_enum!(ExpertiseLevel, "expertise level", [Beginner, Intermediate, Expert]);
impl_str_enum!(OutputFormat, "output format", [Simple, Detailed, Tutorial, Checklist]);

/// Optional refinement parameters.
///
/// Every field is independently optional. A `None` field is left out of the
/// request body entirely, which the service treats differently from an
/// explicit value (including `false`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineOptions {
    pub domain: Option<Domain>,
    pub expertise_level: Option<ExpertiseLevel>,
    pub output_format: Option<OutputFormat>,
    pub include_best_practices: Option<bool>,
    pub include_examples: Option<bool>,
}

impl RefineOptions {
    /// Set the target domain.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Set the expertise level.
    pub fn with_expertise_level(mut self, level: ExpertiseLevel) -> Self {
        self.expertise_level = Some(level);
        self
    }

    /// Set the output format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Ask for (or explicitly decline) best-practice guidance.
    pub fn with_best_practices(mut self, include: bool) -> Self {
        self.include_best_practices = Some(include);
        self
    }

    /// Ask for (or explicitly decline) worked examples.
    pub fn with_examples(mut self, include: bool) -> Self {
        self.include_examples = Some(include);
        self
    }

    /// Fill every unset field from `defaults`, keeping fields already set.
    pub fn or(self, defaults: RefineOptions) -> Self {
        Self {
            domain: self.domain.or(defaults.domain),
            expertise_level: self.expertise_level.or(defaults.expertise_level),
            output_format: self.output_format.or(defaults.output_format),
            include_best_practices: self
                .include_best_practices
                .or(defaults.include_best_practices),
            include_examples: self.include_examples.or(defaults.include_examples),
        }
    }
}

/// Request body for `POST /refine-prompt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub lazy_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise_level: Option<ExpertiseLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_best_practices: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_examples: Option<bool>,
}

impl PromptRequest {
    /// Build a request from a lazy prompt and optional parameters.
    ///
    /// Fails with [`RefineError::Validation`] when `lazy_prompt` is empty.
    pub fn new(lazy_prompt: impl Into<String>, options: RefineOptions) -> Result<Self, RefineError> {
        let lazy_prompt = lazy_prompt.into();
        if lazy_prompt.is_empty() {
            return Err(RefineError::Validation(
                "lazy prompt cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            lazy_prompt,
            domain: options.domain,
            expertise_level: options.expertise_level,
            output_format: options.output_format,
            include_best_practices: options.include_best_practices,
            include_examples: options.include_examples,
        })
    }

    /// The optional parameters carried by this request.
    pub fn options(&self) -> RefineOptions {
        RefineOptions {
            domain: self.domain,
            expertise_level: self.expertise_level,
            output_format: self.output_format,
            include_best_practices: self.include_best_practices,
            include_examples: self.include_examples,
        }
    }

    /// Encode the request as a JSON body.
    pub fn to_json(&self) -> Result<Vec<u8>, RefineError> {
        serde_json::to_vec(self).map_err(RefineError::Serialization)
    }
}

/// Response body from a successful refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResponse {
    pub refined_prompt: String,
    #[serde(default)]
    pub detected_topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_references: Option<Vec<String>>,
}

impl PromptResponse {
    /// Decode a response body.
    pub fn from_json(body: &[u8]) -> Result<Self, RefineError> {
        serde_json::from_slice(body).map_err(RefineError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn encode(request: &PromptRequest) -> Value {
        serde_json::from_slice(&request.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let err = PromptRequest::new("", RefineOptions::default()).unwrap_err();
        assert!(matches!(err, RefineError::Validation(_)));
    }

    #[test]
    fn test_whitespace_prompt_accepted() {
        let request = PromptRequest::new("  ", RefineOptions::default()).unwrap();
        assert_eq!(request.lazy_prompt, "  ");
    }

    #[test]
    fn test_absent_options_omitted() {
        let request = PromptRequest::new("deploy a cluster", RefineOptions::default()).unwrap();
        let json = encode(&request);
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 1);
        assert_eq!(object["lazy_prompt"], "deploy a cluster");
        for field in [
            "domain",
            "expertise_level",
            "output_format",
            "include_best_practices",
            "include_examples",
        ] {
            assert!(!object.contains_key(field), "{} should be omitted", field);
        }
    }

    #[test]
    fn test_explicit_false_is_serialized() {
        let options = RefineOptions::default()
            .with_best_practices(false)
            .with_examples(false);
        let json = encode(&PromptRequest::new("x", options).unwrap());

        assert_eq!(json["include_best_practices"], Value::Bool(false));
        assert_eq!(json["include_examples"], Value::Bool(false));
        assert!(json.get("domain").is_none());
    }

    #[test]
    fn test_all_options_serialized() {
        let options = RefineOptions::default()
            .with_domain(Domain::Infrastructure)
            .with_expertise_level(ExpertiseLevel::Expert)
            .with_output_format(OutputFormat::Tutorial)
            .with_best_practices(true)
            .with_examples(true);
        let json = encode(&PromptRequest::new("test prompt", options).unwrap());

        assert_eq!(json["domain"], "infrastructure");
        assert_eq!(json["expertise_level"], "expert");
        assert_eq!(json["output_format"], "tutorial");
        assert_eq!(json["include_best_practices"], true);
        assert_eq!(json["include_examples"], true);
    }

    #[test]
    fn test_options_roundtrip_through_request() {
        let options = RefineOptions::default()
            .with_domain(Domain::Security)
            .with_examples(false);
        let request = PromptRequest::new("harden ssh", options).unwrap();
        assert_eq!(request.options(), options);
    }

    #[test]
    fn test_options_or_keeps_explicit_values() {
        let defaults = RefineOptions::default()
            .with_domain(Domain::General)
            .with_best_practices(true);
        let merged = RefineOptions::default()
            .with_best_practices(false)
            .or(defaults);

        assert_eq!(merged.domain, Some(Domain::General));
        assert_eq!(merged.include_best_practices, Some(false));
        assert_eq!(merged.include_examples, None);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Security".parse::<Domain>().unwrap(), Domain::Security);
        assert_eq!(
            " intermediate ".parse::<ExpertiseLevel>().unwrap(),
            ExpertiseLevel::Intermediate
        );
        assert_eq!("CHECKLIST".parse::<OutputFormat>().unwrap(), OutputFormat::Checklist);
        assert!("cooking".parse::<Domain>().is_err());
        assert_eq!(Domain::Architecture.to_string(), "architecture");
    }

    #[test]
    fn test_response_decoding() {
        let body = br#"{"refined_prompt":"Enhanced: test","detected_topics":["Topic1","Topic2"],"recommended_references":["Ref1","Ref2"]}"#;
        let response = PromptResponse::from_json(body).unwrap();

        assert_eq!(response.refined_prompt, "Enhanced: test");
        assert_eq!(response.detected_topics, vec!["Topic1", "Topic2"]);
        assert_eq!(
            response.recommended_references,
            Some(vec!["Ref1".to_string(), "Ref2".to_string()])
        );
    }

    #[test]
    fn test_response_without_references() {
        let body = br#"{"refined_prompt":"Simple: x","detected_topics":[]}"#;
        let response = PromptResponse::from_json(body).unwrap();
        assert!(response.detected_topics.is_empty());
        assert!(response.recommended_references.is_none());
    }

    #[test]
    fn test_response_missing_refined_prompt_fails() {
        let err = PromptResponse::from_json(br#"{"detected_topics":[]}"#).unwrap_err();
        assert!(matches!(err, RefineError::Decode(_)));

        let err = PromptResponse::from_json(b"not json").unwrap_err();
        assert!(matches!(err, RefineError::Decode(_)));
    }
}
