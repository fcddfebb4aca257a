use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::llm_client::ProviderId;

/// Output languages a caller may request. English is the default and adds
/// nothing to the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Ru,
    Es,
    Fr,
    De,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Hi,
        Language::Ru,
        Language::Es,
        Language::Fr,
        Language::De,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Ru => "ru",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Ru => "Russian",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
        }
    }

    pub fn is_default(self) -> bool {
        self == Language::default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| format!("unsupported language code '{s}'"))
    }
}

/// The task-specific portion of a prompt.
///
/// `expects_percentage` opts the result into percentage extraction. Only
/// instructions whose wording asks for a `NN%` answer should set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    #[serde(default)]
    pub expects_percentage: bool,
}

impl Instruction {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expects_percentage: false,
        }
    }

    pub fn expecting_percentage(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expects_percentage: true,
        }
    }
}

/// A normalized analysis request. Fields are private so a request cannot be
/// altered once built.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    job_description: String,
    document_text: String,
    instruction: Instruction,
    target_language: Language,
}

impl AnalysisRequest {
    pub fn new(
        job_description: impl Into<String>,
        document_text: impl Into<String>,
        instruction: Instruction,
        target_language: Language,
    ) -> Self {
        Self {
            job_description: job_description.into(),
            document_text: document_text.into(),
            instruction,
            target_language,
        }
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn document_text(&self) -> &str {
        &self.document_text
    }

    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    pub fn target_language(&self) -> Language {
        self.target_language
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub provider_id: ProviderId,
    pub raw_text: String,
    /// Present only when the instruction opted in and the text carried a
    /// `<digits>%` value within 0..=100.
    pub extracted_percentage: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parses_case_insensitively() {
        assert_eq!("HI".parse::<Language>().unwrap(), Language::Hi);
        assert_eq!(" de ".parse::<Language>().unwrap(), Language::De);
    }

    #[test]
    fn test_language_rejects_unknown_code() {
        assert!("jp".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_default_is_english() {
        assert_eq!(Language::default(), Language::En);
        assert!(Language::En.is_default());
        assert!(!Language::Fr.is_default());
    }

    #[test]
    fn test_language_serde_uses_code() {
        let json = serde_json::to_string(&Language::Ru).unwrap();
        assert_eq!(json, r#""ru""#);
        let lang: Language = serde_json::from_str(r#""es""#).unwrap();
        assert_eq!(lang, Language::Es);
    }

    #[test]
    fn test_instruction_percentage_flag_defaults_off() {
        let instruction: Instruction =
            serde_json::from_str(r#"{"text": "summarize"}"#).unwrap();
        assert!(!instruction.expects_percentage);
    }
}
