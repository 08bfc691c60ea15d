use clap::ValueEnum;
use serde::Deserialize;

/// Ceiling on the subject line the model is asked to respect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubjectLength {
    Short,
    #[default]
    Normal,
}

impl SubjectLength {
    pub fn max_chars(self) -> usize {
        match self {
            SubjectLength::Short => 36,
            SubjectLength::Normal => 72,
        }
    }
}

/// Output language(s). The first code of a multilingual list is the primary language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageConfig {
    Single(String),
    Multilingual(Vec<String>),
}

impl LanguageConfig {
    /// Collapse an ordered list of codes: more than one code means multilingual output,
    /// an empty list falls back to `fallback`.
    pub fn from_codes(codes: Vec<String>, fallback: &str) -> Self {
        let mut codes: Vec<String> = codes
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        match codes.len() {
            0 => LanguageConfig::Single(fallback.to_string()),
            1 => LanguageConfig::Single(codes.remove(0)),
            _ => LanguageConfig::Multilingual(codes),
        }
    }

    pub fn primary(&self) -> &str {
        match self {
            LanguageConfig::Single(code) => code,
            LanguageConfig::Multilingual(codes) => &codes[0],
        }
    }

    /// Languages that need a translated subject line.
    pub fn secondary(&self) -> &[String] {
        match self {
            LanguageConfig::Single(_) => &[],
            LanguageConfig::Multilingual(codes) => &codes[1..],
        }
    }

    pub fn is_multilingual(&self) -> bool {
        matches!(self, LanguageConfig::Multilingual(_))
    }
}

/// Best-effort repository context. Every field may be empty.
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    pub project_name: String,
    pub branch_name: String,
    pub recent_commits: Vec<String>,
    pub changed_files: Vec<String>,
    pub readme_snippet: String,
    pub diff_stats: String,
}

/// Everything the prompt needs for one commit. Only `custom_guidelines` changes after
/// construction, and only through [`CommitRequest::replace_guidelines`].
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub commit_type: String,
    pub scope: String,
    pub diff: String,
    pub ticket: Option<String>,
    pub languages: LanguageConfig,
    pub subject_length: SubjectLength,
    pub detailed: bool,
    pub custom_guidelines: Option<String>,
    pub context: ProjectContext,
}

impl CommitRequest {
    pub fn replace_guidelines(&mut self, guidelines: String) {
        self.custom_guidelines = Some(guidelines);
    }

    pub fn ticket(&self) -> Option<&str> {
        self.ticket.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn guidelines(&self) -> Option<&str> {
        self.custom_guidelines
            .as_deref()
            .filter(|g| !g.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_length_ceilings() {
        assert_eq!(SubjectLength::Short.max_chars(), 36);
        assert_eq!(SubjectLength::Normal.max_chars(), 72);
    }

    #[test]
    fn language_codes_collapse() {
        let single = LanguageConfig::from_codes(vec!["zh".into()], "en");
        assert_eq!(single, LanguageConfig::Single("zh".into()));
        assert!(!single.is_multilingual());

        let fallback = LanguageConfig::from_codes(vec![" ".into()], "en");
        assert_eq!(fallback.primary(), "en");

        let multi = LanguageConfig::from_codes(vec!["en".into(), "ja".into(), "de".into()], "en");
        assert!(multi.is_multilingual());
        assert_eq!(multi.primary(), "en");
        assert_eq!(multi.secondary(), &["ja".to_string(), "de".to_string()]);
    }

    #[test]
    fn blank_ticket_is_absent() {
        let req = CommitRequest {
            commit_type: "fix".into(),
            scope: String::new(),
            diff: String::new(),
            ticket: Some("  ".into()),
            languages: LanguageConfig::Single("en".into()),
            subject_length: SubjectLength::Normal,
            detailed: false,
            custom_guidelines: None,
            context: ProjectContext::default(),
        };
        assert_eq!(req.ticket(), None);
    }
}
