use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::cli_args::CommitArgs;
use crate::i18n;
use crate::request::{LanguageConfig, SubjectLength};

const DEFAULT_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_LANGUAGE: &str = "en";

/// A commit type offered in the type menu.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitType {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub emoji: String,
}

fn default_types() -> Vec<CommitType> {
    [
        ("feat", "A new feature", "✨"),
        ("fix", "A bug fix", "🐛"),
        ("docs", "Documentation only changes", "📝"),
        ("style", "Code style changes (formatting, etc)", "💄"),
        ("refactor", "Code refactoring", "♻️"),
        ("perf", "Performance improvements", "⚡"),
        ("test", "Adding or updating tests", "✅"),
        ("chore", "Build process or auxiliary tool changes", "🔧"),
        ("ci", "CI configuration changes", "👷"),
        ("build", "Build system changes", "📦"),
    ]
    .into_iter()
    .map(|(name, desc, emoji)| CommitType {
        name: name.to_string(),
        desc: desc.to_string(),
        emoji: emoji.to_string(),
    })
    .collect()
}

/// Final resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub ollama_url: String,
    pub languages: LanguageConfig,
    pub detailed_commit: bool,
    pub custom_prompt: Option<String>,
    pub subject_length: SubjectLength,
    pub types: Vec<CommitType>,
    pub scopes: Vec<String>,
    pub prompt_scope: bool,
    pub ticket_prefix: Option<String>,
    pub require_ticket: bool,
    pub stream: bool,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags (`--model`, `--language`, `--ollama-url`, ...)
    ///   2. Env vars `COMMITPILOT_MODEL`, `COMMITPILOT_LANGUAGE`, `COMMITPILOT_OLLAMA_URL`
    ///   3. TOML `./.commitpilot.toml`, else `~/.config/commitpilot.toml`
    ///   4. Hardcoded defaults
    pub fn from_sources(args: &CommitArgs) -> Result<Self> {
        let file_cfg = load_file_config()?.unwrap_or_default();
        Ok(Self::resolve(args, |key| env::var(key).ok(), file_cfg))
    }

    fn resolve(args: &CommitArgs, env_var: impl Fn(&str) -> Option<String>, file: FileConfig) -> Self {
        let model = args
            .common
            .model
            .clone()
            .or_else(|| env_var("COMMITPILOT_MODEL"))
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let ollama_url = args
            .common
            .ollama_url
            .clone()
            .or_else(|| env_var("COMMITPILOT_OLLAMA_URL"))
            .or(file.ollama_url)
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let codes = if !args.common.language.is_empty() {
            args.common.language.clone()
        } else if let Some(env_langs) = env_var("COMMITPILOT_LANGUAGE") {
            env_langs.split(',').map(str::to_string).collect()
        } else if !file.languages.is_empty() {
            file.languages
        } else {
            file.language.into_iter().collect()
        };
        let codes = codes.iter().map(|c| i18n::normalize_code(c)).collect();
        let languages = LanguageConfig::from_codes(codes, DEFAULT_LANGUAGE);

        let types = if file.types.is_empty() {
            default_types()
        } else {
            file.types
        };

        Config {
            model,
            ollama_url,
            languages,
            detailed_commit: file.detailed_commit.unwrap_or(true),
            custom_prompt: file.custom_prompt.filter(|p| !p.trim().is_empty()),
            subject_length: args
                .subject_length
                .or(file.subject_length)
                .unwrap_or_default(),
            types,
            scopes: file.scopes,
            prompt_scope: args.prompt_scope || file.prompt_scope,
            ticket_prefix: file.ticket_prefix.filter(|p| !p.trim().is_empty()),
            require_ticket: file.require_ticket,
            stream: args.stream || file.stream,
        }
    }

    /// Prefix bare ticket numbers: `123` becomes `JIRA-123` when `ticket_prefix = "JIRA"`.
    pub fn format_ticket(&self, ticket: &str) -> Option<String> {
        let ticket = ticket.trim();
        if ticket.is_empty() {
            return None;
        }
        match &self.ticket_prefix {
            Some(prefix) if ticket.chars().all(|c| c.is_ascii_digit()) => {
                Some(format!("{}-{ticket}", prefix.trim_end_matches('-')))
            }
            _ => Some(ticket.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    model: Option<String>,
    ollama_url: Option<String>,
    language: Option<String>,
    languages: Vec<String>,
    detailed_commit: Option<bool>,
    custom_prompt: Option<String>,
    subject_length: Option<SubjectLength>,
    types: Vec<CommitType>,
    scopes: Vec<String>,
    prompt_scope: bool,
    ticket_prefix: Option<String>,
    require_ticket: bool,
    stream: bool,
}

/// Return `./.commitpilot.toml` and `~/.config/commitpilot.toml`, in lookup order.
fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".commitpilot.toml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("commitpilot.toml"));
    }
    paths
}

fn load_file_config() -> Result<Option<FileConfig>> {
    let Some(path) = config_paths().into_iter().find(|p| p.exists()) else {
        return Ok(None);
    };

    log::debug!("Loading config from {}", path.display());
    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = toml::from_str::<FileConfig>(&data)
        .with_context(|| format!("invalid config file format at {}", path.display()))?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_args::GenerateArgs;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_any_source() {
        let cfg = Config::resolve(&CommitArgs::default(), no_env, FileConfig::default());
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.ollama_url, DEFAULT_OLLAMA_URL);
        assert_eq!(cfg.languages, LanguageConfig::Single("en".into()));
        assert!(cfg.detailed_commit);
        assert_eq!(cfg.subject_length, SubjectLength::Normal);
        assert_eq!(cfg.types.len(), 10);
        assert!(!cfg.stream);
        assert!(!cfg.require_ticket);
        assert_eq!(cfg.types[0].emoji, "✨");
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file: FileConfig = toml::from_str(
            r#"
            model = "from-file"
            language = "de"
            "#,
        )
        .unwrap();
        let env = |key: &str| match key {
            "COMMITPILOT_MODEL" => Some("from-env".to_string()),
            _ => None,
        };

        let cfg = Config::resolve(&CommitArgs::default(), env, file);
        assert_eq!(cfg.model, "from-env");
        assert_eq!(cfg.languages.primary(), "de");

        let args = CommitArgs::from(GenerateArgs {
            model: Some("from-cli".into()),
            language: vec!["Japanese".into()],
            ..Default::default()
        });
        let cfg = Config::resolve(&args, env, FileConfig::default());
        assert_eq!(cfg.model, "from-cli");
        assert_eq!(cfg.languages.primary(), "ja");
    }

    #[test]
    fn parses_full_file() {
        let file: FileConfig = toml::from_str(
            r#"
            model = "llama3"
            ollama_url = "http://gpu-box:11434"
            languages = ["en", "zh"]
            detailed_commit = false
            custom_prompt = "Mention the affected service."
            subject_length = "short"
            scopes = ["api", "ui"]
            prompt_scope = true
            ticket_prefix = "JIRA"
            require_ticket = true
            stream = true

            [[types]]
            name = "feat"
            desc = "Feature"
            emoji = "🚀"

            [[types]]
            name = "hotfix"
            "#,
        )
        .unwrap();

        let cfg = Config::resolve(&CommitArgs::default(), no_env, file);
        assert!(cfg.languages.is_multilingual());
        assert!(!cfg.detailed_commit);
        assert_eq!(cfg.subject_length, SubjectLength::Short);
        assert_eq!(cfg.custom_prompt.as_deref(), Some("Mention the affected service."));
        assert_eq!(cfg.types.len(), 2);
        assert_eq!(cfg.types[0].emoji, "🚀");
        assert_eq!(cfg.types[1].desc, "");
        assert_eq!(cfg.types[1].emoji, "");
        assert!(cfg.prompt_scope && cfg.stream && cfg.require_ticket);
        assert_eq!(cfg.ollama_url, "http://gpu-box:11434");
    }

    #[test]
    fn rejects_unknown_subject_length() {
        assert!(toml::from_str::<FileConfig>(r#"subject_length = "tiny""#).is_err());
    }

    #[test]
    fn ticket_prefix_only_applies_to_bare_numbers() {
        let mut cfg = Config::resolve(&CommitArgs::default(), no_env, FileConfig::default());
        assert_eq!(cfg.format_ticket("123").as_deref(), Some("123"));

        cfg.ticket_prefix = Some("JIRA".into());
        assert_eq!(cfg.format_ticket(" 123 ").as_deref(), Some("JIRA-123"));
        assert_eq!(cfg.format_ticket("OPS-9").as_deref(), Some("OPS-9"));
        assert_eq!(cfg.format_ticket("  "), None);
    }
}
