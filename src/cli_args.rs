use clap::{ArgAction, Args, Parser, Subcommand};

use crate::request::SubjectLength;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "commitpilot",
    version,
    about = "Draft Conventional Commit messages for staged changes with a local Ollama model"
)]
pub struct Cli {
    /// Log verbosity: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand; defaults to 'commit'
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `commitpilot commit --type fix`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a message, review it, and commit the staged changes
    Commit(CommitArgs),

    /// Generate a message for the staged changes and print it without committing
    Generate(GenerateArgs),
}

/// Options shared by every generating subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// Commit type (skips the type menu)
    #[arg(short = 't', long = "type")]
    pub commit_type: Option<String>,

    /// Commit scope
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Message language code; pass several (en,ja) for a multilingual message
    #[arg(short, long, value_delimiter = ',')]
    pub language: Vec<String>,

    /// Ollama model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of the Ollama service
    #[arg(long)]
    pub ollama_url: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct CommitArgs {
    #[command(flatten)]
    pub common: GenerateArgs,

    /// Show the final message without committing
    #[arg(short, long)]
    pub dry_run: bool,

    /// Ticket/issue number (e.g. JIRA-123)
    #[arg(short = 'k', long)]
    pub ticket: Option<String>,

    /// Subject line length
    #[arg(short = 'n', long, value_enum)]
    pub subject_length: Option<SubjectLength>,

    /// Print the message as the model produces it
    #[arg(short = 'S', long)]
    pub stream: bool,

    /// Ask for a scope when none was given
    #[arg(short, long)]
    pub prompt_scope: bool,
}

impl From<GenerateArgs> for CommitArgs {
    fn from(common: GenerateArgs) -> Self {
        CommitArgs {
            common,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commit_flags() {
        let cli = Cli::parse_from([
            "commitpilot", "-vv", "commit", "-t", "fix", "-s", "api", "-l", "en,ja", "-k", "42",
            "-n", "short", "-S", "-d",
        ]);
        assert_eq!(cli.verbose, 2);
        let Some(Command::Commit(args)) = cli.command else {
            panic!("expected commit subcommand");
        };
        assert_eq!(args.common.commit_type.as_deref(), Some("fix"));
        assert_eq!(args.common.scope.as_deref(), Some("api"));
        assert_eq!(args.common.language, vec!["en", "ja"]);
        assert_eq!(args.ticket.as_deref(), Some("42"));
        assert_eq!(args.subject_length, Some(SubjectLength::Short));
        assert!(args.stream);
        assert!(args.dry_run);
        assert!(!args.prompt_scope);
    }

    #[test]
    fn subcommand_is_optional() {
        let cli = Cli::parse_from(["commitpilot"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn generate_has_no_commit_flags() {
        assert!(Cli::try_parse_from(["commitpilot", "generate", "--dry-run"]).is_err());
        let cli = Cli::parse_from(["commitpilot", "generate", "-m", "llama3"]);
        assert!(matches!(
            cli.command,
            Some(Command::Generate(ref g)) if g.model.as_deref() == Some("llama3")
        ));
    }
}
