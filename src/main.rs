mod cli_args;
mod config;
mod error;
mod git;
mod i18n;
mod interaction;
mod llm;
mod logging;
mod message;
mod request;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::cli_args::{Cli, Command, CommitArgs, GenerateArgs};
use crate::config::Config;
use crate::error::CommitError;
use crate::interaction::{CommitExecutor, GenerationMode, InteractionController};
use crate::llm::ollama::OllamaClient;
use crate::llm::{prompt_builder, LlmClient};
use crate::logging::init_logger;
use crate::message::GeneratedMessage;
use crate::request::CommitRequest;
use crate::ui::{DryRunExecutor, TerminalDisplay, TerminalSelector};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Some(Command::Generate(args)) => run_generate(args),
        Some(Command::Commit(args)) => run_commit(args),
        None => run_commit(CommitArgs::default()),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if matches!(e.downcast_ref::<CommitError>(), Some(CommitError::UserCancelled)) => {
            println!("{}", "Commit cancelled.".yellow());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}

/// Generate, review, and commit the staged changes.
fn run_commit(args: CommitArgs) -> Result<()> {
    let cfg = Config::from_sources(&args)?;
    log::info!("Using model {} at {}", cfg.model, cfg.ollama_url);

    git::ensure_repository()?;
    let diff = git::staged_diff()?;
    let files = git::staged_file_stats()?;

    let mut display = TerminalDisplay::new();
    let mut selector = TerminalSelector::new();
    display.show_header(args.dry_run);
    display.show_changed_files(&files);

    let hints = git::analyze_file_types(files.iter().map(|f| f.path.as_str()));
    if hints.len() > 1 {
        display.show_type_hints(&hints);
        let proceed = selector
            .confirm("Continue with mixed commit types?")
            .unwrap_or(false);
        if !proceed {
            return Err(CommitError::UserCancelled.into());
        }
    }

    let request = build_request(&args, &cfg, diff, &mut selector)?;
    let client = OllamaClient::new(&cfg.ollama_url, &cfg.model);
    let mode = if cfg.stream {
        GenerationMode::Streaming
    } else {
        GenerationMode::Blocking
    };

    let mut executor: Box<dyn CommitExecutor> = if args.dry_run {
        Box::new(DryRunExecutor)
    } else {
        Box::new(git::GitCommitter)
    };

    let outcome = {
        let mut controller =
            InteractionController::new(request, &client, &mut display, &mut selector, mode);
        let outcome = controller.run(executor.as_mut());
        log::debug!(
            "interaction ended in {:?} after {} regeneration(s)",
            controller.state(),
            controller.regenerations()
        );
        outcome
    };

    let message = outcome?;
    if !args.dry_run {
        display.show_success(&message);
    }
    Ok(())
}

/// Print one cleaned message for the staged changes. No review, no commit.
fn run_generate(args: GenerateArgs) -> Result<()> {
    let args = CommitArgs::from(args);
    let cfg = Config::from_sources(&args)?;

    git::ensure_repository()?;
    let diff = git::staged_diff()?;

    let mut selector = TerminalSelector::new();
    let request = build_request(&args, &cfg, diff, &mut selector)?;

    let client = OllamaClient::new(&cfg.ollama_url, &cfg.model);
    log::info!("Generating with {}", client.model());

    let prompt = prompt_builder::commit_prompt(&request, 0);
    let message = GeneratedMessage::from_raw(client.generate(&prompt)?);
    if message.text().is_empty() {
        return Err(CommitError::Inference("model returned an empty commit message".to_string()).into());
    }

    println!("{}", message.text());
    Ok(())
}

/// Resolve type, scope, and ticket, then gather repository context.
fn build_request(
    args: &CommitArgs,
    cfg: &Config,
    diff: String,
    selector: &mut TerminalSelector,
) -> Result<CommitRequest> {
    let commit_type = match args.common.commit_type.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => selector
            .select_type(&cfg.types)
            .map_err(|_| CommitError::UserCancelled)?,
    };

    let scope = match args.common.scope.as_deref() {
        Some(s) => s.trim().to_string(),
        None if cfg.prompt_scope => selector
            .input_scope(&cfg.scopes)
            .map_err(|_| CommitError::UserCancelled)?,
        None => String::new(),
    };

    let ticket = match args.ticket.as_deref().and_then(|t| cfg.format_ticket(t)) {
        Some(ticket) => Some(ticket),
        None if cfg.require_ticket => {
            let raw = selector
                .input_ticket(cfg.ticket_prefix.as_deref())
                .map_err(|_| CommitError::UserCancelled)?;
            cfg.format_ticket(&raw)
        }
        None => None,
    };
    if let Some(t) = &ticket {
        println!("{} {}", "Ticket:".bold(), t);
    }

    Ok(CommitRequest {
        commit_type,
        scope,
        diff,
        ticket,
        languages: cfg.languages.clone(),
        subject_length: cfg.subject_length,
        detailed: cfg.detailed_commit,
        custom_guidelines: cfg.custom_prompt.clone(),
        context: git::project_context(),
    })
}
