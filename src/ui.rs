use std::io::{self, BufRead, Write};
use std::time::Duration;

use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Editor};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::CommitType;
use crate::error::{CommitError, SelectError};
use crate::git::{CommitTypeHint, FileStat};
use crate::interaction::{CommitExecutor, Display, EditAction, ReviewAction, Selector};

const MAX_BOX_WIDTH: usize = 80;

/// Console rendering: spinner while waiting, boxed messages, coloured notices.
#[derive(Default)]
pub struct TerminalDisplay {
    spinner: Option<ProgressBar>,
    mid_stream: bool,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_header(&mut self, dry_run: bool) {
        if dry_run {
            println!("{}", "commitpilot (dry run: nothing will be committed)".yellow().bold());
        } else {
            println!("{}", "commitpilot".cyan().bold());
        }
    }

    pub fn show_changed_files(&mut self, files: &[FileStat]) {
        println!("{}", format!("Staged files ({}):", files.len()).bold());
        for f in files {
            println!(
                "  {} {} {}",
                format!("+{}", f.additions).green(),
                format!("-{}", f.deletions).red(),
                f.path
            );
        }
        println!();
    }

    /// Staged paths look like more than one kind of change.
    pub fn show_type_hints(&mut self, hints: &[CommitTypeHint]) {
        self.show_warning("Multiple commit types detected in staged files:");
        for hint in hints {
            self.show_info(&format!("  • {}: {} file(s)", hint.commit_type, hint.files.len()));
            for file in &hint.files {
                println!("    - {file}");
            }
        }
        println!();
        self.show_info("Consider splitting them into separate commits.");
        self.show_info("Unstage files with: git restore --staged <file>");
        println!();
    }

    pub fn show_success(&mut self, message: &str) {
        println!("{}", "Committed:".green().bold());
        self.show_message(message);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Close the line left open by streamed fragments.
    fn end_stream(&mut self) {
        if self.mid_stream {
            println!("\n");
            self.mid_stream = false;
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

impl Display for TerminalDisplay {
    fn show_generating(&mut self) {
        self.end_stream();
        self.stop_spinner();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Generating commit message...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn show_chunk(&mut self, chunk: &str) {
        if !self.mid_stream {
            self.stop_spinner();
            println!();
            self.mid_stream = true;
        }
        print!("{chunk}");
        let _ = io::stdout().flush();
    }

    fn show_message(&mut self, message: &str) {
        self.end_stream();
        self.stop_spinner();

        let width = terminal::size()
            .map(|(cols, _)| usize::from(cols))
            .unwrap_or(MAX_BOX_WIDTH)
            .clamp(20, MAX_BOX_WIDTH);
        let title = " Commit message ";
        let rule = "─".repeat(width.saturating_sub(title.len() + 3));

        println!("{}", format!("┌─{title}{rule}").cyan());
        for line in message.lines() {
            println!("{} {line}", "│".cyan());
        }
        println!("{}", format!("└{}", "─".repeat(width - 1)).cyan());
        println!();
    }

    fn show_info(&mut self, info: &str) {
        self.end_stream();
        self.stop_spinner();
        println!("{}", info.bright_black());
    }

    fn show_warning(&mut self, warning: &str) {
        self.end_stream();
        self.stop_spinner();
        println!("{}", warning.yellow());
    }
}

/// Keyboard-driven menus on the controlling terminal.
#[derive(Default)]
pub struct TerminalSelector;

impl TerminalSelector {
    pub fn new() -> Self {
        TerminalSelector
    }

    /// Pick a commit type by number.
    pub fn select_type(&mut self, types: &[CommitType]) -> Result<String, SelectError> {
        println!("{}", "Select commit type".bold());
        for (i, t) in types.iter().enumerate() {
            let emoji = if t.emoji.is_empty() {
                String::new()
            } else {
                format!("{} ", t.emoji)
            };
            println!("  {:>2}) {emoji}{} - {}", i + 1, t.name.cyan(), t.desc);
        }

        loop {
            let input = read_line("Enter choice: ")?;
            if let Some(t) = input
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| types.get(i))
            {
                return Ok(t.name.clone());
            }
            if let Some(t) = types.iter().find(|t| t.name == input) {
                return Ok(t.name.clone());
            }
            println!("{}", format!("Invalid choice. Enter 1-{}.", types.len()).yellow());
        }
    }

    /// Pick a configured scope by number, type a custom one, or leave it empty.
    pub fn input_scope(&mut self, scopes: &[String]) -> Result<String, SelectError> {
        if !scopes.is_empty() {
            println!("{}", "Select scope (number, custom text, or empty for none)".bold());
            for (i, s) in scopes.iter().enumerate() {
                println!("  {:>2}) {s}", i + 1);
            }
        }

        let input = read_line("Scope: ")?;
        let picked = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| scopes.get(i))
            .cloned();
        Ok(picked.unwrap_or(input))
    }

    /// Ask until a non-empty ticket number is given.
    pub fn input_ticket(&mut self, prefix: Option<&str>) -> Result<String, SelectError> {
        let label = match prefix {
            Some(prefix) => format!("Enter ticket number (e.g. {prefix}-123): "),
            None => "Enter ticket/issue number: ".to_string(),
        };
        let stdin = io::stdin();
        read_ticket(&mut stdin.lock(), &label)
    }

    /// Yes/no question, defaulting to no.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool, SelectError> {
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }

    fn read_choice(&mut self, options: &[(char, &str)]) -> Result<char, SelectError> {
        println!("{}", "What do you want to do?".bold());
        for (key, label) in options {
            println!("  [{}] {label}", key.to_string().cyan());
        }
        print!("> ");
        io::stdout().flush()?;

        terminal::enable_raw_mode()?;
        let choice = wait_for_key(options);
        let restored = terminal::disable_raw_mode();
        println!();

        let choice = choice?;
        restored?;
        Ok(choice)
    }
}

fn wait_for_key(options: &[(char, &str)]) -> Result<char, SelectError> {
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Esc => return Err(SelectError::Interrupted),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(SelectError::Interrupted);
            }
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                if options.iter().any(|(k, _)| *k == c) {
                    print!("{c}");
                    return Ok(c);
                }
            }
            _ => {}
        }
    }
}

fn read_line(prompt: &str) -> Result<String, SelectError> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut buf = String::new();
    if io::stdin().read_line(&mut buf)? == 0 {
        return Err(SelectError::Interrupted);
    }
    Ok(buf.trim().to_string())
}

fn read_ticket<R: BufRead>(input: &mut R, label: &str) -> Result<String, SelectError> {
    loop {
        print!("{label}");
        io::stdout().flush()?;

        let mut buf = String::new();
        if input.read_line(&mut buf)? == 0 {
            return Err(SelectError::Interrupted);
        }
        let ticket = buf.trim();
        if !ticket.is_empty() {
            return Ok(ticket.to_string());
        }
        println!("{}", "ticket number cannot be empty".yellow());
    }
}

/// Surrounding blank lines are dropped; everything between them, including the blank
/// line separating subject and body, is kept.
fn accept_revision(text: &str) -> Result<String, CommitError> {
    let text = text.trim_end().trim_start_matches(['\n', '\r']);
    if text.trim().is_empty() {
        return Err(CommitError::EmptyInput);
    }
    Ok(text.to_string())
}

impl Selector for TerminalSelector {
    fn review(&mut self, _message: &str) -> Result<ReviewAction, SelectError> {
        let choice = self.read_choice(&[
            ('u', "Use this message"),
            ('r', "Regenerate"),
            ('e', "Edit manually"),
            ('c', "Cancel"),
        ])?;
        Ok(match choice {
            'u' => ReviewAction::Use,
            'r' => ReviewAction::Regenerate,
            'e' => ReviewAction::Edit,
            _ => ReviewAction::Cancel,
        })
    }

    fn edit(&mut self, seed: &str) -> Result<String, SelectError> {
        println!("{}", "Opening the message in your editor; save and close to continue.".bold());
        loop {
            let edited = Editor::new().extension(".txt").require_save(false).edit(seed)?;
            match accept_revision(edited.as_deref().unwrap_or_default()) {
                Ok(text) => return Ok(text),
                Err(e) => println!("{}", e.to_string().yellow()),
            }
        }
    }

    fn after_edit(&mut self, _message: &str) -> Result<EditAction, SelectError> {
        let choice = self.read_choice(&[
            ('u', "Use this message"),
            ('r', "Regenerate based on this input"),
            ('e', "Edit again"),
            ('c', "Cancel"),
        ])?;
        Ok(match choice {
            'u' => EditAction::Use,
            'r' => EditAction::RegenerateFromEdit,
            'e' => EditAction::EditAgain,
            _ => EditAction::Cancel,
        })
    }
}

/// Shows the accepted message instead of committing it.
pub struct DryRunExecutor;

impl CommitExecutor for DryRunExecutor {
    fn commit(&mut self, message: &str) -> crate::error::Result<()> {
        println!("{}", "Would commit with message:".yellow().bold());
        println!("{message}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn revision_keeps_subject_and_body() {
        let text = "feat(auth): add login\n\n- add endpoint\n- add middleware\n\n";
        assert_eq!(
            accept_revision(text).unwrap(),
            "feat(auth): add login\n\n- add endpoint\n- add middleware"
        );
    }

    #[test]
    fn revision_drops_surrounding_blank_lines() {
        assert_eq!(accept_revision("\r\n\nfix: x  \n").unwrap(), "fix: x");
    }

    #[test]
    fn blank_revision_is_rejected() {
        assert!(matches!(accept_revision(" \n\t\n"), Err(CommitError::EmptyInput)));
        assert!(matches!(accept_revision(""), Err(CommitError::EmptyInput)));
    }

    #[test]
    fn ticket_prompt_repeats_until_non_empty() {
        let mut input = Cursor::new("\n   \n JIRA-7 \nleftover\n");
        assert_eq!(read_ticket(&mut input, "> ").unwrap(), "JIRA-7");
    }

    #[test]
    fn ticket_prompt_eof_interrupts() {
        let mut input = Cursor::new("\n");
        assert!(matches!(
            read_ticket(&mut input, "> "),
            Err(SelectError::Interrupted)
        ));
    }

    #[test]
    fn dropping_display_clears_spinner() {
        let mut display = TerminalDisplay::new();
        display.show_generating();
        let spinner = display.spinner.clone().expect("spinner started");
        assert!(!spinner.is_finished());

        drop(display);
        assert!(spinner.is_finished());
    }
}
