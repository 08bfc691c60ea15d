use std::time::Instant;

use crate::error::{CommitError, Result, SelectError};
use crate::llm::prompt_builder;
use crate::llm::prompts;
use crate::llm::LlmClient;
use crate::message::GeneratedMessage;
use crate::request::CommitRequest;

/// Regenerate selections allowed from the review menu before giving up.
pub const MAX_REGENERATIONS: u32 = 3;

/// Where the review loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Generating,
    Reviewing,
    Editing,
    Committed,
    Cancelled,
    Exhausted,
}

impl InteractionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InteractionState::Committed | InteractionState::Cancelled | InteractionState::Exhausted
        )
    }
}

/// Choices offered after a message is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Use,
    Regenerate,
    Edit,
    Cancel,
}

/// Choices offered after the user revised the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Use,
    RegenerateFromEdit,
    EditAgain,
    Cancel,
}

/// Whether fragments are shown as they arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Blocking,
    Streaming,
}

/// Output-only presentation. Nothing returned here steers the state machine.
pub trait Display {
    fn show_generating(&mut self);
    fn show_chunk(&mut self, chunk: &str);
    fn show_message(&mut self, message: &str);
    fn show_info(&mut self, info: &str);
    fn show_warning(&mut self, warning: &str);
}

/// Blocking user input. Any error counts as Cancel.
pub trait Selector {
    fn review(&mut self, message: &str) -> std::result::Result<ReviewAction, SelectError>;

    /// Ask for a revision seeded with `seed`. Implementations re-prompt on empty input.
    fn edit(&mut self, seed: &str) -> std::result::Result<String, SelectError>;

    fn after_edit(&mut self, message: &str) -> std::result::Result<EditAction, SelectError>;
}

/// Receives the accepted message.
pub trait CommitExecutor {
    fn commit(&mut self, message: &str) -> Result<()>;
}

/// Drives Generating → Reviewing → Editing until a terminal state.
pub struct InteractionController<'a> {
    request: CommitRequest,
    llm: &'a dyn LlmClient,
    display: &'a mut dyn Display,
    selector: &'a mut dyn Selector,
    mode: GenerationMode,
    state: InteractionState,
    regenerations: u32,
    current: Option<GeneratedMessage>,
}

impl<'a> InteractionController<'a> {
    pub fn new(
        request: CommitRequest,
        llm: &'a dyn LlmClient,
        display: &'a mut dyn Display,
        selector: &'a mut dyn Selector,
        mode: GenerationMode,
    ) -> Self {
        Self {
            request,
            llm,
            display,
            selector,
            mode,
            state: InteractionState::Generating,
            regenerations: 0,
            current: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    #[cfg(test)]
    pub fn request(&self) -> &CommitRequest {
        &self.request
    }

    /// Run until a terminal state. `Committed` hands the message to `executor` and
    /// returns it; `Cancelled` and `Exhausted` come back as errors.
    pub fn run(&mut self, executor: &mut dyn CommitExecutor) -> Result<String> {
        while !self.state.is_terminal() {
            log::debug!("interaction state: {:?}", self.state);
            match self.state {
                InteractionState::Generating => {
                    let message = self.generate()?;
                    self.current = Some(message);
                    self.state = InteractionState::Reviewing;
                }
                InteractionState::Reviewing => {
                    let text = self.current_text().to_string();
                    self.display.show_message(&text);
                    let action = self.selector.review(&text).unwrap_or_else(|e| {
                        log::debug!("review selection failed: {e}");
                        ReviewAction::Cancel
                    });
                    self.state = self.on_review(action);
                }
                InteractionState::Editing => {
                    let seed = self.current_text().to_string();
                    let revised = match self.selector.edit(&seed) {
                        Ok(text) => text,
                        Err(e) => {
                            log::debug!("edit interrupted: {e}");
                            self.state = InteractionState::Cancelled;
                            continue;
                        }
                    };
                    self.current = Some(GeneratedMessage::edited(revised));

                    let text = self.current_text().to_string();
                    self.display.show_message(&text);
                    let action = self.selector.after_edit(&text).unwrap_or_else(|e| {
                        log::debug!("post-edit selection failed: {e}");
                        EditAction::Cancel
                    });
                    self.state = self.on_edit(action);
                }
                InteractionState::Committed
                | InteractionState::Cancelled
                | InteractionState::Exhausted => break,
            }
        }

        log::debug!("interaction state: {:?}", self.state);
        match self.state {
            InteractionState::Cancelled => Err(CommitError::UserCancelled),
            InteractionState::Exhausted => Err(CommitError::AttemptsExhausted {
                attempts: self.regenerations,
            }),
            _ => {
                let text = self.current_text().to_string();
                executor.commit(&text)?;
                Ok(text)
            }
        }
    }

    /// Reviewing transitions. Only Regenerate consumes the bounded budget.
    fn on_review(&mut self, action: ReviewAction) -> InteractionState {
        match action {
            ReviewAction::Use => InteractionState::Committed,
            ReviewAction::Cancel => InteractionState::Cancelled,
            ReviewAction::Edit => InteractionState::Editing,
            ReviewAction::Regenerate => {
                self.regenerations += 1;
                if self.regenerations >= MAX_REGENERATIONS {
                    InteractionState::Exhausted
                } else {
                    InteractionState::Generating
                }
            }
        }
    }

    /// Editing transitions. Regenerating from an edit swaps the guidelines and leaves the
    /// counter alone.
    fn on_edit(&mut self, action: EditAction) -> InteractionState {
        match action {
            EditAction::Use => InteractionState::Committed,
            EditAction::Cancel => InteractionState::Cancelled,
            EditAction::EditAgain => InteractionState::Editing,
            EditAction::RegenerateFromEdit => {
                let edited = self.current_text().to_string();
                self.request
                    .replace_guidelines(prompts::edited_guidelines(&edited));
                InteractionState::Generating
            }
        }
    }

    fn generate(&mut self) -> Result<GeneratedMessage> {
        self.display.show_generating();

        let prompt = prompt_builder::commit_prompt(&self.request, self.regenerations);
        let started = Instant::now();

        let raw = match self.mode {
            GenerationMode::Blocking => self.llm.generate(&prompt)?,
            GenerationMode::Streaming => {
                let display = &mut *self.display;
                self.llm
                    .generate_stream(&prompt, &mut |chunk| display.show_chunk(chunk))?
            }
        };

        self.display
            .show_info(&format!("[time elapsed: {:.2}s]", started.elapsed().as_secs_f64()));

        let message = GeneratedMessage::from_raw(raw);
        log::trace!("raw model output: {:?}", message.raw);
        if message.text().is_empty() {
            return Err(CommitError::Inference(
                "model returned an empty commit message".to_string(),
            ));
        }
        Ok(message)
    }

    fn current_text(&self) -> &str {
        self.current.as_ref().map(GeneratedMessage::text).unwrap_or_default()
    }
}
