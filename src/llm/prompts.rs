pub const HEADER: &str = "You are a Git commit message generator expert.";

pub const FOLLOW_GUIDELINES: &str =
    "IMPORTANT: Follow the above guidelines strictly when generating the commit message.";

/// Diff text beyond this many characters is cut off.
pub const MAX_DIFF_CHARS: usize = 2000;

pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Appended on regeneration, picked by `regeneration_count % len`.
pub const VARIATION_HINTS: &[&str] = &[
    "Try a different perspective or emphasis in the subject line.",
    "Consider alternative wording or focus on different aspects.",
    "Rephrase with a fresh approach while maintaining accuracy.",
    "Use different verbs or structure to convey the same changes.",
    "Focus on a different aspect of the changes for variety.",
];

/// Guidelines that replace the configured ones when the user regenerates from an edit.
pub fn edited_guidelines(edited: &str) -> String {
    format!(
        "Generate a commit message based on this user input: {edited}\n\n\
         Also consider the following diff:"
    )
}
