use crate::i18n;
use crate::llm::prompts;
use crate::request::{CommitRequest, ProjectContext};

/// Build the generation prompt for `request`.
///
/// Sections appear in a fixed order and each one is left out when there is nothing to
/// put in it. `regeneration_count > 0` appends a variation hint.
pub fn commit_prompt(request: &CommitRequest, regeneration_count: u32) -> String {
    let mut out = String::new();

    out.push_str(prompts::HEADER);
    out.push_str("\n\n");

    push_project_context(&mut out, &request.context);
    push_guidelines(&mut out, request.guidelines());
    push_task(&mut out, request);
    push_language(&mut out, request);
    push_changed_files(&mut out, &request.context.changed_files);
    push_diff_stats(&mut out, &request.context.diff_stats);
    push_diff(&mut out, &request.diff);
    push_requirements(&mut out, request);
    push_output_format(&mut out, request);

    if regeneration_count > 0 {
        let hint = variation_hint(regeneration_count);
        out.push_str(&format!(
            "\nNOTE: This is regeneration attempt #{regeneration_count}. {hint}\n"
        ));
    }

    out
}

pub fn variation_hint(regeneration_count: u32) -> &'static str {
    let idx = regeneration_count as usize % prompts::VARIATION_HINTS.len();
    prompts::VARIATION_HINTS[idx]
}

/// Cut `diff` to exactly [`prompts::MAX_DIFF_CHARS`] characters plus a marker.
pub fn truncate_diff(diff: &str) -> String {
    match diff.char_indices().nth(prompts::MAX_DIFF_CHARS) {
        Some((byte_idx, _)) => format!("{}{}", &diff[..byte_idx], prompts::TRUNCATION_MARKER),
        None => diff.to_string(),
    }
}

fn push_project_context(out: &mut String, ctx: &ProjectContext) {
    let has_any = !ctx.project_name.is_empty()
        || !ctx.branch_name.is_empty()
        || !ctx.recent_commits.is_empty()
        || !ctx.readme_snippet.is_empty();
    if !has_any {
        return;
    }

    out.push_str("PROJECT CONTEXT:\n");
    if !ctx.project_name.is_empty() {
        out.push_str(&format!("- Project: {}\n", ctx.project_name));
    }
    if !ctx.branch_name.is_empty() {
        out.push_str(&format!("- Branch: {}\n", ctx.branch_name));
    }
    if !ctx.recent_commits.is_empty() {
        out.push_str("- Recent commits style:\n");
        for subject in &ctx.recent_commits {
            out.push_str(&format!("  * {subject}\n"));
        }
    }
    if !ctx.readme_snippet.is_empty() {
        out.push_str(&format!("- Project description: {}\n", ctx.readme_snippet));
    }
    out.push('\n');
}

fn push_guidelines(out: &mut String, guidelines: Option<&str>) {
    let Some(guidelines) = guidelines else {
        return;
    };

    out.push_str("COMPANY/TEAM COMMIT GUIDELINES:\n");
    out.push_str(guidelines);
    out.push_str("\n\n");
    out.push_str(prompts::FOLLOW_GUIDELINES);
    out.push_str("\n\n");
}

fn push_task(out: &mut String, request: &CommitRequest) {
    out.push_str("TASK:\n");
    out.push_str(&format!(
        "Generate a {} commit message for the following changes.\n",
        request.commit_type
    ));
    if !request.scope.is_empty() {
        out.push_str(&format!("Scope: {}\n", request.scope));
    }
    if let Some(ticket) = request.ticket() {
        out.push_str(&format!("Ticket/Issue Number: {ticket}\n"));
        out.push_str(&format!(
            "IMPORTANT: Include the ticket number [{ticket}] in the commit message.\n"
        ));
    }
}

fn push_language(out: &mut String, request: &CommitRequest) {
    let langs = &request.languages;

    if !langs.is_multilingual() {
        let template = i18n::template(langs.primary(), &request.commit_type, &request.scope);
        out.push_str(&format!("\n{}\n\n", template.instruction));
        return;
    }

    let primary = i18n::display_name(langs.primary());
    out.push_str("\nLANGUAGES:\n");
    out.push_str(
        "Generate a MULTILINGUAL commit message with translations in the following languages:\n",
    );
    out.push_str(&format!("1. {primary}\n"));
    for (i, code) in langs.secondary().iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 2, i18n::display_name(code)));
    }
    out.push_str("\nFormat:\n");
    out.push_str(&format!("Subject line in primary language ({primary})\n\n"));
    out.push_str("Body:\n");
    out.push_str(&format!("- Bullet points explaining changes in {primary}\n\n"));
    out.push_str("Translations:\n");
    for code in langs.secondary() {
        out.push_str(&format!(
            "- [{}] Translation of the subject line\n",
            i18n::native_name(code)
        ));
    }
    out.push('\n');
}

fn push_changed_files(out: &mut String, files: &[String]) {
    if files.is_empty() {
        return;
    }
    out.push_str("CHANGED FILES:\n");
    for file in files {
        out.push_str(&format!("- {file}\n"));
    }
    out.push('\n');
}

fn push_diff_stats(out: &mut String, stats: &str) {
    if stats.trim().is_empty() {
        return;
    }
    out.push_str("CHANGES SUMMARY:\n");
    out.push_str(stats.trim_end());
    out.push_str("\n\n");
}

fn push_diff(out: &mut String, diff: &str) {
    out.push_str("CHANGES:\n");
    out.push_str(&truncate_diff(diff));
    out.push_str("\n\n");
}

fn push_requirements(out: &mut String, request: &CommitRequest) {
    let langs = &request.languages;
    let mut reqs = vec![
        "Follow Conventional Commits format".to_string(),
        format!(
            "Subject line: concise summary (max {} characters)",
            request.subject_length.max_chars()
        ),
    ];

    if langs.is_multilingual() {
        reqs.push(format!(
            "Primary language for subject line: {}",
            i18n::display_name(langs.primary())
        ));
        reqs.push("Provide translations for all configured languages".to_string());
        if request.detailed {
            reqs.push(
                "Body: explain WHAT changed and WHY (2-4 bullet points in primary language)"
                    .to_string(),
            );
            reqs.push("Include translation section with subject line in each language".to_string());
            reqs.push("Start subject line with lowercase letter after the type".to_string());
            reqs.push("Separate subject and body with a blank line".to_string());
        } else {
            reqs.push("Focus on WHAT changed and WHY (concise)".to_string());
            reqs.push("Include translation section with subject line in each language".to_string());
            reqs.push("Start with lowercase letter after the type".to_string());
        }
    } else if request.detailed {
        reqs.push("Body: explain WHAT changed and WHY (2-4 bullet points)".to_string());
        reqs.push("Focus on the motivation and impact, not implementation details".to_string());
        reqs.push("Start subject line with lowercase letter after the type".to_string());
        reqs.push("Separate subject and body with a blank line".to_string());
    } else {
        reqs.push("Focus on WHAT changed and WHY (concise)".to_string());
        reqs.push("Start with lowercase letter after the type".to_string());
        reqs.push("Generate ONLY the subject line, no body or explanation".to_string());
    }

    out.push_str("REQUIREMENTS:\n");
    for (i, req) in reqs.iter().enumerate() {
        out.push_str(&format!("{}. {req}\n", i + 1));
    }
    out.push('\n');
}

/// `type(scope): [ticket] <subject line>`, with the optional parts left out.
pub fn format_skeleton(request: &CommitRequest) -> String {
    let mut head = request.commit_type.clone();
    if !request.scope.is_empty() {
        head.push_str(&format!("({})", request.scope));
    }
    head.push_str(": ");
    if let Some(ticket) = request.ticket() {
        head.push_str(&format!("[{ticket}] "));
    }
    head.push_str("<subject line>");
    head
}

fn push_output_format(out: &mut String, request: &CommitRequest) {
    let langs = &request.languages;
    let template = i18n::template(langs.primary(), &request.commit_type, &request.scope);

    out.push_str("OUTPUT FORMAT:\n");
    out.push_str(&format_skeleton(request));
    out.push_str("\n\n");

    if langs.is_multilingual() {
        if request.detailed {
            out.push_str("<body with bullet points in primary language>\n\n");
        }
        out.push_str("Translations:\n");
        for code in langs.secondary() {
            out.push_str(&format!(
                "- [{}] <translated subject line>\n",
                i18n::native_name(code)
            ));
        }
        out.push('\n');

        out.push_str("Example:\n");
        out.push_str(&template.example_subject);
        out.push_str("\n\n");
        if request.detailed {
            push_example_body(out, &template.example_body);
            out.push('\n');
        }
        out.push_str("Translations:\n");
        for code in langs.secondary() {
            let other = i18n::template(code, &request.commit_type, &request.scope);
            out.push_str(&format!(
                "- [{}] {}\n",
                i18n::native_name(code),
                other.example_subject
            ));
        }
        out.push('\n');
        out.push_str("Generate the multilingual commit message now:\n");
    } else if request.detailed {
        out.push_str("<body with bullet points>\n\n");
        out.push_str("Example:\n");
        out.push_str(&template.example_subject);
        out.push_str("\n\n");
        push_example_body(out, &template.example_body);
        out.push_str("\nGenerate the commit message now (subject + body with details):\n");
    } else {
        out.push_str("Example:\n");
        out.push_str(&template.example_subject);
        out.push_str("\n\n");
        out.push_str("Generate the commit message now (ONLY the subject line):\n");
    }
}

fn push_example_body(out: &mut String, lines: &[&str]) {
    for line in lines {
        out.push_str(&format!("- {line}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{LanguageConfig, SubjectLength};

    fn request() -> CommitRequest {
        CommitRequest {
            commit_type: "feat".into(),
            scope: "auth".into(),
            diff: "+ added login()".into(),
            ticket: None,
            languages: LanguageConfig::Single("en".into()),
            subject_length: SubjectLength::Normal,
            detailed: false,
            custom_guidelines: None,
            context: ProjectContext::default(),
        }
    }

    #[test]
    fn scope_without_ticket() {
        let prompt = commit_prompt(&request(), 0);
        assert!(prompt.contains("feat(auth): <subject line>"));
        assert!(!prompt.contains("Ticket/Issue Number"));
        assert!(!prompt.contains("[]"));
        assert!(prompt.contains("+ added login()"));
    }

    #[test]
    fn always_names_convention_and_ceiling() {
        let mut req = request();
        let prompt = commit_prompt(&req, 0);
        assert!(prompt.contains("Conventional Commits"));
        assert!(prompt.contains("(max 72 characters)"));

        req.subject_length = SubjectLength::Short;
        let prompt = commit_prompt(&req, 0);
        assert!(prompt.contains("Conventional Commits"));
        assert!(prompt.contains("(max 36 characters)"));
    }

    #[test]
    fn ticket_is_required_in_output() {
        let mut req = request();
        req.ticket = Some("JIRA-42".into());
        let prompt = commit_prompt(&req, 0);
        assert!(prompt.contains("Ticket/Issue Number: JIRA-42"));
        assert!(prompt.contains("Include the ticket number [JIRA-42]"));
        assert!(prompt.contains("feat(auth): [JIRA-42] <subject line>"));

        req.scope.clear();
        assert_eq!(format_skeleton(&req), "feat: [JIRA-42] <subject line>");
    }

    #[test]
    fn short_diff_passes_through() {
        let diff = "x".repeat(2000);
        assert_eq!(truncate_diff(&diff), diff);
    }

    #[test]
    fn long_diff_is_cut_to_exactly_2000_chars() {
        let diff = "é".repeat(2001);
        let truncated = truncate_diff(&diff);
        let body = truncated
            .strip_suffix(prompts::TRUNCATION_MARKER)
            .expect("marker appended");
        assert_eq!(body.chars().count(), 2000);

        let mut req = request();
        req.diff = diff;
        assert!(commit_prompt(&req, 0).contains(prompts::TRUNCATION_MARKER));
    }

    #[test]
    fn empty_context_omits_sections() {
        let prompt = commit_prompt(&request(), 0);
        assert!(!prompt.contains("PROJECT CONTEXT"));
        assert!(!prompt.contains("CHANGED FILES"));
        assert!(!prompt.contains("CHANGES SUMMARY"));
        assert!(!prompt.contains("GUIDELINES"));
        assert!(!prompt.contains("NOTE: This is regeneration"));
    }

    #[test]
    fn sections_keep_their_order() {
        let mut req = request();
        req.custom_guidelines = Some("Use imperative mood.".into());
        req.context = ProjectContext {
            project_name: "demo".into(),
            branch_name: "feature/login".into(),
            recent_commits: vec!["fix: old bug".into()],
            changed_files: vec!["src/auth.rs".into()],
            readme_snippet: "A demo app.".into(),
            diff_stats: " src/auth.rs | 1 +\n".into(),
        };
        let prompt = commit_prompt(&req, 1);

        let order = [
            "You are a Git commit message generator expert.",
            "PROJECT CONTEXT:",
            "COMPANY/TEAM COMMIT GUIDELINES:\nUse imperative mood.",
            "TASK:",
            "Generate the commit message in English.",
            "CHANGED FILES:\n- src/auth.rs",
            "CHANGES SUMMARY:",
            "CHANGES:\n+ added login()",
            "REQUIREMENTS:",
            "OUTPUT FORMAT:",
            "NOTE: This is regeneration attempt #1.",
        ];
        let mut last = 0;
        for marker in order {
            let pos = prompt[last..]
                .find(marker)
                .unwrap_or_else(|| panic!("{marker:?} missing or out of order"));
            last += pos + marker.len();
        }
    }

    #[test]
    fn detailed_mode_asks_for_body() {
        let mut req = request();
        req.detailed = true;
        let prompt = commit_prompt(&req, 0);
        assert!(prompt.contains("Body: explain WHAT changed and WHY (2-4 bullet points)"));
        assert!(prompt.contains("- Add login and logout endpoints"));
        assert!(prompt.contains("subject + body with details"));
        assert!(!prompt.contains("ONLY the subject line"));
    }

    #[test]
    fn concise_mode_asks_for_subject_only() {
        let prompt = commit_prompt(&request(), 0);
        assert!(prompt.contains("Generate ONLY the subject line, no body or explanation"));
        assert!(prompt.contains("Generate the commit message now (ONLY the subject line):"));
    }

    #[test]
    fn multilingual_lists_translations_by_native_name() {
        let mut req = request();
        req.languages = LanguageConfig::Multilingual(vec!["en".into(), "ja".into(), "xx".into()]);
        let prompt = commit_prompt(&req, 0);

        assert!(prompt.contains("MULTILINGUAL"));
        assert!(prompt.contains("Primary language for subject line: English"));
        assert!(prompt.contains("- [日本語] <translated subject line>"));
        assert!(prompt.contains("- [xx] <translated subject line>"));
        assert!(prompt.contains("- [日本語] feat(auth): ユーザー認証エンドポイントを追加"));
        assert!(prompt.contains("Generate the multilingual commit message now:"));
    }

    #[test]
    fn variation_hint_rotates() {
        let req = request();
        let first = commit_prompt(&req, 1);
        let second = commit_prompt(&req, 2);
        assert!(first.contains(prompts::VARIATION_HINTS[1]));
        assert!(second.contains(prompts::VARIATION_HINTS[2]));
        assert_eq!(variation_hint(5), variation_hint(0));
        assert_ne!(first, second);
    }

    #[test]
    fn edited_guidelines_embed_user_text() {
        let mut req = request();
        req.replace_guidelines(prompts::edited_guidelines("fix auth bug"));
        let prompt = commit_prompt(&req, 0);
        let section = prompt
            .split("COMPANY/TEAM COMMIT GUIDELINES:\n")
            .nth(1)
            .expect("guidelines section");
        let section = section.split("TASK:").next().unwrap_or_default();
        assert!(section.contains("fix auth bug"));
        assert!(section.contains("Also consider the following diff:"));
    }

    #[test]
    fn build_is_deterministic() {
        let req = request();
        assert_eq!(commit_prompt(&req, 3), commit_prompt(&req, 3));
    }
}
