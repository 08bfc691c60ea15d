use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command as GitCommand, Stdio};

use crate::error::CommitError;
use crate::interaction::CommitExecutor;
use crate::request::ProjectContext;

const RECENT_COMMITS: usize = 5;
const README_SNIPPET_CHARS: usize = 200;

/// Per-file line counts from `git diff --cached --numstat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub path: String,
    pub additions: u32,
    pub deletions: u32,
}

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    let output = GitCommand::new("git")
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {:?}", args))?;

    if !output.status.success() {
        return Err(anyhow!(
            "git {:?} exited with status {:?}",
            args,
            output.status.code()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Fail early when not inside a work tree.
pub fn ensure_repository() -> Result<()> {
    git_output(&["rev-parse", "--git-dir"])
        .map(|_| ())
        .map_err(|_| anyhow!("not a git repository\nInitialize git first:\n  $ git init"))
}

/// Get the full staged diff. An empty diff is an error.
pub fn staged_diff() -> Result<String> {
    let diff = git_output(&["diff", "--cached"]).context("failed to get git diff")?;
    if diff.trim().is_empty() {
        return Err(anyhow!(
            "no staged changes found\nStage your changes first:\n  $ git add <files>"
        ));
    }
    Ok(diff)
}

/// Staged files with their added/deleted line counts.
pub fn staged_file_stats() -> Result<Vec<FileStat>> {
    let output = git_output(&["diff", "--cached", "--numstat"])
        .context("failed to get file stats")?;
    Ok(parse_numstat(&output))
}

/// Binary files report `-` for both counts; they show up as zero.
fn parse_numstat(output: &str) -> Vec<FileStat> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            let additions = parts.next()?.trim();
            let deletions = parts.next()?.trim();
            let path = parts.next()?.trim();
            if path.is_empty() {
                return None;
            }
            Some(FileStat {
                path: path.to_string(),
                additions: additions.parse().unwrap_or(0),
                deletions: deletions.parse().unwrap_or(0),
            })
        })
        .collect()
}

/// Commit type suggested for a group of staged paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTypeHint {
    pub commit_type: &'static str,
    pub files: Vec<String>,
}

const TYPE_PRIORITY: [&str; 10] = [
    "feat", "fix", "docs", "test", "style", "refactor", "perf", "build", "ci", "chore",
];

const CODE_EXTENSIONS: [&str; 14] = [
    ".go", ".js", ".ts", ".jsx", ".tsx", ".py", ".java", ".c", ".cpp", ".rs", ".rb", ".php",
    ".swift", ".kt",
];

/// Group staged paths by the commit type they look like, in priority order.
/// More than one group means the staged changes mix concerns.
pub fn analyze_file_types<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<CommitTypeHint> {
    let detected: Vec<(&str, &str)> = paths
        .into_iter()
        .map(|path| (detect_file_type(path), path))
        .collect();

    TYPE_PRIORITY
        .iter()
        .filter_map(|&commit_type| {
            let files: Vec<String> = detected
                .iter()
                .filter(|(t, _)| *t == commit_type)
                .map(|(_, path)| path.to_string())
                .collect();
            (!files.is_empty()).then_some(CommitTypeHint { commit_type, files })
        })
        .collect()
}

fn detect_file_type(path: &str) -> &'static str {
    let file = path.to_lowercase();
    let has = |needle: &str| file.contains(needle);
    let ends = |suffix: &str| file.ends_with(suffix);

    if ends(".md")
        || ends(".mdx")
        || ends(".rst")
        || has("readme")
        || has("docs/")
        || has("documentation/")
        || (ends(".txt") && has("doc"))
    {
        return "docs";
    }

    if has("_test.")
        || has(".test.")
        || has("/test/")
        || has("/tests/")
        || has("__tests__/")
        || has(".spec.")
    {
        return "test";
    }

    if has(".github/workflows/")
        || has(".gitlab-ci")
        || has("jenkinsfile")
        || has(".circleci/")
        || has(".travis.yml")
    {
        return "ci";
    }

    let manifests = [
        "package.json",
        "package-lock.json",
        "go.mod",
        "go.sum",
        "cargo.toml",
        "cargo.lock",
        "pom.xml",
        "build.gradle",
        "dockerfile",
        "makefile",
    ];
    if manifests.iter().any(|&m| ends(m))
        || ((ends(".yaml") || ends(".yml") || ends(".json")) && has("config"))
        || ends(".toml")
    {
        return "build";
    }

    if [".css", ".scss", ".sass", ".less"].iter().any(|&ext| ends(ext)) {
        return "style";
    }

    if CODE_EXTENSIONS.iter().any(|&ext| ends(ext)) {
        return "feat";
    }

    "chore"
}

/// Get the current branch name.
pub fn current_branch() -> Result<String> {
    let name = git_output(&["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string();
    Ok(name)
}

/// Collect repository context. Every piece is optional; failures leave the field empty.
pub fn project_context() -> ProjectContext {
    let toplevel = git_output(&["rev-parse", "--show-toplevel"])
        .ok()
        .map(|s| PathBuf::from(s.trim()));

    let project_name = toplevel
        .as_deref()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let branch_name = current_branch().unwrap_or_else(|e| {
        log::debug!("no branch name: {e:#}");
        String::new()
    });

    let recent_commits = git_output(&[
        "log",
        &format!("-{RECENT_COMMITS}"),
        "--pretty=format:%s",
    ])
    .map(|out| non_empty_lines(&out))
    .unwrap_or_default();

    let changed_files = git_output(&["diff", "--cached", "--name-only"])
        .map(|out| non_empty_lines(&out))
        .unwrap_or_default();

    let readme_snippet = toplevel
        .as_deref()
        .and_then(read_readme)
        .map(|text| readme_snippet(&text))
        .unwrap_or_default();

    let diff_stats = git_output(&["diff", "--cached", "--stat"]).unwrap_or_default();

    ProjectContext {
        project_name,
        branch_name,
        recent_commits,
        changed_files,
        readme_snippet,
        diff_stats,
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

fn read_readme(root: &Path) -> Option<String> {
    ["README.md", "README.MD", "readme.md", "Readme.md", "README"]
        .iter()
        .find_map(|name| fs::read_to_string(root.join(name)).ok())
}

/// First prose paragraph of a README, skipping headings and badges.
fn readme_snippet(text: &str) -> String {
    let paragraph = text
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty() && !p.starts_with('#') && !p.starts_with('[') && !p.starts_with('!'))
        .unwrap_or_default();

    let flat = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.chars().take(README_SNIPPET_CHARS).collect()
}

/// Creates the commit with `git commit -F -`.
pub struct GitCommitter;

impl CommitExecutor for GitCommitter {
    fn commit(&mut self, message: &str) -> crate::error::Result<()> {
        commit_with_message(message).map_err(|e| CommitError::Commit(format!("{e:#}")))
    }
}

fn commit_with_message(message: &str) -> Result<()> {
    let mut child = GitCommand::new("git")
        .args(["commit", "-F", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to run git commit")?;

    child
        .stdin
        .take()
        .context("git commit stdin unavailable")?
        .write_all(message.as_bytes())
        .context("failed to pass message to git commit")?;

    let output = child
        .wait_with_output()
        .context("failed to wait for git commit")?;
    if !output.status.success() {
        return Err(anyhow!(
            "git commit exited with status {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    log::info!("{}", String::from_utf8_lossy(&output.stdout).trim());
    Ok(())
}
