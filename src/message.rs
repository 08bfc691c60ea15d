/// Phrases models like to put in front of the actual message.
const BOILERPLATE_PREFIXES: &[&str] = &[
    "commit message:",
    "here is the commit message:",
    "here's the commit message:",
    "suggested commit message:",
    "generated message:",
];

const QUOTE_CHARS: &[char] = &['"', '\'', '`'];

/// A model response together with the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
    pub raw: String,
    pub cleaned: String,
}

impl GeneratedMessage {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let cleaned = clean(&raw);
        Self { raw, cleaned }
    }

    /// A user revision replaces both sides verbatim.
    pub fn edited(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            raw: text.clone(),
            cleaned: text,
        }
    }

    pub fn text(&self) -> &str {
        &self.cleaned
    }
}

/// Strip one boilerplate prefix and one layer of surrounding quotes.
///
/// Both orders are tried (prefix first, then quotes first). The first candidate that
/// would survive another pass unchanged wins; if neither does, the trimmed input is
/// returned as-is. The result only depends on the trimmed input, which makes
/// `clean(clean(x)) == clean(x)` hold.
pub fn clean(message: &str) -> String {
    let trimmed = message.trim();

    let prefix_first = strip_quotes(strip_prefix(trimmed));
    if is_clean(prefix_first) {
        return prefix_first.to_string();
    }

    let quotes_first = strip_prefix(strip_quotes(trimmed));
    if is_clean(quotes_first) {
        return quotes_first.to_string();
    }

    trimmed.to_string()
}

fn is_clean(s: &str) -> bool {
    s == s.trim() && matching_prefix(s).is_none() && unquoted(s).is_none()
}

fn matching_prefix(s: &str) -> Option<&'static str> {
    BOILERPLATE_PREFIXES
        .iter()
        .copied()
        .filter(|p| {
            s.get(..p.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(p))
        })
        .max_by_key(|p| p.len())
}

fn strip_prefix(s: &str) -> &str {
    match matching_prefix(s) {
        Some(p) => s[p.len()..].trim(),
        None => s,
    }
}

fn unquoted(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if !QUOTE_CHARS.contains(&first) || s.len() < 2 || !s.ends_with(first) {
        return None;
    }
    Some(&s[1..s.len() - 1])
}

fn strip_quotes(s: &str) -> &str {
    match unquoted(s) {
        Some(inner) => inner.trim(),
        None => s,
    }
}
