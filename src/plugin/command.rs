//! Text command surface.
//!
//! | Input            | Command          |
//! |------------------|------------------|
//! | `单词 <word>`    | `Query(word)`    |
//! | `单词听 <word>`  | `Speak(word)`    |
//! | `听单词 <word>`  | `Speak(word)`    |
//!
//! The keyword must be followed by whitespace or end the message; a bare
//! keyword parses with an empty word so the dispatcher can prompt for one.

/// Keyword for "look up word".
pub const QUERY_PREFIX: &str = "单词";

/// Synonymous keywords for "speak word"; the first one is canonical.
pub const SPEAK_PREFIXES: [&str; 2] = ["单词听", "听单词"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reply with the explanation (voice follows in the background).
    Query(String),
    /// Reply with a voice file.
    Speak(String),
}

/// The trimmed argument after `keyword`, if `content` starts with it as a
/// whole word.
fn argument<'a>(content: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = content.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

impl Command {
    /// Parse an incoming text message; `None` means "not for this plugin".
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim();

        if let Some(word) = SPEAK_PREFIXES.iter().find_map(|p| argument(content, p)) {
            return Some(Command::Speak(word.to_string()));
        }

        argument(content, QUERY_PREFIX).map(|word| Command::Query(word.to_string()))
    }
}
