//! Helpers for the light Markdown dialect used in chat replies.

/// Characters that toggle formatting or mentions in reply text.
const CONTROL_CHARS: [char; 4] = ['@', '*', '`', '_'];

/// Neutralise markup control characters in user-supplied text so that a
/// name cannot break the formatting of the message it is embedded in.
pub fn escape(text: &str) -> String {
    text.chars()
        .map(|c| if CONTROL_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// Wrap text in bold markers.
pub fn bold(text: &str) -> String {
    format!("*{text}*")
}
