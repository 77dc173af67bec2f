//! Inline keyboards and text formatting for outbound messages.

use serde::{Deserialize, Serialize};

/// How the backend should interpret markup in message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// No markup.
    #[default]
    Plain,
    /// HTML subset (`<b>`, `<code>`, links).
    Html,
    /// Markdown subset.
    Markdown,
}

/// Escapes text for [`ParseMode::Html`].
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// What pressing a button does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Sends a callback query carrying this data string back to the bot.
    CallbackData(String),
    /// Opens a URL.
    Url(String),
}

/// A single inline button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    /// Label shown to the user.
    pub text: String,
    /// Action performed on press.
    #[serde(flatten)]
    pub action: ButtonAction,
}

impl InlineButton {
    /// Creates a button that sends `data` back as a callback query.
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::CallbackData(data.into()),
        }
    }

    /// Creates a button that opens `url`.
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    /// Returns the callback data, if this is a callback button.
    pub fn callback_data(&self) -> Option<&str> {
        match &self.action {
            ButtonAction::CallbackData(data) => Some(data),
            ButtonAction::Url(_) => None,
        }
    }
}

/// Rows of inline buttons attached under a message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InlineKeyboard {
    /// Button rows, top to bottom.
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Creates an empty keyboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a keyboard from rows.
    pub fn from_rows(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Appends a row (builder pattern).
    pub fn row(mut self, row: Vec<InlineButton>) -> Self {
        self.rows.push(row);
        self
    }

    /// Appends a row in place.
    pub fn push_row(&mut self, row: Vec<InlineButton>) {
        self.rows.push(row);
    }

    /// Returns `true` if the keyboard has no buttons.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Iterates over every button, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_keyboard_is_empty() {
        assert!(InlineKeyboard::new().is_empty());
        assert!(InlineKeyboard::new().row(vec![]).is_empty());

        let keyboard = InlineKeyboard::new()
            .row(vec![InlineButton::callback("A", "a")])
            .row(vec![InlineButton::url("B", "https://example.org")]);
        assert!(!keyboard.is_empty());
        assert_eq!(keyboard.buttons().count(), 2);
        assert_eq!(keyboard.buttons().next().and_then(InlineButton::callback_data), Some("a"));
    }
}
