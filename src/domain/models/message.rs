#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MessageType {
    #[default]
    Normal,
    Error,
}

/// A single chat turn. Only `role` and `content` ever go over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
    #[serde(skip)]
    mtype: MessageType,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            role,
            content: content.to_string(),
            mtype: MessageType::Normal,
        };
    }

    pub fn new_with_type(role: Role, mtype: MessageType, content: &str) -> Message {
        return Message {
            role,
            content: content.to_string(),
            mtype,
        };
    }

    pub fn role(&self) -> Role {
        return self.role;
    }

    pub fn content(&self) -> &str {
        return &self.content;
    }

    pub fn message_type(&self) -> MessageType {
        return self.mtype;
    }

    pub fn as_string_lines(&self, line_max_width: usize) -> Vec<String> {
        return wrap_lines(&self.content.replace('\t', "  "), line_max_width);
    }
}

/// Word wraps text to the given width. Blank lines are kept as a single space
/// so they still take up a row when rendered.
pub fn wrap_lines(text: &str, line_max_width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for full_line in text.split('\n') {
        if full_line.trim().is_empty() {
            lines.push(" ".to_string());
            continue;
        }

        let mut char_count = 0;
        let mut current_lines: Vec<&str> = vec![];

        for word in full_line.split(' ') {
            let word_len = word.chars().count();
            if word_len + char_count + 1 > line_max_width && !current_lines.is_empty() {
                lines.push(current_lines.join(" ").trim_end().to_string());
                current_lines = vec![word];
                char_count = word_len + 1;
            } else {
                current_lines.push(word);
                char_count += word_len + 1;
            }
        }
        if !current_lines.is_empty() {
            lines.push(current_lines.join(" ").trim_end().to_string());
        }
    }

    return lines;
}
