#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::Theme;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;

use super::Message;
use super::MessageType;
use super::Role;

static SYNTAX: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_nonewlines);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

/// Renders one message as a bordered chat bubble. Markdown code fences are
/// syntax highlighted and headings are drawn bold.
pub struct Bubble<'a> {
    message: &'a Message,
    alignment: BubbleAlignment,
    window_max_width: usize,
}

impl<'a> Bubble<'a> {
    pub fn new(
        message: &'a Message,
        alignment: BubbleAlignment,
        window_max_width: usize,
    ) -> Bubble<'a> {
        return Bubble {
            message,
            alignment,
            window_max_width,
        };
    }

    pub fn as_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        // Keep at least 4% of the window free beside every bubble.
        let min_bubble_padding_length = (self.window_max_width as f32 * 0.04).ceil() as usize;

        // left border + left padding + right padding + right border + scrollbar.
        let line_border_width = 5 + min_bubble_padding_length;
        let text_width = self
            .window_max_width
            .saturating_sub(line_border_width)
            .max(1);

        let message_lines = self.message.as_string_lines(text_width);
        let username = self.message.role().display_name();
        let max_line_length = message_lines
            .iter()
            .map(|line| return line.chars().count())
            .max()
            .unwrap_or(0)
            .max(username.chars().count());

        let mut highlight: Option<HighlightLines> = None;
        let mut lines: Vec<Line<'static>> = vec![];

        for line in message_lines {
            let trimmed = line.trim();
            let spans = if trimmed.starts_with("```") {
                if highlight.is_some() {
                    highlight = None;
                } else {
                    let lang = trimmed.trim_start_matches('`').trim();
                    highlight = Some(HighlightLines::new(find_syntax(lang), theme));
                }
                vec![Span::styled(
                    line.to_string(),
                    Style {
                        fg: Some(Color::DarkGray),
                        ..Style::default()
                    },
                )]
            } else if let Some(highlighter) = highlight.as_mut() {
                match highlighter.highlight_line(&line, &SYNTAX) {
                    Ok(segments) => segments
                        .iter()
                        .map(|(style, content)| {
                            return Span::styled(
                                content.to_string(),
                                Style {
                                    fg: translate_colour(style.foreground),
                                    ..Style::default()
                                },
                            );
                        })
                        .collect(),
                    Err(_) => vec![Span::from(line.to_string())],
                }
            } else if trimmed.starts_with('#') {
                vec![Span::styled(
                    line.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )]
            } else {
                vec![Span::from(line.to_string())]
            };

            lines.push(self.format_line(&line, max_line_length, spans));
        }

        // Add 2 for the padding spaces inside the borders.
        let inner_width = max_line_length + 2;
        let top_fill = "─".repeat(inner_width.saturating_sub(username.chars().count()));
        let top_bar = format!("╭{username}{top_fill}╮");
        let bottom_bar = format!("╰{}╯", "─".repeat(inner_width));

        let mut res = vec![self.pad(vec![self.highlight_span(top_bar)], max_line_length + 4)];
        res.extend(lines);
        res.push(self.pad(vec![self.highlight_span(bottom_bar)], max_line_length + 4));

        return res;
    }

    fn format_line(
        &self,
        line: &str,
        max_line_length: usize,
        mut spans: Vec<Span<'static>>,
    ) -> Line<'static> {
        let fill = " ".repeat(max_line_length.saturating_sub(line.chars().count()));

        let mut res = vec![self.highlight_span("│ ".to_string())];
        res.append(&mut spans);
        res.push(self.highlight_span(format!("{fill} │")));

        return self.pad(res, max_line_length + 4);
    }

    fn pad(&self, spans: Vec<Span<'static>>, content_width: usize) -> Line<'static> {
        let padding = Span::from(" ".repeat(self.window_max_width.saturating_sub(content_width)));

        if self.alignment == BubbleAlignment::Left {
            let mut res = spans;
            res.push(padding);
            return Line::from(res);
        }

        let mut res = vec![padding];
        res.extend(spans);
        return Line::from(res);
    }

    fn highlight_span(&self, text: String) -> Span<'static> {
        if self.message.message_type() == MessageType::Error {
            return Span::styled(
                text,
                Style {
                    fg: Some(Color::Red),
                    ..Style::default()
                },
            );
        }

        if self.message.role() == Role::User {
            return Span::styled(
                text,
                Style {
                    fg: Some(Color::Indexed(63)), // Indigo
                    ..Style::default()
                },
            );
        }

        return Span::from(text);
    }
}

fn translate_colour(syntect_color: syntect::highlighting::Color) -> Option<Color> {
    match syntect_color {
        syntect::highlighting::Color { r, g, b, a } if a > 0 => return Some(Color::Rgb(r, g, b)),
        _ => return None,
    }
}

fn find_syntax(name: &str) -> &'static SyntaxReference {
    let lang = match name {
        "typescript" | "ts" | "tsx" => "js",
        "" => return SYNTAX.find_syntax_plain_text(),
        other => other,
    };

    return SYNTAX
        .find_syntax_by_token(lang)
        .unwrap_or_else(|| return SYNTAX.find_syntax_plain_text());
}
