//! Input widgets used by the wizard steps

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

/// One editable field
pub enum FormField {
    /// Single-line text input
    TextInput {
        value: String,
        /// Cursor position in chars
        cursor_pos: usize,
        placeholder: String,
    },
    /// Multi-line text input using tui-textarea
    TextArea {
        textarea: Box<TextArea<'static>>,
        placeholder: String,
    },
    /// Choice from fixed options; nothing chosen until the user picks
    Select {
        options: Vec<String>,
        selected: Option<usize>,
    },
}

fn byte_index(value: &str, cursor: usize) -> usize {
    value
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

impl FormField {
    pub fn text(value: &str, placeholder: &str) -> Self {
        FormField::TextInput {
            cursor_pos: value.chars().count(),
            value: value.to_string(),
            placeholder: placeholder.to_string(),
        }
    }

    pub fn text_area(value: &str, placeholder: &str) -> Self {
        let mut textarea = TextArea::default();
        textarea.insert_str(value);
        FormField::TextArea {
            textarea: Box::new(textarea),
            placeholder: placeholder.to_string(),
        }
    }

    pub fn select(options: &[&str], current: Option<&str>) -> Self {
        let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        let selected = current.and_then(|c| options.iter().position(|o| o == c));
        FormField::Select { options, selected }
    }

    /// Current value; an unchosen select is empty
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::TextArea { textarea, .. } => textarea.lines().join("\n"),
            FormField::Select { options, selected } => selected
                .and_then(|i| options.get(i))
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub fn set_value(&mut self, new_value: &str) {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            } => {
                *value = new_value.to_string();
                *cursor_pos = value.chars().count();
            }
            FormField::TextArea { textarea, .. } => {
                textarea.select_all();
                textarea.cut();
                textarea.insert_str(new_value);
            }
            FormField::Select { options, selected } => {
                *selected = options.iter().position(|o| o == new_value);
            }
        }
    }

    /// Handle a key event, returns true if the value changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            } => match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    let at = byte_index(value, *cursor_pos);
                    value.insert(at, c);
                    *cursor_pos += 1;
                    true
                }
                KeyCode::Backspace => {
                    if *cursor_pos == 0 {
                        return false;
                    }
                    *cursor_pos -= 1;
                    let at = byte_index(value, *cursor_pos);
                    value.remove(at);
                    true
                }
                KeyCode::Delete => {
                    if *cursor_pos >= value.chars().count() {
                        return false;
                    }
                    let at = byte_index(value, *cursor_pos);
                    value.remove(at);
                    true
                }
                KeyCode::Left => {
                    *cursor_pos = cursor_pos.saturating_sub(1);
                    false
                }
                KeyCode::Right => {
                    *cursor_pos = (*cursor_pos + 1).min(value.chars().count());
                    false
                }
                KeyCode::Home => {
                    *cursor_pos = 0;
                    false
                }
                KeyCode::End => {
                    *cursor_pos = value.chars().count();
                    false
                }
                _ => false,
            },
            FormField::TextArea { textarea, .. } => {
                let before = textarea.lines().to_vec();
                textarea.input(key);
                textarea.lines() != before.as_slice()
            }
            FormField::Select { options, selected } => {
                if options.is_empty() {
                    return false;
                }
                let last = options.len() - 1;
                let next = match (key.code, *selected) {
                    (KeyCode::Left | KeyCode::Char('h'), None) => last,
                    (KeyCode::Left | KeyCode::Char('h'), Some(i)) => i.saturating_sub(1),
                    (KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' '), None) => 0,
                    (KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' '), Some(i)) => {
                        (i + 1).min(last)
                    }
                    _ => return false,
                };
                let changed = *selected != Some(next);
                *selected = Some(next);
                changed
            }
        }
    }

    /// Rows needed to render this field
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextInput { .. } | FormField::Select { .. } => 1,
            FormField::TextArea { .. } => 5,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let text_style = Style::default().fg(if focused { Color::White } else { Color::Gray });

        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                placeholder,
            } => {
                let content = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else {
                    let mut text = value.clone();
                    if focused {
                        text.insert(byte_index(value, *cursor_pos), '|');
                    }
                    Line::from(text)
                };
                frame.render_widget(Paragraph::new(content).style(text_style), area);
            }
            FormField::TextArea {
                textarea,
                placeholder,
            } => {
                let border_color = if focused { Color::Cyan } else { Color::Gray };
                textarea.set_cursor_line_style(Style::default());
                textarea.set_cursor_style(if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                });
                textarea.set_block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border_color)),
                );
                textarea.set_placeholder_text(placeholder.clone());
                textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));

                frame.render_widget(&**textarea, area);
            }
            FormField::Select { options, selected } => {
                let mut spans = Vec::new();
                for (i, option) in options.iter().enumerate() {
                    let style = if Some(i) == *selected {
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    spans.push(Span::styled(format!(" {} ", option), style));
                    spans.push(Span::raw(" "));
                }
                if selected.is_none() && !focused {
                    spans.push(Span::styled(
                        "(choose with ←/→)",
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                frame.render_widget(Paragraph::new(Line::from(spans)), area);
            }
        }
    }
}

/// Inline validation message under a field
pub fn error_line(message: Option<&str>) -> Line<'static> {
    match message {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::default(),
    }
}
