use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmSelection {
    Yes,
    No,
}

impl ConfirmSelection {
    fn toggle(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

/// Yes/No prompt for destructive actions. Defaults to No.
pub struct ConfirmDialog {
    pub visible: bool,
    title: String,
    message: String,
    pub selection: ConfirmSelection,
}

impl ConfirmDialog {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            visible: false,
            title: title.to_string(),
            message: message.to_string(),
            selection: ConfirmSelection::No,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.selection = ConfirmSelection::No;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Returns the answer once the user decides. Esc and `n` answer No.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<ConfirmSelection> {
        let answer = match key {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h' | 'l') => {
                self.selection = self.selection.toggle();
                None
            }
            KeyCode::Enter => Some(self.selection),
            KeyCode::Char('y' | 'Y') => Some(ConfirmSelection::Yes),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(ConfirmSelection::No),
            _ => None,
        };
        if answer.is_some() {
            self.hide();
        }
        answer
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(self.message.as_str())
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center),
            chunks[0],
        );

        let button = |label: &'static str, selected: bool| {
            if selected {
                Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(label, Style::default().fg(Color::Gray))
            }
        };
        let buttons = Line::from(vec![
            button(" [Y]es ", self.selection == ConfirmSelection::Yes),
            Span::raw("   "),
            button(" [N]o ", self.selection == ConfirmSelection::No),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no() {
        let mut dialog = ConfirmDialog::new("Clear draft?", "All entered data will be lost.");
        dialog.show();
        assert_eq!(dialog.handle_key(KeyCode::Enter), Some(ConfirmSelection::No));
        assert!(!dialog.visible);
    }

    #[test]
    fn test_toggle_then_confirm() {
        let mut dialog = ConfirmDialog::new("Clear draft?", "");
        dialog.show();
        assert_eq!(dialog.handle_key(KeyCode::Left), None);
        assert!(dialog.visible);
        assert_eq!(dialog.handle_key(KeyCode::Enter), Some(ConfirmSelection::Yes));
    }

    #[test]
    fn test_shortcuts() {
        let mut dialog = ConfirmDialog::new("Clear draft?", "");
        dialog.show();
        assert_eq!(dialog.handle_key(KeyCode::Char('y')), Some(ConfirmSelection::Yes));
        dialog.show();
        assert_eq!(dialog.handle_key(KeyCode::Esc), Some(ConfirmSelection::No));
        dialog.show();
        assert_eq!(dialog.handle_key(KeyCode::Char('x')), None);
    }
}
