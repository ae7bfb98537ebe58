use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::ViewAction;
use crate::nav::Route;
use crate::types::UserRole;

const ENTRIES: [(&str, &str); 3] = [
    ("Onboard employee (admin)", "/wizard?role=admin"),
    ("Onboard employee (ops)", "/wizard?role=ops"),
    ("Employee list", "/employees"),
];

/// Landing menu linking the wizard for each role and the listing
pub struct Home {
    list_state: ListState,
}

impl Default for Home {
    fn default() -> Self {
        Self::new()
    }
}

impl Home {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { list_state }
    }

    fn selected(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        let last = ENTRIES.len() - 1;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                ViewAction::Quit
            }
            KeyCode::Char('q') | KeyCode::Esc => ViewAction::Quit,
            KeyCode::Down | KeyCode::Char('j') => {
                self.list_state.select(Some((self.selected() + 1).min(last)));
                ViewAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list_state.select(Some(self.selected().saturating_sub(1)));
                ViewAction::None
            }
            KeyCode::Char('a') => ViewAction::Push(Route::Wizard {
                role: UserRole::Admin,
            }),
            KeyCode::Char('o') => ViewAction::Push(Route::Wizard {
                role: UserRole::Ops,
            }),
            KeyCode::Char('e') => ViewAction::Push(Route::Employees { page: None }),
            KeyCode::Enter => ViewAction::Push(Route::parse(ENTRIES[self.selected()].1)),
            _ => ViewAction::None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(Span::styled(
            " Onboard ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        let items: Vec<ListItem> = ENTRIES
            .iter()
            .map(|(label, path)| {
                ListItem::new(Line::from(vec![
                    Span::raw(*label),
                    Span::styled(format!("  {}", path), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[1], &mut self.list_state);

        let key = Style::default().fg(Color::Yellow);
        let muted = Style::default().fg(Color::DarkGray);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("[Enter]", key),
                Span::styled(" open  ", muted),
                Span::styled("[a]", key),
                Span::styled(" admin  ", muted),
                Span::styled("[o]", key),
                Span::styled(" ops  ", muted),
                Span::styled("[e]", key),
                Span::styled(" employees  ", muted),
                Span::styled("[q]", key),
                Span::styled(" quit", muted),
            ])),
            chunks[2],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_opens_selected_route() {
        let mut home = Home::new();
        home.handle_key(key(KeyCode::Down));
        let action = home.handle_key(key(KeyCode::Enter));
        assert!(matches!(
            action,
            ViewAction::Push(Route::Wizard {
                role: UserRole::Ops
            })
        ));

        home.handle_key(key(KeyCode::Down));
        home.handle_key(key(KeyCode::Down));
        let action = home.handle_key(key(KeyCode::Enter));
        assert!(matches!(action, ViewAction::Push(Route::Employees { page: None })));
    }
}
