//! Paginated employee listing

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use tokio::sync::oneshot;
use tracing::warn;

use super::ViewAction;
use crate::api::{ApiError, EmployeeApi};
use crate::app::AppContext;
use crate::draft;
use crate::employees::load_employees;
use crate::nav::Route;
use crate::pagination::{page_items, resolve_page, PageInfo};
use crate::storage::KeyValueStore;
use crate::types::{Employee, UserRole};

pub const COLUMNS: [&str; 8] = [
    "ID",
    "Photo",
    "Name",
    "Email",
    "Department",
    "Role",
    "Location",
    "Employment Type",
];

/// Cell text for one employee, in [`COLUMNS`] order
pub fn row_cells(employee: &Employee) -> [String; 8] {
    let or_dash = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or("-")
            .to_string()
    };
    [
        employee.basic.employee_id.clone(),
        if employee.photo.is_some() {
            "has photo".to_string()
        } else {
            "No Photo".to_string()
        },
        employee.basic.full_name.clone(),
        employee.basic.email.clone(),
        employee.basic.department.clone(),
        employee.basic.role.clone(),
        or_dash(&employee.office_location),
        or_dash(&employee.employment_type),
    ]
}

/// "Showing a - b of n" for the resolved page
pub fn showing_line(info: &PageInfo, total_items: usize, per_page: usize) -> String {
    let range = info.range(total_items, per_page);
    format!(
        "Showing {} - {} of {}",
        range.start + 1,
        range.end,
        total_items
    )
}

enum LoadState {
    Loading,
    Error(String),
    Loaded(Vec<Employee>),
}

pub struct EmployeeTable {
    api: Arc<dyn EmployeeApi>,
    store: Arc<dyn KeyValueStore>,
    per_page: usize,
    raw_page: Option<String>,
    state: LoadState,
    page: Option<PageInfo>,
    rx: Option<oneshot::Receiver<Result<Vec<Employee>, ApiError>>>,
}

impl EmployeeTable {
    pub fn mount(page: Option<String>, ctx: &AppContext) -> Self {
        let mut table = Self {
            api: ctx.api.clone(),
            store: ctx.store.clone(),
            per_page: ctx.config.ui.page_size.max(1),
            raw_page: page,
            state: LoadState::Loading,
            page: None,
            rx: None,
        };
        table.reload();
        table
    }

    /// Fetch both collections again
    pub fn reload(&mut self) {
        let (tx, rx) = oneshot::channel();
        let api = self.api.clone();
        tokio::spawn(async move {
            let _ = tx.send(load_employees(api.as_ref()).await);
        });
        self.state = LoadState::Loading;
        self.page = None;
        self.rx = Some(rx);
    }

    /// Follow a page change without refetching
    pub fn set_page(&mut self, raw: Option<String>) -> ViewAction {
        self.raw_page = raw;
        self.resolve()
    }

    pub fn page(&self) -> Option<PageInfo> {
        self.page
    }

    fn resolve(&mut self) -> ViewAction {
        let LoadState::Loaded(employees) = &self.state else {
            return ViewAction::None;
        };
        let info = resolve_page(self.raw_page.as_deref(), employees.len(), self.per_page);
        self.page = Some(info);
        if info.corrected {
            self.raw_page = Some(info.page.to_string());
            return ViewAction::Replace(Route::employees_page(info.page));
        }
        ViewAction::None
    }

    pub fn poll_background(&mut self) -> ViewAction {
        let Some(rx) = &mut self.rx else {
            return ViewAction::None;
        };
        match rx.try_recv() {
            Ok(Ok(employees)) => {
                self.rx = None;
                self.state = LoadState::Loaded(employees);
                self.resolve()
            }
            Ok(Err(err)) => {
                self.rx = None;
                self.state = LoadState::Error(err.to_string());
                ViewAction::None
            }
            Err(oneshot::error::TryRecvError::Empty) => ViewAction::None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.rx = None;
                self.state = LoadState::Error("Employee fetch was interrupted".to_string());
                ViewAction::None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                ViewAction::Quit
            }
            KeyCode::Char('q') => ViewAction::Quit,
            KeyCode::Esc => ViewAction::Back,
            KeyCode::Char('r') => {
                self.reload();
                ViewAction::None
            }
            KeyCode::Char('a') => self.add_employee(),
            KeyCode::Char('n') | KeyCode::Right => self
                .page
                .and_then(|info| info.next())
                .map_or(ViewAction::None, |page| {
                    ViewAction::Push(Route::employees_page(page))
                }),
            KeyCode::Char('p') | KeyCode::Left => self
                .page
                .and_then(|info| info.previous())
                .map_or(ViewAction::None, |page| {
                    ViewAction::Push(Route::employees_page(page))
                }),
            _ => ViewAction::None,
        }
    }

    /// Start a fresh admin onboarding
    fn add_employee(&mut self) -> ViewAction {
        if let Err(err) = draft::clear_draft(self.store.as_ref(), UserRole::Admin) {
            warn!(error = %err, "Failed to clear admin draft before adding employee");
        }
        ViewAction::Push(Route::Wizard {
            role: UserRole::Admin,
        })
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let block = Block::default()
            .title(" Employees ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let muted = Style::default().fg(Color::DarkGray);
        match &self.state {
            LoadState::Loading => {
                frame.render_widget(Paragraph::new("Loading employees...").style(muted), chunks[0]);
            }
            LoadState::Error(message) => {
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from(Span::styled(
                            "Failed to load employees",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red))),
                    ]),
                    chunks[0],
                );
            }
            LoadState::Loaded(employees) if employees.is_empty() => {
                frame.render_widget(Paragraph::new("No employees found.").style(muted), chunks[0]);
            }
            LoadState::Loaded(employees) => {
                let info = self
                    .page
                    .unwrap_or_else(|| resolve_page(None, employees.len(), self.per_page));
                let rows: Vec<Row> = page_items(employees, &info, self.per_page)
                    .iter()
                    .map(|employee| {
                        let cells = row_cells(employee);
                        let photo_style = if employee.photo.is_some() {
                            Style::default().fg(Color::Green)
                        } else {
                            muted
                        };
                        Row::new(cells.into_iter().enumerate().map(|(i, text)| {
                            if i == 1 {
                                Cell::from(text).style(photo_style)
                            } else {
                                Cell::from(text)
                            }
                        }))
                    })
                    .collect();
                let header = Row::new(COLUMNS).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                );
                let widths = [
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Percentage(18),
                    Constraint::Percentage(22),
                    Constraint::Percentage(14),
                    Constraint::Length(10),
                    Constraint::Percentage(12),
                    Constraint::Length(16),
                ];
                frame.render_widget(Table::new(rows, widths).header(header), chunks[0]);

                let mut footer = vec![Span::styled(
                    showing_line(&info, employees.len(), self.per_page),
                    Style::default().fg(Color::Cyan),
                )];
                if info.total_pages > 1 {
                    footer.push(Span::styled(
                        format!("  Page {}/{}", info.page, info.total_pages),
                        muted,
                    ));
                }
                frame.render_widget(Paragraph::new(Line::from(footer)), chunks[1]);
            }
        }

        let key = Style::default().fg(Color::Yellow);
        let hints = Line::from(vec![
            Span::styled("[a]", key),
            Span::styled(" Add Employee  ", muted),
            Span::styled("[n]", key),
            Span::styled(" next  ", muted),
            Span::styled("[p]", key),
            Span::styled(" prev  ", muted),
            Span::styled("[r]", key),
            Span::styled(" reload  ", muted),
            Span::styled("[Esc]", key),
            Span::styled(" back  ", muted),
            Span::styled("[q]", key),
            Span::styled(" quit", muted),
        ]);
        frame.render_widget(Paragraph::new(hints), chunks[2]);
    }
}
