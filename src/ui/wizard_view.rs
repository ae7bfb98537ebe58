//! Wizard screen: field widgets bound to the step controllers.

use std::path::Path;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::dialogs::{ConfirmDialog, ConfirmSelection};
use super::form_field::{error_line, FormField};
use super::ViewAction;
use crate::api::ApiError;
use crate::app::AppContext;
use crate::draft::DraftStore;
use crate::lookup::{DepartmentSource, LocationSource, OptionLoader};
use crate::nav::Route;
use crate::types::{BasicInfo, EmploymentType, LookupOption, Role, UserRole};
use crate::wizard::{fields, SubmissionEvent, SubmissionGateway, SubmissionPhase, Wizard, WizardStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    FullName,
    Email,
    Department,
    Role,
    Photo,
    EmploymentType,
    OfficeLocation,
    Notes,
}

const STEP_ONE_SLOTS: [Slot; 4] = [Slot::FullName, Slot::Email, Slot::Department, Slot::Role];
const STEP_TWO_SLOTS: [Slot; 4] = [
    Slot::Photo,
    Slot::EmploymentType,
    Slot::OfficeLocation,
    Slot::Notes,
];

impl Slot {
    /// Key the controllers report errors under
    fn field_key(self) -> &'static str {
        match self {
            Slot::FullName => fields::FULL_NAME,
            Slot::Email => fields::EMAIL,
            Slot::Department => fields::DEPARTMENT,
            Slot::Role => fields::ROLE,
            Slot::Photo => fields::PHOTO,
            Slot::EmploymentType => fields::EMPLOYMENT_TYPE,
            Slot::OfficeLocation => fields::OFFICE_LOCATION,
            Slot::Notes => fields::NOTES,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Slot::FullName => "Full name *",
            Slot::Email => "Email *",
            Slot::Department => "Department *",
            Slot::Role => "Role *",
            Slot::Photo => "Photo (path to image, Enter to attach, Ctrl+X to remove)",
            Slot::EmploymentType => "Employment type *",
            Slot::OfficeLocation => "Office location *",
            Slot::Notes => "Notes",
        }
    }

    fn has_suggestions(self) -> bool {
        matches!(self, Slot::Department | Slot::OfficeLocation)
    }
}

pub struct WizardView {
    wizard: Wizard,
    gateway: SubmissionGateway,
    departments: Arc<OptionLoader>,
    locations: Arc<OptionLoader>,
    widgets: Vec<(Slot, FormField)>,
    focus: usize,
    suggestions: Vec<LookupOption>,
    highlighted: Option<usize>,
    suggestion_tx: mpsc::UnboundedSender<(Slot, Vec<LookupOption>)>,
    suggestion_rx: mpsc::UnboundedReceiver<(Slot, Vec<LookupOption>)>,
    existing_rx: Option<oneshot::Receiver<Result<Vec<BasicInfo>, ApiError>>>,
    submission_rx: Option<mpsc::UnboundedReceiver<SubmissionEvent>>,
    confirm: ConfirmDialog,
    status: Option<String>,
}

impl WizardView {
    /// Mount the wizard for `role` and start fetching the records employee IDs derive from
    pub fn mount(role: UserRole, ctx: &AppContext) -> Self {
        let drafts = DraftStore::new(ctx.store.clone(), ctx.config.wizard.autosave_delay());
        let wizard = Wizard::mount(role, drafts, ctx.config.wizard.max_photo_bytes);

        let debounce = ctx.config.wizard.lookup_debounce();
        let departments = Arc::new(OptionLoader::new(
            Arc::new(DepartmentSource::new(ctx.api.clone())),
            debounce,
        ));
        let locations = Arc::new(OptionLoader::new(
            Arc::new(LocationSource::new(ctx.api.clone())),
            debounce,
        ));

        let existing_rx = role.fills_basic_info().then(|| {
            let (tx, rx) = oneshot::channel();
            let api = ctx.api.clone();
            tokio::spawn(async move {
                let _ = tx.send(api.list_basic_info().await);
            });
            rx
        });

        let (suggestion_tx, suggestion_rx) = mpsc::unbounded_channel();
        let mut view = Self {
            wizard,
            gateway: SubmissionGateway::new(ctx.api.clone()),
            departments,
            locations,
            widgets: Vec::new(),
            focus: 0,
            suggestions: Vec::new(),
            highlighted: None,
            suggestion_tx,
            suggestion_rx,
            existing_rx,
            submission_rx: None,
            confirm: ConfirmDialog::new(
                "Clear draft?",
                "This discards everything entered so far for this role.",
            ),
            status: None,
        };
        view.rebuild_widgets();
        view
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Widgets mirror the controllers' current values
    fn rebuild_widgets(&mut self) {
        let one = self.wizard.step_one().fields();
        let two = self.wizard.step_two().fields();
        let role_labels: Vec<&str> = Role::all().iter().map(Role::label).collect();
        let type_labels: Vec<&str> = EmploymentType::all()
            .iter()
            .map(EmploymentType::label)
            .collect();

        self.widgets = vec![
            (Slot::FullName, FormField::text(&one.full_name, "Jane Doe")),
            (Slot::Email, FormField::text(&one.email, "jane@company.com")),
            (
                Slot::Department,
                FormField::text(&one.department, "Start typing to search"),
            ),
            (
                Slot::Role,
                FormField::select(&role_labels, one.role.map(|r| r.label())),
            ),
            (Slot::Photo, FormField::text("", "/path/to/photo.jpg")),
            (
                Slot::EmploymentType,
                FormField::select(&type_labels, two.employment_type.map(|t| t.label())),
            ),
            (
                Slot::OfficeLocation,
                FormField::text(&two.office_location, "Start typing to search"),
            ),
            (Slot::Notes, FormField::text_area(&two.notes, "Optional notes")),
        ];
        self.focus = 0;
        self.clear_suggestions();
    }

    fn slots(&self) -> &'static [Slot] {
        match self.wizard.step() {
            WizardStep::StepOne => &STEP_ONE_SLOTS,
            WizardStep::StepTwo => &STEP_TWO_SLOTS,
        }
    }

    fn focused_slot(&self) -> Slot {
        let slots = self.slots();
        slots[self.focus.min(slots.len() - 1)]
    }

    fn widget_mut(&mut self, slot: Slot) -> Option<&mut FormField> {
        self.widgets
            .iter_mut()
            .find(|(s, _)| *s == slot)
            .map(|(_, w)| w)
    }

    fn widget_value(&self, slot: Slot) -> String {
        self.widgets
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, w)| w.value())
            .unwrap_or_default()
    }

    fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
    }

    /// Push a widget's value into its controller
    fn sync(&mut self, slot: Slot) {
        let value = self.widget_value(slot);
        match slot {
            Slot::FullName => self.wizard.step_one_mut().set_full_name(value),
            Slot::Email => self.wizard.step_one_mut().set_email(value),
            Slot::Department => self.wizard.step_one_mut().set_department(value),
            Slot::Role => self.wizard.step_one_mut().set_role(value.parse().ok()),
            Slot::EmploymentType => self
                .wizard
                .step_two_mut()
                .set_employment_type(value.parse().ok()),
            Slot::OfficeLocation => self.wizard.step_two_mut().set_office_location(value),
            Slot::Notes => self.wizard.step_two_mut().set_notes(value),
            Slot::Photo => {}
        }
    }

    fn request_suggestions(&self, slot: Slot, query: String) {
        let loader = match slot {
            Slot::Department => self.departments.clone(),
            Slot::OfficeLocation => self.locations.clone(),
            _ => return,
        };
        let tx = self.suggestion_tx.clone();
        tokio::spawn(async move {
            let options = loader.load_options(&query).await;
            let _ = tx.send((slot, options));
        });
    }

    /// Drain results from background tasks
    pub fn poll_background(&mut self) -> ViewAction {
        if let Some(rx) = &mut self.existing_rx {
            match rx.try_recv() {
                Ok(result) => {
                    self.wizard.set_existing_records(result);
                    self.existing_rx = None;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => self.existing_rx = None,
            }
        }

        while let Ok((slot, options)) = self.suggestion_rx.try_recv() {
            if slot == self.focused_slot() {
                self.highlighted = None;
                self.suggestions = options;
            }
        }

        if let Some(rx) = &mut self.submission_rx {
            let mut events = Vec::new();
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
            for event in events {
                self.wizard.apply(event);
            }
            if self.wizard.submission().phase.is_terminal() {
                self.submission_rx = None;
            }
        }

        ViewAction::None
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        if self.confirm.visible {
            if let Some(answer) = self.confirm.handle_key(key.code) {
                if answer == ConfirmSelection::Yes {
                    return self.clear_draft();
                }
            }
            return ViewAction::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return ViewAction::Quit,
            KeyCode::Char('d') if ctrl => {
                self.confirm.show();
                return ViewAction::None;
            }
            KeyCode::Char('s') if ctrl => return self.primary_action(),
            _ => {}
        }

        if self.wizard.submission().phase == SubmissionPhase::Success {
            return match key.code {
                KeyCode::Enter => ViewAction::Push(Route::employees_page(1)),
                KeyCode::Esc => ViewAction::Back,
                _ => ViewAction::None,
            };
        }

        let slot = self.focused_slot();
        match key.code {
            KeyCode::Esc => {
                if self.wizard.back() {
                    self.focus = 0;
                    self.clear_suggestions();
                    return ViewAction::None;
                }
                ViewAction::Back
            }
            KeyCode::Tab => {
                self.move_focus(1);
                ViewAction::None
            }
            KeyCode::BackTab => {
                self.move_focus(-1);
                ViewAction::None
            }
            KeyCode::Up | KeyCode::Down if !self.suggestions.is_empty() => {
                let last = self.suggestions.len() - 1;
                self.highlighted = Some(match (key.code, self.highlighted) {
                    (KeyCode::Down, None) => 0,
                    (KeyCode::Down, Some(i)) => (i + 1).min(last),
                    (_, None) => last,
                    (_, Some(i)) => i.saturating_sub(1),
                });
                ViewAction::None
            }
            KeyCode::Up if slot != Slot::Notes => {
                self.move_focus(-1);
                ViewAction::None
            }
            KeyCode::Down if slot != Slot::Notes => {
                self.move_focus(1);
                ViewAction::None
            }
            KeyCode::Enter if self.highlighted.is_some() => {
                self.accept_suggestion(slot);
                ViewAction::None
            }
            KeyCode::Enter if slot == Slot::Photo => {
                self.attach_photo();
                ViewAction::None
            }
            KeyCode::Enter if slot != Slot::Notes => self.primary_action(),
            KeyCode::Char('x') if ctrl && slot == Slot::Photo => {
                self.wizard.step_two_mut().remove_photo();
                self.status = Some("Photo removed".to_string());
                ViewAction::None
            }
            _ => {
                let changed = self
                    .widget_mut(slot)
                    .is_some_and(|widget| widget.handle_key(key));
                if changed {
                    self.sync(slot);
                    if slot.has_suggestions() {
                        self.request_suggestions(slot, self.widget_value(slot));
                    }
                }
                ViewAction::None
            }
        }
    }

    fn move_focus(&mut self, delta: isize) {
        let count = self.slots().len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(count) as usize;
        self.clear_suggestions();
    }

    fn accept_suggestion(&mut self, slot: Slot) {
        let Some(option) = self
            .highlighted
            .and_then(|i| self.suggestions.get(i))
            .cloned()
        else {
            return;
        };
        if let Some(widget) = self.widget_mut(slot) {
            widget.set_value(&option.value);
        }
        self.sync(slot);
        self.clear_suggestions();
    }

    fn attach_photo(&mut self) {
        let path = self.widget_value(Slot::Photo);
        if path.trim().is_empty() {
            return;
        }
        if self
            .wizard
            .step_two_mut()
            .attach_photo(Path::new(path.trim()))
            .is_ok()
        {
            if let Some(widget) = self.widget_mut(Slot::Photo) {
                widget.set_value("");
            }
            self.status = Some("Photo attached".to_string());
        }
    }

    /// Next on Step 1, Submit on Step 2
    fn primary_action(&mut self) -> ViewAction {
        match self.wizard.step() {
            WizardStep::StepOne => {
                if self.wizard.advance() {
                    self.focus = 0;
                    self.clear_suggestions();
                }
            }
            WizardStep::StepTwo => {
                if let Some(request) = self.wizard.begin_submission() {
                    let (tx, rx) = mpsc::unbounded_channel();
                    self.submission_rx = Some(rx);
                    self.gateway.spawn(request, tx);
                }
            }
        }
        ViewAction::None
    }

    fn clear_draft(&mut self) -> ViewAction {
        if let Err(err) = self.wizard.clear_draft() {
            tracing::error!(error = %err, "Failed to clear draft");
            self.status = Some(format!("Failed to clear draft: {}", err));
            return ViewAction::None;
        }
        self.submission_rx = None;
        self.rebuild_widgets();
        debug!(role = %self.wizard.role(), "wizard reloaded after clearing draft");
        ViewAction::Reload
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let step = self.wizard.step();
        let title = format!(
            " Onboard employee · Step {} of 2 · {} ",
            step.number(),
            self.wizard.role()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(self.suggestion_height()),
                Constraint::Length(2),
                Constraint::Length(1),
            ])
            .split(inner);

        self.render_fields(frame, chunks[0]);
        self.render_suggestions(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
        frame.render_widget(Paragraph::new(self.key_hints()), chunks[3]);

        self.confirm.render(frame);
    }

    fn render_fields(&mut self, frame: &mut Frame, area: Rect) {
        let slots = self.slots();
        let step = self.wizard.step();
        let visible_errors = match step {
            WizardStep::StepOne => self.wizard.step_one().visible_errors(),
            WizardStep::StepTwo => self.wizard.step_two().visible_errors(),
        };

        let mut constraints = Vec::new();
        for slot in slots {
            let height = self
                .widgets
                .iter()
                .find(|(s, _)| s == slot)
                .map_or(1, |(_, w)| w.render_height());
            constraints.extend([
                Constraint::Length(1),
                Constraint::Length(height),
                Constraint::Length(1),
            ]);
        }
        constraints.push(Constraint::Length(2));
        constraints.push(Constraint::Min(0));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (i, slot) in slots.iter().enumerate() {
            let focused = i == self.focus;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            frame.render_widget(
                Paragraph::new(Span::styled(slot.label(), label_style)),
                rows[i * 3],
            );
            if let Some(widget) = self.widget_mut(*slot) {
                widget.render(frame, rows[i * 3 + 1], focused);
            }

            let message = if *slot == Slot::Photo {
                self.wizard.step_two().photo_error().map(str::to_string)
            } else {
                visible_errors.get(slot.field_key()).map(str::to_string)
            };
            frame.render_widget(Paragraph::new(error_line(message.as_deref())), rows[i * 3 + 2]);
        }

        let extra = match step {
            WizardStep::StepOne => {
                let id = self.wizard.step_one().employee_id();
                let value = if !self.wizard.step_one().existing_loaded() {
                    "loading existing employees...".to_string()
                } else if id.is_empty() {
                    "assigned once a department is entered".to_string()
                } else {
                    id.to_string()
                };
                Line::from(vec![
                    Span::styled("Employee ID: ", Style::default().fg(Color::White)),
                    Span::styled(value, Style::default().fg(Color::Yellow)),
                ])
            }
            WizardStep::StepTwo => match self.wizard.step_two().photo_preview() {
                Some(preview) => Line::from(vec![
                    Span::styled("Photo: ", Style::default().fg(Color::White)),
                    Span::styled(preview.summary(), Style::default().fg(Color::Green)),
                ]),
                None => Line::from(Span::styled(
                    "No photo attached",
                    Style::default().fg(Color::DarkGray),
                )),
            },
        };
        frame.render_widget(Paragraph::new(extra), rows[slots.len() * 3]);
    }

    fn suggestion_height(&self) -> u16 {
        if self.suggestions.is_empty() {
            0
        } else {
            (self.suggestions.len() as u16).min(6) + 2
        }
    }

    fn render_suggestions(&self, frame: &mut Frame, area: Rect) {
        if self.suggestions.is_empty() {
            return;
        }
        let items: Vec<ListItem> = self
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let style = if Some(i) == self.highlighted {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(Span::styled(option.label.clone(), style))
            })
            .collect();
        let list = List::new(items).block(
            Block::default()
                .title(" Suggestions (↑/↓, Enter) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(list, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let submission = self.wizard.submission();
        let mut lines = Vec::new();
        match submission.phase {
            SubmissionPhase::Idle => {}
            SubmissionPhase::SubmittingStepOne | SubmissionPhase::SubmittingStepTwo => {
                lines.push(Line::from(Span::styled(
                    submission.phase.label(),
                    Style::default().fg(Color::Yellow),
                )));
            }
            SubmissionPhase::Success => lines.push(Line::from(Span::styled(
                "Employee created. Enter: view employee list, Esc: leave",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))),
            SubmissionPhase::Error => lines.push(Line::from(Span::styled(
                format!(
                    "{}: {}",
                    submission.phase.label(),
                    submission.error.as_deref().unwrap_or("unknown error")
                ),
                Style::default().fg(Color::Red),
            ))),
        }
        if let Some(notice) = self.wizard.notice() {
            lines.push(Line::from(Span::styled(
                notice.to_string(),
                Style::default().fg(Color::Yellow),
            )));
        } else if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn key_hints(&self) -> Line<'static> {
        let busy = self.wizard.is_busy();
        let (action, enabled) = match self.wizard.step() {
            WizardStep::StepOne => ("Next", self.wizard.step_one().can_advance(busy)),
            WizardStep::StepTwo => ("Submit", self.wizard.step_two().can_submit(busy)),
        };
        let action_style = if enabled {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let hint = Style::default().fg(Color::DarkGray);
        let key = Style::default().fg(Color::Yellow);

        let mut spans = vec![
            Span::styled("[Ctrl+S]", key),
            Span::styled(format!(" {}  ", action), action_style),
            Span::styled("[Tab]", key),
            Span::styled(" field  ", hint),
        ];
        if self.wizard.can_go_back() {
            spans.push(Span::styled("[Esc]", key));
            spans.push(Span::styled(" back  ", hint));
        } else {
            spans.push(Span::styled("[Esc]", key));
            spans.push(Span::styled(" leave  ", hint));
        }
        spans.push(Span::styled("[Ctrl+D]", key));
        spans.push(Span::styled(" clear draft  ", hint));
        spans.push(Span::styled("[Ctrl+C]", key));
        spans.push(Span::styled(" quit", hint));
        Line::from(spans)
    }
}
