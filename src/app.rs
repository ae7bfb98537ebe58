use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::EmployeeApi;
use crate::config::Config;
use crate::nav::{History, Route};
use crate::storage::KeyValueStore;
use crate::ui::{EmployeeTable, Home, TerminalGuard, ViewAction, WizardView};

/// Shared services every view is mounted with
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub api: Arc<dyn EmployeeApi>,
    pub store: Arc<dyn KeyValueStore>,
}

enum View {
    Home(Home),
    Wizard(Box<WizardView>),
    Employees(EmployeeTable),
}

impl View {
    fn mount(route: &Route, ctx: &AppContext) -> Self {
        match route {
            Route::Home => View::Home(Home::new()),
            Route::Wizard { role } => View::Wizard(Box::new(WizardView::mount(*role, ctx))),
            Route::Employees { page } => View::Employees(EmployeeTable::mount(page.clone(), ctx)),
        }
    }
}

pub struct App {
    ctx: AppContext,
    history: History,
    view: View,
    should_quit: bool,
}

impl App {
    pub fn new(ctx: AppContext, start: Route) -> Self {
        let view = View::mount(&start, &ctx);
        Self {
            ctx,
            history: History::new(start),
            view,
            should_quit: false,
        }
    }

    pub fn current_route(&self) -> &Route {
        self.history.current()
    }

    pub async fn run(&mut self) -> Result<()> {
        let (_guard, mut terminal) = TerminalGuard::enter()?;
        let tick_rate = Duration::from_millis(self.ctx.config.ui.refresh_rate_ms);
        info!(route = %self.history.current(), "TUI started");

        while !self.should_quit {
            terminal.draw(|f| match &mut self.view {
                View::Home(home) => home.render(f),
                View::Wizard(wizard) => wizard.render(f),
                View::Employees(table) => table.render(f),
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let action = match &mut self.view {
                            View::Home(home) => home.handle_key(key),
                            View::Wizard(wizard) => wizard.handle_key(key),
                            View::Employees(table) => table.handle_key(key),
                        };
                        self.apply(action);
                    }
                }
            }

            self.poll_background();
        }

        terminal.show_cursor()?;
        Ok(())
    }

    fn poll_background(&mut self) {
        let action = match &mut self.view {
            View::Home(_) => ViewAction::None,
            View::Wizard(wizard) => wizard.poll_background(),
            View::Employees(table) => table.poll_background(),
        };
        self.apply(action);
    }

    fn apply(&mut self, action: ViewAction) {
        match action {
            ViewAction::None => {}
            ViewAction::Quit => self.should_quit = true,
            ViewAction::Push(route) => {
                self.history.push(route);
                self.show_current();
            }
            ViewAction::Replace(route) => {
                self.history.replace(route);
                self.show_current();
            }
            ViewAction::Back => {
                if self.history.back() {
                    self.show_current();
                } else {
                    self.should_quit = true;
                }
            }
            ViewAction::Reload => self.view = View::mount(self.history.current(), &self.ctx),
        }
    }

    /// Page changes within the listing keep the loaded data; anything else remounts
    fn show_current(&mut self) {
        let route = self.history.current().clone();
        if let (View::Employees(table), Route::Employees { page }) = (&mut self.view, &route) {
            let follow_up = table.set_page(page.clone());
            self.apply(follow_up);
            return;
        }
        self.view = View::mount(&route, &self.ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::storage::MemoryStore;
    use crate::types::{BasicInfo, UserRole};

    fn app(api: FakeApi, start: Route) -> App {
        let ctx = AppContext {
            config: Config::default(),
            api: Arc::new(api),
            store: Arc::new(MemoryStore::new()),
        };
        App::new(ctx, start)
    }

    async fn settle(app: &mut App) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
            app.poll_background();
        }
    }

    fn records(count: usize) -> Vec<BasicInfo> {
        (1..=count)
            .map(|n| BasicInfo {
                id: Some(n as u64),
                full_name: format!("Employee {}", n),
                email: format!("e{}@example.com", n),
                department: "Finance".to_string(),
                role: "Finance".to_string(),
                employee_id: format!("FIN-{:03}", n),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_out_of_range_page_replaces_history_entry() {
        let mut app = app(FakeApi::new().with_basic_info(records(25)), Route::Home);
        app.apply(ViewAction::Push(Route::parse("/employees?page=99")));
        settle(&mut app).await;

        assert_eq!(app.current_route(), &Route::employees_page(3));
        assert_eq!(app.history.len(), 2);

        app.apply(ViewAction::Back);
        assert_eq!(app.current_route(), &Route::Home);
    }

    #[tokio::test]
    async fn test_paging_keeps_loaded_data() {
        let api = Arc::new(FakeApi::new().with_basic_info(records(25)));
        let ctx = AppContext {
            config: Config::default(),
            api: api.clone(),
            store: Arc::new(MemoryStore::new()),
        };
        let mut app = App::new(ctx, Route::employees_page(1));
        settle(&mut app).await;

        app.apply(ViewAction::Push(Route::employees_page(2)));
        settle(&mut app).await;
        assert_eq!(app.history.len(), 2);
        assert_eq!(api.count("GET /basicInfo"), 1);
        assert!(matches!(&app.view, View::Employees(table) if table.page().map(|p| p.page) == Some(2)));
    }

    #[tokio::test]
    async fn test_back_from_first_entry_quits() {
        let mut app = app(FakeApi::new(), Route::Wizard { role: UserRole::Ops });
        app.apply(ViewAction::Back);
        assert!(app.should_quit);
    }
}
