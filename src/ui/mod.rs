pub mod dialogs;
pub mod employee_table;
pub mod form_field;
pub mod home;
pub mod terminal_guard;
pub mod wizard_view;

pub use dialogs::{ConfirmDialog, ConfirmSelection};
pub use employee_table::EmployeeTable;
pub use home::Home;
pub use terminal_guard::{install_panic_hook, TerminalGuard, Tui};
pub use wizard_view::WizardView;

use crate::nav::Route;

/// What a view asks the app loop to do after handling input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    None,
    Push(Route),
    /// Correct the current route without adding a history entry
    Replace(Route),
    Back,
    /// Rebuild the current view from scratch
    Reload,
    Quit,
}
