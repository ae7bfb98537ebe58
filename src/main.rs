use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use onboard::api::HttpEmployeeApi;
use onboard::app::{App, AppContext};
use onboard::config::Config;
use onboard::draft;
use onboard::employees::load_employees;
use onboard::logging;
use onboard::nav::Route;
use onboard::pagination::{page_items, resolve_page};
use onboard::storage::{FileStore, KeyValueStore};
use onboard::types::UserRole;
use onboard::ui::employee_table::{row_cells, showing_line, COLUMNS};
use onboard::ui::install_panic_hook;

#[derive(Parser)]
#[command(name = "onboard")]
#[command(about = "Employee onboarding wizard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the onboarding wizard
    Wizard {
        /// Who is filling the form; anything but `admin` starts as ops
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Print the employee list
    Employees {
        /// Page to print (1-indexed)
        #[arg(short, long)]
        page: Option<String>,
    },

    /// Inspect or discard a saved draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Print the stored draft as JSON
    Show {
        #[arg(short, long, value_enum)]
        role: RoleArg,
    },
    /// Remove the stored draft
    Clear {
        #[arg(short, long, value_enum)]
        role: RoleArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    Ops,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Ops => UserRole::Ops,
        }
    }
}

fn build_context(config: &Config) -> Result<AppContext> {
    let api = HttpEmployeeApi::from_config(&config.api).context("Failed to build HTTP client")?;
    Ok(AppContext {
        config: config.clone(),
        api: Arc::new(api),
        store: Arc::new(FileStore::new(config.drafts_path())),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = matches!(cli.command, None | Some(Commands::Wizard { .. }));
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Wizard { role }) => {
            let start = Route::Wizard {
                role: UserRole::from_query(role.as_deref()),
            };
            run_tui(&config, start, logging_handle.log_file_path).await?;
        }
        Some(Commands::Employees { page }) => {
            cmd_employees(&config, page).await?;
        }
        Some(Commands::Draft { action }) => {
            cmd_draft(&config, action)?;
        }
        None => {
            run_tui(&config, Route::Home, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn run_tui(config: &Config, start: Route, log_file_path: Option<PathBuf>) -> Result<()> {
    install_panic_hook();
    let ctx = build_context(config)?;
    let mut app = App::new(ctx, start);
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

async fn cmd_employees(config: &Config, page: Option<String>) -> Result<()> {
    let ctx = build_context(config)?;
    let employees = load_employees(ctx.api.as_ref()).await?;

    if employees.is_empty() {
        println!("No employees found.");
        return Ok(());
    }

    let per_page = config.ui.page_size.max(1);
    let info = resolve_page(page.as_deref(), employees.len(), per_page);
    if info.corrected && page.is_some() {
        eprintln!(
            "Page {} is not available, showing page {} of {}",
            page.as_deref().unwrap_or_default(),
            info.page,
            info.total_pages
        );
    }

    let rows: Vec<[String; 8]> = page_items(&employees, &info, per_page)
        .iter()
        .map(row_cells)
        .collect();
    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
    };
    let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    println!("{}", format_row(header.as_slice()));
    println!("{}", "─".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    for row in &rows {
        println!("{}", format_row(row.as_slice()));
    }
    println!();
    println!("{}", showing_line(&info, employees.len(), per_page));
    if info.total_pages > 1 {
        println!("Page {}/{}", info.page, info.total_pages);
    }

    Ok(())
}

fn cmd_draft(config: &Config, action: DraftAction) -> Result<()> {
    let store = FileStore::new(config.drafts_path());
    match action {
        DraftAction::Show { role } => {
            let role = UserRole::from(role);
            match store.get(&draft::draft_key(role))? {
                Some(raw) => println!("{}", raw),
                None => println!("No draft saved for {}", role),
            }
        }
        DraftAction::Clear { role } => {
            let role = UserRole::from(role);
            draft::clear_draft(&store, role)?;
            println!("Draft cleared for {}", role);
        }
    }
    Ok(())
}
