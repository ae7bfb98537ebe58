//! Onboard - employee onboarding wizard for the terminal
//!
//! The library holds every component; the `onboard` binary wires them to the
//! CLI and the TUI event loop.

pub mod api;
pub mod app;
pub mod config;
pub mod debounce;
pub mod draft;
pub mod employee_id;
pub mod employees;
pub mod logging;
pub mod lookup;
pub mod nav;
pub mod pagination;
pub mod photo;
pub mod storage;
pub mod types;
pub mod ui;
pub mod wizard;
