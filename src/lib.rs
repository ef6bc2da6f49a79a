pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod helpers;
pub mod logging;
pub mod optimistic;
pub mod project;
pub mod router;
pub mod session;
pub mod task;
pub mod ui;
pub mod user;
pub mod views;
