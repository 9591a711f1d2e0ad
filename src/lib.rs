pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod menu;
pub mod middleware;
pub mod permissions;
pub mod services;
pub mod types;
