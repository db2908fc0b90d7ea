pub mod admins;
pub mod app;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod state;
pub mod users;
