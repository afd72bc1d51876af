//! HTTP API handlers for songbook-web

pub mod auth;
pub mod health;
pub mod songs;
pub mod ui;
pub mod upload;
