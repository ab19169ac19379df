//! Personal blog server library.
//!
//! Accounts and sessions: password signup and login, GitHub sign-in,
//! access tokens with rotating refresh tokens, and the HTTP API on top.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
