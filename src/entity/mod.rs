//! SeaORM entity definitions for PostgreSQL database.

pub mod refresh_token;
pub mod user;
