//! API E2E test suite.
//!
//! Drives the `/api/v1` routes against the in-memory credential store, with
//! GitHub replaced by a mock provider on an ephemeral port. No database needed.
//!
//! Run with: cargo test --test api_e2e

mod mock_github_provider;
mod test_helpers;

mod test_github_client;
mod test_password_auth;
mod test_refresh_logout;
