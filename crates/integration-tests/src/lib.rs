//! Integration tests for Saltbox.
//!
//! The tests in `tests/` drive a running API server over HTTP and are
//! `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and the server
//! docker compose up -d db
//! cargo run -p saltbox-api
//!
//! # Run the suite against it
//! cargo test -p saltbox-integration-tests -- --ignored
//! ```
//!
//! The target server is configurable via `SALTBOX_BASE_URL`
//! (default: `http://localhost:5000`).
