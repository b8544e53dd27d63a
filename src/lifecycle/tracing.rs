//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered by
//! `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Requests**: one `http.request` span per request with method and path, closed
//!   by a `Handled` event carrying status and latency
//! - **API operations**: a span per handler with the resource name
//! - **Store**: inserts, replacements and removals with collection, id and size
//! - **Client**: outgoing calls, redirects and view load failures
//!
//! ## Usage Examples
//!
//! ```bash
//! # Request summaries and store mutations
//! RUST_LOG=info cargo run
//!
//! # Also show store reads and route decisions
//! RUST_LOG=debug cargo run
//!
//! # Only the store
//! RUST_LOG=contacts_router::store=debug cargo run
//! ```
//!
//! With `RUST_LOG=info`, creating a contact looks like:
//!
//! ```text
//! INFO Inserted collection="contacts" id="6530f1a2c4d1e9b07a11f3de" size=1
//! INFO http.request:create: Created id="6530f1a2c4d1e9b07a11f3de"
//! INFO http.request: Handled status=201 elapsed_ms=0
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
