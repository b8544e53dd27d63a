#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Contacts Router
//!
//! > **REST resource routing with a single-page shell, in Rust.**
//!
//! This crate serves a JSON API for one resource (contacts), the template fragments
//! a client-side router needs, and a catch-all application shell. It also ships the
//! client half: a resource binding that turns a small action table into HTTP calls,
//! and a client route table that turns navigations into views.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Route order is a contract
//! Both the server and the client dispatch through an ordered list of
//! `(pattern, target)` pairs where the **first match wins**. The server tries API
//! routes, then `/partials/:name`, then the shell catch-all. Registering the
//! catch-all earlier swallows the partials; the tests demonstrate exactly that.
//!
//! ### Identity aliasing
//! Records carry their store identity in `_id`; URLs use `:id`. The
//! [`ResourceDescriptor`](client::ResourceDescriptor) reads `_id` from a record and
//! writes it into the `id` slot, so store vocabulary never leaks into URLs.
//!
//! ### Explicit store lifecycle
//! There is no global connection. [`ContactsSystem`](lifecycle::ContactsSystem)
//! opens the store at startup, hands it to the server, and closes it at shutdown.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. Matching ([`routing`])
//! - **Role**: path patterns (`/contacts/:id`, `*`) and the ordered [`RouteTable`](routing::RouteTable).
//!
//! ### 2. Data ([`model`], [`store`])
//! - **Role**: [`Document`](model::Document) records, the [`Resource`](model::Resource)
//!   mapper, and the [`DocumentStore`](store::DocumentStore) collaborator with its
//!   in-memory actor backend.
//!
//! ### 3. The Server ([`server`])
//! - **Role**: API, partial and shell routers behind one dispatcher with a request timeout.
//! - **Key items**: [`ServerRoutes`](server::ServerRoutes), [`build_router`](server::build_router),
//!   [`ApiError`](server::ApiError).
//!
//! ### 4. The Client ([`client`])
//! - **Role**: [`ResourceBinding`](client::ResourceBinding), [`ClientRouter`](client::ClientRouter)
//!   and the [`ContactsApp`](client::ContactsApp) controllers.
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`config`])
//! - **Role**: environment configuration, startup, graceful shutdown, tracing.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run with info logs
//! RUST_LOG=info cargo run
//!
//! # Then
//! curl -X POST localhost:3000/api/contacts \
//!   -H 'content-type: application/json' \
//!   -d '{"firstname":"Ada","lastname":"Lovelace","age":28}'
//! ```

pub mod client;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod routing;
pub mod server;
pub mod store;
