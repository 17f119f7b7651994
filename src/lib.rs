//! Pingup booking API client library for Rust.
//!
//! A blocking client for the Pingup booking API: places, services,
//! personnel, time slots, users and appointments. Responses are returned as
//! [`serde_json::Value`]; a body carrying `httpStatus` becomes
//! [`PingupError::Api`].
//!
//! # Quick Start
//!
//! ```no_run
//! use pingup_client::{auth, PingupClient};
//!
//! let tokens = auth::generate_tokens("my-key", "my-secret", true).unwrap();
//! let client = PingupClient::new(&tokens.access_token, true).unwrap();
//!
//! let services = client.places().services("place-id").unwrap();
//! println!("{services:#}");
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod request;

// Re-export the main public types at the crate root for convenience.
pub use client::{AppointmentsClient, PingupClient, PlacesClient, UsersClient};
pub use config::{ClientConfig, Environment, API_VERSION, LIVE_ENDPOINT, SANDBOX_ENDPOINT};
pub use error::{PingupError, Result};
pub use models::{AppointmentFilters, NewUser, PlaceFilters, TokenPair, UserUpdate};
pub use query::Query;
pub use request::{parse_response, ApiRequest};
