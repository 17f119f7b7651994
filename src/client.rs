//! The authenticated client and its per-resource sub-clients.

use reqwest::header::HeaderValue;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, Environment};
use crate::error::{PingupError, Result};
use crate::models::{AppointmentFilters, NewUser, PlaceFilters, UserUpdate};
use crate::query::{encode_segment, Query};
use crate::request::{ApiRequest, Executor};

// ---------------------------------------------------------------------------
// Internal request plumbing
// ---------------------------------------------------------------------------

/// Token, endpoint and executor shared by every sub-client.
struct BaseClient {
    token: String,
    endpoint: String,
    executor: Executor,
}

impl BaseClient {
    fn new(config: ClientConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(PingupError::Config("No access token provided".into()));
        }
        // Reject tokens that could never be sent as a header value.
        HeaderValue::from_str(&config.token)
            .map_err(|e| PingupError::Config(format!("Invalid token header value: {e}")))?;

        let endpoint = config.base_url();
        let executor = Executor::new(config.timeout)?;
        debug!(endpoint = %endpoint, "created Pingup client");

        Ok(Self {
            token: config.token,
            endpoint,
            executor,
        })
    }

    fn build(&self, method: Method, path: &str, query: &Query) -> ApiRequest {
        ApiRequest::authenticated(method, &self.endpoint, &self.token, path, query)
    }

    fn send(&self, method: Method, path: &str, query: &Query) -> Result<Value> {
        self.executor.execute(&self.build(method, path, query))
    }

    // ---- convenience wrappers for common HTTP verbs -----------------------

    fn get(&self, path: &str, query: &Query) -> Result<Value> {
        self.send(Method::GET, path, query)
    }

    fn post(&self, path: &str, query: &Query) -> Result<Value> {
        self.send(Method::POST, path, query)
    }

    fn put(&self, path: &str, query: &Query) -> Result<Value> {
        self.send(Method::PUT, path, query)
    }

    fn delete(&self, path: &str, query: &Query) -> Result<Value> {
        self.send(Method::DELETE, path, query)
    }
}

/// Join path segments, percent-encoding the caller-supplied identifiers.
///
/// `.` and `..` are rejected: URL parsing treats them as dot segments even
/// when escaped, so they would address a different resource.
fn resource_path(collection: &str, ids_and_names: &[&str]) -> Result<String> {
    let mut path = collection.to_string();
    for (i, part) in ids_and_names.iter().enumerate() {
        path.push('/');
        // Even positions are identifiers, odd positions are fixed sub-collections.
        if i % 2 == 0 {
            if matches!(*part, "." | "..") {
                return Err(PingupError::Config(format!(
                    "Invalid resource identifier {part:?} in {collection}"
                )));
            }
            path.push_str(&encode_segment(part));
        } else {
            path.push_str(part);
        }
    }
    Ok(path)
}

// ---------------------------------------------------------------------------
// Public client
// ---------------------------------------------------------------------------

/// Main entry point for the Pingup booking API.
///
/// ```no_run
/// use pingup_client::{auth, PingupClient, PlaceFilters};
///
/// let tokens = auth::generate_tokens("key", "secret", true).unwrap();
/// let client = PingupClient::new(&tokens.access_token, true).unwrap();
/// let places = client
///     .places()
///     .list(&PlaceFilters {
///         locality: Some("London".into()),
///         ..Default::default()
///     })
///     .unwrap();
/// println!("{places}");
/// ```
pub struct PingupClient {
    base: BaseClient,
}

impl PingupClient {
    /// Create a new client.
    ///
    /// * `auth_token` – access token from [`auth::generate_tokens`](crate::auth::generate_tokens)
    /// * `sandbox`    – use the sandbox deployment instead of the live one
    pub fn new(auth_token: &str, sandbox: bool) -> Result<Self> {
        Self::from_config(ClientConfig::new(
            auth_token,
            Environment::from_sandbox(sandbox),
        ))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            base: BaseClient::new(config)?,
        })
    }

    /// Base URL every request is sent to, ending in `/`.
    pub fn endpoint(&self) -> &str {
        &self.base.endpoint
    }

    // -- sub-client accessors ------------------------------------------------

    pub fn places(&self) -> PlacesClient<'_> {
        PlacesClient { base: &self.base }
    }

    pub fn users(&self) -> UsersClient<'_> {
        UsersClient { base: &self.base }
    }

    pub fn appointments(&self) -> AppointmentsClient<'_> {
        AppointmentsClient { base: &self.base }
    }
}

// ===========================================================================
// Sub-clients
// ===========================================================================

// ---- Places ---------------------------------------------------------------

pub struct PlacesClient<'a> {
    base: &'a BaseClient,
}

impl PlacesClient<'_> {
    /// Search places.
    pub fn list(&self, filters: &PlaceFilters) -> Result<Value> {
        self.base.get("places", &filters.to_query())
    }

    /// Get a single place by id.
    pub fn get(&self, place_id: &str) -> Result<Value> {
        self.base
            .get(&resource_path("places", &[place_id])?, &Query::new())
    }

    /// List the services offered at a place.
    pub fn services(&self, place_id: &str) -> Result<Value> {
        self.base.get(
            &resource_path("places", &[place_id, "services"])?,
            &Query::new(),
        )
    }

    /// List the personnel performing a service.
    pub fn personnel(&self, place_id: &str, service_id: &str) -> Result<Value> {
        self.base.get(
            &resource_path("places", &[place_id, "services", service_id, "personnel"])?,
            &Query::new(),
        )
    }

    /// Available time slots for a service between two `yyyy-mm-dd` dates, inclusive.
    ///
    /// The API rejects spans longer than seven days. `personnel_id: None` means
    /// no preference and is sent as an empty value.
    pub fn time_slots(
        &self,
        place_id: &str,
        service_id: &str,
        start_time: &str,
        end_time: &str,
        personnel_id: Option<&str>,
    ) -> Result<Value> {
        let mut query = Query::new();
        query
            .push("startTime", start_time)
            .push("endTime", end_time)
            .push("personnelId", personnel_id.unwrap_or_default());

        self.base.get(
            &resource_path("places", &[place_id, "services", service_id, "timeSlots"])?,
            &query,
        )
    }
}

// ---- Users ----------------------------------------------------------------

pub struct UsersClient<'a> {
    base: &'a BaseClient,
}

impl UsersClient<'_> {
    /// Create a new user.
    pub fn create(&self, user: &NewUser) -> Result<Value> {
        self.base.post("users", &user.to_query())
    }

    /// Get a user by id.
    pub fn get(&self, user_id: &str) -> Result<Value> {
        self.base.get(&resource_path("users", &[user_id])?, &Query::new())
    }

    /// Change some of a user's fields.
    pub fn edit(&self, user_id: &str, update: &UserUpdate) -> Result<Value> {
        self.base
            .put(&resource_path("users", &[user_id])?, &update.to_query())
    }

    /// Delete a user.
    pub fn delete(&self, user_id: &str) -> Result<Value> {
        self.base
            .delete(&resource_path("users", &[user_id])?, &Query::new())
    }
}

// ---- Appointments ---------------------------------------------------------

pub struct AppointmentsClient<'a> {
    base: &'a BaseClient,
}

impl AppointmentsClient<'_> {
    /// Book an appointment.
    ///
    /// `time_slot` is one of the slot objects returned by
    /// [`PlacesClient::time_slots`]; it is flattened into `timeSlot[...]` parameters.
    pub fn create(
        &self,
        place_id: &str,
        service_id: &str,
        user_id: &str,
        time_slot: &Value,
    ) -> Result<Value> {
        let mut query = Query::new();
        query
            .push("placeId", place_id)
            .push("serviceId", service_id)
            .push("userId", user_id)
            .push_value("timeSlot", time_slot);

        self.base.post("appointments", &query)
    }

    /// List a user's appointments.
    pub fn list(&self, user_id: &str, filters: &AppointmentFilters) -> Result<Value> {
        self.base.get("appointments", &filters.to_query(user_id))
    }

    /// Get the status of an appointment booked by `user_id`.
    pub fn status(&self, appointment_id: &str, user_id: &str) -> Result<Value> {
        self.base.get(
            &resource_path("appointments", &[appointment_id])?,
            &user_query(user_id),
        )
    }

    /// Cancel an appointment booked by `user_id`.
    pub fn delete(&self, appointment_id: &str, user_id: &str) -> Result<Value> {
        self.base.delete(
            &resource_path("appointments", &[appointment_id])?,
            &user_query(user_id),
        )
    }
}

fn user_query(user_id: &str) -> Query {
    let mut query = Query::new();
    query.push("userId", user_id);
    query
}
