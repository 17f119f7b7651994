//! Token responses and the parameter structs for list and write calls.

use serde::Deserialize;

use crate::query::Query;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Tokens issued by `auth/generateTokens` and `auth/refreshToken`.
///
/// Fields other than the two tokens are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Places
// ---------------------------------------------------------------------------

/// Search filters for listing places. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct PlaceFilters {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub post_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub category: Option<String>,
    pub modified_since: Option<String>,
    pub factual_id: Option<String>,
    pub user_id: Option<String>,
}

impl PlaceFilters {
    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push_opt("offset", self.offset)
            .push_opt("limit", self.limit)
            .push_opt("name", self.name.as_deref())
            .push_opt("street", self.street.as_deref())
            .push_opt("locality", self.locality.as_deref())
            .push_opt("region", self.region.as_deref())
            .push_opt("postCode", self.post_code.as_deref())
            .push_opt("country", self.country.as_deref())
            .push_opt("latitude", self.latitude)
            .push_opt("longitude", self.longitude)
            .push_opt("radius", self.radius)
            .push_opt("category", self.category.as_deref())
            .push_opt("modifiedSince", self.modified_since.as_deref())
            .push_opt("factualId", self.factual_id.as_deref())
            .push_opt("userId", self.user_id.as_deref());
        query
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Parameters for creating a user. All four are required by the API.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
}

impl NewUser {
    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push("firstName", self.first_name.as_str())
            .push("lastName", self.last_name.as_str())
            .push("phoneNumber", self.phone_number.as_str())
            .push("email", self.email.as_str());
        query
    }
}

/// Fields to change on an existing user. Unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push_opt("firstName", self.first_name.as_deref())
            .push_opt("lastName", self.last_name.as_deref())
            .push_opt("phoneNumber", self.phone_number.as_deref())
            .push_opt("email", self.email.as_deref());
        query
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

/// Filters for listing a user's appointments.
///
/// `date_from` and `date_to` use the `yyyy-mm-dd` format.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilters {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl AppointmentFilters {
    pub(crate) fn to_query(&self, user_id: &str) -> Query {
        let mut query = Query::new();
        query
            .push("userId", user_id)
            .push_opt("offset", self.offset)
            .push_opt("limit", self.limit)
            .push_opt("status", self.status.as_deref())
            .push_opt("dateFrom", self.date_from.as_deref())
            .push_opt("dateTo", self.date_to.as_deref());
        query
    }
}
