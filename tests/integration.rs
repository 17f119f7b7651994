//! Integration tests for the Pingup API Rust client.
//!
//! Every operation runs against a local mockito server standing in for the
//! Pingup API, checking the method, path, query string and headers that
//! reach the wire, and what the caller gets back.
//!
//! Run with:
//!
//! ```bash
//! cargo test -- --nocapture
//! ```

use assert_json_diff::assert_json_eq;
use mockito::{Matcher, Mock, Server, ServerGuard};
use pingup_client::{
    auth, AppointmentFilters, ClientConfig, Environment, NewUser, PingupClient, PingupError,
    PlaceFilters, UserUpdate,
};
use serde_json::json;

const TOKEN: &str = "access-123";

fn client_for(server: &ServerGuard) -> PingupClient {
    let config = ClientConfig::new(TOKEN, Environment::Sandbox).with_endpoint(server.url());
    PingupClient::from_config(config).unwrap()
}

/// Expect one authenticated call with an exact raw query string.
fn expect(server: &mut ServerGuard, method: &str, path: &str, query: &str) -> Mock {
    server
        .mock(method, path)
        .match_query(Matcher::Exact(query.to_string()))
        .match_header("token", TOKEN)
        .match_header("content-type", "application/json")
}

// ---------------------------------------------------------------------------
// 1. Authentication
// ---------------------------------------------------------------------------

#[test]
fn test_generate_tokens() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/auth/generateTokens")
        .match_query(Matcher::Exact("key=key1&secret=secret1".into()))
        .match_header("content-type", "application/json")
        .match_header("token", Matcher::Missing)
        .with_body(r#"{"accessToken":"a","refreshToken":"b"}"#)
        .create();

    let tokens = auth::generate_tokens_at(&format!("{}/", server.url()), "key1", "secret1").unwrap();
    assert_eq!(tokens.access_token, "a");
    assert_eq!(tokens.refresh_token, "b");
    assert!(tokens.extra.is_empty());
    mock.assert();
}

#[test]
fn test_generate_tokens_api_error() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/auth/generateTokens")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(
            r#"{"httpStatus":401,"responseReference":"r1","message":"Unauthorized","description":"bad key"}"#,
        )
        .create();

    let err = auth::generate_tokens_at(&format!("{}/", server.url()), "key1", "wrong").unwrap_err();
    match err {
        PingupError::Api {
            http_status,
            response_reference,
            message,
            description,
        } => {
            assert_eq!(http_status, Some(401));
            assert_eq!(response_reference, "r1");
            assert_eq!(message, "Unauthorized");
            assert_eq!(description, "bad key");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    mock.assert();
}

#[test]
fn test_refresh_token() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/auth/refreshToken")
        .match_query(Matcher::Exact("token=b&secret=secret1".into()))
        .match_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"c","refreshToken":"d","expiresIn":3600}"#)
        .create();

    let tokens = auth::refresh_token_at(&format!("{}/", server.url()), "b", "secret1").unwrap();
    assert_eq!(tokens.access_token, "c");
    assert_eq!(tokens.refresh_token, "d");
    assert_eq!(tokens.extra["expiresIn"], 3600);
    mock.assert();
}

#[test]
fn test_token_response_missing_fields_is_decode_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/auth/generateTokens")
        .match_query(Matcher::Any)
        .with_body(r#"{"accessToken":"a"}"#)
        .create();

    let err = auth::generate_tokens_at(&format!("{}/", server.url()), "k", "s").unwrap_err();
    assert!(matches!(err, PingupError::Decode(_)));
}

// ---------------------------------------------------------------------------
// 2. Client construction
// ---------------------------------------------------------------------------

#[test]
fn test_client_requires_token() {
    assert!(matches!(
        PingupClient::new("", true),
        Err(PingupError::Config(_))
    ));
}

#[test]
fn test_client_endpoints() {
    assert_eq!(
        PingupClient::new(TOKEN, false).unwrap().endpoint(),
        "https://api.pingup.com/"
    );
    assert_eq!(
        PingupClient::new(TOKEN, true).unwrap().endpoint(),
        "http://api.sandbox.pingup.com/"
    );
}

// ---------------------------------------------------------------------------
// 3. Places
// ---------------------------------------------------------------------------

#[test]
fn test_list_places_without_filters() {
    let mut server = Server::new();
    let body = json!({"places": [{"id": "p1", "name": "Salon"}], "total": 1});
    let mock = expect(&mut server, "GET", "/v1/places", "")
        .with_body(body.to_string())
        .create();

    let places = client_for(&server).places().list(&PlaceFilters::default()).unwrap();
    assert_json_eq!(places, body);
    mock.assert();
}

#[test]
fn test_list_places_with_filters() {
    let mut server = Server::new();
    let mock = expect(
        &mut server,
        "GET",
        "/v1/places",
        "offset=20&limit=10&locality=London&radius=2.5&category=hair",
    )
    .with_body("[]")
    .create();

    let filters = PlaceFilters {
        offset: Some(20),
        limit: Some(10),
        locality: Some("London".into()),
        radius: Some(2.5),
        category: Some("hair".into()),
        ..Default::default()
    };
    let places = client_for(&server).places().list(&filters).unwrap();
    assert_json_eq!(places, json!([]));
    mock.assert();
}

#[test]
fn test_get_place() {
    let mut server = Server::new();
    let body = json!({"id": "p1", "name": "Salon", "location": {"locality": "London"}});
    let mock = expect(&mut server, "GET", "/v1/places/p1", "")
        .with_body(body.to_string())
        .create();

    let place = client_for(&server).places().get("p1").unwrap();
    assert_json_eq!(place, body);
    mock.assert();
}

#[test]
fn test_get_place_not_found() {
    let mut server = Server::new();
    let mock = expect(&mut server, "GET", "/v1/places/missing", "")
        .with_status(404)
        .with_body(
            r#"{"httpStatus":404,"responseReference":"ref-9","message":"Not Found","description":"No place with that id"}"#,
        )
        .create();

    let err = client_for(&server).places().get("missing").unwrap_err();
    assert_eq!(err.http_status(), Some(404));
    assert_eq!(
        err.to_string(),
        "Pingup API error ref-9: Not Found No place with that id"
    );
    mock.assert();
}

#[test]
fn test_get_services_for_place() {
    let mut server = Server::new();
    let mock = expect(&mut server, "GET", "/v1/places/p1/services", "")
        .with_body(r#"[{"id":"s1","name":"Haircut"}]"#)
        .create();

    let services = client_for(&server).places().services("p1").unwrap();
    assert_eq!(services[0]["name"], "Haircut");
    mock.assert();
}

#[test]
fn test_get_personnel_for_service() {
    let mut server = Server::new();
    let mock = expect(&mut server, "GET", "/v1/places/p1/services/s1/personnel", "")
        .with_body(r#"[{"id":"e1","name":"Sam"}]"#)
        .create();

    let personnel = client_for(&server).places().personnel("p1", "s1").unwrap();
    assert_eq!(personnel[0]["id"], "e1");
    mock.assert();
}

#[test]
fn test_get_time_slots_with_personnel() {
    let mut server = Server::new();
    let mock = expect(
        &mut server,
        "GET",
        "/v1/places/p1/services/s1/timeSlots",
        "startTime=2014-06-01&endTime=2014-06-07&personnelId=e1",
    )
    .with_body(r#"[{"startTime":"2014-06-01T10:00:00"}]"#)
    .create();

    let slots = client_for(&server)
        .places()
        .time_slots("p1", "s1", "2014-06-01", "2014-06-07", Some("e1"))
        .unwrap();
    assert_eq!(slots[0]["startTime"], "2014-06-01T10:00:00");
    mock.assert();
}

#[test]
fn test_get_time_slots_without_personnel() {
    let mut server = Server::new();
    let mock = expect(
        &mut server,
        "GET",
        "/v1/places/p1/services/s1/timeSlots",
        "startTime=2014-06-01&endTime=2014-06-07&personnelId=",
    )
    .with_body("[]")
    .create();

    client_for(&server)
        .places()
        .time_slots("p1", "s1", "2014-06-01", "2014-06-07", None)
        .unwrap();
    mock.assert();
}

// ---------------------------------------------------------------------------
// 4. Users
// ---------------------------------------------------------------------------

#[test]
fn test_create_user() {
    let mut server = Server::new();
    let mock = expect(
        &mut server,
        "POST",
        "/v1/users",
        "firstName=Ada&lastName=Lovelace&phoneNumber=%2B441234567890&email=ada%40example.com",
    )
    .with_status(201)
    .with_body(r#"{"id":"u1"}"#)
    .create();

    let user = client_for(&server)
        .users()
        .create(&NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone_number: "+441234567890".into(),
            email: "ada@example.com".into(),
        })
        .unwrap();
    assert_eq!(user["id"], "u1");
    mock.assert();
}

#[test]
fn test_get_user() {
    let mut server = Server::new();
    let body = json!({"id": "u1", "firstName": "Ada"});
    let mock = expect(&mut server, "GET", "/v1/users/u1", "")
        .with_body(body.to_string())
        .create();

    assert_json_eq!(client_for(&server).users().get("u1").unwrap(), body);
    mock.assert();
}

#[test]
fn test_edit_user() {
    let mut server = Server::new();
    let mock = expect(&mut server, "PUT", "/v1/users/u1", "lastName=Byron")
        .with_body(r#"{"id":"u1","lastName":"Byron"}"#)
        .create();

    let update = UserUpdate {
        last_name: Some("Byron".into()),
        ..Default::default()
    };
    let user = client_for(&server).users().edit("u1", &update).unwrap();
    assert_eq!(user["lastName"], "Byron");
    mock.assert();
}

#[test]
fn test_delete_user() {
    let mut server = Server::new();
    let mock = expect(&mut server, "DELETE", "/v1/users/u1", "")
        .with_status(204)
        .create();

    let result = client_for(&server).users().delete("u1").unwrap();
    assert!(result.is_null());
    mock.assert();
}

// ---------------------------------------------------------------------------
// 5. Appointments
// ---------------------------------------------------------------------------

#[test]
fn test_create_appointment() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/appointments")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("placeId".into(), "p1".into()),
            Matcher::UrlEncoded("serviceId".into(), "s1".into()),
            Matcher::UrlEncoded("userId".into(), "u1".into()),
            Matcher::UrlEncoded("timeSlot[startTime]".into(), "2014-06-01T10:00:00".into()),
            Matcher::UrlEncoded("timeSlot[personnelId]".into(), "e1".into()),
        ]))
        .match_header("token", TOKEN)
        .with_status(201)
        .with_body(r#"{"id":"a1","status":"pending"}"#)
        .create();

    let slot = json!({"startTime": "2014-06-01T10:00:00", "personnelId": "e1"});
    let appointment = client_for(&server)
        .appointments()
        .create("p1", "s1", "u1", &slot)
        .unwrap();
    assert_eq!(appointment["status"], "pending");
    mock.assert();
}

#[test]
fn test_get_appointments() {
    let mut server = Server::new();
    let mock = expect(
        &mut server,
        "GET",
        "/v1/appointments",
        "userId=u1&limit=5&dateTo=2014-06-30",
    )
    .with_body(r#"[{"id":"a1"}]"#)
    .create();

    let filters = AppointmentFilters {
        limit: Some(5),
        date_to: Some("2014-06-30".into()),
        ..Default::default()
    };
    let appointments = client_for(&server)
        .appointments()
        .list("u1", &filters)
        .unwrap();
    assert_eq!(appointments[0]["id"], "a1");
    mock.assert();
}

#[test]
fn test_get_appointment_status() {
    let mut server = Server::new();
    let mock = expect(&mut server, "GET", "/v1/appointments/a1", "userId=u1")
        .with_body(r#"{"id":"a1","status":"confirmed"}"#)
        .create();

    let status = client_for(&server).appointments().status("a1", "u1").unwrap();
    assert_eq!(status["status"], "confirmed");
    mock.assert();
}

#[test]
fn test_delete_appointment() {
    let mut server = Server::new();
    let mock = expect(&mut server, "DELETE", "/v1/appointments/a1", "userId=u1")
        .with_body(r#"{"id":"a1","status":"cancelled"}"#)
        .create();

    let result = client_for(&server).appointments().delete("a1", "u1").unwrap();
    assert_eq!(result["status"], "cancelled");
    mock.assert();
}

// ---------------------------------------------------------------------------
// 6. Failure modes
// ---------------------------------------------------------------------------

#[test]
fn test_non_json_body_is_decode_error() {
    let mut server = Server::new();
    let _mock = expect(&mut server, "GET", "/v1/users/u1", "")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create();

    let err = client_for(&server).users().get("u1").unwrap_err();
    assert!(matches!(err, PingupError::Decode(_)));
}

#[test]
fn test_unreachable_server_is_transport_error() {
    let config =
        ClientConfig::new(TOKEN, Environment::Live).with_endpoint("http://127.0.0.1:1");
    let client = PingupClient::from_config(config).unwrap();
    let err = client.users().get("u1").unwrap_err();
    assert!(matches!(err, PingupError::Transport(_)));
}

#[test]
fn test_redirects_are_followed() {
    let mut server = Server::new();
    let target = format!("{}/v1/places/p2?", server.url());
    let redirect = expect(&mut server, "GET", "/v1/places/p1", "")
        .with_status(301)
        .with_header("location", &target)
        .create();
    let final_hop = server
        .mock("GET", "/v1/places/p2")
        .match_query(Matcher::Any)
        .with_body(r#"{"id":"p2"}"#)
        .create();

    let place = client_for(&server).places().get("p1").unwrap();
    assert_eq!(place["id"], "p2");
    redirect.assert();
    final_hop.assert();
}

#[test]
fn test_dot_segment_identifiers_never_reach_the_server() {
    let mut server = Server::new();
    let any_delete = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create();
    let any_get = server.mock("GET", Matcher::Any).expect(0).create();

    let client = client_for(&server);
    assert!(matches!(
        client.users().delete(".."),
        Err(PingupError::Config(_))
    ));
    assert!(matches!(
        client.users().get(".."),
        Err(PingupError::Config(_))
    ));
    assert!(matches!(
        client.places().personnel("p1", "."),
        Err(PingupError::Config(_))
    ));
    assert!(matches!(
        client.appointments().delete("..", "u1"),
        Err(PingupError::Config(_))
    ));

    any_delete.assert();
    any_get.assert();
}
