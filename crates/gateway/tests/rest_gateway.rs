use clinic_desk_gateway::{DataGateway, GatewayError, Query, RestGateway};
use reqwest::{Client, StatusCode};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> RestGateway {
    let _ = pretty_env_logger::try_init();
    RestGateway::new(&server.uri(), "fake-key", Client::new())
}

#[tokio::test]
async fn query_sends_filters_order_and_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/closure_dates"))
        .and(header("apikey", "fake-key"))
        .and(query_param("select", "*"))
        .and(query_param("is_active", "eq.true"))
        .and(query_param("order", "date.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "date": "2024-12-25", "reason": "Christmas" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = gateway(&server)
        .query(
            "closure_dates",
            &Query::new().eq("is_active", true).order("date", true),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["reason"], "Christmas");
}

#[tokio::test]
async fn access_token_and_schema_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/time_slots"))
        .and(header("Authorization", "Bearer admin-jwt"))
        .and(header("Accept-Profile", "clinic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = gateway(&server)
        .with_access_token("admin-jwt")
        .with_schema("clinic")
        .query("time_slots", &Query::new())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn insert_returns_first_representation_row() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctor_messages"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({ "message": "Back on Monday" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": id, "message": "Back on Monday", "active": true, "version": 1 }
        ])))
        .mount(&server)
        .await;

    let row = gateway(&server)
        .insert(
            "doctor_messages",
            json!({ "message": "Back on Monday", "active": true }),
        )
        .await
        .unwrap();
    assert_eq!(row["id"], id.to_string());
}

#[tokio::test]
async fn update_sends_version_guard_and_bumps_version() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/mr_weekdays"))
        .and(query_param("id", format!("eq.{}", id).as_str()))
        .and(query_param("version", "eq.3"))
        .and(body_partial_json(json!({ "is_working": false, "version": 4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": id, "day": "Monday", "is_working": false, "version": 4 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let row = gateway(&server)
        .update("mr_weekdays", id, Some(3), json!({ "is_working": false }))
        .await
        .unwrap();
    assert_eq!(row["version"], 4);
}

#[tokio::test]
async fn stale_update_is_a_conflict() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/time_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/time_slots"))
        .and(query_param("id", format!("eq.{}", id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": id, "version": 7 }
        ])))
        .mount(&server)
        .await;

    let result = gateway(&server)
        .update("time_slots", id, Some(6), json!({ "max_bookings": 2 }))
        .await;
    assert!(matches!(result, Err(GatewayError::Conflict { .. })));
}

#[tokio::test]
async fn update_of_vanished_row_is_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/time_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/time_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = gateway(&server)
        .update("time_slots", id, Some(1), json!({ "max_bookings": 2 }))
        .await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn delete_with_no_affected_rows_is_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/contact_messages"))
        .and(query_param("id", format!("eq.{}", id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = gateway(&server).delete("contact_messages", id).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn delete_accepts_deleted_representation() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/contact_messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": id }])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(gateway(&server).delete("contact_messages", id).await.is_ok());
}

#[tokio::test]
async fn api_errors_carry_postgrest_details() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/closure_dates"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint",
            "details": null,
            "hint": null
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .insert("closure_dates", json!({ "date": "2024-12-25" }))
        .await
        .unwrap_err();

    match err {
        GatewayError::Api { details, status } => {
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(details.code.as_deref(), Some("23505"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}
