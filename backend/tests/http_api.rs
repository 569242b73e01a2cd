//! End-to-end tests of the HTTP surface against a real SQLite store.
//!
//! Each test boots the full Actix app (session middleware, trace
//! middleware, every `/api/v1` endpoint) over a fresh migrated database
//! and drives it the way a client would: register, log in, carry the
//! session cookie.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use routelink::server::{api_services, build_http_state, session_middleware};
use routelink::Trace;

mod support;

use support::test_db;

macro_rules! test_app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(build_http_state(&$db.pool, None)))
                .wrap(Trace)
                .service(
                    web::scope("/api/v1")
                        .wrap(session_middleware(Key::generate(), false))
                        .configure(api_services),
                ),
        )
        .await
    };
}

async fn register_and_login<S, B>(app: &S, name: &str, email: &str, gender: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "name": name,
                "email": email,
                "password": "hunter42",
                "gender": gender,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "registration should succeed");

    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": email, "password": "hunter42" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

fn create_route_body(date: &str) -> Value {
    json!({
        "date": date,
        "slotCode": "SL0001",
        "endPoint": "CityMall",
        "majorStops": "Gate 2, Library",
    })
}

fn join_body(date: &str, phone: &str, drop: &str) -> Value {
    json!({
        "date": date,
        "name": "Asha",
        "gender": "F",
        "drop": drop,
        "phone": phone,
        "courseYear": "3",
        "branch": "CSE",
    })
}

#[actix_web::test]
async fn protected_endpoints_require_a_session() {
    let db = test_db();
    let app = test_app!(db);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/routes")
            .set_json(create_route_body("2100-03-01"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/me").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["id"], Value::Null);
}

#[actix_web::test]
async fn route_creation_join_and_duplicate_semantics() {
    let db = test_db();
    let app = test_app!(db);
    let cookie = register_and_login(&app, "Asha", "asha@example.edu", "F").await;

    // Create a route for 2100-03-01 to CityMall.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/routes")
            .cookie(cookie.clone())
            .set_json(create_route_body("2100-03-01"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    let route_id = body["routeId"].as_i64().expect("route id");

    // A second identical creation for the same date conflicts.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/routes")
            .cookie(cookie.clone())
            .set_json(create_route_body("2100-03-01"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // A rider joins with a case-different drop point: accepted.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/routes/{route_id}/join"))
            .cookie(cookie.clone())
            .set_json(join_body("2100-03-01", "9876543210", "citymall"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Same phone on the same date/route: rejected.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/routes/{route_id}/join"))
            .cookie(cookie.clone())
            .set_json(join_body("2100-03-01", "9876543210", "CityMall"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Mismatched drop point names the required endpoint.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/routes/{route_id}/join"))
            .cookie(cookie.clone())
            .set_json(join_body("2100-03-01", "1112223334", "North Gate"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(
        body["message"]
            .as_str()
            .expect("message present")
            .contains("CityMall")
    );

    // Past dates are rejected outright.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/routes/{route_id}/join"))
            .cookie(cookie.clone())
            .set_json(join_body("2020-01-01", "1112223334", "CityMall"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // The calendar shows the route; the rider count reflects the one join.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/calendar/2100-03-01")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.as_array().expect("array").len(), 1);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/routes/{route_id}/rider-count?date=2100-03-01"
            ))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["count"], 1);

    // Garbage date reads as zero rather than an error.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/routes/{route_id}/rider-count?date=not-a-date"
            ))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["count"], 0);
}

#[actix_web::test]
async fn rider_listing_update_and_delete() {
    let db = test_db();
    let app = test_app!(db);
    let cookie = register_and_login(&app, "Asha", "asha@example.edu", "F").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/routes")
            .cookie(cookie.clone())
            .set_json(create_route_body("2100-03-01"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let route_id = body["routeId"].as_i64().expect("route id");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/routes/{route_id}/join"))
            .cookie(cookie.clone())
            .set_json(join_body("2100-03-01", "9876543210", "CityMall"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let link_id = body["linkId"].as_i64().expect("link id");

    // Gender filter narrows the listing; an unknown filter is ignored.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/riders?gender=F")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.as_array().expect("array").len(), 1);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/riders?gender=M")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert!(body.as_array().expect("array").is_empty());

    // Partial update sticks.
    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/riders/{link_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "phone": "5556667778" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/routes/{route_id}/riders?date=2100-03-01"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body[0]["phone"], "5556667778");

    // An invalid partial update is rejected without touching the record.
    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/riders/{link_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "gender": "Q" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Delete, then the id is gone.
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/riders/{link_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/riders/{link_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn route_update_and_delete() {
    let db = test_db();
    let app = test_app!(db);
    let cookie = register_and_login(&app, "Asha", "asha@example.edu", "F").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/routes")
            .cookie(cookie.clone())
            .set_json(create_route_body("2100-03-01"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let route_id = body["routeId"].as_i64().expect("route id");

    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/routes/{route_id}"))
            .cookie(cookie.clone())
            .set_json(json!({ "departTime": "09:15" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Empty update bodies are a client error.
    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/routes/{route_id}"))
            .cookie(cookie.clone())
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/routes/{route_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/routes/{route_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn direct_conversations_converge_and_deliver_messages() {
    let db = test_db();
    let app = test_app!(db);
    let asha = register_and_login(&app, "Asha", "asha@example.edu", "F").await;
    let ravi = register_and_login(&app, "Ravi", "ravi@example.edu", "M").await;

    // Find each other's ids via /me.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(asha.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let asha_id = body["id"].as_i64().expect("asha id");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(ravi.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let ravi_id = body["id"].as_i64().expect("ravi id");

    // Both sides provision the pair in opposite argument order.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/direct/{ravi_id}"))
            .cookie(asha.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let conversation = body["conversationId"].as_i64().expect("conversation id");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/direct/{asha_id}"))
            .cookie(ravi.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["conversationId"].as_i64(), Some(conversation));

    // Self-DM is rejected.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/direct/{asha_id}"))
            .cookie(asha.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown peers are not found.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/conversations/direct/999")
            .cookie(asha.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Asha posts; Ravi sees it in order.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/{conversation}/messages"))
            .cookie(asha.clone())
            .set_json(json!({ "text": "leaving at 8?" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/conversations/{conversation}/messages"))
            .cookie(ravi.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let listed = body.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["text"], "leaving at 8?");
    assert_eq!(listed[0]["senderName"], "Asha");

    // Empty text is rejected.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/{conversation}/messages"))
            .cookie(ravi.clone())
            .set_json(json!({ "text": "   " }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // The conversation shows up in the listing with the last message.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/conversations")
            .cookie(ravi.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let listed = body.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["lastMessage"], "leaving at 8?");
}

#[actix_web::test]
async fn group_conversations_gate_non_members() {
    let db = test_db();
    let app = test_app!(db);
    let asha = register_and_login(&app, "Asha", "asha@example.edu", "F").await;
    let ravi = register_and_login(&app, "Ravi", "ravi@example.edu", "M").await;
    let tara = register_and_login(&app, "Tara", "tara@example.edu", "F").await;

    // Asha advertises a route and joins it herself.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/routes")
            .cookie(asha.clone())
            .set_json(create_route_body("2100-03-01"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let route_id = body["routeId"].as_i64().expect("route id");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/routes/{route_id}/join"))
            .cookie(asha.clone())
            .set_json(join_body("2100-03-01", "9876543210", "CityMall"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Ravi provisions the group: membership is the historical joiners plus
    // Ravi himself.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/route-group/{route_id}"))
            .cookie(ravi.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let group = body["conversationId"].as_i64().expect("conversation id");

    // Repeat provisioning converges on the same conversation.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/route-group/{route_id}"))
            .cookie(asha.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["conversationId"].as_i64(), Some(group));

    // A group for a missing route is not found.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/conversations/route-group/999")
            .cookie(asha.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Members talk; Tara (provisioned nothing, joined nothing) is gated.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/{group}/messages"))
            .cookie(asha.clone())
            .set_json(json!({ "text": "seats left for tomorrow" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/conversations/{group}/messages"))
            .cookie(ravi.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/conversations/{group}/messages"))
            .cookie(tara.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/conversations/{group}/messages"))
            .cookie(tara.clone())
            .set_json(json!({ "text": "let me in" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn registration_rejects_duplicates_and_bad_logins() {
    let db = test_db();
    let app = test_app!(db);
    register_and_login(&app, "Asha", "asha@example.edu", "F").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "name": "Imposter",
                "email": "asha@example.edu",
                "password": "other",
                "gender": "M",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": "asha@example.edu", "password": "wrong" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
