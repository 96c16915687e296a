use std::collections::BTreeMap;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase};
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use sprintdeck::{
    auth::token::{JwtKeys, make_claims, sign_token},
    db::entities::{role_assignment, time_request, user},
    routes::API_PREFIX,
    test_helpers::router_with_db,
};

const SECRET: &str = "test-secret";

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

fn bearer(user_id: &Uuid) -> String {
    let keys = JwtKeys::from_secret(SECRET.as_bytes());
    let claims = make_claims(user_id, "alice@example.com", 600);
    let token = sign_token(&keys, &claims).expect("token should encode");
    format!("Bearer {token}")
}

fn assignment(user_id: Uuid, role: &str) -> role_assignment::Model {
    let now = Utc::now().fixed_offset();
    role_assignment::Model {
        id: Uuid::new_v4(),
        user_id,
        role: role.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
    BTreeMap::from([("num_items", sea_orm::Value::from(n))])
}

async fn json_body(res: axum::response::Response) -> serde_json::Value {
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn admin_is_denied_on_a_superadmin_route() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![assignment(user_id, "admin")]])
        .into_connection();
    let app = router_with_db(db, SECRET);

    let res = app
        .oneshot(
            Request::builder()
                .uri(api_path("/users/search"))
                .header("authorization", bearer(&user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let json = json_body(res).await;
    assert_eq!(json["message"], "Insufficient role");
}

#[tokio::test]
async fn user_without_assignment_is_denied() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<role_assignment::Model>::new()])
        .into_connection();
    let app = router_with_db(db, SECRET);

    let res = app
        .oneshot(
            Request::builder()
                .uri(api_path("/users/search"))
                .header("authorization", bearer(&user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let json = json_body(res).await;
    assert_eq!(json["message"], "Insufficient role");
}

#[tokio::test]
async fn admin_passes_an_admin_route() {
    let user_id = Uuid::new_v4();
    // role lookup, then count and page fetch for the listing.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![assignment(user_id, "admin")]])
        .append_query_results([vec![count_row(0)]])
        .append_query_results([Vec::<time_request::Model>::new()])
        .into_connection();
    let app = router_with_db(db, SECRET);

    let res = app
        .oneshot(
            Request::builder()
                .uri(api_path("/time-requests/all"))
                .header("authorization", bearer(&user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = json_body(res).await;
    assert_eq!(json["data"]["total"], 0);
    assert_eq!(json["data"]["data"], serde_json::json!([]));
}

#[tokio::test]
async fn superadmin_passes_a_superadmin_route() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![assignment(user_id, "superadmin")]])
        .append_query_results([vec![count_row(0)]])
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = router_with_db(db, SECRET);

    let res = app
        .oneshot(
            Request::builder()
                .uri(api_path("/users/search"))
                .header("authorization", bearer(&user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = json_body(res).await;
    assert_eq!(json["data"]["total"], 0);
}

#[tokio::test]
async fn unauthenticated_request_never_reaches_the_gate() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = router_with_db(db, SECRET);

    let res = app
        .oneshot(
            Request::builder()
                .uri(api_path("/users/search"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(res).await;
    assert_eq!(json["message"], "Missing Authorization header");
}
