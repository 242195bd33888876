use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Matches requests that carry no `Authorization` header.
#[allow(dead_code)]
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

#[allow(dead_code)]
pub fn user_json(user_name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": format!("u-{user_name}"),
        "user_name": user_name,
        "full_name": "Jane Doe",
        "email": format!("{user_name}@example.com"),
        "roles": ["user"],
        "is_active": true
    })
}

#[allow(dead_code)]
pub fn card_json(id: &str, job: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "card_type": "Modern",
        "job": job,
        "company": "Acme",
        "phone": "0912345678",
        "is_active": true,
        "socialLinks": [
            {"id": "s1", "platform": "github", "url": "https://github.com/jdoe", "icon": "gh"}
        ]
    })
}

/// Serve `body` at `GET route` only to `token`; every other token gets a 401.
#[allow(dead_code)]
pub async fn mount_protected(server: &MockServer, route: &str, token: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("Authorization", token))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .with_priority(1)
        .mount(server)
        .await;
    mount_expired(server, route).await;
}

/// Any request to `route` is answered with the server's expired-token 401.
#[allow(dead_code)]
pub async fn mount_expired(server: &MockServer, route: &str) {
    Mock::given(path(route))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "jwt expired",
                "statusCode": 401
            })),
        )
        .with_priority(10)
        .mount(server)
        .await;
}

/// Refresh endpoint answering `refresh_token` with `access`, expected
/// exactly `times` times.
#[allow(dead_code)]
pub async fn mount_refresh(
    server: &MockServer,
    refresh_token: &str,
    access: &str,
    times: u64,
    delay: Duration,
) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_partial_json(serde_json::json!({ "refreshToken": refresh_token })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "message": "Refresh token successfully",
                    "data": { "accessToken": access }
                }))
                .set_delay(delay),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Refresh endpoint that rejects the session.
#[allow(dead_code)]
pub async fn mount_refresh_rejected(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "message": "Invalid refresh token" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(times)
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub async fn mount_login(server: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "accessToken": access,
                "refreshToken": refresh,
                "existUser": { "roles": ["user"] }
            }
        })))
        .mount(server)
        .await;
}
