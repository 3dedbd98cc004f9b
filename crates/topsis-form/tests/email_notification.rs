use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use topsis_form::config::EmailJsConfig;
use topsis_form::notify::{EmailJsClient, MailError, ResultMailer};

#[derive(Clone, Default)]
struct Inbox(Arc<Mutex<Vec<Value>>>);

async fn accept(State(inbox): State<Inbox>, Json(body): Json<Value>) -> &'static str {
    inbox.0.lock().expect("inbox mutex").push(body);
    "OK"
}

async fn reject() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, "The public key is required")
}

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock mail api");
    });
    format!("http://{addr}/api/v1.0/email/send")
}

fn mailer(api_url: String) -> EmailJsClient {
    let client = Client::builder().no_proxy().build().expect("http client");
    EmailJsClient::with_client(
        client,
        EmailJsConfig {
            service_id: "service_abc".to_string(),
            template_id: "template_xyz".to_string(),
            public_key: "pk_123".to_string(),
            api_url,
        },
    )
}

#[tokio::test]
async fn sends_recipient_and_link_with_configured_identifiers() {
    let inbox = Inbox::default();
    let router = Router::new()
        .route("/api/v1.0/email/send", post(accept))
        .with_state(inbox.clone());
    let mailer = mailer(spawn(router).await);

    let receipt = mailer
        .send_result_email("analyst@example.com", "http://127.0.0.1:5000/api/download/r.csv")
        .await
        .expect("mail accepted");
    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.text, "OK");

    let delivered = inbox.0.lock().expect("inbox mutex").clone();
    assert_eq!(
        delivered,
        vec![json!({
            "service_id": "service_abc",
            "template_id": "template_xyz",
            "user_id": "pk_123",
            "template_params": {
                "to_email": "analyst@example.com",
                "result_link": "http://127.0.0.1:5000/api/download/r.csv"
            }
        })]
    );
}

#[tokio::test]
async fn api_rejection_is_returned_untranslated() {
    let router = Router::new().route("/api/v1.0/email/send", post(reject));
    let mailer = mailer(spawn(router).await);

    let err = mailer
        .send_result_email("analyst@example.com", "link")
        .await
        .expect_err("rejected");
    match err {
        MailError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "The public key is required");
        }
        other => panic!("unexpected error: {other}"),
    }
}
