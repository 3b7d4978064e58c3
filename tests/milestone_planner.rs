use chrono::{NaiveDate, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ledgerly::models::{ProjectSubmission, SubmissionStatus};
use ledgerly::services::{LlmClient, MilestonePlanner};
use ledgerly::Error;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
}

fn submission() -> ProjectSubmission {
    ProjectSubmission {
        id: 3,
        user_id: 1,
        title: "Booking site".into(),
        description: "Appointment booking for a hair salon".into(),
        client_name: "Lin".into(),
        client_email: "lin@salon.example".into(),
        budget: Some(3000.0),
        deadline: NaiveDate::from_ymd_opt(2024, 11, 1),
        status: SubmissionStatus::Approved,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn plans_milestones_from_fenced_json() {
    let server = MockServer::start().await;
    let content = "Here is the plan:\n```json\n[\
        {\"title\": \"Discovery\", \"description\": \"Workshops\", \"due_in_days\": 7, \"amount\": 500},\
        {\"title\": \"Build\", \"due_in_days\": 30, \"amount\": 2000},\
        {\"title\": \"Launch\", \"due_date\": \"2024-10-25\"}\
    ]\n```";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
        .expect(1)
        .mount(&server)
        .await;

    let planner = MilestonePlanner::new(LlmClient::new(&server.uri(), "test-model", Some("sk-test".into())));
    let drafts = planner.plan(&submission(), today()).await.unwrap();

    assert_eq!(drafts.len(), 3);
    assert_eq!(drafts[0].title, "Discovery");
    assert_eq!(drafts[0].due_date, NaiveDate::from_ymd_opt(2024, 9, 8));
    assert_eq!(drafts[1].amount, Some(2000.0));
    assert!(drafts[1].description.is_none());
    assert_eq!(drafts[2].due_date, NaiveDate::from_ymd_opt(2024, 10, 25));
}

#[tokio::test]
async fn provider_failure_is_an_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let planner = MilestonePlanner::new(LlmClient::new(&server.uri(), "test-model", Some("sk-test".into())));
    let err = planner.plan(&submission(), today()).await.unwrap_err();

    assert!(matches!(err, Error::Llm(ref m) if m.contains("503")));
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn unusable_answer_is_an_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("I cannot help with that.")),
        )
        .mount(&server)
        .await;

    let planner = MilestonePlanner::new(LlmClient::new(&server.uri(), "test-model", Some("sk-test".into())));
    let err = planner.plan(&submission(), today()).await.unwrap_err();
    assert!(matches!(err, Error::Llm(_)));
}

#[tokio::test]
async fn missing_key_never_calls_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let planner = MilestonePlanner::new(LlmClient::new(&server.uri(), "test-model", None));
    assert!(!planner.is_configured());
    let err = planner.plan(&submission(), today()).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
