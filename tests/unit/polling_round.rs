use crate::common::{client_for, login_body, query, terms_body, CollectingNotifier};
use luxmed_checker::application::services::poll_orchestrator::{PollOrchestrator, SearchTask};
use luxmed_checker::error::AppError;
use luxmed_checker::storage::cookie_store::MemoryCookieStore;
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use std::sync::Arc;

#[tokio::test]
async fn test_round_notifies_and_isolates_failures() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/Account/LogIn")
        .match_body(Matcher::PartialJsonString(
            r#"{"login": "test_user", "password": "test_password"}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("set-cookie", "ASP.NET_SessionId=abc; path=/; HttpOnly")
        .with_body(login_body("tok-1"))
        .expect(1)
        .create_async()
        .await;
    let found = server
        .mock("GET", "/NewPortal/terms/index")
        .match_query(Matcher::UrlEncoded(
            "serviceVariantId".to_string(),
            "4480".to_string(),
        ))
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_body(terms_body())
        .create_async()
        .await;
    let broken = server
        .mock("GET", "/NewPortal/terms/index")
        .match_query(Matcher::UrlEncoded(
            "serviceVariantId".to_string(),
            "999".to_string(),
        ))
        .with_status(500)
        .create_async()
        .await;

    let store = Arc::new(MemoryCookieStore::new());
    let notifier = Arc::new(CollectingNotifier::default());
    let orchestrator = PollOrchestrator::new(
        client_for(&server.url(), store.clone()),
        notifier.clone(),
        vec![
            SearchTask::new("Dermatologist", query(4480)),
            SearchTask::new("Broken", query(999)),
        ],
    );

    let report = orchestrator.run_once().await;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.successes(), 1);
    assert_eq!(report.notifications_sent, 1);
    let errors = report.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "Broken");
    assert!(matches!(
        errors[0].1,
        AppError::Request(status) if *status == StatusCode::INTERNAL_SERVER_ERROR
    ));
    assert_eq!(
        notifier.sent(),
        vec!["[Dermatologist] 2024-12-15 09:00-09:30, Anna Kowalska, Center A".to_string()]
    );
    assert!(store.snapshot().unwrap().contains("abc"));

    login.assert_async().await;
    found.assert_async().await;
    broken.assert_async().await;
}
