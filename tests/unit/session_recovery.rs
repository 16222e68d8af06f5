use crate::common::{client_for, login_body, query, terms_body};
use luxmed_checker::error::AppError;
use luxmed_checker::storage::cookie_store::MemoryCookieStore;
use mockito::Server;
use std::sync::Arc;

#[tokio::test]
async fn test_expired_token_is_replaced_once() {
    let mut server = Server::new_async().await;
    let first_login = server
        .mock("POST", "/Account/LogIn")
        .with_status(200)
        .with_body(login_body("old"))
        .expect(1)
        .create_async()
        .await;
    let rejected = server
        .mock("GET", "/NewPortal/terms/index")
        .match_query(mockito::Matcher::Any)
        .match_header("authorization", "Bearer old")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), Arc::new(MemoryCookieStore::new()));
    client.session().ensure_authenticated().await.unwrap();
    first_login.assert_async().await;
    first_login.remove_async().await;

    let second_login = server
        .mock("POST", "/Account/LogIn")
        .with_status(200)
        .with_body(login_body("new"))
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/NewPortal/terms/index")
        .match_query(mockito::Matcher::Any)
        .match_header("authorization", "Bearer new")
        .with_status(200)
        .with_body(terms_body())
        .expect(1)
        .create_async()
        .await;

    let result = client.search(&query(4480)).await.unwrap();

    assert!(result.has_available_terms());
    assert_eq!(client.session().generation().await, 2);
    rejected.assert_async().await;
    second_login.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_rejected_credentials_surface_as_authentication_error() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/Account/LogIn")
        .with_status(403)
        .create_async()
        .await;
    let search = server
        .mock("GET", "/NewPortal/terms/index")
        .match_query(mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server.url(), Arc::new(MemoryCookieStore::new()));
    let err = client.search(&query(4480)).await.unwrap_err();

    assert!(err.is_authentication());
    assert!(matches!(err, AppError::Authentication(_)));
    search.assert_async().await;
}
