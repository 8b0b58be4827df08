//! Integration tests for lb_client network functionality.
//!
//! Tests network error handling against unreachable and misconfigured
//! backends. None of these require a running server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use lb_client::shell::Shell;
use link_board::auth::flows::{SignInFlow, SignInForm};
use link_board::content::posts::PostService;
use link_board::net::errors::NETWORK_MESSAGE;
use link_board::net::http::AuthTokenHeader;
use link_board::users::UserService;
use link_board::{ClientConfig, HttpClient, SessionHolder, Storage};

fn scratch_storage(tag: &str) -> Storage {
    let rand_id: u32 = rand::random();
    Storage::new(std::env::temp_dir().join(format!("lb_client_it_{tag}_{rand_id}")))
}

fn config(server_url: &str) -> ClientConfig {
    ClientConfig {
        server_url: server_url.to_string(),
        app_url: "http://localhost:12001".to_string(),
        login_url: "http://localhost:12001/sign-in".to_string(),
        state_dir: PathBuf::from("."),
    }
}

fn sign_in_flow(server_url: &str, tag: &str) -> (SignInFlow, Storage) {
    let storage = scratch_storage(tag);
    let http = HttpClient::new(server_url)
        .unwrap()
        .with(AuthTokenHeader::new(storage.clone()));
    let session = Arc::new(SessionHolder::new(storage.clone()));
    let users = UserService::new(http.clone());
    (
        SignInFlow::new(http, storage.clone(), session, users),
        storage,
    )
}

// ============================================================================
// Network Error Scenario Tests
// ============================================================================

#[tokio::test]
async fn test_connection_refused() {
    let (mut flow, storage) = sign_in_flow("http://localhost:19999", "refused");

    let form = SignInForm {
        email: "a@b.com".to_string(),
        password: "hunter2".to_string(),
    };
    let result = flow.submit(&form).await;

    assert!(result.is_err(), "Should fail when server is not available");
    let error = result.unwrap_err();
    assert_eq!(
        error.user_message(SignInFlow::MESSAGE_FIELDS, SignInFlow::FALLBACK),
        NETWORK_MESSAGE
    );
    let _ = std::fs::remove_dir_all(storage.dir());
}

#[tokio::test]
async fn test_timeout_handling() {
    // Non-routable address; either times out or fails to connect.
    let (mut flow, storage) = sign_in_flow("http://192.0.2.1:80", "timeout");

    let form = SignInForm {
        email: "a@b.com".to_string(),
        password: "hunter2".to_string(),
    };
    let result = timeout(Duration::from_secs(3), flow.submit(&form)).await;

    assert!(
        result.is_err() || result.unwrap().is_err(),
        "Should fail when connecting to unreachable host"
    );
    let _ = std::fs::remove_dir_all(storage.dir());
}

#[tokio::test]
async fn test_invalid_hostname() {
    let (mut flow, storage) = sign_in_flow(
        "http://invalid-hostname-that-does-not-exist.local",
        "hostname",
    );

    let form = SignInForm {
        email: "a@b.com".to_string(),
        password: "hunter2".to_string(),
    };
    let result = flow.submit(&form).await;

    assert!(result.is_err(), "Should fail with invalid hostname");
    let _ = std::fs::remove_dir_all(storage.dir());
}

#[tokio::test]
async fn test_network_error_on_feed() {
    let storage = scratch_storage("feed");
    let http = HttpClient::new("http://localhost:19999")
        .unwrap()
        .with(AuthTokenHeader::new(storage.clone()));
    let posts = PostService::new(http);

    let result = posts.list(None).await;

    assert!(result.is_err(), "Should fail when server is not available");
    let _ = std::fs::remove_dir_all(storage.dir());
}

// ============================================================================
// Validation-Before-Network Tests
// ============================================================================

#[tokio::test]
async fn test_validation_precedes_transport() {
    // An empty form never reaches the (unreachable) network.
    let (mut flow, storage) = sign_in_flow("http://localhost:19999", "validation");

    let error = flow.submit(&SignInForm::default()).await.unwrap_err();

    assert!(error.is_validation());
    let _ = std::fs::remove_dir_all(storage.dir());
}

// ============================================================================
// Shell State Tests
// ============================================================================

#[tokio::test]
async fn test_logout_without_server_still_clears_state() {
    let storage = scratch_storage("logout");
    let http = HttpClient::new("http://localhost:19999")
        .unwrap()
        .with(AuthTokenHeader::new(storage.clone()));
    let session = Arc::new(SessionHolder::new(storage.clone()));
    let users = UserService::new(http);
    let mut shell = Shell::new(
        config("http://localhost:19999"),
        storage.clone(),
        session.clone(),
        users,
    );

    storage
        .store_item(link_board::AUTH_TOKEN_KEY, &"tok1".to_string())
        .unwrap();

    let destination = shell.logout().await;

    assert_eq!(destination, "http://localhost:12001/sign-in");
    assert_eq!(
        storage.get_item::<String>(link_board::AUTH_TOKEN_KEY),
        None
    );
    assert_eq!(session.current(), None);
    let _ = std::fs::remove_dir_all(storage.dir());
}
