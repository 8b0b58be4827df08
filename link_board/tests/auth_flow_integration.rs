//! Integration tests for the sign-in/sign-up flows against a loopback
//! mock backend.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use link_board::auth::flows::{FlowState, SignInFlow, SignInForm, SignUpFlow, SignUpForm};
use link_board::net::errors::NETWORK_MESSAGE;
use link_board::net::http::AuthTokenHeader;
use link_board::users::UserService;
use link_board::{AUTH_TOKEN_KEY, HttpClient, SessionHolder, Storage, USER_KEY, User};

type Hits = Arc<AtomicUsize>;

fn scratch_storage(tag: &str) -> Storage {
    let rand_id: u32 = rand::random();
    Storage::new(std::env::temp_dir().join(format!("link_board_auth_it_{tag}_{rand_id}")))
}

async fn spawn_backend() -> (SocketAddr, Hits) {
    let hits: Hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/rest-auth/login/", post(login))
        .route("/rest-auth/registration/", post(registration))
        .route("/rest-auth/user/", get(auth_user))
        .with_state(hits.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hits)
}

async fn login(State(hits): State<Hits>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    hits.fetch_add(1, Ordering::SeqCst);
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    match (email, password) {
        (Some("a@b.com"), Some("hunter2")) => (StatusCode::OK, Json(json!({ "key": "tok1" }))),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "non_field_errors": ["Invalid credentials"] })),
        ),
    }
}

async fn registration(
    State(hits): State<Hits>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    hits.fetch_add(1, Ordering::SeqCst);
    let password1 = body.get("password1").and_then(Value::as_str);
    let password2 = body.get("password2").and_then(Value::as_str);
    if password1 != password2 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "password1": ["The two password fields didn't match."] })),
        );
    }
    (StatusCode::CREATED, Json(json!({ "key": "reg-key" })))
}

async fn auth_user(State(hits): State<Hits>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    hits.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());
    match authorization {
        Some("Token tok1") => (
            StatusCode::OK,
            Json(json!({ "pk": 1, "username": "ada", "email": "a@b.com" })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Authentication credentials were not provided." })),
        ),
    }
}

struct Harness {
    storage: Storage,
    session: Arc<SessionHolder>,
    sign_in: SignInFlow,
    sign_up: SignUpFlow,
}

fn harness(addr: SocketAddr, tag: &str) -> Harness {
    let storage = scratch_storage(tag);
    let http = HttpClient::new(format!("http://{addr}"))
        .unwrap()
        .with(AuthTokenHeader::new(storage.clone()));
    let session = Arc::new(SessionHolder::new(storage.clone()));
    let users = UserService::new(http.clone());
    let sign_in = SignInFlow::new(http.clone(), storage.clone(), session.clone(), users);
    let sign_up = SignUpFlow::new(http);
    Harness {
        storage,
        session,
        sign_in,
        sign_up,
    }
}

#[tokio::test]
async fn successful_login_stores_credential_and_resolves_session() {
    let (addr, _) = spawn_backend().await;
    let mut h = harness(addr, "login_ok");

    let form = SignInForm {
        email: "a@b.com".to_string(),
        password: "hunter2".to_string(),
    };
    let resolved = h.sign_in.submit(&form).await.unwrap();

    assert_eq!(resolved.as_ref().map(|user| user.id), Some(1));
    assert_eq!(
        h.storage.get_item::<String>(AUTH_TOKEN_KEY),
        Some("tok1".to_string())
    );
    assert_eq!(h.session.current().map(|user| user.email), Some("a@b.com".to_string()));
    // The resolved record is cached for the next cold start.
    assert!(h.storage.get_item::<User>(USER_KEY).is_some());
    assert_eq!(h.sign_in.state(), FlowState::Succeeded);
    let _ = std::fs::remove_dir_all(h.storage.dir());
}

#[tokio::test]
async fn invalid_credentials_surface_non_field_message() {
    let (addr, _) = spawn_backend().await;
    let mut h = harness(addr, "login_bad");

    let form = SignInForm {
        email: "a@b.com".to_string(),
        password: "x".to_string(),
    };
    let error = h.sign_in.submit(&form).await.unwrap_err();

    assert_eq!(
        error.user_message(SignInFlow::MESSAGE_FIELDS, SignInFlow::FALLBACK),
        "Invalid credentials"
    );
    // Session state is untouched: no user, not even initialized.
    assert_eq!(h.session.current(), None);
    assert!(!h.session.initialized());
    assert_eq!(h.storage.get_item::<String>(AUTH_TOKEN_KEY), None);
    // Failure is transient: the flow is ready for another attempt.
    assert_eq!(h.sign_in.state(), FlowState::Idle);
    let _ = std::fs::remove_dir_all(h.storage.dir());
}

#[tokio::test]
async fn empty_sign_in_form_makes_zero_network_calls() {
    let (addr, hits) = spawn_backend().await;
    let mut h = harness(addr, "login_empty");

    let error = h.sign_in.submit(&SignInForm::default()).await.unwrap_err();

    assert!(error.is_validation());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(h.sign_in.state(), FlowState::Idle);
    let _ = std::fs::remove_dir_all(h.storage.dir());
}

#[tokio::test]
async fn registration_success_resets_form_without_authenticating() {
    let (addr, _) = spawn_backend().await;
    let mut h = harness(addr, "register_ok");

    let mut form = SignUpForm {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@b.com".to_string(),
        password1: "hunter2hunter2".to_string(),
        password2: "hunter2hunter2".to_string(),
    };
    h.sign_up.submit(&mut form).await.unwrap();

    assert!(form.email.is_empty());
    assert_eq!(h.sign_up.state(), FlowState::Succeeded);
    // Registration does not auto-authenticate.
    assert_eq!(h.storage.get_item::<String>(AUTH_TOKEN_KEY), None);
    assert_eq!(h.session.current(), None);
    let _ = std::fs::remove_dir_all(h.storage.dir());
}

#[tokio::test]
async fn registration_surfaces_password_field_error_first() {
    let (addr, _) = spawn_backend().await;
    let mut h = harness(addr, "register_mismatch");

    let mut form = SignUpForm {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@b.com".to_string(),
        password1: "one-password".to_string(),
        password2: "two-password".to_string(),
    };
    let error = h.sign_up.submit(&mut form).await.unwrap_err();

    assert_eq!(
        error.user_message(SignUpFlow::MESSAGE_FIELDS, SignUpFlow::FALLBACK),
        "The two password fields didn't match."
    );
    // The form keeps its values for another attempt.
    assert_eq!(form.email, "ada@b.com");
    let _ = std::fs::remove_dir_all(h.storage.dir());
}

#[tokio::test]
async fn unreachable_backend_yields_the_network_message() {
    let addr: SocketAddr = "127.0.0.1:19999".parse().unwrap();
    let mut h = harness(addr, "network");

    let form = SignInForm {
        email: "a@b.com".to_string(),
        password: "hunter2".to_string(),
    };
    let error = h.sign_in.submit(&form).await.unwrap_err();

    assert_eq!(
        error.user_message(SignInFlow::MESSAGE_FIELDS, SignInFlow::FALLBACK),
        NETWORK_MESSAGE
    );
    let _ = std::fs::remove_dir_all(h.storage.dir());
}
