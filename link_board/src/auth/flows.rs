//! Sign-in and sign-up flows.
//!
//! Each flow is a small state machine: `Idle -> Submitting -> success or
//! failure`. The transition out of `Idle` is guarded by client-side
//! validation; an invalid form produces [`ApiError::Validation`] without
//! a network call and without leaving `Idle`. A failure surfaces as the
//! returned error and puts the flow back in `Idle`; nothing retries
//! automatically.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::net::errors::{ApiError, ValidationErrors};
use crate::net::http::{self, HttpClient};
use crate::session::SessionHolder;
use crate::storage::{AUTH_TOKEN_KEY, Storage};
use crate::users::UserService;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Whether a value looks like an email address.
pub fn email_is_well_formed(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Flow lifecycle state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FlowState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
}

/// Sign-in form draft. Component-owned, never persisted.
#[derive(Clone, Debug, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// Validate and produce the exact field set submitted to the server.
    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("email", &self.email);
        if !self.email.trim().is_empty() && !email_is_well_formed(&self.email) {
            errors.push("email", "must be a valid email address");
        }
        errors.require("password", &self.password);
        errors.into_result()?;
        Ok(LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

/// Sign-up form draft. Component-owned, never persisted.
///
/// Password confirmation is submitted as entered; whether the two
/// passwords match is the server's call, surfaced through its `password1`
/// field errors.
#[derive(Clone, Debug, Default)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("first_name", &self.first_name);
        errors.require("last_name", &self.last_name);
        errors.require("email", &self.email);
        if !self.email.trim().is_empty() && !email_is_well_formed(&self.email) {
            errors.push("email", "must be a valid email address");
        }
        errors.require("password1", &self.password1);
        errors.require("password2", &self.password2);
        errors.into_result()?;
        Ok(RegisterRequest {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            password1: self.password1.clone(),
            password2: self.password2.clone(),
        })
    }
}

/// Sign-in flow.
pub struct SignInFlow {
    http: HttpClient,
    storage: Storage,
    session: Arc<SessionHolder>,
    users: UserService,
    state: FlowState,
}

impl SignInFlow {
    /// Fields consulted, in order, when resolving a failure message.
    pub const MESSAGE_FIELDS: &'static [&'static str] = &["email"];

    /// Generic failure message when the server gives nothing usable.
    pub const FALLBACK: &'static str = "Login failed. Please try again.";

    pub fn new(
        http: HttpClient,
        storage: Storage,
        session: Arc<SessionHolder>,
        users: UserService,
    ) -> Self {
        Self {
            http,
            storage,
            session,
            users,
            state: FlowState::default(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Submit the form.
    ///
    /// On success the returned credential (when present) is persisted and
    /// the session is resolved to pick up the full user record; the
    /// resolved user is returned so the caller can navigate and notify.
    /// Session resolution failing after a successful login is not a flow
    /// failure: the login itself stands.
    pub async fn submit(&mut self, form: &SignInForm) -> Result<Option<User>, ApiError> {
        let request = form.validate().map_err(ApiError::Validation)?;
        self.state = FlowState::Submitting;
        let result = self.perform(request).await;
        self.state = match &result {
            Ok(_) => FlowState::Succeeded,
            Err(_) => FlowState::Idle,
        };
        result
    }

    async fn perform(&self, request: LoginRequest) -> Result<Option<User>, ApiError> {
        let auth: AuthResponse =
            http::send_json(self.http.post("/rest-auth/login/").json(&request)).await?;
        if !auth.key.is_empty() {
            if let Err(error) = self.storage.store_item(AUTH_TOKEN_KEY, &auth.key) {
                log::warn!("failed to persist credential: {error}");
            }
        }
        Ok(self.session.resolve(&self.users).await)
    }
}

/// Sign-up flow. Registration does not auto-authenticate: on success the
/// form is reset and the caller navigates to sign-in.
pub struct SignUpFlow {
    http: HttpClient,
    state: FlowState,
}

impl SignUpFlow {
    /// Fields consulted, in order, when resolving a failure message.
    pub const MESSAGE_FIELDS: &'static [&'static str] = &["password1", "email"];

    /// Generic failure message when the server gives nothing usable.
    pub const FALLBACK: &'static str = "Registration failed. Please try again.";

    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            state: FlowState::default(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub async fn submit(&mut self, form: &mut SignUpForm) -> Result<(), ApiError> {
        let request = form.validate().map_err(ApiError::Validation)?;
        self.state = FlowState::Submitting;
        match http::send_unit(self.http.post("/rest-auth/registration/").json(&request)).await {
            Ok(()) => {
                *form = SignUpForm::default();
                self.state = FlowState::Succeeded;
                Ok(())
            }
            Err(error) => {
                self.state = FlowState::Idle;
                Err(error)
            }
        }
    }
}
