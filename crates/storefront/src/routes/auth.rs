//! Login and logout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use crate::actions;
use crate::middleware::CookieSession;
use crate::state::AppState;

/// Login form data.
///
/// Missing fields deserialize as empty so the login action reports them.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    /// Email to prefill after a failed attempt.
    pub email: String,
    pub error: Option<String>,
}

/// Display the login page.
///
/// Visitors with a session never get here: the route guard sends them home.
pub async fn login_page() -> LoginTemplate {
    LoginTemplate {
        email: String::new(),
        error: None,
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    mut session: CookieSession,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = form
        .password
        .unwrap_or_else(|| SecretString::from(String::new()));

    match actions::login(state.api(), &mut session, &form.email, &password).await {
        Ok(next) => (session, next).into_response(),
        Err(e) => LoginTemplate {
            email: form.email,
            error: Some(e.message().to_string()),
        }
        .into_response(),
    }
}

/// Handle logout.
pub async fn logout(mut session: CookieSession) -> Response {
    let next = actions::logout(&mut session);
    (session, next).into_response()
}
