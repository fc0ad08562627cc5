//! Login, logout and current-user resolution.

use redis_shop_core::{Email, UserId};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{ActionError, ApiResult, Navigation};
use crate::api::CommerceApi;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::SessionAccess;

const INVALID_EMAIL: &str = "Invalid email address";
const PASSWORD_REQUIRED: &str = "Password is required";
const LOGIN_FAILED: &str = "Login failed";

/// The signed-in shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
}

/// Check login form fields, email first.
fn validate(email: &str, password: &SecretString) -> ApiResult<Email> {
    let email = Email::parse(email).map_err(|_| ActionError::new(INVALID_EMAIL))?;
    if password.expose_secret().is_empty() {
        return Err(ActionError::new(PASSWORD_REQUIRED));
    }
    Ok(email)
}

/// Sign in with email and password.
///
/// Form fields are validated before any network call. On success the token
/// is stored in the session and the visitor is sent home; on failure the
/// session is left as it was.
///
/// # Errors
///
/// Returns the first validation message, or the service's message (or
/// "Login failed") when the service rejects the credentials.
#[instrument(skip_all)]
pub async fn login<A, S>(
    api: &A,
    session: &mut S,
    email: &str,
    password: &SecretString,
) -> ApiResult<Navigation>
where
    A: CommerceApi,
    S: SessionAccess,
{
    let email = validate(email, password)?;

    let response = api
        .login(email.as_str(), password)
        .await
        .map_err(|e| ActionError::from_api(&e, LOGIN_FAILED))?;

    session.set(response.token);
    tracing::info!(domain = %email.domain(), "Login succeeded");
    Ok(Navigation::Home)
}

/// Sign out. Always succeeds and never calls the service.
pub fn logout<S: SessionAccess>(session: &mut S) -> Navigation {
    session.clear();
    clear_sentry_user();
    Navigation::Login
}

/// Resolve the shopper behind the session, if any.
///
/// A missing session is not an error. When the session's token is rejected
/// (or the lookup fails for any other reason) the session is cleared, so the
/// next request is treated as a guest without another lookup.
#[instrument(skip_all)]
pub async fn current_user<A, S>(api: &A, session: &mut S) -> Option<CurrentUser>
where
    A: CommerceApi,
    S: SessionAccess,
{
    let token = session.get()?;

    match api.get_me(&token).await {
        Ok(me) => {
            set_sentry_user(&me.user_id, None);
            Some(CurrentUser {
                user_id: me.user_id,
            })
        }
        Err(e) => {
            tracing::info!(error = %e, "Session rejected, clearing");
            session.clear();
            None
        }
    }
}
