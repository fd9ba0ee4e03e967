//! HTTP to domain error mapping.

use petshop_auth::AuthError;
use petshop_commerce::CommerceError;
use petshop_data::{FetchError, Response};

/// What a request was about, for `NotFound` errors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'a> {
    pub entity: &'static str,
    pub id: &'a str,
}

impl<'a> Target<'a> {
    pub fn new(entity: &'static str, id: &'a str) -> Self {
        Self { entity, id }
    }
}

/// Map a non-2xx answer onto the error taxonomy.
///
/// 401 and 403 are auth failures (the refresh already ran), 404 names the
/// stale reference, 400/409/422 are server-side validation and anything
/// else is a transport or server failure.
pub(crate) fn check_status(response: Response, target: Target<'_>) -> Result<Response, CommerceError> {
    if response.is_success() {
        return Ok(response);
    }
    let message = response.error_message();
    Err(match response.status {
        401 | 403 => CommerceError::Auth(message),
        404 => CommerceError::not_found(target.entity, target.id),
        400 | 409 | 422 => CommerceError::Rejected(message),
        status => CommerceError::Network(format!("HTTP {}: {}", status, message)),
    })
}

pub(crate) fn from_auth(error: AuthError) -> CommerceError {
    match error {
        AuthError::Fetch(e) => from_fetch(e),
        e if e.is_auth_failure() => CommerceError::Auth(e.to_string()),
        e => CommerceError::Network(e.to_string()),
    }
}

pub(crate) fn from_fetch(error: FetchError) -> CommerceError {
    CommerceError::Network(error.to_string())
}
