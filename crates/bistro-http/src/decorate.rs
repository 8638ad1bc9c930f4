//! Request decoration.

use reqwest::RequestBuilder;

/// Attach `token` as a bearer credential.
///
/// With no token the request goes out unauthenticated; the server's 401 is
/// then handled by the refresh path like any other expired credential.
pub(crate) fn decorate(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}
