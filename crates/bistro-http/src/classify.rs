//! Endpoint classification.
//!
//! Exempt endpoints are the ones reachable without a session. They never get
//! a bearer header, and a 401 from them is handed straight to the caller.
//! The refresh endpoint is exempt so that its own 401 can never recurse into
//! another refresh.

use crate::endpoints::{
    FORGOT_PASSWORD, REFRESH, RESEND_VERIFICATION, RESET_PASSWORD, SIGN_IN, SIGN_UP,
    VERIFY_EMAIL, VERIFY_RESET_TOKEN,
};

/// How the coordinator treats a request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Sent without credentials; failures go straight to the caller.
    Exempt,
    /// Decorated with the access token and eligible for refresh.
    Protected,
}

const EXEMPT_PATHS: &[&str] = &[
    SIGN_IN,
    SIGN_UP,
    REFRESH,
    VERIFY_EMAIL,
    RESEND_VERIFICATION,
    FORGOT_PASSWORD,
    RESET_PASSWORD,
];

const EXEMPT_PREFIXES: &[&str] = &[VERIFY_RESET_TOKEN];

/// Classify a request target by its path.
///
/// The query string and a trailing slash are ignored and the match is
/// case-insensitive.
pub fn classify(target: &str) -> RequestClass {
    let path = normalize(target);

    let exempt = EXEMPT_PATHS
        .iter()
        .any(|exempt| path == normalize(exempt))
        || EXEMPT_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix) && path.len() > prefix.len());

    if exempt {
        RequestClass::Exempt
    } else {
        RequestClass::Protected
    }
}

/// Returns true when `target` must be sent without credentials.
pub fn is_exempt(target: &str) -> bool {
    classify(target) == RequestClass::Exempt
}

fn normalize(target: &str) -> String {
    let path = target
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
        .to_ascii_lowercase();

    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_sign_up_and_refresh_are_exempt() {
        assert!(is_exempt("/api/auth/signin"));
        assert!(is_exempt("/api/auth/signup"));
        assert!(is_exempt("/api/auth/refresh"));
    }

    #[test]
    fn onboarding_endpoints_are_exempt() {
        assert!(is_exempt("/api/auth/verify-email"));
        assert!(is_exempt("/api/auth/resend-verification"));
        assert!(is_exempt("/api/auth/forgot-password"));
        assert!(is_exempt("/api/auth/reset-password"));
        assert!(is_exempt("/api/auth/verify-reset-token/abc123"));
    }

    #[test]
    fn match_ignores_case_query_and_trailing_slash() {
        assert!(is_exempt("/API/Auth/SignIn/"));
        assert!(is_exempt("api/auth/refresh?source=retry"));
    }

    #[test]
    fn everything_else_is_protected() {
        assert_eq!(classify("/api/orders"), RequestClass::Protected);
        assert_eq!(classify("/api/account/"), RequestClass::Protected);
        assert_eq!(classify("/api/auth/logout"), RequestClass::Protected);
        assert_eq!(classify("/api/auth/change-password"), RequestClass::Protected);
        assert_eq!(
            classify("/api/auth/create-organization"),
            RequestClass::Protected
        );
    }

    #[test]
    fn lookalike_paths_are_protected() {
        assert!(!is_exempt("/api/auth/signin-history"));
        assert!(!is_exempt("/api/auth/verify-reset-token/"));
        assert!(!is_exempt("/admin/api/auth/refresh"));
    }
}
