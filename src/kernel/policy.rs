//! Default propagation policy for kernel extraction.
//!
//! # Design Decisions
//! - Credentials and cookies never leave the request path: trace storage
//!   may have weaker access control than the services being traced
//! - Payload-framing headers are meaningless to a tracing backend and are
//!   dropped alongside the security set
//! - All comparisons are case-insensitive (per HTTP spec)

/// Header names excluded because they carry credentials or session state.
pub const SECURITY_HEADERS: [&str; 3] = ["authorization", "cookie", "set-cookie"];

/// Header names excluded because they describe payload framing.
pub const PAYLOAD_HEADERS: [&str; 5] = [
    "content-length",
    "content-type",
    "content-range",
    "trailer",
    "transfer-encoding",
];

/// Default kernel predicate: everything except the security and payload
/// header sets is eligible for propagation.
pub fn is_kernel_header(name: &str) -> bool {
    !SECURITY_HEADERS
        .iter()
        .chain(PAYLOAD_HEADERS.iter())
        .any(|excluded| name.eq_ignore_ascii_case(excluded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_headers_excluded() {
        assert!(!is_kernel_header("authorization"));
        assert!(!is_kernel_header("cookie"));
        assert!(!is_kernel_header("set-cookie"));
    }

    #[test]
    fn test_payload_headers_excluded() {
        assert!(!is_kernel_header("content-length"));
        assert!(!is_kernel_header("content-type"));
        assert!(!is_kernel_header("content-range"));
        assert!(!is_kernel_header("trailer"));
        assert!(!is_kernel_header("transfer-encoding"));
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        assert!(!is_kernel_header("Authorization"));
        assert!(!is_kernel_header("AUTHORIZATION"));
        assert!(!is_kernel_header("Set-Cookie"));
        assert!(!is_kernel_header("Content-Type"));
    }

    #[test]
    fn test_propagation_headers_allowed() {
        assert!(is_kernel_header("x-trace-id"));
        assert!(is_kernel_header("traceparent"));
        assert!(is_kernel_header("x-request-id"));
        assert!(is_kernel_header("accept"));
    }
}
