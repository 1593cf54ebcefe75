//! Tolerant response-shape extraction.
//!
//! The backend gateway fronts several services that disagree on where they
//! put tokens in a response body: flat fields, camelCase or snake_case,
//! nested under `data`, `data.data`, `result` or `tokens` wrappers. Rather
//! than pinning one shape, extraction walks an ordered list of candidate
//! paths and takes the first non-empty string match. New shapes are handled
//! by adding a path, not another conditional.

use serde_json::Value;
use std::collections::HashMap;

/// Candidate locations for an access token, in priority order.
const ACCESS_TOKEN_PATHS: &[&str] = &[
    "access_token",
    "accessToken",
    "token",
    "data.access_token",
    "data.accessToken",
    "data.token",
    "data.data.access_token",
    "data.data.accessToken",
    "data.data.token",
    "result.access_token",
    "result.accessToken",
    "result.token",
    "tokens.access_token",
    "tokens.accessToken",
    "tokens.access.token",
    "data.tokens.access.token",
];

/// Candidate locations for a refresh token, in priority order.
const REFRESH_TOKEN_PATHS: &[&str] = &[
    "refresh_token",
    "refreshToken",
    "data.refresh_token",
    "data.refreshToken",
    "data.data.refresh_token",
    "data.data.refreshToken",
    "tokens.refresh_token",
    "tokens.refreshToken",
    "tokens.refresh.token",
    "data.tokens.refresh.token",
];

/// Candidate locations for the user profile object.
const USER_PATHS: &[&str] = &["user", "data.user", "profile", "data.profile"];

/// Walks a dotted path (`"data.tokens.access.token"`) into a JSON value.
fn value_at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |acc, key| acc.get(key))
}

/// Returns the first non-empty trimmed string found at any of `paths`.
pub fn first_string_at(value: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| {
        value_at(value, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Locates an access token in a response body, under any recognized shape.
pub fn pick_access_token(body: &Value) -> Option<String> {
    first_string_at(body, ACCESS_TOKEN_PATHS)
}

/// Locates a refresh token in a response body, under any recognized shape.
pub fn pick_refresh_token(body: &Value) -> Option<String> {
    first_string_at(body, REFRESH_TOKEN_PATHS)
}

/// Locates the user profile object in a response body.
pub fn pick_user(body: &Value) -> Option<&Value> {
    USER_PATHS
        .iter()
        .find_map(|path| value_at(body, path))
        .filter(|v| v.is_object())
}

/// Extracts a bearer token from a response's `Authorization` header.
///
/// Some deployments return the access token via a response header instead
/// of the body; the `Bearer` prefix is optional and matched
/// case-insensitively.
pub fn bearer_from_header(headers: &HashMap<String, String>) -> Option<String> {
    let value = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("authorization"))
        .map(|(_, v)| v.trim())?;

    let stripped = match value.get(..6) {
        Some(prefix)
            if prefix.eq_ignore_ascii_case("bearer")
                && value[6..].starts_with(|c: char| c.is_whitespace()) =>
        {
            value[6..].trim_start()
        }
        _ => value,
    };

    let token = stripped.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_access_token_shapes() {
        for key in ["access_token", "accessToken", "token"] {
            let body = json!({ key: "abc123" });
            assert_eq!(pick_access_token(&body).as_deref(), Some("abc123"));
        }
    }

    #[test]
    fn test_deeply_nested_access_token() {
        let body = json!({
            "data": { "tokens": { "access": { "token": "nested-abc" } } }
        });
        assert_eq!(pick_access_token(&body).as_deref(), Some("nested-abc"));
    }

    #[test]
    fn test_flat_shape_wins_over_nested() {
        let body = json!({
            "access_token": "flat",
            "data": { "access_token": "nested" }
        });
        assert_eq!(pick_access_token(&body).as_deref(), Some("flat"));
    }

    #[test]
    fn test_empty_string_falls_through_to_next_candidate() {
        let body = json!({
            "access_token": "   ",
            "data": { "accessToken": "real-token" }
        });
        assert_eq!(pick_access_token(&body).as_deref(), Some("real-token"));
    }

    #[test]
    fn test_token_values_are_trimmed() {
        let body = json!({ "token": "  padded  " });
        assert_eq!(pick_access_token(&body).as_deref(), Some("padded"));
    }

    #[test]
    fn test_missing_access_token() {
        let body = json!({ "data": { "unrelated": true } });
        assert!(pick_access_token(&body).is_none());
    }

    #[test]
    fn test_non_string_token_is_ignored() {
        let body = json!({ "access_token": 12345 });
        assert!(pick_access_token(&body).is_none());
    }

    #[test]
    fn test_refresh_token_shapes() {
        let body = json!({ "tokens": { "refresh": { "token": "r-1" } } });
        assert_eq!(pick_refresh_token(&body).as_deref(), Some("r-1"));

        let body = json!({ "data": { "refreshToken": "r-2" } });
        assert_eq!(pick_refresh_token(&body).as_deref(), Some("r-2"));
    }

    #[test]
    fn test_pick_user_shapes() {
        let body = json!({ "data": { "user": { "id": "u-1" } } });
        assert_eq!(pick_user(&body).unwrap()["id"], "u-1");

        let body = json!({ "profile": { "id": "u-2" } });
        assert_eq!(pick_user(&body).unwrap()["id"], "u-2");
    }

    #[test]
    fn test_pick_user_rejects_non_objects() {
        let body = json!({ "user": "not-an-object" });
        assert!(pick_user(&body).is_none());
    }

    #[test]
    fn test_bearer_from_header() {
        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), "Bearer header-tok".to_string());
        assert_eq!(bearer_from_header(&headers).as_deref(), Some("header-tok"));
    }

    #[test]
    fn test_bearer_prefix_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "BEARER  tok".to_string());
        assert_eq!(bearer_from_header(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn test_raw_header_token_without_prefix() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "raw-token".to_string());
        assert_eq!(bearer_from_header(&headers).as_deref(), Some("raw-token"));
    }

    #[test]
    fn test_blank_header_is_none() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer   ".to_string());
        assert!(bearer_from_header(&headers).is_none());

        assert!(bearer_from_header(&HashMap::new()).is_none());
    }
}
