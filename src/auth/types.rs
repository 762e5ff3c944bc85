use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered JWT claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    pub iss: String,
    pub sub: String, // User id
    pub iat: i64,
    pub exp: i64,
}

/// Request body for POST /api/login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub expires_in_seconds: Option<i64>,
}

/// Response body for POST /api/login
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
    pub token: String,
    pub refresh_token: String,
}

/// Response body for POST /api/refresh
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RefreshResponse {
    pub token: String,
}

/// Identity attached to a request by the authentication middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_without_ttl() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email": "a@b.com", "password": "secret123"}"#).unwrap();
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.expires_in_seconds, None);
    }

    #[test]
    fn test_login_response_field_names() {
        let response = LoginResponse {
            id: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            email: "a@b.com".to_string(),
            is_chirpy_red: false,
            token: "jwt".to_string(),
            refresh_token: "hex".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token"], "jwt");
        assert_eq!(json["refresh_token"], "hex");
        assert_eq!(json["is_chirpy_red"], false);
    }
}
