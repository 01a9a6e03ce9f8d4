use serde::{Deserialize, Serialize};

use crate::checkins::repo_types::CheckinView;
use crate::users::repo_types::User;
use crate::validate::{is_valid_email, Rule};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl SignupRequest {
    pub const RULES: &'static [Rule<Self>] = &[
        Rule {
            field: "email",
            message: "Please provide a valid email.",
            check: |r: &Self| is_valid_email(&r.email),
        },
        Rule {
            field: "password",
            message: "Please provide a password.",
            check: |r: &Self| !r.password.is_empty(),
        },
        Rule {
            field: "username",
            message: "Please provide a username.",
            check: |r: &Self| !r.username.is_empty(),
        },
    ];
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued on signup and login: the token plus the bare user id.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserIdBody,
}

#[derive(Debug, Serialize)]
pub struct UserIdBody {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub checkins: Vec<CheckinView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub about_you: Option<String>,
}

impl UpdateProfileRequest {
    pub const RULES: &'static [Rule<Self>] = &[
        Rule {
            field: "username",
            message: "Please provide a username.",
            check: |r: &Self| !r.username.is_empty(),
        },
        Rule {
            field: "email",
            message: "Please provide a valid email.",
            check: |r: &Self| is_valid_email(&r.email),
        },
    ];
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedProfileResponse {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub about_you: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    pub delete_password: String,
    pub confirm_delete_password: String,
}

/// Business outcome of password change and account delete. Always a 200;
/// callers must check `success`.
#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub message: String,
    pub success: bool,
}

impl OutcomeResponse {
    pub fn succeeded(message: &str) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}
