use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subscription tier. Stored as a Postgres enum, serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
    Starter,
    Pro,
    Business,
}

impl FromStr for Subscription {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            "business" => Ok(Self::Business),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Business => "business",
        };
        f.write_str(s)
    }
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for re-sending the verification email.
#[derive(Debug, Deserialize)]
pub struct ResendVerifyRequest {
    #[serde(default)]
    pub email: String,
}

/// Request body for changing the subscription tier. The value is parsed
/// manually so an unknown tier yields a 400 with a precise message.
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub subscription: String,
}

/// Public part of the user returned at registration, including the
/// default (gravatar-style) or uploaded avatar.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub email: String,
    pub subscription: Subscription,
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: RegisteredUser,
}

/// Public part of the user returned at login.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub email: String,
    pub subscription: Subscription,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub message: String,
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
