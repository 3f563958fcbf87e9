use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::auth::services::is_valid_email;

fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.len() < 2 {
        return Err("Name must be at least 2 characters".into());
    }
    if name.len() > 50 {
        return Err("Name must be at most 50 characters".into());
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CreateContactRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        if !is_valid_email(&self.email) {
            return Err("Email must be a valid email address".into());
        }
        if !is_valid_phone(&self.phone) {
            return Err("Phone must be a valid international phone number".into());
        }
        Ok(())
    }
}

/// Partial update; at least one field must be present.
#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub favorite: Option<bool>,
}

impl UpdateContactRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.favorite.is_none()
        {
            return Err("Body must have at least one field".into());
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err("Email must be a valid email address".into());
            }
        }
        if let Some(phone) = &self.phone {
            if !is_valid_phone(phone) {
                return Err("Phone must be a valid international phone number".into());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub favorite: bool,
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn create(name: &str, email: &str, phone: &str) -> CreateContactRequest {
        CreateContactRequest {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    #[test]
    fn accepts_a_well_formed_contact() {
        assert!(create("Alice", "alice@x.com", "+380501234567").validate().is_ok());
    }

    #[test]
    fn rejects_short_and_long_names() {
        assert!(create("A", "a@x.com", "+380501234567").validate().is_err());
        let long = "x".repeat(51);
        assert!(create(&long, "a@x.com", "+380501234567").validate().is_err());
    }

    #[test]
    fn rejects_bad_email_and_phone() {
        assert!(create("Alice", "not-an-email", "+380501234567")
            .validate()
            .is_err());
        assert!(create("Alice", "a@x.com", "0-800-LETTERS").validate().is_err());
        assert!(create("Alice", "a@x.com", "+0123").validate().is_err());
    }

    #[test]
    fn phone_plus_prefix_is_optional() {
        assert!(create("Alice", "a@x.com", "380501234567").validate().is_ok());
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let empty = UpdateContactRequest {
            name: None,
            email: None,
            phone: None,
            favorite: None,
        };
        assert_eq!(
            empty.validate().unwrap_err(),
            "Body must have at least one field"
        );

        let only_favorite = UpdateContactRequest {
            name: None,
            email: None,
            phone: None,
            favorite: Some(true),
        };
        assert!(only_favorite.validate().is_ok());
    }

    #[test]
    fn update_validates_present_fields() {
        let bad_email = UpdateContactRequest {
            name: None,
            email: Some("nope".into()),
            phone: None,
            favorite: None,
        };
        assert!(bad_email.validate().is_err());
    }
}
