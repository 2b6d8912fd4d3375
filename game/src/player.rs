use thiserror::Error;

/// Identity collected at registration. Held for the process, never persisted as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
}

impl Player {
    /// Trims every field and rejects blanks and obviously malformed email addresses.
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
    ) -> Result<Self, RegistrationError> {
        let first_name = required("first name", first_name)?;
        let last_name = required("last name", last_name)?;
        let email = required("email", email)?;
        let phone = required("phone", phone)?;

        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(RegistrationError::InvalidEmail(email)),
        }

        Ok(Self {
            first_name,
            last_name,
            email,
            phone,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

fn required(field: &'static str, value: &str) -> Result<String, RegistrationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RegistrationError::Missing(field))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
pub(crate) fn sample_player() -> Player {
    Player {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "0123456789".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_trimmed() {
        let player = Player::new("  Ada ", "Lovelace", " ada@example.com", "0123")
            .expect("valid registration");
        assert_eq!(player.first_name(), "Ada");
        assert_eq!(player.email(), "ada@example.com");
    }

    #[test]
    fn blank_fields_are_rejected_in_order() {
        assert_eq!(
            Player::new("   ", "", "", ""),
            Err(RegistrationError::Missing("first name"))
        );
        assert_eq!(
            Player::new("Ada", "Lovelace", "ada@example.com", " "),
            Err(RegistrationError::Missing("phone"))
        );
    }

    #[test]
    fn email_needs_text_around_the_at_sign() {
        for bad in ["ada", "@example.com", "ada@"] {
            assert!(matches!(
                Player::new("Ada", "Lovelace", bad, "0123"),
                Err(RegistrationError::InvalidEmail(_))
            ));
        }
    }
}
