use std::fmt;

use super::fields::{FormFields, UploadFile};

/// Required-field failures that keep a submission from leaving the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a CSV file is required")]
    MissingFile,
    #[error("weights are required")]
    MissingWeights,
    #[error("impacts are required")]
    MissingImpacts,
    #[error("an e-mail address is required when sending the result by mail")]
    MissingEmail,
    #[error("'{0}' is not a valid e-mail address")]
    InvalidEmail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Accepts what an `<input type="email">` accepts: one `@`, a non-empty
    /// local part and a dotted domain without empty labels.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingEmail);
        }

        let invalid = || ValidationError::InvalidEmail(trimmed.to_string());
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(invalid());
        }
        if domain.split('.').any(|label| label.is_empty()) {
            return Err(invalid());
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether the backend should mail the result, decided once at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailDelivery {
    NoEmail,
    WithEmail(EmailAddress),
}

impl MailDelivery {
    pub fn address(&self) -> Option<&EmailAddress> {
        match self {
            MailDelivery::NoEmail => None,
            MailDelivery::WithEmail(address) => Some(address),
        }
    }

    pub fn send_mail(&self) -> bool {
        matches!(self, MailDelivery::WithEmail(_))
    }
}

/// A form snapshot that passed the required-field constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub file: UploadFile,
    pub weights: String,
    pub impacts: String,
    pub delivery: MailDelivery,
}

impl FormInput {
    /// Mirrors the native `required` constraint: only empty values are
    /// missing. Token counts are not checked here; the backend owns that rule.
    pub fn from_fields(fields: &FormFields) -> Result<Self, ValidationError> {
        let file = fields
            .file
            .as_ref()
            .filter(|file| !file.is_blank())
            .cloned()
            .ok_or(ValidationError::MissingFile)?;

        if fields.weights.is_empty() {
            return Err(ValidationError::MissingWeights);
        }
        if fields.impacts.is_empty() {
            return Err(ValidationError::MissingImpacts);
        }

        let delivery = if fields.send_mail {
            MailDelivery::WithEmail(EmailAddress::parse(&fields.email)?)
        } else {
            MailDelivery::NoEmail
        };

        Ok(Self {
            file,
            weights: fields.weights.clone(),
            impacts: fields.impacts.clone(),
            delivery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormFields {
        FormFields {
            file: Some(UploadFile::new("data.csv", None, b"Fund,P1\nM1,0.8\n".to_vec())),
            weights: "1".to_string(),
            impacts: "+".to_string(),
            email: String::new(),
            send_mail: false,
        }
    }

    #[test]
    fn complete_fields_without_mail() {
        let input = FormInput::from_fields(&filled()).expect("valid");
        assert_eq!(input.delivery, MailDelivery::NoEmail);
        assert_eq!(input.weights, "1");
    }

    #[test]
    fn email_is_ignored_while_send_mail_is_off() {
        let mut fields = filled();
        fields.email = "not-an-address".to_string();
        let input = FormInput::from_fields(&fields).expect("valid");
        assert!(!input.delivery.send_mail());
    }

    #[test]
    fn required_fields_are_checked_in_form_order() {
        let mut fields = filled();
        fields.file = None;
        fields.weights = "  ".to_string();
        assert_eq!(
            FormInput::from_fields(&fields),
            Err(ValidationError::MissingFile)
        );

        fields.file = Some(UploadFile::new("", None, Vec::new()));
        assert_eq!(
            FormInput::from_fields(&fields),
            Err(ValidationError::MissingFile)
        );

        let mut fields = filled();
        fields.weights.clear();
        assert_eq!(
            FormInput::from_fields(&fields),
            Err(ValidationError::MissingWeights)
        );

        let mut fields = filled();
        fields.impacts.clear();
        assert_eq!(
            FormInput::from_fields(&fields),
            Err(ValidationError::MissingImpacts)
        );
    }

    #[test]
    fn whitespace_values_are_left_for_the_backend() {
        let mut fields = filled();
        fields.weights = "  ".to_string();
        fields.impacts = " ".to_string();
        let input = FormInput::from_fields(&fields).expect("valid");
        assert_eq!(input.weights, "  ");
        assert_eq!(input.impacts, " ");
    }

    #[test]
    fn send_mail_requires_an_address() {
        let mut fields = filled();
        fields.send_mail = true;
        assert_eq!(
            FormInput::from_fields(&fields),
            Err(ValidationError::MissingEmail)
        );

        fields.email = " analyst@example.com ".to_string();
        let input = FormInput::from_fields(&fields).expect("valid");
        assert_eq!(
            input.delivery.address().map(EmailAddress::as_str),
            Some("analyst@example.com")
        );
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for raw in ["plain", "@example.com", "a@", "a@b@c", "a@example..com", "a b@c.d"] {
            assert!(
                matches!(
                    EmailAddress::parse(raw),
                    Err(ValidationError::InvalidEmail(_))
                ),
                "{raw} should be rejected"
            );
        }
        assert!(EmailAddress::parse("ops@localhost").is_ok());
    }
}
