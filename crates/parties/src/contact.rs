use serde::{Deserialize, Serialize};

use realtyops_core::{DomainError, DomainResult};

/// Contact details shared by leads and clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactInfo {
    /// Trim both fields, drop blanks and sanity-check the email.
    ///
    /// Only the shape `local@domain.tld` is checked; deliverability is not.
    pub fn normalized(self) -> DomainResult<Self> {
        let email = non_blank(self.email).map(|e| e.to_lowercase());
        if let Some(email) = &email {
            if !looks_like_email(email) {
                return Err(DomainError::field("email", "is not a valid address"));
            }
        }

        let phone = non_blank(self.phone);
        if let Some(phone) = &phone {
            if !phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
            {
                return Err(DomainError::field("phone", "may only contain digits, spaces and + - ( )"));
            }
        }

        Ok(Self { email, phone })
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
}
