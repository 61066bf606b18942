use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// Wraps personal data (customer e-mail addresses) so that it never reaches the logs verbatim.
///
/// `Debug` hides the value entirely; `Display` keeps just enough of an e-mail address
/// (first character and domain) to correlate a log line with a support ticket.
/// Serialization is NOT masked: API responses and outgoing mail need the real value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0.as_ref();
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                let first = local.chars().next().unwrap_or('*');
                write!(f, "{}***@{}", first, domain)
            }
            _ => write!(f, "********"),
        }
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl From<String> for Masked<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_masked_in_logs() {
        let email = Masked("alice@example.com".to_string());
        assert_eq!(format!("{}", email), "a***@example.com");
        assert_eq!(format!("{:?}", email), "********");
    }

    #[test]
    fn test_non_email_is_fully_masked() {
        let token = Masked("secret-token".to_string());
        assert_eq!(token.to_string(), "********");
        assert_eq!(Masked("@nolocal".to_string()).to_string(), "********");
    }

    #[test]
    fn test_serialization_keeps_real_value() {
        let email = Masked("bob@example.com".to_string());
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"bob@example.com\"");

        let back: Masked<String> = serde_json::from_str("\"bob@example.com\"").unwrap();
        assert_eq!(back.expose(), "bob@example.com");
    }
}
