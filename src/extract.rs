//! Contact extractor — mines free-text message bodies for phone numbers
//! and email addresses.
//!
//! Pure: extraction never mutates the message and never deduplicates.
//! Deduplication, if any, is a ledger-level concern.

use regex::Regex;

/// Extraction result. Both vectors are empty (never absent) when nothing
/// matched; duplicates within one call are retained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub phone_numbers: Vec<String>,
    pub emails: Vec<String>,
}

impl ContactDetails {
    pub fn is_empty(&self) -> bool {
        self.phone_numbers.is_empty() && self.emails.is_empty()
    }
}

/// Compiled contact patterns.
pub struct ContactExtractor {
    /// Regional 10-digit mobile number, first digit 6-9, optionally
    /// prefixed with the country code or a leading zero.
    phone: Regex,
    /// Prefix stripped during normalization so every returned number is
    /// exactly 10 digits.
    phone_prefix: Regex,
    email: Regex,
}

impl ContactExtractor {
    pub fn new() -> Self {
        Self {
            phone: Regex::new(r"(?:\+91|0)?[6789][0-9]{9}").unwrap(),
            phone_prefix: Regex::new(r"^(?:\+91|0)").unwrap(),
            email: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap(),
        }
    }

    /// Extract all phone numbers and emails from `text`.
    pub fn extract(&self, text: &str) -> ContactDetails {
        let phone_numbers = self
            .phone
            .find_iter(text)
            .map(|m| self.phone_prefix.replace(m.as_str(), "").into_owned())
            .collect();

        let emails = self
            .email
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        ContactDetails {
            phone_numbers,
            emails,
        }
    }
}

impl Default for ContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_prefixed_phone_and_email() {
        let details = ContactExtractor::new().extract("+91 9876543210, reach me at a@b.com");
        assert_eq!(details.phone_numbers, vec!["9876543210"]);
        assert_eq!(details.emails, vec!["a@b.com"]);
    }

    #[test]
    fn strips_country_code_and_leading_zero() {
        let extractor = ContactExtractor::new();
        assert_eq!(
            extractor.extract("call +919876543210").phone_numbers,
            vec!["9876543210"]
        );
        assert_eq!(
            extractor.extract("call 09876543210").phone_numbers,
            vec!["9876543210"]
        );
    }

    #[test]
    fn no_contact_yields_empty_vectors() {
        let details = ContactExtractor::new().extract("no contact here");
        assert!(details.phone_numbers.is_empty());
        assert!(details.emails.is_empty());
        assert!(details.is_empty());
    }

    #[test]
    fn rejects_first_digit_outside_mobile_range() {
        let details = ContactExtractor::new().extract("id 5432109876 is not a mobile");
        assert!(details.phone_numbers.is_empty());
    }

    #[test]
    fn retains_multiple_matches_without_dedup() {
        let details =
            ContactExtractor::new().extract("9876543210 or 9876543210, a@b.com / c@d.org");
        assert_eq!(details.phone_numbers, vec!["9876543210", "9876543210"]);
        assert_eq!(details.emails, vec!["a@b.com", "c@d.org"]);
    }

    #[test]
    fn email_match_is_case_insensitive_shape() {
        let details = ContactExtractor::new().extract("Mail Me@Example.COM today");
        assert_eq!(details.emails, vec!["Me@Example.COM"]);
    }
}
