use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Phone numbers as users type them: digits with an optional leading `+`
    /// and spaces, dashes, dots or parentheses as separators.
    /// - Valid: "+1 (555) 010-2030", "0812.3456.7890", "5550102030"
    /// - Invalid: "call me", "555-CALL", ""
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ().-]*[0-9][0-9 ().-]*$").unwrap();

    /// Identity provider names: a letter followed by letters, digits, `_` or `-`
    /// - Valid: "Google", "EmailPassword", "azure-ad"
    /// - Invalid: "", "1password", "bad name"
    pub static ref PROVIDER_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap();
}

/// Digits of a phone number, in order, with every separator dropped.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}
