use once_cell::sync::Lazy;
use regex::Regex;

pub fn is_valid_email(string: &str) -> Result<(), String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
        r#"^(?:[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-zA-Z0-9-]*[a-zA-Z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])$"#
    ).unwrap()
    });
    match RE.is_match(string) {
        true => Ok(()),
        false => Err("Enter a valid email address.".to_string()),
    }
}

/// Required text field of bounded length (counted in characters).
pub fn is_present_within(
    value: &str,
    max: usize,
    field: &str,
) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required."));
    }
    is_within(value, max, field)
}

pub fn is_within(value: &str, max: usize, field: &str) -> Result<(), String> {
    match value.chars().count() <= max {
        true => Ok(()),
        false => Err(format!("{field} must be at most {max} characters.")),
    }
}

pub fn is_acceptable_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err(
            "This password is too short. It must contain at least 8 characters."
                .to_string(),
        );
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("This password is entirely numeric.".to_string());
    }
    Ok(())
}

/// Statistics are stored as text of one or two digits.
pub fn is_stat_value(value: &str) -> Result<(), String> {
    match !value.is_empty()
        && value.len() <= 2
        && value.chars().all(|c| c.is_ascii_digit())
    {
        true => Ok(()),
        false => Err("should be a number between 0 and 99".to_string()),
    }
}

#[cfg(test)]
#[test]
fn test_email() {
    assert!(is_valid_email("hello@example.com").is_ok());
    assert!(is_valid_email("Jane.Doe@Example.COM").is_ok());
    assert!(is_valid_email("").is_err());
    assert!(is_valid_email("not an email").is_err());
}

#[cfg(test)]
#[test]
fn test_password() {
    assert!(is_acceptable_password("secret123").is_ok());
    assert!(is_acceptable_password("short").is_err());
    assert!(is_acceptable_password("123456789").is_err());
}

#[cfg(test)]
#[test]
fn test_stat_value() {
    assert!(is_stat_value("0").is_ok());
    assert!(is_stat_value("42").is_ok());
    assert!(is_stat_value("").is_err());
    assert!(is_stat_value("100").is_err());
    assert!(is_stat_value("-1").is_err());
}
