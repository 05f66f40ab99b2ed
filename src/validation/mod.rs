//! Field validators shared by services and DTO handling: password strength,
//! Arabic text, and vehicle plate numbers (Saudi format).

use std::collections::HashMap;

/// Collected field errors, keyed by field name, for 400 responses
pub type FieldErrors = HashMap<String, String>;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Strong-password policy: minimum length plus three character classes
/// (upper, lower, digit) and at least one symbol.
pub fn validate_strong_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a digit".to_string());
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err("Password must contain a symbol".to_string());
    }
    Ok(())
}

/// True when the character belongs to one of the Arabic Unicode blocks
fn is_arabic_char(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}' // Arabic
        | '\u{0750}'..='\u{077F}' // Arabic Supplement
        | '\u{FB50}'..='\u{FDFF}' // Presentation Forms-A
        | '\u{FE70}'..='\u{FEFF}' // Presentation Forms-B
    )
}

/// Validates that the text is Arabic: at least one Arabic letter, and no
/// letters from other scripts. Digits, spaces and common punctuation pass.
pub fn validate_arabic_text(text: &str) -> Result<(), String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Text cannot be empty".to_string());
    }

    let mut has_arabic = false;
    for c in trimmed.chars() {
        if is_arabic_char(c) {
            has_arabic = true;
        } else if c.is_alphabetic() {
            return Err(format!("Non-Arabic letter '{}' in Arabic text", c));
        }
    }

    if !has_arabic {
        return Err("Text contains no Arabic letters".to_string());
    }
    Ok(())
}

/// Letters valid on Saudi plates (a restricted subset of the alphabet)
const PLATE_LATIN_LETTERS: &[char] = &[
    'A', 'B', 'D', 'E', 'G', 'H', 'J', 'K', 'L', 'N', 'R', 'S', 'T', 'U', 'V', 'X', 'Z',
];

const PLATE_ARABIC_LETTERS: &[char] = &[
    'ا', 'ب', 'د', 'ع', 'ق', 'ه', 'ح', 'ك', 'ل', 'ن', 'ر', 'س', 'ط', 'و', 'ى', 'ص', 'م',
];

/// Validates a vehicle plate: 1-4 digits plus exactly 3 letters, either
/// Latin (e.g. "ABC 1234") or Arabic, in any order, with optional spaces
/// or dashes. Returns the normalized form (letters, space, digits).
pub fn validate_plate_number(plate: &str) -> Result<String, String> {
    let mut letters = Vec::new();
    let mut digits = Vec::new();

    for c in plate.chars() {
        if c == ' ' || c == '-' {
            continue;
        }
        if c.is_ascii_digit() {
            digits.push(c);
        } else if PLATE_LATIN_LETTERS.contains(&c.to_ascii_uppercase()) {
            letters.push(c.to_ascii_uppercase());
        } else if PLATE_ARABIC_LETTERS.contains(&c) {
            letters.push(c);
        } else {
            return Err(format!("Invalid plate character: '{}'", c));
        }
    }

    if letters.len() != 3 {
        return Err("Plate must contain exactly 3 letters".to_string());
    }
    if digits.is_empty() || digits.len() > 4 {
        return Err("Plate must contain 1 to 4 digits".to_string());
    }

    let letters: String = letters.into_iter().collect();
    let digits: String = digits.into_iter().collect();
    Ok(format!("{} {}", letters, digits))
}

/// Basic email shape check, sufficient for uniqueness-keyed login addresses
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err("Invalid email format".to_string());
    }
    if email.chars().any(|c| c.is_whitespace()) {
        return Err("Email cannot contain whitespace".to_string());
    }
    Ok(())
}

/// URL-safe slug: lowercase alphanumerics and hyphens, 2-50 chars
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.len() < 2 || slug.len() > 50 {
        return Err("Slug must be 2-50 characters".to_string());
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err("Slug can only contain lowercase letters, digits, and hyphens".to_string());
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err("Slug cannot start or end with a hyphen".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_rules() {
        assert!(validate_strong_password("Str0ng!Pass").is_ok());
        assert!(validate_strong_password("short1!A").is_ok());
        assert!(validate_strong_password("sh0r!A").is_err()); // too short
        assert!(validate_strong_password("alllowercase1!").is_err());
        assert!(validate_strong_password("ALLUPPERCASE1!").is_err());
        assert!(validate_strong_password("NoDigitsHere!").is_err());
        assert!(validate_strong_password("NoSymbols123A").is_err());
    }

    #[test]
    fn arabic_text_accepts_arabic() {
        assert!(validate_arabic_text("مدرسة الرياض الابتدائية").is_ok());
        assert!(validate_arabic_text("مدرسة 12").is_ok());
    }

    #[test]
    fn arabic_text_rejects_latin_and_empty() {
        assert!(validate_arabic_text("Riyadh School").is_err());
        assert!(validate_arabic_text("مدرسة Riyadh").is_err());
        assert!(validate_arabic_text("   ").is_err());
        assert!(validate_arabic_text("123").is_err());
    }

    #[test]
    fn plate_latin_forms() {
        assert_eq!(validate_plate_number("ABD 1234").unwrap(), "ABD 1234");
        assert_eq!(validate_plate_number("1234-ABD").unwrap(), "ABD 1234");
        assert_eq!(validate_plate_number("a b d 7").unwrap(), "ABD 7");
    }

    #[test]
    fn plate_arabic_form() {
        assert!(validate_plate_number("ا ب د 1234").is_ok());
    }

    #[test]
    fn plate_rejects_bad_shapes() {
        assert!(validate_plate_number("AB 1234").is_err()); // 2 letters
        assert!(validate_plate_number("ABDE 123").is_err()); // 4 letters
        assert!(validate_plate_number("ABD 12345").is_err()); // 5 digits
        assert!(validate_plate_number("ABD").is_err()); // no digits
        assert!(validate_plate_number("ABI 123").is_err()); // I not a plate letter
        assert!(validate_plate_number("AB* 123").is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("ops@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn slug_shapes() {
        assert!(validate_slug("al-noor-schools").is_ok());
        assert!(validate_slug("x").is_err());
        assert!(validate_slug("Bad_Slug").is_err());
        assert!(validate_slug("-leading").is_err());
    }
}
