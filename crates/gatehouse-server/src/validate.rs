use chrono::NaiveDate;

use crate::error::AppError;

pub const GENDERS: [&str; 4] = ["male", "female", "other", "prefer-not-to-say"];

/// Trim, lowercase, and shape-check an email address.
///
/// Normalization happens here because every boundary (issue, redeem, lookup)
/// funnels through this function; two spellings of one address must always
/// resolve to the same pending entry and the same account row.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();

    if email.is_empty() || email.len() > 254 {
        return Err(AppError::Validation("Invalid email address".into()));
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(AppError::Validation("Invalid email address".into())),
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::Validation("Invalid email address".into()));
    }

    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_full_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.chars().count() < 2 || name.chars().count() > 50 {
        return Err(AppError::Validation(
            "Full name must be between 2 and 50 characters".into(),
        ));
    }
    Ok(name.to_string())
}

pub fn validate_bio(bio: &str) -> Result<(), AppError> {
    if bio.chars().count() > 500 {
        return Err(AppError::Validation(
            "Bio must be at most 500 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_gender(gender: &str) -> Result<(), AppError> {
    if !GENDERS.contains(&gender) {
        return Err(AppError::Validation("Invalid gender value".into()));
    }
    Ok(())
}

pub fn validate_dob(dob: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::Validation("Date of birth must be YYYY-MM-DD".into()))
}
