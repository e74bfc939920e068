//! Validation utilities for the inventory management platform

use rust_decimal::Decimal;

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate username format (3-30 chars, lowercase alphanumeric plus `_` and `.`)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 30 {
        return Err("Username must be at most 30 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
    {
        return Err("Username must be lowercase alphanumeric");
    }
    Ok(())
}

/// A material is low on stock when its balance has fallen below its
/// reorder threshold. Used as the primary sort key of material listings.
pub fn is_low_stock(stock: Decimal, threshold: Decimal) -> bool {
    stock < threshold
}
