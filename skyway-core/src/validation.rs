//! Checks run before a mutating request is sent. A failed check means no
//! request goes out; the message is meant to be shown to the user as is.

use crate::booking::Booking;
use crate::flight::FlightStatus;
use crate::rating::{MAX_SCORE, MIN_SCORE};
use crate::{CoreError, CoreResult};

pub const MIN_REJECTION_REASON_LEN: usize = 10;
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

fn invalid(message: &str) -> CoreError {
    CoreError::ValidationError(message.to_string())
}

/// A score must be picked (0 means "nothing selected") and the flight must
/// have completed.
pub fn validate_rating(score: u8, flight_status: FlightStatus) -> CoreResult<u8> {
    validate_score(score)?;
    if flight_status != FlightStatus::Completed {
        return Err(invalid("You can only rate completed flights"));
    }
    Ok(score)
}

/// Score check on its own, for edits of an existing rating.
pub fn validate_score(score: u8) -> CoreResult<u8> {
    if score == 0 {
        return Err(invalid("Please select a rating"));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(invalid("Rating must be between 1 and 5"));
    }
    Ok(score)
}

/// Returns the trimmed reason.
pub fn validate_rejection_reason(reason: &str) -> CoreResult<String> {
    let trimmed = reason.trim();
    if trimmed.is_empty() || reason.chars().count() < MIN_REJECTION_REASON_LEN {
        return Err(invalid("Rejection reason must be at least 10 characters"));
    }
    Ok(trimmed.to_string())
}

/// Normalise free-form amount input: digits and one dot, at most two
/// decimals. `"1a2.3.4"` becomes `"12.3"`, `"5.678"` becomes `"5.67"`.
pub fn sanitize_amount_input(raw: &str) -> String {
    let mut value: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

    if value.matches('.').count() > 1 {
        if let Some(last_dot) = value.rfind('.') {
            value.truncate(last_dot);
        }
    }

    let mut parts = value.split('.');
    if let (Some(integer), Some(decimals)) = (parts.next(), parts.next()) {
        let decimals: String = decimals.chars().take(2).collect();
        value = format!("{}.{}", integer, decimals);
    }

    value
}

pub fn validate_deposit(amount: &str) -> CoreResult<f64> {
    parse_positive_amount(amount)
}

pub fn validate_withdrawal(amount: &str, current_balance: f64) -> CoreResult<f64> {
    let value = parse_positive_amount(amount)?;
    if value > current_balance {
        return Err(invalid("Insufficient balance for this withdrawal"));
    }
    Ok(value)
}

fn parse_positive_amount(amount: &str) -> CoreResult<f64> {
    match amount.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(invalid("Please enter a valid amount")),
    }
}

pub fn validate_avatar(content_type: &str, size_bytes: usize) -> CoreResult<()> {
    if !content_type.starts_with("image/") {
        return Err(invalid("Please select an image file"));
    }
    if size_bytes > MAX_AVATAR_BYTES {
        return Err(invalid("Image size must be less than 5MB"));
    }
    Ok(())
}

pub fn validate_booking_cancellation(booking: &Booking) -> CoreResult<()> {
    if booking.is_cancellable() {
        Ok(())
    } else {
        Err(invalid("This booking can no longer be cancelled"))
    }
}
