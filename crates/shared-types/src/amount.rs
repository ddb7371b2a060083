//! # Amounts
//!
//! Protocol amounts travel the wire as decimal integer strings and are
//! computed on as [`U256`]. Negative values, decimals and non-numeric
//! strings are rejected at the parse boundary so arithmetic downstream
//! only ever sees valid non-negative integers.

use primitive_types::U256;
use thiserror::Error;

/// Amount parsing/arithmetic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The string is not a non-negative decimal integer.
    #[error("invalid amount: {raw:?}")]
    InvalidAmount { raw: String },

    /// Addition overflowed 256 bits.
    #[error("amount overflow")]
    Overflow,

    /// Subtraction would produce a negative amount.
    #[error("amount underflow")]
    Underflow,
}

/// Parse a decimal integer string into a `U256`.
///
/// Only ASCII digits are accepted: no sign, no decimal point, no
/// whitespace. An empty string is invalid.
pub fn parse(raw: &str) -> Result<U256, AmountError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidAmount {
            raw: raw.to_string(),
        });
    }
    U256::from_dec_str(raw).map_err(|_| AmountError::InvalidAmount {
        raw: raw.to_string(),
    })
}

/// Render an amount back to its wire form.
pub fn format(amount: U256) -> String {
    amount.to_string()
}

/// Checked addition.
pub fn add(left: U256, right: U256) -> Result<U256, AmountError> {
    left.checked_add(right).ok_or(AmountError::Overflow)
}

/// Checked subtraction; underflow means the caller tried to go negative.
pub fn sub(left: U256, right: U256) -> Result<U256, AmountError> {
    left.checked_sub(right).ok_or(AmountError::Underflow)
}
