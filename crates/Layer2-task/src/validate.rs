//! Argument validation for worker launches
//!
//! Arguments end up on a worker's command line, so only decimal digits are
//! allowed through. Anything else is rejected outright; there is no escaping.

/// Accept only strings made entirely of ASCII decimal digits.
///
/// The empty string passes and means "no argument".
pub fn validate(argument: &str) -> bool {
    argument.bytes().all(|b| b.is_ascii_digit())
}
