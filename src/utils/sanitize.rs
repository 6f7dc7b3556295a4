//! Utilities for sanitizing error messages.
//!
//! Removes control characters from messages before they are stored in a run
//! summary or logged, and caps their length.

/// Sanitizes an error message by removing control characters.
///
/// Newline, tab and carriage return are kept; every other character below
/// 0x20 is dropped. Non-ASCII text is preserved.
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 || code == 0x09 || code == 0x0A || code == 0x0D
        })
        .filter(|c| *c != '\u{7F}')
        .collect()
}

/// Sanitizes, flattens to one line and truncates an error message.
///
/// Messages longer than `MAX_ERROR_MESSAGE_LENGTH` characters are cut at a
/// character boundary and suffixed with the original length.
pub fn sanitize_and_truncate_error_message(message: &str) -> String {
    let sanitized = sanitize_error_message(message);
    let single_line = sanitized.split_whitespace().collect::<Vec<_>>().join(" ");

    let char_count = single_line.chars().count();
    if char_count > crate::config::MAX_ERROR_MESSAGE_LENGTH {
        // Leave room for the truncation note
        let keep = crate::config::MAX_ERROR_MESSAGE_LENGTH.saturating_sub(50);
        let truncated: String = single_line.chars().take(keep).collect();
        format!(
            "{}... (truncated, original length: {} chars)",
            truncated, char_count
        )
    } else {
        single_line
    }
}
