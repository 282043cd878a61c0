const MAX_ERROR_LENGTH: usize = 2_000;

/// Cap tool error output before it goes into an error message.
pub fn truncate_error(error: &str) -> String {
    if error.len() <= MAX_ERROR_LENGTH {
        error.to_string()
    } else {
        let mut end = MAX_ERROR_LENGTH;
        while !error.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &error[..end])
    }
}
