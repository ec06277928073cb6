//! Centralized validation and helper functions for punch input.

/// Maximum number of punches accepted from a single card or file
pub const MAX_PUNCHES: usize = 10_000;

/// Longest accepted punched code
pub const MAX_CODE_LENGTH: usize = 16;

/// Validate a punched control code: ASCII letters and digits only.
///
/// # Examples
///
/// ```
/// use orient_results::utils::validation::is_valid_code;
///
/// assert!(is_valid_code("31"));
/// assert!(is_valid_code("105T"));
/// assert!(!is_valid_code(""));
/// assert!(!is_valid_code("31 41"));
/// ```
#[must_use]
pub fn is_valid_code(s: &str) -> bool {
    !s.is_empty() && s.len() <= MAX_CODE_LENGTH && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Normalize a punched code: trim, drop leading zeros of the number part and
/// uppercase the answer letter.
///
/// Returns None if the input is not a valid code.
#[must_use]
pub fn normalize_code(s: &str) -> Option<String> {
    let s = s.trim();
    if !is_valid_code(s) {
        return None;
    }

    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let (number, rest) = s.split_at(digits);
    let number = number.trim_start_matches('0');
    let number = if number.is_empty() && digits > 0 { "0" } else { number };

    Some(format!("{number}{}", rest.to_uppercase()))
}

/// Check if adding another punch would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new punch.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_punch_limit(count: usize) -> Option<String> {
    if count >= MAX_PUNCHES {
        Some(format!(
            "Too many punches: adding another would exceed maximum of {MAX_PUNCHES}"
        ))
    } else {
        None
    }
}

/// Split a comma or whitespace separated list of control expressions.
///
/// Commas inside parentheses belong to the expression, so `31(31,131)` stays
/// one item.
#[must_use]
pub fn split_code_list(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth > 0 => current.push(c),
            c if c == ',' || c.is_whitespace() => {
                if !current.is_empty() {
                    items.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        items.push(current);
    }

    items
}
