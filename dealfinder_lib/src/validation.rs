use crate::error::DealFinderError;

pub const MAX_SEARCH_LENGTH: usize = 100;
pub const MAX_PAGES_LIMIT: u32 = 50;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// then enforce a byte-length limit on what remains.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, DealFinderError> {
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(DealFinderError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    if sanitized.len() > max_len {
        return Err(DealFinderError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    Ok(sanitized)
}

/// Validate a search term: required, length-limited, control chars stripped.
pub fn validate_search(input: &str) -> Result<String, DealFinderError> {
    sanitize_text(input, MAX_SEARCH_LENGTH).map_err(|e| match e {
        DealFinderError::InvalidInput(msg) => {
            DealFinderError::InvalidInput(format!("search term: {}", msg))
        }
        other => other,
    })
}

/// Validate a price bound in whole euros. Blank input means "no bound".
pub fn validate_price(input: &str) -> Result<Option<u32>, DealFinderError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(DealFinderError::InvalidInput(format!(
            "price '{}' must be a whole number of euros",
            input
        )));
    }
    trimmed.parse().map(Some).map_err(|_| {
        DealFinderError::InvalidInput(format!("price '{}' is out of range", input))
    })
}

/// Validate that the lower bound does not exceed the upper bound.
pub fn validate_price_range(
    min_price: Option<u32>,
    max_price: Option<u32>,
) -> Result<(), DealFinderError> {
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(DealFinderError::InvalidInput(format!(
                "minimum price {} exceeds maximum price {}",
                min, max
            )));
        }
    }
    Ok(())
}

/// Validate the page limit (must be 1..=50).
pub fn validate_max_pages(max_pages: u32) -> Result<u32, DealFinderError> {
    if !(1..=MAX_PAGES_LIMIT).contains(&max_pages) {
        return Err(DealFinderError::InvalidInput(format!(
            "max_pages must be between 1 and {}",
            MAX_PAGES_LIMIT
        )));
    }
    Ok(max_pages)
}
