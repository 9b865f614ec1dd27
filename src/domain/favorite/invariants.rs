use crate::domain::{DomainError, DomainResult};

/// Largest page the favorites endpoint serves
pub const MAX_PAGE_SIZE: u32 = 100;

/// Event identifiers are positive integers
pub fn validate_event_id(event_id: i64) -> DomainResult<()> {
    if event_id <= 0 {
        return Err(DomainError::InvariantViolation(format!(
            "Event id must be positive, got {}",
            event_id
        )));
    }
    Ok(())
}

/// Pages start at 1; page size is 1..=100
pub fn validate_page_params(page: u32, per_page: u32) -> DomainResult<()> {
    if page == 0 {
        return Err(DomainError::InvariantViolation(
            "Page numbers start at 1".to_string(),
        ));
    }
    if per_page == 0 || per_page > MAX_PAGE_SIZE {
        return Err(DomainError::InvariantViolation(format!(
            "Page size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, per_page
        )));
    }
    Ok(())
}
