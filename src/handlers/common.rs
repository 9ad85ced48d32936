use crate::{errors::ServiceError, PaginatedResponse};
use validator::Validate;

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Wraps a service page into the list envelope.
pub fn paginate<T, U>(
    (items, total): (Vec<T>, u64),
    page: Option<u64>,
    limit: u64,
) -> PaginatedResponse<U>
where
    U: From<T>,
{
    PaginatedResponse::new(
        items.into_iter().map(U::from).collect(),
        total,
        page.unwrap_or(1).max(1),
        limit,
    )
}
