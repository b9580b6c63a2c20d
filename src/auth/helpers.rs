use crate::error::AuthFailure;

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthFailure> {
    let header = header.ok_or(AuthFailure::Missing)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthFailure::Malformed)?
        .trim();

    if token.is_empty() {
        return Err(AuthFailure::Malformed);
    }
    Ok(token)
}
