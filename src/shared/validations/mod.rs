pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    (page, limit)
}

/// Loose e-mail plausibility check used by the domain layer.
///
/// Strict RFC validation happens on the HTTP DTOs via `validator`.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        assert_eq!(validate_pagination(None, None), (1, 20));
        assert_eq!(validate_pagination(Some(0), Some(0)), (1, 1));
    }

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("ana@example.com"));
        assert!(!is_plausible_email("ana.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ana@localhost"));
        assert!(!is_plausible_email("ana@example."));
    }
}
