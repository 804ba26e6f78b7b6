//! URL slugs.

use taleweave_core::error::DomainError;

/// Longest accepted slug.
pub const MAX_SLUG_LEN: usize = 80;

/// Derives a slug from free text: lowercase ASCII alphanumerics separated by
/// single hyphens. Non-ASCII characters are dropped.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_owned()
}

/// Checks that `slug` is already in canonical form.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the slug is empty, too long, or not
/// canonical.
pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    let canonical = !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if canonical {
        Ok(())
    } else {
        Err(DomainError::Validation(format!("invalid slug: {slug:?}")))
    }
}

/// Uses `explicit` when given (after validation), otherwise derives a slug
/// from `fallback`.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the resulting slug is not valid.
pub fn resolve_slug(explicit: Option<&str>, fallback: &str) -> Result<String, DomainError> {
    let slug = match explicit {
        Some(s) => s.trim().to_owned(),
        None => slugify(fallback),
    };
    validate_slug(&slug)?;
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  The  Hollow -- Crown! "), "the-hollow-crown");
        assert_eq!(slugify("Café_Noir 2"), "caf-noir-2");
    }

    #[test]
    fn test_validate_slug_rejects_non_canonical() {
        assert!(validate_slug("ok-slug-1").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Upper").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("-leading").is_err());
    }

    #[test]
    fn test_resolve_slug_prefers_explicit() {
        assert_eq!(resolve_slug(Some("custom"), "Title").unwrap(), "custom");
        assert_eq!(resolve_slug(None, "Night Shift").unwrap(), "night-shift");
        assert!(resolve_slug(None, "???").is_err());
    }
}
