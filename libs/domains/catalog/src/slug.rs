use validator::ValidationError;

/// Lowercase, with every run of non-alphanumeric characters collapsed to a
/// single `-` and no leading or trailing dash.
///
/// ```
/// use domain_catalog::slug::slugify;
/// assert_eq!(slugify("  Phones & Tablets "), "phones-tablets");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

/// `validator` hook for client-supplied slugs.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ValidationError::new("slug")
            .with_message("must be lowercase words separated by single dashes".into()))
    }
}
