/// Derive a URL slug from a display name.
///
/// Keeps alphanumeric characters (Unicode included) in lowercase form,
/// collapses every other run of characters into a single `-` and strips
/// leading/trailing separators.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
