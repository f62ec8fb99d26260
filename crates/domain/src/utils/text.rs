//! Pure string helpers for display names and flattened id lists

use crate::constants::PROFILE_LIST_SEPARATOR;

/// Title-case a name word by word.
///
/// Words are split on whitespace. The first letter of each word, and any
/// letter following a `-`, is upper-cased; the rest is lower-cased.
/// Underscores are kept as part of the word.
///
/// # Examples
///
/// ```
/// use hubspot_sync_domain::utils::text::title_case;
///
/// assert_eq!(title_case("sales manager"), "Sales Manager");
/// assert_eq!(title_case("read-only"), "Read-Only");
/// assert_eq!(title_case("SUPER_ADMIN"), "Super_admin");
/// assert_eq!(title_case(""), "");
/// ```
#[must_use]
pub fn title_case(input: &str) -> String {
    input.split_whitespace().map(title_word).collect::<Vec<_>>().join(" ")
}

fn title_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut upper_next = true;
    for c in word.chars() {
        if upper_next {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper_next = c == '-';
    }
    out
}

/// Join ids into the single scalar stored in a profile.
///
/// # Examples
///
/// ```
/// use hubspot_sync_domain::utils::text::join_ids;
///
/// assert_eq!(join_ids(&["1".to_string(), "2".to_string()]), "1,2");
/// assert_eq!(join_ids(&[]), "");
/// ```
#[must_use]
pub fn join_ids(ids: &[String]) -> String {
    ids.join(&PROFILE_LIST_SEPARATOR.to_string())
}

/// Split a profile scalar back into ids.
///
/// Empty segments are dropped, so an empty string yields an empty list
/// rather than a single blank id.
///
/// # Examples
///
/// ```
/// use hubspot_sync_domain::utils::text::split_ids;
///
/// assert_eq!(split_ids("1,2"), vec!["1".to_string(), "2".to_string()]);
/// assert!(split_ids("").is_empty());
/// ```
#[must_use]
pub fn split_ids(joined: &str) -> Vec<String> {
    joined
        .split(PROFILE_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}
