use crate::domain::{ContentItem, Update};

const EXPAND_PREFIX: &str = "#update-";
const SCROLL_PREFIX: &str = "#update_";

/// Updates visible to the public, in their original order.
pub fn public_updates(item: &ContentItem) -> Vec<&Update> {
    item.updates.iter().filter(|u| u.is_public()).collect()
}

pub fn public_update_count(item: &ContentItem) -> usize {
    item.updates.iter().filter(|u| u.is_public()).count()
}

/// Parse a `#update-<N>` fragment into `N`.
pub fn update_anchor(fragment: &str) -> Option<usize> {
    parse_index(fragment.strip_prefix(EXPAND_PREFIX)?)
}

/// Whether the update at `update_index` should open its comment thread.
///
/// At most one index matches a given fragment.
pub fn should_expand_comments(update_index: usize, fragment: &str) -> bool {
    update_anchor(fragment) == Some(update_index)
}

/// Section to scroll to after load, for `#update_<N>` fragments.
pub fn scroll_target(fragment: &str) -> Option<String> {
    let index = parse_index(fragment.strip_prefix(SCROLL_PREFIX)?)?;
    Some(format!("{SCROLL_PREFIX}{index}"))
}

/// Download url of the first image on the most recent update that has one.
pub fn latest_update_image(item: &ContentItem) -> Option<String> {
    item.updates
        .iter()
        .filter_map(|u| u.images.first())
        .map(|media| media.url.clone())
        .filter(|url| !url.is_empty())
        .last()
}

fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
