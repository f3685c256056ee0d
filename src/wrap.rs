//! Greedy word wrapping against a width oracle.
//!
//! Table cells (and anything else laid out in a fixed column) are broken into
//! lines here before they are drawn, so that row heights can be computed up
//! front. The measuring function is supplied by the caller, normally
//! [`crate::canvas::Canvas::string_width`] with the cell font selected.

/// Split `text` into lines no wider than `width`.
///
/// Words are separated by single spaces and accumulated greedily. A word that
/// is wider than `width` on its own is emitted as its own line rather than
/// broken. Empty input yields no lines.
pub fn wrap_text<F>(text: &str, width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    let mut current = String::new();
    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate) <= width {
            current = candidate;
        } else if current.is_empty() {
            lines.push(word.to_string());
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
