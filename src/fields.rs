use url::Url;

use crate::config::Limits;
use crate::partner::PartnerRecord;

/// Whether `name` can serve as the namespace of its remote images: one key
/// segment, no path separators or control characters, not `.` or `..`.
pub fn is_key_safe_name(name: &str) -> bool {
    name != "."
        && name != ".."
        && !name.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}

/// Checks the text fields of `record` against `limits`.
///
/// Every rule is evaluated; one message per failure. Lengths are counted in
/// characters. An empty `url` is skipped here (absence is reported by the
/// caller); a non-empty one must parse and use the `https` scheme.
pub fn check_fields(record: &PartnerRecord, limits: &Limits) -> Vec<String> {
    let mut messages = Vec::new();

    if record.name.chars().count() > limits.name_limit {
        messages.push(format!("'name' exceeds {} characters", limits.name_limit));
    }

    if !record.name.is_empty() && !is_key_safe_name(&record.name) {
        messages.push(format!(
            "'name' \"{}\" cannot be used as an image key",
            record.name
        ));
    }

    if record.short_description.chars().count() > limits.short_description_limit {
        messages.push(format!(
            "'short_description' exceeds {} characters",
            limits.short_description_limit
        ));
    }

    if record.long_description.chars().count() > limits.long_description_limit {
        messages.push(format!(
            "'long_description' exceeds {} characters",
            limits.long_description_limit
        ));
    }

    if record.tags.is_empty() {
        messages.push("'tags' should be a non-empty list".to_string());
    }

    if record.tags.len() > limits.max_number_of_tags {
        messages.push(format!(
            "'tags' should not contain more than {} tags",
            limits.max_number_of_tags
        ));
    }

    for tag in &record.tags {
        if tag.chars().count() > limits.tag_character_limit {
            messages.push(format!(
                "'tag' \"{}\" exceeds {} characters",
                tag, limits.tag_character_limit
            ));
        }
    }

    if !record.url.is_empty() {
        match Url::parse(&record.url) {
            Ok(url) if url.scheme() != "https" => {
                messages.push("'url' should use the https scheme".to_string());
            }
            Ok(_) => {}
            Err(_) => messages.push("'url' is not a valid URL".to_string()),
        }
    }

    messages
}
