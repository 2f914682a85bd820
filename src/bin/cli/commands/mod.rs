pub mod list;
pub mod serve;
pub mod study;
pub mod transfer;
pub mod words;

/// Split a comma-separated tag list, dropping empty entries
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
