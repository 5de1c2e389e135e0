pub const UNKNOWN_IDENTITY: &str = "Unknown";

/// Turns a character display name into a file-name-safe key.
///
/// Keeps letters, digits, `_`, `-` and whitespace, then folds each run of
/// whitespace into one `_`.
pub fn sanitize_identity(name: Option<&str>) -> String {
    let kept: String = name
        .unwrap_or_default()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == '-' || ch.is_whitespace())
        .collect();

    let key = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if key.is_empty() {
        UNKNOWN_IDENTITY.to_owned()
    } else {
        key
    }
}
