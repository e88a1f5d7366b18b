use std::path::Path;

/// File name recorded against every ingested record: the path stem with
/// the extension stripped, matching the name the ingestion procedures key
/// their upserts on.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
