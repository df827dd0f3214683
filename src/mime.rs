//! Extension to content-type lookup

use std::collections::BTreeMap;

/// Content type used when an object name has no known extension
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Built-in extension table (lowercase, no leading dot)
pub const KNOWN_MIME_TYPES: &[(&str, &str)] = &[
    // Text
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("md", "text/markdown"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("xml", "application/xml"),
    ("json", "application/json"),
    // Images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/vnd.microsoft.icon"),
    // Audio / video
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    // Documents and archives
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("wasm", "application/wasm"),
];

/// Maps object names to content types by extension.
///
/// The lookup uses the object *name*, never its digest path.
#[derive(Clone, Debug)]
pub struct MimeRegistry {
    types: BTreeMap<String, String>,
    default: String,
}

impl MimeRegistry {
    /// Registry holding [`KNOWN_MIME_TYPES`] and [`DEFAULT_MIME_TYPE`]
    pub fn builtin() -> Self {
        MimeRegistry {
            types: KNOWN_MIME_TYPES
                .iter()
                .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
                .collect(),
            default: DEFAULT_MIME_TYPE.to_string(),
        }
    }

    /// Add or replace one extension mapping
    pub fn with_override(mut self, extension: &str, mime_type: impl Into<String>) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.types.insert(ext, mime_type.into());
        self
    }

    /// Replace the fallback content type
    pub fn with_default(mut self, mime_type: impl Into<String>) -> Self {
        self.default = mime_type.into();
        self
    }

    /// Content type for an object name
    pub fn resolve(&self, name: &str) -> &str {
        extension(name)
            .and_then(|ext| self.types.get(&ext))
            .map(String::as_str)
            .unwrap_or(&self.default)
    }

    pub fn default_type(&self) -> &str {
        &self.default
    }

    /// Iterate over (extension, content type) pairs in extension order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for MimeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercased extension of the last `/`-separated component of a name.
///
/// A component that only starts with a dot (`.profile`) has no extension.
fn extension(name: &str) -> Option<String> {
    let file = name.rsplit('/').next().unwrap_or(name);
    match file.rfind('.') {
        Some(0) | None => None,
        Some(i) if i + 1 == file.len() => None,
        Some(i) => Some(file[i + 1..].to_ascii_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_type_resolves() {
        let registry = MimeRegistry::builtin();
        for (ext, mime) in KNOWN_MIME_TYPES {
            assert_eq!(registry.resolve(&format!("test.{}", ext)), *mime);
        }
    }

    #[test]
    fn test_unknown_and_missing_extension() {
        let registry = MimeRegistry::builtin();
        assert_eq!(registry.resolve("test.unknown"), DEFAULT_MIME_TYPE);
        assert_eq!(registry.resolve("README"), DEFAULT_MIME_TYPE);
        assert_eq!(registry.resolve("trailing."), DEFAULT_MIME_TYPE);
        assert_eq!(registry.resolve(".profile"), DEFAULT_MIME_TYPE);
        assert_eq!(registry.resolve(""), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_extension_taken_from_last_component() {
        let registry = MimeRegistry::builtin();
        assert_eq!(registry.resolve("site.v2/index.html"), "text/html");
        assert_eq!(registry.resolve("dist.d/archive"), DEFAULT_MIME_TYPE);
        assert_eq!(registry.resolve("backup.tar.gz"), "application/gzip");
        assert_eq!(registry.resolve("PHOTO.JPG"), "image/jpeg");
    }

    #[test]
    fn test_overrides() {
        let registry = MimeRegistry::builtin()
            .with_override(".TOML", "application/toml")
            .with_override("txt", "text/plain; charset=utf-8")
            .with_default("application/x-unknown");
        assert_eq!(registry.resolve("Cargo.toml"), "application/toml");
        assert_eq!(registry.resolve("a.txt"), "text/plain; charset=utf-8");
        assert_eq!(registry.resolve("blob"), "application/x-unknown");
        assert_eq!(registry.default_type(), "application/x-unknown");
    }
}
