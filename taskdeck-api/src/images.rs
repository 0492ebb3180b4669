/// On-disk store for uploaded task images
///
/// Uploaded files are written under a configured directory with generated
/// names (UUIDv4 plus the original extension), so client-supplied filenames
/// never reach the filesystem. Lookups sanitize the requested name and fall
/// back to a placeholder image when the file is missing.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Filename served when a requested image doesn't exist
pub const PLACEHOLDER: &str = "no-image.jpg";

/// Handle to the image directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Creates a store rooted at `root`
    ///
    /// The directory itself is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes uploaded bytes under a generated name
    ///
    /// The extension of `original_filename` (if any) is preserved so the
    /// content type can be derived on download.
    ///
    /// # Returns
    ///
    /// The generated filename, to be stored on the task record.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory can't be created or the file
    /// can't be written.
    pub async fn save(
        &self,
        original_filename: Option<&str>,
        data: &[u8],
    ) -> io::Result<String> {
        fs::create_dir_all(&self.root).await?;

        let name = generate_name(original_filename);
        fs::write(self.root.join(&name), data).await?;

        Ok(name)
    }

    /// Resolves a stored image name to a path, if the file exists
    ///
    /// Names containing path separators or parent-directory components are
    /// rejected outright, so a crafted name can't escape the image root.
    pub async fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_safe_name(name) {
            return None;
        }

        let path = self.root.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    /// Path of the fallback placeholder image
    pub fn placeholder_path(&self) -> PathBuf {
        self.root.join(PLACEHOLDER)
    }
}

/// Generates a stored filename: UUIDv4 plus the original extension
fn generate_name(original_filename: Option<&str>) -> String {
    let ext = original_filename
        .and_then(|f| Path::new(f).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

/// True if `name` is a plain filename with no traversal potential
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.starts_with('.')
}

/// Derives a Content-Type from a stored filename's extension
pub fn content_type(name: &str) -> &'static str {
    match Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_name_preserves_extension() {
        let name = generate_name(Some("photo.JPG"));
        assert!(name.ends_with(".jpg"));

        let name = generate_name(Some("archive.tar.gz"));
        assert!(name.ends_with(".gz"));
    }

    #[test]
    fn test_generate_name_without_extension() {
        let name = generate_name(Some("noext"));
        assert!(!name.contains('.'));

        let name = generate_name(None);
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_generate_name_rejects_odd_extensions() {
        // Extension with a path separator must not survive
        let name = generate_name(Some("x.ex/t"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_generated_names_are_unique() {
        assert_ne!(generate_name(Some("a.png")), generate_name(Some("a.png")));
    }

    #[test]
    fn test_safe_name_rejects_traversal() {
        assert!(is_safe_name("abc.png"));
        assert!(!is_safe_name("../etc/passwd"));
        assert!(!is_safe_name("a/b.png"));
        assert!(!is_safe_name("a\\b.png"));
        assert!(!is_safe_name(".hidden"));
        assert!(!is_safe_name(""));
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type("a.jpg"), "image/jpeg");
        assert_eq!(content_type("a.jpeg"), "image/jpeg");
        assert_eq!(content_type("a.PNG"), "image/png");
        assert_eq!(content_type("a.webp"), "image/webp");
        assert_eq!(content_type("a"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_save_and_resolve_roundtrip() {
        let dir = std::env::temp_dir().join(format!("taskdeck-images-{}", Uuid::new_v4()));
        let store = ImageStore::new(&dir);

        let name = store.save(Some("pic.png"), b"fake png bytes").await.unwrap();
        assert!(name.ends_with(".png"));

        let path = store.resolve(&name).await.expect("saved image resolves");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"fake png bytes");

        assert!(store.resolve("missing.png").await.is_none());
        assert!(store.resolve("../escape.png").await.is_none());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
