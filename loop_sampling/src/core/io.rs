use std::io::Read;
use std::path::Path;

/// File extension together with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionWithMime {
    /// File extension (without leading dot, e.g., `json.gz`)
    pub extension: String,
    /// MIME type (e.g., `application/json`)
    pub mime: String,
}

impl ExtensionWithMime {
    /// Create a new [`ExtensionWithMime`]
    pub fn new<S: Into<String>, M: Into<String>>(extension: S, mime: M) -> Self {
        Self {
            extension: extension.into(),
            mime: mime.into(),
        }
    }
}

/// Trait for importing types from a file path or reader
pub trait Importable: Sized {
    /// The error type returned by import operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;
    /// Options to configure the import
    type ImportOptions: Default;

    /// Import from a reader, specifying the format and import options.
    fn import_from_reader_with_options<R: Read>(
        reader: R,
        format: &str,
        options: Self::ImportOptions,
    ) -> Result<Self, Self::Error>;

    /// Import from a reader, specifying the format.
    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        Self::import_from_reader_with_options(reader, format, Self::ImportOptions::default())
    }

    /// Import from a file path using the given import options.
    /// The format is inferred from the file extension.
    fn import_from_path_with_options<P: AsRef<Path>>(
        path: P,
        options: Self::ImportOptions,
    ) -> Result<Self, Self::Error> {
        let path = path.as_ref();
        let format = Self::infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Self::import_from_reader_with_options(reader, &format, options)
    }

    /// Import from a file path.
    /// The format is inferred from the file extension.
    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        Self::import_from_path_with_options(path, Self::ImportOptions::default())
    }

    /// Import from a byte slice, specifying the format.
    fn import_from_bytes(bytes: &[u8], format: &str) -> Result<Self, Self::Error> {
        Self::import_from_reader(std::io::Cursor::new(bytes), format)
    }

    /// Infer format from path. Can be overridden for complex extensions (e.g., `.json.gz`).
    fn infer_format(path: &Path) -> Option<String> {
        let path_str = path.to_string_lossy().to_lowercase();
        if let Some(compound) = Self::known_import_formats()
            .into_iter()
            .map(|f| f.extension)
            .filter(|ext| ext.contains('.'))
            .find(|ext| path_str.ends_with(&format!(".{ext}")))
        {
            return Some(compound);
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
    }

    /// Formats (extensions) supported by the import
    fn known_import_formats() -> Vec<ExtensionWithMime>;
}
