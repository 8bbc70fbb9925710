use crate::constants::{
    HEADER_COMPRESSION_COUNT, HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE, HEADER_IMAGE_HEIGHT,
    HEADER_IMAGE_WIDTH, HEADER_LOCATION, OUTPUT_FILE_MODE,
};
use reqwest::header::HeaderMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Tinify-specific response headers, read on demand.
///
/// Missing or unparseable headers read as 0 or "".
#[derive(Debug, Clone, Default)]
pub struct ResultMeta {
    headers: HeaderMap,
}

impl ResultMeta {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn width(&self) -> u64 {
        self.number(HEADER_IMAGE_WIDTH)
    }

    pub fn height(&self) -> u64 {
        self.number(HEADER_IMAGE_HEIGHT)
    }

    pub fn location(&self) -> &str {
        self.text(HEADER_LOCATION)
    }

    /// Size as reported by `Content-Length`; some servers omit it.
    pub fn size(&self) -> u64 {
        self.number(HEADER_CONTENT_LENGTH)
    }

    pub fn media_type(&self) -> &str {
        self.text(HEADER_CONTENT_TYPE)
    }

    /// Compressions made with this API key in the current month.
    pub fn compression_count(&self) -> u64 {
        self.number(HEADER_COMPRESSION_COUNT)
    }

    fn text(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }

    fn number(&self, name: &str) -> u64 {
        self.text(name).trim().parse().unwrap_or(0)
    }
}

/// Processed image returned by the Tinify API.
#[derive(Debug, Clone)]
pub struct ImageResult {
    data: Vec<u8>,
    meta: ResultMeta,
}

impl ImageResult {
    pub fn new(headers: HeaderMap, data: Vec<u8>) -> Self {
        Self {
            data,
            meta: ResultMeta::new(headers),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn meta(&self) -> &ResultMeta {
        &self.meta
    }

    pub fn width(&self) -> u64 {
        self.meta.width()
    }

    pub fn height(&self) -> u64 {
        self.meta.height()
    }

    pub fn location(&self) -> &str {
        self.meta.location()
    }

    pub fn size(&self) -> u64 {
        self.meta.size()
    }

    pub fn media_type(&self) -> &str {
        self.meta.media_type()
    }

    pub fn compression_count(&self) -> u64 {
        self.meta.compression_count()
    }

    /// Writes the image to `path`, resolved against the current directory.
    ///
    /// Returns the absolute path written to.
    pub fn to_file(&self, path: &Path) -> std::io::Result<PathBuf> {
        let path = std::path::absolute(path)?;
        let mut file = open_output(&path)?;
        file.write_all(&self.data)?;
        file.flush()?;
        Ok(path)
    }
}

#[cfg(unix)]
fn open_output(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(OUTPUT_FILE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn open_output(path: &Path) -> std::io::Result<fs::File> {
    let _ = OUTPUT_FILE_MODE;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use tempfile::TempDir;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_meta_reads_headers() {
        let meta = ResultMeta::new(headers(&[
            ("content-length", "12345"),
            ("content-type", "image/webp"),
            ("image-width", "640"),
            ("image-height", "480"),
            ("compression-count", "42"),
            ("location", "https://api.tinify.com/output/abc"),
        ]));
        assert_eq!(meta.size(), 12345);
        assert_eq!(meta.media_type(), "image/webp");
        assert_eq!(meta.width(), 640);
        assert_eq!(meta.height(), 480);
        assert_eq!(meta.compression_count(), 42);
        assert_eq!(meta.location(), "https://api.tinify.com/output/abc");
    }

    #[test]
    fn test_meta_defaults_when_absent_or_garbage() {
        let meta = ResultMeta::new(headers(&[
            ("image-width", "wide"),
            ("compression-count", "-3"),
        ]));
        assert_eq!(meta.size(), 0);
        assert_eq!(meta.width(), 0);
        assert_eq!(meta.height(), 0);
        assert_eq!(meta.compression_count(), 0);
        assert_eq!(meta.location(), "");
        assert_eq!(meta.media_type(), "");
    }

    #[test]
    fn test_result_to_file_writes_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.png");
        let result = ImageResult::new(HeaderMap::new(), b"png bytes".to_vec());

        let written = result.to_file(&path).unwrap();
        assert!(written.is_absolute());
        assert_eq!(fs::read(&path).unwrap(), b"png bytes");
    }

    #[cfg(unix)]
    #[test]
    fn test_result_to_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.png");
        ImageResult::new(HeaderMap::new(), vec![1, 2, 3])
            .to_file(&path)
            .unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode & !0o644, 0);
    }

    #[test]
    fn test_result_to_file_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.png");
        let result = ImageResult::new(HeaderMap::new(), vec![1]);
        assert!(result.to_file(&path).is_err());
    }
}
