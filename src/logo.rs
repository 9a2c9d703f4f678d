//! Company logo loading. The image is embedded into exports as a base64
//! `data:` URL, so only browser-friendly formats are accepted.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::info;

use crate::error::LogoError;

/// Largest image we are willing to inline.
pub const MAX_LOGO_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    pub file_name: String,
    pub mime: &'static str,
    pub data_url: String,
}

impl Logo {
    /// Read `path` into a data URL. The caller keeps its previous logo when
    /// this fails.
    pub fn load(path: &Path) -> Result<Self, LogoError> {
        let mime = mime_for(path)?;
        let read_err = |source| LogoError::Read {
            path: path.to_path_buf(),
            source,
        };

        let size = fs::metadata(path).map_err(read_err)?.len();
        if size > MAX_LOGO_BYTES {
            return Err(LogoError::TooLarge {
                size,
                limit: MAX_LOGO_BYTES,
            });
        }
        let bytes = fs::read(path).map_err(read_err)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(file = %file_name, bytes = bytes.len(), "loaded logo");

        Ok(Self {
            file_name,
            mime,
            data_url: format!("data:{mime};base64,{}", STANDARD.encode(&bytes)),
        })
    }
}

/// Expand a leading `~/` against the home directory; other paths are used
/// as typed.
pub fn expand_home(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(raw)
}

fn mime_for(path: &Path) -> Result<&'static str, LogoError> {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "svg" => Ok("image/svg+xml"),
        "webp" => Ok("image/webp"),
        "bmp" => Ok("image/bmp"),
        _ => Err(LogoError::UnsupportedType(if ext.is_empty() {
            path.display().to_string()
        } else {
            ext
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_becomes_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Logo.PNG");
        fs::write(&path, b"\x89PNG").unwrap();

        let logo = Logo::load(&path).unwrap();
        assert_eq!(logo.mime, "image/png");
        assert_eq!(logo.file_name, "Logo.PNG");
        assert_eq!(logo.data_url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let err = Logo::load(Path::new("/does/not/exist/logo.tiff")).unwrap_err();
        assert!(matches!(err, LogoError::UnsupportedType(ext) if ext == "tiff"));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Logo::load(&dir.path().join("missing.jpg")).unwrap_err();
        assert!(matches!(err, LogoError::Read { .. }));
    }

    #[test]
    fn plain_paths_are_not_expanded() {
        assert_eq!(expand_home(" /tmp/logo.png "), PathBuf::from("/tmp/logo.png"));
        assert_eq!(expand_home("logo.png"), PathBuf::from("logo.png"));
    }
}
