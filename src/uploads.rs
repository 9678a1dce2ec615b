use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Content type assumed for inline uploads that declare none.
pub const DEFAULT_INLINE_TYPE: &str = "image/jpeg";

/// Server-relative prefix of disk-backed references.
pub const UPLOADS_PREFIX: &str = "/uploads/";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File size ({size_mb}) exceeds {limit_mb}MB limit")]
    TooLarge { size_mb: String, limit_mb: u64 },
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// What a disk-backed upload looks like to a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    SplatModel,
    PlyModel,
    Image,
}

impl AssetKind {
    pub fn from_file_name(name: &str) -> Self {
        match extension_of(name).as_deref() {
            Some("splat") => AssetKind::SplatModel,
            Some("ply") => AssetKind::PlyModel,
            _ => AssetKind::Image,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetKind::SplatModel => "3D Splat Model",
            AssetKind::PlyModel => "3D PLY Model",
            AssetKind::Image => "Image",
        }
    }
}

/// An upload after it has been stored.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredAsset {
    Disk {
        file_name: String,
        reference: String,
        kind: AssetKind,
        size: u64,
    },
    Inline {
        reference: String,
    },
}

impl StoredAsset {
    /// Value written into the content field.
    pub fn reference(&self) -> &str {
        match self {
            StoredAsset::Disk { reference, .. } | StoredAsset::Inline { reference } => reference,
        }
    }
}

/// Lowercased extension of a client-supplied name, if it is a plain short token.
pub fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    let plain = !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    plain.then_some(ext)
}

/// Size formatted the way upload responses report it, e.g. `12.3MB`.
pub fn human_size(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / 1_048_576.0)
}

/// Reject payloads above `limit` bytes. Called before the payload is read.
pub fn check_size(size: u64, limit: u64) -> Result<(), UploadError> {
    if size > limit {
        return Err(UploadError::TooLarge {
            size_mb: human_size(size),
            limit_mb: limit / 1_048_576,
        });
    }
    Ok(())
}

/// Write `bytes` to a fresh `<prefix>_<uuid>[.<ext>]` file under `dir`.
/// The extension comes from the client's file name; the rest of that name is dropped.
pub fn store_on_disk(
    dir: &Path,
    prefix: &str,
    original_name: Option<&str>,
    bytes: &[u8],
) -> Result<StoredAsset, UploadError> {
    std::fs::create_dir_all(dir)?;

    let ext = original_name.and_then(extension_of);
    let file_name = match &ext {
        Some(ext) => format!("{}_{}.{}", prefix, uuid::Uuid::new_v4(), ext),
        None => format!("{}_{}", prefix, uuid::Uuid::new_v4()),
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dir.join(&file_name))?;
    file.write_all(bytes)?;
    file.flush()?;

    Ok(StoredAsset::Disk {
        reference: format!("{}{}", UPLOADS_PREFIX, file_name),
        kind: AssetKind::from_file_name(&file_name),
        size: bytes.len() as u64,
        file_name,
    })
}

/// Encode `bytes` as a `data:` URI using the declared content type.
pub fn store_inline(content_type: Option<&str>, bytes: &[u8]) -> StoredAsset {
    let mime = content_type
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or(DEFAULT_INLINE_TYPE);
    StoredAsset::Inline {
        reference: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
    }
}

/// Content type served for a stored file, by extension.
pub fn mime_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some("ply") => "application/ply",
        Some("splat") => "application/splat",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Resolve a requested name to an existing file directly under `dir`.
/// Anything that is not a bare file name resolves to nothing.
pub fn resolve(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let bare = !file_name.is_empty()
        && !file_name.starts_with('.')
        && !file_name.contains(['/', '\\'])
        && !file_name.contains("..");
    if !bare {
        return None;
    }
    let path = dir.join(file_name);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(AssetKind::from_file_name("m.splat"), AssetKind::SplatModel);
        assert_eq!(AssetKind::from_file_name("M.PLY"), AssetKind::PlyModel);
        assert_eq!(AssetKind::from_file_name("photo.png"), AssetKind::Image);
        assert_eq!(AssetKind::from_file_name("noext"), AssetKind::Image);
        assert_eq!(AssetKind::SplatModel.label(), "3D Splat Model");
        assert_eq!(AssetKind::PlyModel.label(), "3D PLY Model");
    }

    #[test]
    fn extension_rejects_odd_tokens() {
        assert_eq!(extension_of("a.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert!(extension_of("trailingdot.").is_none());
        assert!(extension_of("x.p/ng").is_none());
        assert!(extension_of("plain").is_none());
    }

    #[test]
    fn human_size_has_one_decimal() {
        assert_eq!(human_size(1024), "0.0MB");
        assert_eq!(human_size(3 * 1_048_576 / 2), "1.5MB");
    }

    #[test]
    fn size_check_is_inclusive_of_limit() {
        assert!(check_size(200, 200).is_ok());
        let err = check_size(201 * 1_048_576, 200 * 1_048_576).unwrap_err();
        assert_eq!(err.to_string(), "File size (201.0MB) exceeds 200MB limit");
    }

    #[test]
    fn disk_store_writes_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = store_on_disk(dir.path(), "hero", Some("scan.splat"), b"one").unwrap();
        let b = store_on_disk(dir.path(), "hero", Some("scan.splat"), b"two").unwrap();
        assert_ne!(a.reference(), b.reference());

        match &a {
            StoredAsset::Disk { file_name, reference, kind, size } => {
                assert!(file_name.starts_with("hero_"));
                assert!(file_name.ends_with(".splat"));
                assert_eq!(reference, &format!("/uploads/{}", file_name));
                assert_eq!(*kind, AssetKind::SplatModel);
                assert_eq!(*size, 3);
                assert_eq!(std::fs::read(dir.path().join(file_name)).unwrap(), b"one");
            }
            other => panic!("expected disk asset, got {:?}", other),
        }
    }

    #[test]
    fn disk_store_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let asset = store_on_disk(dir.path(), "demo1", None, b"").unwrap();
        let StoredAsset::Disk { file_name, .. } = asset else {
            panic!("expected disk asset");
        };
        assert!(!file_name.contains('.'));
        assert!(dir.path().join(&file_name).is_file());
    }

    #[test]
    fn inline_store_builds_data_uri() {
        let asset = store_inline(Some("image/png"), b"hi");
        assert_eq!(asset.reference(), "data:image/png;base64,aGk=");
        let asset = store_inline(None, b"hi");
        assert_eq!(asset.reference(), "data:image/jpeg;base64,aGk=");
    }

    #[test]
    fn mime_table() {
        assert_eq!(mime_for("a.ply"), "application/ply");
        assert_eq!(mime_for("a.splat"), "application/splat");
        assert_eq!(mime_for("a.JPG"), "image/jpeg");
        assert_eq!(mime_for("a.jpeg"), "image/jpeg");
        assert_eq!(mime_for("a.png"), "image/png");
        assert_eq!(mime_for("a.gif"), "image/gif");
        assert_eq!(mime_for("a.webp"), "image/webp");
        assert_eq!(mime_for("a.bin"), "application/octet-stream");
        assert_eq!(mime_for("noext"), "application/octet-stream");
    }

    #[test]
    fn resolve_only_bare_existing_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hero_1.png"), b"x").unwrap();
        std::fs::write(dir.path().join(".hidden"), b"x").unwrap();

        assert!(resolve(dir.path(), "hero_1.png").is_some());
        assert!(resolve(dir.path(), "missing.png").is_none());
        assert!(resolve(dir.path(), ".hidden").is_none());
        assert!(resolve(dir.path(), "../hero_1.png").is_none());
        assert!(resolve(dir.path(), "sub/hero_1.png").is_none());
        assert!(resolve(dir.path(), "").is_none());
    }
}
