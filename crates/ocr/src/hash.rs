use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex, 64 chars.
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Content id of a capture: identical images share a scan id.
pub fn scan_id(data: &[u8]) -> String {
    to_hex(&sha256_bytes(data))
}

/// Layout: `<base>/<first_2_hex_chars>/<full_hex>.<ext>`. Ids shorter than
/// two bytes, or not splittable there, are bucketed under themselves.
pub fn archive_path(archive_dir: &Path, scan_id: &str, ext: &str) -> PathBuf {
    let bucket = scan_id.get(..2).unwrap_or(scan_id);
    archive_dir.join(bucket).join(format!("{scan_id}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_known_vector() {
        assert_eq!(
            scan_id(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn scan_id_is_content_addressed() {
        assert_eq!(scan_id(b"note-a"), scan_id(b"note-a"));
        assert_ne!(scan_id(b"note-a"), scan_id(b"note-b"));
        assert_eq!(scan_id(b"note-a").len(), 64);
    }

    #[test]
    fn archive_path_layout() {
        let base = PathBuf::from("/var/visionai/captures");
        let id = scan_id(b"");
        assert_eq!(
            archive_path(&base, &id, "jpg"),
            PathBuf::from(format!("/var/visionai/captures/e3/{id}.jpg"))
        );
    }

    #[test]
    fn archive_path_short_or_multibyte_id() {
        let base = PathBuf::from("/captures");
        assert_eq!(archive_path(&base, "a", "png"), PathBuf::from("/captures/a/a.png"));
        assert_eq!(archive_path(&base, "é1", "png"), PathBuf::from("/captures/é1/é1.png"));
        assert_eq!(archive_path(&base, "", "png"), PathBuf::from("/captures/.png"));
    }
}
