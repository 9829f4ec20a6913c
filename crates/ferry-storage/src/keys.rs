//! Shared key generation for stored bytes.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Storage key of an uploaded or crawled file.
///
/// The user-supplied filename only contributes its extension, so names such as
/// `a..b.pdf` never end up inside a key.
pub fn matter_key(user_id: Uuid, matter_id: Uuid, filename: &str) -> String {
    match extension(filename) {
        Some(ext) => format!("matter/{}/{}.{}", user_id, matter_id, ext),
        None => format!("matter/{}/{}", user_id, matter_id),
    }
}

/// Storage key of a derived artifact.
///
/// A pure function of the source matter and the request URI, so two requests
/// materializing the same URI write to the same key.
pub fn artifact_key(matter_id: Uuid, request_uri: &str, ext: &str) -> String {
    let digest = hex::encode(Sha256::digest(request_uri.as_bytes()));
    format!("cache/{}/{}.{}", matter_id, digest, ext)
}

/// Lowercased extension of `filename` when it is short and alphanumeric
pub fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matter_key_keeps_only_extension() {
        let user = Uuid::nil();
        let matter = Uuid::from_u128(1);
        assert_eq!(
            matter_key(user, matter, "Report..Final.PDF"),
            format!("matter/{}/{}.pdf", user, matter)
        );
        assert_eq!(
            matter_key(user, matter, "README"),
            format!("matter/{}/{}", user, matter)
        );
        assert_eq!(
            matter_key(user, matter, ".bashrc"),
            format!("matter/{}/{}", user, matter)
        );
    }

    #[test]
    fn test_artifact_key_is_deterministic() {
        let matter = Uuid::from_u128(7);
        let a = artifact_key(matter, "/api/alien/download/x/a.png?ir=fit_10_0", "png");
        let b = artifact_key(matter, "/api/alien/download/x/a.png?ir=fit_10_0", "png");
        let c = artifact_key(matter, "/api/alien/download/x/a.png?ir=fit_20_0", "png");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with(&format!("cache/{}/", matter)));
        assert!(a.ends_with(".png"));
    }
}
