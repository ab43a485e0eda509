// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Blob Identity
//!
//! Names a binary payload by its content: a SHA-256 digest plus a file
//! extension sniffed from the payload's magic number. Two payloads with the
//! same bytes always get the same file name, which is what makes blob files
//! deduplicate across rows, batches and re-runs.

use sha2::{Digest, Sha256};

/// The content-derived name of one blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobIdentity {
    /// Lowercase hex SHA-256, always 64 characters.
    pub hash: String,
    /// Includes the leading `.`; empty when the type could not be sniffed.
    pub extension: String,
}

impl BlobIdentity {
    /// The on-disk file name: `{hash}{extension}`.
    pub fn filename(&self) -> String {
        format!("{}{}", self.hash, self.extension)
    }
}

/// Hashes and sniffs `bytes`.
///
/// Pure function. Callers are expected to skip empty payloads before calling.
pub fn identify(bytes: &[u8]) -> BlobIdentity {
    let hash = hex::encode(Sha256::digest(bytes));
    let extension = infer::get(bytes)
        .map(|t| match t.extension() {
            "" => extension_for_mime(t.mime_type()),
            ext => format!(".{}", ext),
        })
        .unwrap_or_default();

    BlobIdentity { hash, extension }
}

/// Maps a MIME type to a file extension, for sniffed types that carry none.
///
/// Uses the first registered extension when one exists, otherwise falls back
/// to the MIME subtype (`application/x-foo` becomes `.x-foo`).
pub fn extension_for_mime(mime: &str) -> String {
    if let Some(ext) = mime_guess::get_mime_extensions_str(mime).and_then(|exts| exts.first()) {
        return format!(".{}", ext);
    }

    let subtype = mime.rsplit('/').next().unwrap_or(mime);
    format!(".{}", subtype)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06\x00\x00\x00";

    #[test]
    fn test_identify_is_deterministic() {
        let a = identify(GIF);
        let b = identify(GIF);
        assert_eq!(a, b);
        assert_eq!(a.hash.len(), 64);
        assert!(a.hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_identify_known_digest() {
        let id = identify(b"abc");
        assert_eq!(
            id.hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sniff_gif_and_png() {
        assert_eq!(identify(GIF).extension, ".gif");
        assert_eq!(identify(PNG).extension, ".png");
        assert!(identify(GIF).filename().ends_with(".gif"));
    }

    #[test]
    fn test_sniff_uses_conventional_extension() {
        let jpeg = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00\x01\x01\x00\x00\x01\x00\x01\x00\x00";
        let mp3 = b"ID3\x03\x00\x00\x00\x00\x00\x0a\x00\x00\x00\x00\x00\x00";
        assert_eq!(identify(jpeg).extension, ".jpg");
        assert_eq!(identify(mp3).extension, ".mp3");
    }

    #[test]
    fn test_unrecognised_content_has_no_extension() {
        let id = identify(b"plain text, nothing magic about it");
        assert_eq!(id.extension, "");
        assert_eq!(id.filename(), id.hash);
    }

    #[test]
    fn test_extension_falls_back_to_subtype() {
        assert_eq!(extension_for_mime("image/gif"), ".gif");
        assert_eq!(
            extension_for_mime("application/x-not-a-registered-type"),
            ".x-not-a-registered-type"
        );
    }
}
