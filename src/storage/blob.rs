//! Checksummed binary blobs for model artifacts.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! +-------+---------+------+-------------+---------+---------------+
//! | magic | version | kind | payload len | payload | CRC32(payload)|
//! | RSNT  |   u16   |  u8  |     u64     |  bytes  |      u32      |
//! +-------+---------+------+-------------+---------+---------------+
//! ```
//!
//! Every field is verified when reading; any deviation is
//! [`SentinelError::ArtifactCorrupt`].

use std::fmt;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, SentinelError};

/// File signature.
pub const BLOB_MAGIC: &[u8; 4] = b"RSNT";

/// Current format version.
pub const BLOB_VERSION: u16 = 1;

/// Bytes before the payload.
pub const HEADER_LEN: usize = 4 + 2 + 1 + 8;

/// What a blob contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BlobKind {
    Vectorizer = 1,
    Classifier = 2,
}

impl BlobKind {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(BlobKind::Vectorizer),
            2 => Some(BlobKind::Classifier),
            _ => None,
        }
    }
}

impl fmt::Display for BlobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobKind::Vectorizer => f.write_str("vectorizer"),
            BlobKind::Classifier => f.write_str("classifier"),
        }
    }
}

/// A writer that frames one payload.
pub struct BlobWriter<W: Write> {
    writer: W,
    kind: BlobKind,
}

impl<W: Write> BlobWriter<W> {
    pub fn new(writer: W, kind: BlobKind) -> Self {
        BlobWriter { writer, kind }
    }

    /// Write header, payload and checksum; returns the inner writer.
    pub fn write_payload(mut self, payload: &[u8]) -> Result<W> {
        self.writer.write_all(BLOB_MAGIC)?;
        self.writer.write_u16::<LittleEndian>(BLOB_VERSION)?;
        self.writer.write_u8(self.kind as u8)?;
        self.writer.write_u64::<LittleEndian>(payload.len() as u64)?;
        self.writer.write_all(payload)?;
        self.writer
            .write_u32::<LittleEndian>(crc32fast::hash(payload))?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// A reader that validates one framed payload held in memory.
pub struct BlobReader<'a> {
    cursor: Cursor<&'a [u8]>,
    origin: String,
}

impl<'a> BlobReader<'a> {
    /// `origin` names the source in error messages.
    pub fn new(bytes: &'a [u8], origin: impl Into<String>) -> Self {
        BlobReader {
            cursor: Cursor::new(bytes),
            origin: origin.into(),
        }
    }

    fn corrupt(&self, what: impl fmt::Display) -> SentinelError {
        SentinelError::artifact_corrupt(format!("{}: {what}", self.origin))
    }

    /// Validate the frame and return the payload.
    pub fn read_payload(mut self, expected: BlobKind) -> Result<&'a [u8]> {
        let bytes = *self.cursor.get_ref();
        if bytes.len() < HEADER_LEN + 4 {
            return Err(self.corrupt(format!("truncated ({} bytes)", bytes.len())));
        }

        let mut magic = [0u8; 4];
        self.cursor.read_exact(&mut magic)?;
        if &magic != BLOB_MAGIC {
            return Err(self.corrupt("bad magic"));
        }

        let version = self.cursor.read_u16::<LittleEndian>()?;
        if version != BLOB_VERSION {
            return Err(self.corrupt(format!(
                "unsupported format version {version} (expected {BLOB_VERSION})"
            )));
        }

        let kind_byte = self.cursor.read_u8()?;
        match BlobKind::from_u8(kind_byte) {
            Some(kind) if kind == expected => {}
            Some(kind) => {
                return Err(self.corrupt(format!("holds a {kind}, expected a {expected}")));
            }
            None => return Err(self.corrupt(format!("unknown blob kind {kind_byte}"))),
        }

        let len = self.cursor.read_u64::<LittleEndian>()?;
        let available = (bytes.len() - HEADER_LEN - 4) as u64;
        if len != available {
            return Err(self.corrupt(format!(
                "payload length {len} does not match file size ({available} bytes available)"
            )));
        }

        let start = HEADER_LEN;
        let end = start + len as usize;
        let payload = &bytes[start..end];
        self.cursor.set_position(end as u64);

        let stored = self.cursor.read_u32::<LittleEndian>()?;
        let actual = crc32fast::hash(payload);
        if stored != actual {
            return Err(self.corrupt(format!(
                "checksum mismatch (stored {stored:08x}, computed {actual:08x})"
            )));
        }

        Ok(payload)
    }
}

/// Frame `payload` into `path`, writing through a temporary sibling file.
pub fn save_blob(path: &Path, kind: BlobKind, payload: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    if let Err(err) = write_and_rename(&tmp, path, kind, payload) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "cannot remove temporary blob");
            }
        }
        return Err(err);
    }

    tracing::debug!(path = %path.display(), %kind, bytes = payload.len(), "blob written");
    Ok(())
}

fn write_and_rename(tmp: &Path, path: &Path, kind: BlobKind, payload: &[u8]) -> Result<()> {
    let file = fs::File::create(tmp)?;
    let file = BlobWriter::new(std::io::BufWriter::new(file), kind).write_payload(payload)?;
    file.into_inner()
        .map_err(|e| SentinelError::Io(e.into_error()))?
        .sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Read and validate the blob at `path`.
///
/// A missing file is [`SentinelError::ResourceMissing`]; anything malformed is
/// [`SentinelError::ArtifactCorrupt`].
pub fn load_blob(path: &Path, kind: BlobKind) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| {
        SentinelError::resource_missing(format!("cannot read {kind} artifact '{}': {e}", path.display()))
    })?;
    let payload = BlobReader::new(&bytes, path.display().to_string()).read_payload(kind)?;
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(kind: BlobKind, payload: &[u8]) -> Vec<u8> {
        BlobWriter::new(Vec::new(), kind)
            .write_payload(payload)
            .unwrap()
    }

    #[test]
    fn test_frame_layout() {
        let bytes = framed(BlobKind::Classifier, b"abc");
        assert_eq!(&bytes[..4], b"RSNT");
        assert_eq!(bytes[6], 2);
        assert_eq!(bytes.len(), HEADER_LEN + 3 + 4);

        let payload = BlobReader::new(&bytes, "mem")
            .read_payload(BlobKind::Classifier)
            .unwrap();
        assert_eq!(payload, b"abc");
    }

    #[test]
    fn test_flipped_payload_bit() {
        let mut bytes = framed(BlobKind::Vectorizer, b"weights");
        bytes[HEADER_LEN + 2] ^= 0x01;

        let err = BlobReader::new(&bytes, "mem")
            .read_payload(BlobKind::Vectorizer)
            .unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_wrong_kind() {
        let bytes = framed(BlobKind::Vectorizer, b"x");
        let err = BlobReader::new(&bytes, "mem")
            .read_payload(BlobKind::Classifier)
            .unwrap_err();
        assert!(matches!(err, SentinelError::ArtifactCorrupt(_)));
    }

    #[test]
    fn test_truncated_and_bad_magic() {
        let bytes = framed(BlobKind::Vectorizer, b"payload");
        assert!(
            BlobReader::new(&bytes[..bytes.len() - 1], "mem")
                .read_payload(BlobKind::Vectorizer)
                .is_err()
        );

        let mut bytes = bytes;
        bytes[0] = b'X';
        let err = BlobReader::new(&bytes, "mem")
            .read_payload(BlobKind::Vectorizer)
            .unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("classifier.bin");

        save_blob(&path, BlobKind::Classifier, b"coefficients").unwrap();
        assert_eq!(load_blob(&path, BlobKind::Classifier).unwrap(), b"coefficients");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory in the way makes the final rename fail.
        let path = dir.path().join("classifier.bin");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        assert!(save_blob(&path, BlobKind::Classifier, b"coefficients").is_err());
        assert!(!path.with_extension("tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_blob(&dir.path().join("absent.bin"), BlobKind::Vectorizer).unwrap_err();
        assert!(matches!(err, SentinelError::ResourceMissing(_)));
    }
}
