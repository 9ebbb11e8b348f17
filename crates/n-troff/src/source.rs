// SPDX-License-Identifier: MIT
//
// Raw page acquisition: path in, bytes out.
//
// Man pages ship either as plain troff or gzip-compressed (`ls.1.gz`). We
// sniff the gzip magic rather than trusting the extension. Anything under
// 18 bytes is rejected before sniffing: that is the smallest possible gzip
// member (10-byte header, 8-byte trailer), and no useful man page is
// smaller either.
//
// The bytes are owned by `RawDocument` and released when it drops, on
// every path. The compressed input is dropped as soon as inflation
// finishes, whether it succeeded or not.

use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::LoadError;

/// Smallest accepted input, in bytes.
pub const MIN_LEN: usize = 18;

/// ID1, ID2, and CM=8 (deflate).
const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Upper bound on the up-front allocation taken from the gzip trailer.
/// The trailer is untrusted; the vector still grows past this if needed.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// The full, decompressed source of one man page.
pub struct RawDocument {
    bytes: Vec<u8>,
    compressed: bool,
}

impl RawDocument {
    /// Read a page from disk, inflating it if it is gzip-compressed.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] if the file can't be read, plus everything
    /// [`from_bytes`](Self::from_bytes) can return.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("{}: read {} bytes", path.display(), bytes.len());
        Self::from_bytes(bytes)
    }

    /// Take ownership of an in-memory page, inflating it if needed.
    ///
    /// # Errors
    ///
    /// - [`LoadError::TooShort`] if `bytes` is under [`MIN_LEN`].
    /// - [`LoadError::Inflate`] if the gzip stream is corrupt.
    /// - [`LoadError::LengthMismatch`] if the inflated size disagrees
    ///   with the trailer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LoadError> {
        if bytes.len() < MIN_LEN {
            return Err(LoadError::TooShort { len: bytes.len() });
        }
        if !bytes.starts_with(&GZIP_MAGIC) {
            return Ok(Self {
                bytes,
                compressed: false,
            });
        }

        let declared = declared_len(&bytes);
        let inflated = inflate(&bytes, declared);
        drop(bytes);
        let inflated = inflated?;

        if u32::try_from(inflated.len()).ok() != Some(declared) {
            return Err(LoadError::LengthMismatch {
                declared,
                actual: inflated.len(),
            });
        }
        log::debug!("inflated {declared} bytes");
        Ok(Self {
            bytes: inflated,
            compressed: true,
        })
    }

    /// The page source.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the input was gzip-compressed.
    #[inline]
    #[must_use]
    pub const fn is_compressed(&self) -> bool {
        self.compressed
    }
}

impl std::fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RawDocument({} bytes{})",
            self.bytes.len(),
            if self.compressed { ", inflated" } else { "" }
        )
    }
}

/// ISIZE: the last four bytes of a gzip member, little-endian.
fn declared_len(gz: &[u8]) -> u32 {
    let mut trailer = [0u8; 4];
    trailer.copy_from_slice(&gz[gz.len() - 4..]);
    u32::from_le_bytes(trailer)
}

fn inflate(gz: &[u8], declared: u32) -> Result<Vec<u8>, LoadError> {
    let capacity = usize::try_from(declared).map_or(MAX_PREALLOC, |n| n.min(MAX_PREALLOC));
    let mut out = Vec::with_capacity(capacity);
    GzDecoder::new(gz)
        .read_to_end(&mut out)
        .map_err(LoadError::Inflate)?;
    Ok(out)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
