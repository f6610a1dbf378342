//! Streaming content hashing.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use blake3::Hasher;
use tracing::debug;

use dustfile_core::ContentHash;

/// Read buffer size. Memory use is bounded by this regardless of file size.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the BLAKE3 digest of a file, or `None` if it cannot be read.
///
/// Read failures (permission denied, file vanished, I/O error mid-read) are
/// logged at debug level and never propagate.
pub fn hash_file(path: &Path) -> Option<ContentHash> {
    match try_hash_file(path) {
        Ok(hash) => Some(hash),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Could not hash file");
            None
        }
    }
}

/// Compute the BLAKE3 digest of a file, reading it in fixed-size chunks.
pub fn try_hash_file(path: &Path) -> io::Result<ContentHash> {
    let mut file = File::open(path)?;
    hash_reader(&mut file)
}

/// Compute the BLAKE3 digest of everything a reader yields.
pub fn hash_reader<R: Read>(reader: &mut R) -> io::Result<ContentHash> {
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}
