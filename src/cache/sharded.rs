//! Sharded file store - one raw file per digest
//!
//! Layout: `root/hex[0:2]/hex[2:4]/hex[4:]`. Files carry no header; their
//! mtime doubles as the last-used time when they are migrated into the index.

use std::fs;
use std::io;
use std::path::Path;

use crate::core::digest::Digest;
use crate::core::paths::resolve;
use crate::error::CacheError;

/// Read the loose file for `digest`. A missing file is `Ok(None)`.
pub fn read(root: &Path, digest: &Digest) -> Result<Option<Vec<u8>>, CacheError> {
    let paths = resolve(root, digest)?;
    match fs::read(&paths.entry_path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Create or overwrite the loose file for `digest`.
pub fn write(root: &Path, digest: &Digest, content: &[u8]) -> Result<(), CacheError> {
    let paths = resolve(root, digest)?;
    fs::create_dir_all(&paths.shard_dir)?;
    fs::write(&paths.entry_path, content)?;
    Ok(())
}

/// Delete the loose file for `digest`. Missing files are not an error.
pub fn remove(root: &Path, digest: &Digest) -> Result<(), CacheError> {
    let paths = resolve(root, digest)?;
    match fs::remove_file(&paths.entry_path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn digest(hex: &str) -> Digest {
        Digest::from_hex(hex).unwrap()
    }

    #[test]
    fn test_read_missing_is_none() {
        let temp = tempdir().unwrap();
        assert_eq!(read(temp.path(), &digest("ab01cd")).unwrap(), None);
    }

    #[test]
    fn test_write_creates_shard_layout() {
        let temp = tempdir().unwrap();
        write(temp.path(), &digest("ab01cdef"), b"hello").unwrap();

        let file = temp.path().join("ab").join("01").join("cdef");
        assert_eq!(fs::read(file).unwrap(), b"hello");
        assert_eq!(
            read(temp.path(), &digest("ab01cdef")).unwrap(),
            Some(b"hello".to_vec())
        );
    }

    #[test]
    fn test_write_overwrites() {
        let temp = tempdir().unwrap();
        write(temp.path(), &digest("ab01cd"), b"first").unwrap();
        write(temp.path(), &digest("ab01cd"), b"second").unwrap();
        assert_eq!(
            read(temp.path(), &digest("ab01cd")).unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[test]
    fn test_write_rejects_short_digest() {
        let temp = tempdir().unwrap();
        let err = write(temp.path(), &digest("ab01"), b"x").unwrap_err();
        assert!(matches!(err, CacheError::DigestTooShort { .. }));
    }

    #[test]
    fn test_read_propagates_non_missing_errors() {
        let temp = tempdir().unwrap();
        // A directory where the entry file should be cannot be read as a file.
        fs::create_dir_all(temp.path().join("ab").join("01").join("cd")).unwrap();
        assert!(read(temp.path(), &digest("ab01cd")).is_err());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp = tempdir().unwrap();
        write(temp.path(), &digest("ab01cd"), b"x").unwrap();
        remove(temp.path(), &digest("ab01cd")).unwrap();
        remove(temp.path(), &digest("ab01cd")).unwrap();
        assert_eq!(read(temp.path(), &digest("ab01cd")).unwrap(), None);
    }
}
