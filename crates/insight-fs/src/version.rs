//! Embedded file version lookup
//!
//! Windows executables and libraries carry a `VS_FIXEDFILEINFO` block in
//! their version resource. [`PeVersionReader`] finds that block and formats
//! the file version as `major.minor.build.revision`. Files without one have
//! no version, which is not an error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Signature that opens a `VS_FIXEDFILEINFO` block (`0xFEEF04BD`, little endian).
const FIXED_FILE_INFO_SIGNATURE: [u8; 4] = [0xBD, 0x04, 0xEF, 0xFE];
/// `dwStrucVersion` of every `VS_FIXEDFILEINFO` written by current toolchains.
const FIXED_FILE_INFO_STRUC_VERSION: u32 = 0x0001_0000;

/// Source of a file's version tag.
pub trait VersionReader: Send + Sync {
    /// Version of the file at `path`, or `None` if it carries none.
    fn read_version(&self, path: &Path) -> Option<String>;
}

impl<F> VersionReader for F
where
    F: Fn(&Path) -> Option<String> + Send + Sync,
{
    fn read_version(&self, path: &Path) -> Option<String> {
        self(path)
    }
}

/// Reads the fixed file version of PE images (`.exe`, `.dll`, ...).
#[derive(Debug, Default, Clone, Copy)]
pub struct PeVersionReader;

impl VersionReader for PeVersionReader {
    fn read_version(&self, path: &Path) -> Option<String> {
        let mut file = File::open(path).ok()?;

        let mut magic = [0u8; 2];
        file.read_exact(&mut magic).ok()?;
        if &magic != b"MZ" {
            return None;
        }

        let mut image = magic.to_vec();
        file.read_to_end(&mut image).ok()?;
        fixed_file_version(&image)
    }
}

/// Never reports a version.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVersion;

impl VersionReader for NoVersion {
    fn read_version(&self, _path: &Path) -> Option<String> {
        None
    }
}

fn fixed_file_version(image: &[u8]) -> Option<String> {
    let mut offset = 0;
    while let Some(found) = image[offset..]
        .windows(FIXED_FILE_INFO_SIGNATURE.len())
        .position(|w| w == FIXED_FILE_INFO_SIGNATURE)
    {
        let start = offset + found;
        if let Some(version) = parse_fixed_file_info(&image[start..]) {
            return Some(version);
        }
        offset = start + 1;
    }
    None
}

fn parse_fixed_file_info(block: &[u8]) -> Option<String> {
    let dword = |at: usize| -> Option<u32> {
        let bytes = block.get(at..at + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    };

    if dword(4)? != FIXED_FILE_INFO_STRUC_VERSION {
        return None;
    }
    let ms = dword(8)?;
    let ls = dword(12)?;
    Some(format!(
        "{}.{}.{}.{}",
        ms >> 16,
        ms & 0xFFFF,
        ls >> 16,
        ls & 0xFFFF
    ))
}
