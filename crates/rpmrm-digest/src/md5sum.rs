use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};

/// Chaining state of MD5 before finalisation. Old builders emitted this for
/// zero-length files instead of the real digest.
const BROKEN_EMPTY_DIGEST: &str = "0123456789abcdeffedcba9876543210";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestVariant {
    Standard,
    BrokenOnEmpty,
}

pub trait FileDigester {
    fn digest(&self, path: &Path, variant: DigestVariant) -> io::Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Digester;

impl FileDigester for Md5Digester {
    fn digest(&self, path: &Path, variant: DigestVariant) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Md5::new();
        let mut buffer = vec![0_u8; 64 * 1024];
        let mut total = 0_u64;
        loop {
            let read = file.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            total += read as u64;
            hasher.update(&buffer[..read]);
        }

        if total == 0 && variant == DigestVariant::BrokenOnEmpty {
            return Ok(BROKEN_EMPTY_DIGEST.to_string());
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

pub fn md5_hex(payload: &[u8]) -> String {
    hex::encode(Md5::digest(payload))
}
