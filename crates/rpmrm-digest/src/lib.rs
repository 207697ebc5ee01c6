mod md5sum;

pub use md5sum::{md5_hex, DigestVariant, FileDigester, Md5Digester};
