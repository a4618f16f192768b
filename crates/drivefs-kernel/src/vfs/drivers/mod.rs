//! Driver variants.
//!
//! The three built-in kinds differ only in name, file-name encoding, and the
//! shape of their root node. [`ConfiguredDriver`] covers kinds declared at
//! runtime.

mod block;
mod configured;
mod ftp;
mod native;

pub use block::BlockDriver;
pub use configured::ConfiguredDriver;
pub use ftp::FtpDriver;
pub use native::NativeDriver;

/// File-name encoding identifiers.
pub const ENCODING_ASCII: &str = "ASCII";
pub const ENCODING_LATIN_1: &str = "ISO 8859-1";
pub const ENCODING_UTF_8: &str = "UTF-8";
