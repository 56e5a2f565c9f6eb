//! Command implementations for OxiZlib CLI.

pub mod cat;
pub mod compress;
pub mod decompress;
pub mod info;
pub mod test;

pub use cat::cmd_cat;
pub use compress::{CompressOptions, cmd_compress};
pub use decompress::{DecompressOptions, cmd_decompress};
pub use info::cmd_info;
pub use test::cmd_test;
