//! Utility functions for the CLI.

use dialoguer::Confirm;
use filetime::FileTime;
use indicatif::{ProgressBar, ProgressStyle};
use oxizlib_gzip::{GzipHeader, GzipReader};
use std::error::Error;
use std::ffi::OsString;
use std::fs::Metadata;
use std::io::{self, Cursor, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result type for command implementations.
pub type CliResult<T> = Result<T, Box<dyn Error>>;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// `path` with `suffix` appended to its file name.
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// `path` with `suffix` removed, if it ends with it and something remains.
pub fn strip_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(suffix)?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}

/// Ask before overwriting `path`. Never asks when stdin is not a terminal.
pub fn confirm_overwrite(path: &Path, force: bool) -> CliResult<bool> {
    if force || !path.exists() {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    let answer = Confirm::new()
        .with_prompt(format!("{} already exists; overwrite?", path.display()))
        .default(false)
        .interact()?;
    Ok(answer)
}

/// Modification time of a file as a gzip header timestamp.
pub fn file_mtime(metadata: &Metadata) -> u32 {
    let secs = FileTime::from_last_modification_time(metadata).unix_seconds();
    u32::try_from(secs).unwrap_or(0)
}

/// Set the modification time of `path`.
pub fn restore_mtime(path: &Path, mtime: u32) -> CliResult<()> {
    filetime::set_file_mtime(path, FileTime::from_unix_time(i64::from(mtime), 0))?;
    Ok(())
}

/// What was decoded from one gzip member.
#[derive(Debug, Clone)]
pub struct MemberStats {
    /// Member header.
    pub header: GzipHeader,
    /// CRC-32 of the member's data (verified against the footer).
    pub crc: u32,
    /// Uncompressed size.
    pub size: u64,
}

/// Decompress every member of `input` into `out`; returns the total size.
pub fn copy_members<'a, W: Write>(
    input: Box<dyn Read + 'a>,
    out: &mut W,
    mut on_member: impl FnMut(MemberStats),
) -> CliResult<u64> {
    let mut source = input;
    let mut total = 0;
    loop {
        let mut reader = GzipReader::new(source)?;
        let size = io::copy(&mut reader, out)?;
        total += size;
        on_member(MemberStats {
            header: reader.header().clone(),
            crc: reader.crc(),
            size,
        });

        let mut pending = reader.unused()?.unwrap_or_default();
        let mut rest = reader.finish()?;
        if pending.is_empty() {
            let mut next_byte = [0u8; 1];
            if rest.read(&mut next_byte)? == 0 {
                return Ok(total);
            }
            pending.push(next_byte[0]);
        }
        debug!(pending = pending.len(), "next gzip member");
        source = Box::new(Cursor::new(pending).chain(rest));
    }
}
