//! Decompress command implementation.

use crate::utils::{CliResult, confirm_overwrite, copy_members, restore_mtime, strip_suffix};
use oxizlib_gzip::GzipReader;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Options for the decompress command.
pub struct DecompressOptions {
    pub keep: bool,
    pub stdout: bool,
    pub force: bool,
    pub restore_name: bool,
    pub suffix: String,
}

pub fn cmd_decompress(files: &[PathBuf], options: &DecompressOptions) -> CliResult<()> {
    for path in files {
        decompress_file(path, options)?;
    }
    Ok(())
}

fn decompress_file(path: &Path, options: &DecompressOptions) -> CliResult<()> {
    if options.stdout {
        let input = BufReader::new(File::open(path)?);
        let mut stdout = io::stdout().lock();
        copy_members(Box::new(input), &mut stdout, |_| {})?;
        stdout.flush()?;
        return Ok(());
    }

    let Some(default_target) = strip_suffix(path, &options.suffix) else {
        eprintln!("{}: unknown suffix, ignored", path.display());
        return Ok(());
    };

    // Peek at the first header for the stored name and timestamp.
    let header = GzipReader::open(path)?.header().clone();
    let target = match (&header.orig_name, options.restore_name) {
        (Some(name), true) => stored_name_target(path, name).unwrap_or(default_target),
        _ => default_target,
    };

    if !confirm_overwrite(&target, options.force)? {
        eprintln!("{}: already exists, not overwritten", target.display());
        return Ok(());
    }

    let input = BufReader::new(File::open(path)?);
    let mut output = BufWriter::new(File::create(&target)?);
    let result = copy_members(Box::new(input), &mut output, |_| {});
    if let Err(e) = result {
        drop(output);
        let _ = fs::remove_file(&target);
        return Err(e);
    }
    output.flush()?;
    drop(output);

    if header.mtime > 0 {
        restore_mtime(&target, header.mtime)?;
    }
    if !options.keep {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Target path from a stored name, keeping only its final component.
fn stored_name_target(path: &Path, name: &[u8]) -> Option<PathBuf> {
    let name = String::from_utf8_lossy(name);
    let file_name = Path::new(name.as_ref()).file_name()?;
    Some(path.with_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name_is_confined() {
        let path = Path::new("/tmp/in/archive.gz");
        assert_eq!(
            stored_name_target(path, b"report.txt"),
            Some(PathBuf::from("/tmp/in/report.txt"))
        );
        assert_eq!(
            stored_name_target(path, b"../../etc/passwd"),
            Some(PathBuf::from("/tmp/in/passwd"))
        );
        assert_eq!(stored_name_target(path, b".."), None);
    }
}
