//! Compress command implementation.

use crate::utils::{
    CliResult, append_suffix, confirm_overwrite, create_progress_bar, file_mtime,
};
use oxizlib_core::{CompressionLevel, Strategy};
use oxizlib_gzip::GzipWriter;
use std::fs::{self, File, Metadata};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for the compress command.
pub struct CompressOptions {
    pub level: i32,
    pub strategy: Strategy,
    pub keep: bool,
    pub stdout: bool,
    pub force: bool,
    pub no_name: bool,
    pub suffix: String,
    pub sync: bool,
    pub progress: bool,
}

pub fn cmd_compress(files: &[PathBuf], options: &CompressOptions) -> CliResult<()> {
    let level = CompressionLevel::new(options.level)?;
    for path in files {
        compress_file(path, level, options)?;
    }
    Ok(())
}

fn compress_file(path: &Path, level: CompressionLevel, options: &CompressOptions) -> CliResult<()> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(format!("{}: not a regular file", path.display()).into());
    }
    if !options.stdout && path.to_string_lossy().ends_with(&options.suffix) {
        eprintln!(
            "{}: already has {} suffix, unchanged",
            path.display(),
            options.suffix
        );
        return Ok(());
    }

    let input = BufReader::new(File::open(path)?);

    if options.stdout {
        let writer = GzipWriter::with_params(io::stdout().lock(), level, options.strategy);
        let mut stdout = write_member(writer, input, path, &metadata, options)?;
        stdout.flush()?;
        return Ok(());
    }

    let target = append_suffix(path, &options.suffix);
    if !confirm_overwrite(&target, options.force)? {
        eprintln!("{}: already exists, not overwritten", target.display());
        return Ok(());
    }

    let output = BufWriter::new(File::create(&target)?);
    let writer = GzipWriter::with_params(output, level, options.strategy);
    let mut output = write_member(writer, input, path, &metadata, options)?;
    output.flush()?;

    if !options.keep {
        fs::remove_file(path)?;
    }
    Ok(())
}

fn write_member<W: Write>(
    mut writer: GzipWriter<W>,
    input: impl Read,
    path: &Path,
    metadata: &Metadata,
    options: &CompressOptions,
) -> CliResult<W> {
    if !options.no_name {
        if let Some(name) = path.file_name() {
            writer.set_orig_name(name.as_encoded_bytes())?;
        }
        writer.set_mtime(file_mtime(metadata))?;
    }
    writer.set_sync(options.sync);

    let pb = create_progress_bar(metadata.len(), options.progress);
    pb.set_message(path.display().to_string());
    io::copy(&mut pb.wrap_read(input), &mut writer)?;
    pb.finish_and_clear();

    let (total_in, crc) = (writer.total_in(), writer.crc());
    let output = writer.finish()?;
    debug!(file = %path.display(), total_in, crc, "compressed");
    Ok(output)
}
