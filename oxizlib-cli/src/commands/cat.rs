//! Cat command implementation.

use crate::utils::{CliResult, copy_members};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

pub fn cmd_cat(files: &[PathBuf]) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    for path in files {
        let input = BufReader::new(File::open(path)?);
        copy_members(Box::new(input), &mut stdout, |_| {})?;
    }
    stdout.flush()?;
    Ok(())
}
