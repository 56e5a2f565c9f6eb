//! Test command implementation.

use crate::utils::{CliResult, copy_members};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

pub fn cmd_test(files: &[PathBuf], verbose: bool) -> CliResult<()> {
    let mut ok_count = 0usize;
    let mut errors: Vec<(String, String)> = Vec::new();

    for path in files {
        match test_file(path) {
            Ok(members) => {
                ok_count += 1;
                if verbose {
                    println!("  OK: {} ({} member(s))", path.display(), members);
                }
            }
            Err(e) => {
                println!("  FAILED: {} - {}", path.display(), e);
                errors.push((path.display().to_string(), e.to_string()));
            }
        }
    }

    println!();
    println!(
        "Tested {} file(s): {} OK, {} failed",
        files.len(),
        ok_count,
        errors.len()
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} file(s) failed the integrity test", errors.len()).into())
    }
}

fn test_file(path: &Path) -> CliResult<usize> {
    let input = BufReader::new(File::open(path)?);
    let mut members = 0;
    copy_members(Box::new(input), &mut io::sink(), |_| members += 1)?;
    Ok(members)
}
