//! Info command implementation.

use crate::utils::{CliResult, MemberStats, copy_members};
use oxizlib_gzip::header::os;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

/// JSON serializable summary of one gzip member.
#[derive(Debug, Serialize, Deserialize)]
struct MemberJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    orig_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    mtime: u32,
    os: String,
    level: i32,
    crc: String,
    size: u64,
}

impl MemberJson {
    fn from_stats(stats: &MemberStats) -> Self {
        let lossy = |bytes: &Vec<u8>| String::from_utf8_lossy(bytes).into_owned();
        Self {
            orig_name: stats.header.orig_name.as_ref().map(lossy),
            comment: stats.header.comment.as_ref().map(lossy),
            mtime: stats.header.mtime,
            os: os::name(stats.header.os_code).to_string(),
            level: stats.header.level.level(),
            crc: format!("{:08x}", stats.crc),
            size: stats.size,
        }
    }
}

/// JSON output for the info command.
#[derive(Debug, Serialize, Deserialize)]
struct InfoJson {
    file: String,
    compressed_size: u64,
    uncompressed_size: u64,
    ratio: f64,
    members: Vec<MemberJson>,
}

pub fn cmd_info(path: &Path, json: bool) -> CliResult<()> {
    let compressed_size = fs::metadata(path)?.len();
    let input = BufReader::new(File::open(path)?);
    let mut members = Vec::new();
    let uncompressed_size = copy_members(Box::new(input), &mut io::sink(), |m| members.push(m))?;

    let ratio = if uncompressed_size > 0 {
        (1.0 - compressed_size as f64 / uncompressed_size as f64) * 100.0
    } else {
        0.0
    };

    if json {
        let info = InfoJson {
            file: path.display().to_string(),
            compressed_size,
            uncompressed_size,
            ratio,
            members: members.iter().map(MemberJson::from_stats).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("GZIP Information");
    println!("================");
    println!("File: {}", path.display());
    println!("Compressed size: {} bytes", compressed_size);
    println!("Uncompressed size: {} bytes", uncompressed_size);
    println!("Compression ratio: {:.1}%", ratio);

    for (index, member) in members.iter().enumerate() {
        let header = &member.header;
        println!();
        println!("Member {}:", index + 1);
        if let Some(name) = &header.orig_name {
            println!("  Original filename: {}", String::from_utf8_lossy(name));
        }
        if let Some(comment) = &header.comment {
            println!("  Comment: {}", String::from_utf8_lossy(comment));
        }
        if header.mtime > 0 {
            println!("  Modification time: {} (Unix timestamp)", header.mtime);
        }
        println!("  OS: {} ({})", os::name(header.os_code), header.os_code);
        println!("  Level: {}", header.level);
        println!("  CRC-32: {:08x}", member.crc);
        println!("  Size: {} bytes", member.size);
    }
    Ok(())
}
