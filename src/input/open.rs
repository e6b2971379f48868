use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use memmap2::Mmap;

use crate::error::Result;

/// Opens `path` for line reading. `.gz` files are decompressed on the fly,
/// everything else is memory-mapped.
pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        return Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))));
    }
    // zero-length files cannot be mapped
    if file.metadata()?.len() == 0 {
        return Ok(Box::new(BufReader::new(file)));
    }
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Box::new(Cursor::new(mmap)))
}

/// Comma for `.csv`, tab for everything else; a trailing `.gz` is ignored.
pub fn delimiter_for(path: &Path) -> u8 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".csv") { b',' } else { b'\t' }
}
