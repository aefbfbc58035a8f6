//! HotSpot performance-data (hsperfdata) counter adapter.
//!
//! HotSpot JVMs export their internal `sun.*` counters through a
//! memory-mapped file at `/tmp/hsperfdata_<user>/<pid>`. The file is a
//! prologue followed by self-describing entries; scalar `long` entries
//! are the counters this crate cares about. The index (names and value
//! offsets) is parsed once at attach time; `lookup` then re-reads the
//! counter's 8 value bytes from the file on every call, so gauge reads
//! always observe the JVM's current value.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{JvmStatsError, Result};
use crate::platform::DiagnosticCounters;

const MAGIC: u32 = 0xCAFE_C0C0;
const PROLOGUE_LEN: usize = 32;
const ENTRY_HEADER_LEN: usize = 20;

/// Scalar 64-bit counter, type tag 'J' in the entry header.
const TYPE_LONG: u8 = b'J';

pub struct PerfDataCounters {
    file: File,
    little_endian: bool,
    // counter name -> absolute byte offset of its i64 value
    offsets: HashMap<String, u64>,
}

impl PerfDataCounters {
    /// Attach to the perfdata file of a running JVM by pid.
    pub fn attach(pid: u32) -> Result<Self> {
        let path = Self::path_for(pid)?;
        Self::open(&path)
    }

    /// Open an explicit perfdata file.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;

        let (little_endian, offsets) = parse_index(&buf)
            .map_err(|msg| {
                warn!("malformed perfdata file {}: {}", path.display(), msg);
                JvmStatsError::perf_data(format!("{}: {}", path.display(), msg))
            })?;

        debug!(
            "attached to {} ({} counters)",
            path.display(),
            offsets.len()
        );

        Ok(Self {
            file,
            little_endian,
            offsets,
        })
    }

    /// Names of every indexed counter, unordered.
    pub fn counter_names(&self) -> Vec<String> {
        self.offsets.keys().cloned().collect()
    }

    fn path_for(pid: u32) -> Result<PathBuf> {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .map_err(|_| {
                JvmStatsError::counters_not_available("cannot determine user for hsperfdata path")
            })?;
        Ok(PathBuf::from(format!("/tmp/hsperfdata_{}/{}", user, pid)))
    }
}

impl DiagnosticCounters for PerfDataCounters {
    fn lookup(&self, name: &str) -> Option<i64> {
        let offset = *self.offsets.get(name)?;
        let mut raw = [0u8; 8];
        self.file.read_exact_at(&mut raw, offset).ok()?;
        Some(if self.little_endian {
            i64::from_le_bytes(raw)
        } else {
            i64::from_be_bytes(raw)
        })
    }
}

/// Walk the prologue and entries, indexing scalar long counters.
fn parse_index(buf: &[u8]) -> std::result::Result<(bool, HashMap<String, u64>), String> {
    if buf.len() < PROLOGUE_LEN {
        return Err("file shorter than prologue".to_string());
    }
    // The magic is always stored big-endian.
    let magic = u32::from_be_bytes(buf[0..4].try_into().unwrap());
    if magic != MAGIC {
        return Err(format!("bad magic 0x{:08X}", magic));
    }
    let little_endian = match buf[4] {
        0 => false,
        1 => true,
        other => return Err(format!("bad byte order marker {}", other)),
    };
    let (major, minor) = (buf[5], buf[6]);
    if major != 2 {
        return Err(format!("unsupported perfdata version {}.{}", major, minor));
    }
    if buf[7] == 0 {
        return Err("perfdata not yet marked accessible".to_string());
    }

    let read_i32 = |at: usize| -> std::result::Result<i32, String> {
        let raw: [u8; 4] = buf
            .get(at..at + 4)
            .ok_or_else(|| format!("truncated at offset {}", at))?
            .try_into()
            .unwrap();
        Ok(if little_endian {
            i32::from_le_bytes(raw)
        } else {
            i32::from_be_bytes(raw)
        })
    };

    let entry_offset = read_i32(24)?;
    let num_entries = read_i32(28)?;
    if entry_offset < 0 || num_entries < 0 {
        return Err("negative entry offset or count".to_string());
    }

    let mut offsets = HashMap::new();
    let mut at = entry_offset as usize;

    for _ in 0..num_entries {
        if at + ENTRY_HEADER_LEN > buf.len() {
            break;
        }
        let entry_length = read_i32(at)?;
        if entry_length <= 0 || at + entry_length as usize > buf.len() {
            break;
        }
        let name_offset = read_i32(at + 4)?;
        let vector_length = read_i32(at + 8)?;
        let data_type = buf[at + 12];
        let data_offset = read_i32(at + 16)?;

        // Only scalar longs are indexed; vectors (strings) and other
        // scalar types are not counters this adapter serves.
        if data_type == TYPE_LONG && vector_length == 0 && name_offset > 0 && data_offset > 0 {
            let name_at = at + name_offset as usize;
            let data_at = at as u64 + data_offset as u64;
            if name_at < buf.len() && data_at + 8 <= buf.len() as u64 {
                if let Some(name) = read_cstr(&buf[name_at..]) {
                    offsets.insert(name, data_at);
                }
            }
        }

        at += entry_length as usize;
    }

    Ok((little_endian, offsets))
}

fn read_cstr(buf: &[u8]) -> Option<String> {
    let end = buf.iter().position(|&b| b == 0)?;
    std::str::from_utf8(&buf[..end]).ok().map(str::to_string)
}
