//! Memory Region Types
//!
//! Mapped regions of a live process, as listed in /proc/pid/maps.

/// A memory region from /proc/pid/maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: usize,
    pub end: usize,
    pub perms: String,
    pub path: Option<String>,
}

impl MemoryRegion {
    /// Parse one maps line: `start-end perms offset dev inode [path]`
    pub fn parse(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let (start, end) = parts.first()?.split_once('-')?;

        let start = usize::from_str_radix(start, 16).ok()?;
        let end = usize::from_str_radix(end, 16).ok()?;
        let perms = parts.get(1).unwrap_or(&"").to_string();
        // Paths may contain spaces (Wine prefixes usually do)
        let path = (parts.len() > 5).then(|| parts[5..].join(" "));

        Some(MemoryRegion {
            start,
            end,
            perms,
            path,
        })
    }

    pub fn size(&self) -> usize {
        self.end - self.start
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    /// Whether this region is backed by a file named `file_name` (case-insensitive)
    pub fn is_file(&self, file_name: &str) -> bool {
        self.path
            .as_deref()
            .map(|p| {
                p.rsplit(['/', '\\'])
                    .next()
                    .unwrap_or(p)
                    .eq_ignore_ascii_case(file_name)
            })
            .unwrap_or(false)
    }
}

/// Lowest mapped address of the module file `file_name`
pub fn module_base(regions: &[MemoryRegion], file_name: &str) -> Option<usize> {
    regions
        .iter()
        .filter(|r| r.is_file(file_name))
        .map(|r| r.start)
        .min()
}

/// Whether `[address, address + size)` lies wholly in readable regions
///
/// `regions` must be sorted by start address. Adjacent readable regions
/// count as one span.
pub fn covers_readable(regions: &[MemoryRegion], address: usize, size: usize) -> bool {
    if size == 0 {
        return true;
    }
    let Some(end) = address.checked_add(size) else {
        return false;
    };

    let mut cursor = address;
    for region in regions {
        if !(region.is_readable() && region.end > cursor) {
            continue;
        }
        if region.start > cursor {
            return false;
        }
        cursor = region.end;
        if cursor >= end {
            return true;
        }
    }
    false
}
