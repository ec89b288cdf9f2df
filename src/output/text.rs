//! Human-readable output for duplicate scan results.
//!
//! One block per duplicate group: a header line with the content hash
//! and per-file size, then each member path indented beneath it. A
//! summary line closes the report, and collected warnings go to stderr
//! so they never pollute piped output.
//!
//! ```text
//! 9f86d081884c7d65... 1024
//!   /home/user/a.txt
//!   /home/user/backup/a.txt
//!
//! Found 1 duplicate group (1 duplicate file, 1.0 KiB reclaimable).
//! ```

use std::io::Write;

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Text renderer for scan results.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer over the finished scan results.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self { groups, summary }
    }

    /// Write the group listing and summary line.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn write_results<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for group in self.groups {
            writeln!(
                out,
                "{} {}",
                group.hash_hex().cyan(),
                group.size.to_string().dim()
            )?;
            for file in &group.files {
                writeln!(out, "  {}", file.path.display())?;
            }
            writeln!(out)?;
        }

        if self.groups.is_empty() {
            writeln!(out, "{}", "No duplicate files found.".green())?;
        } else {
            let groups = self.groups.len();
            let files = self.summary.duplicate_files;
            writeln!(
                out,
                "Found {} duplicate {} ({} duplicate {}, {} reclaimable).",
                groups.bold(),
                plural(groups, "group", "groups"),
                files,
                plural(files, "file", "files"),
                ByteSize::b(self.summary.reclaimable_space).to_string().bold()
            )?;
        }

        Ok(())
    }

    /// Write the collected warnings, one per line.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn write_warnings<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for error in &self.summary.scan_errors {
            writeln!(out, "{} {}", "warning:".yellow().bold(), error)?;
        }
        if self.summary.has_warnings() {
            writeln!(
                out,
                "{} {} entries could not be scanned",
                "warning:".yellow().bold(),
                self.summary.scan_errors.len()
            )?;
        }
        Ok(())
    }

    /// Print results to stdout and warnings to stderr.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the standard streams.
    pub fn print(&self) -> std::io::Result<()> {
        self.write_warnings(std::io::stderr().lock())?;
        self.write_results(std::io::stdout().lock())
    }
}

fn plural<'s>(count: usize, one: &'s str, many: &'s str) -> &'s str {
    if count == 1 {
        one
    } else {
        many
    }
}
