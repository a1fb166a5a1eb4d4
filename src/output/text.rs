//! Human-readable report.
//!
//! ```text
//! 3 files, 12.0 KiB each (hash 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824)
//!   /data/a.txt
//!   /data/b.txt
//!   /data/copy/a.txt
//!
//! Found 1 duplicate group (2 duplicate files), 24.0 KiB reclaimable.
//! Scanned 3 files (36.0 KiB) in 0.01s with 100 workers.
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Message printed when a scan finds nothing.
pub const NO_DUPLICATES_MESSAGE: &str = "No duplicate files found.";

/// Text formatter.
#[derive(Debug)]
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Formatter without colors.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self {
            groups,
            summary,
            color: false,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn condition(&self) -> Condition {
        if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        }
    }

    /// Write the full report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let when = self.condition();

        if self.groups.is_empty() {
            writeln!(writer, "{NO_DUPLICATES_MESSAGE}")?;
        }

        for group in self.groups {
            writeln!(
                writer,
                "{} files, {} each (hash {})",
                group.len().bold().whenever(when),
                ByteSize(group.size).cyan().whenever(when),
                group.hash_hex().dim().whenever(when)
            )?;
            for (index, file) in group.files.iter().enumerate() {
                let path = file.path.display().to_string();
                if index == 0 {
                    writeln!(writer, "  {}", path.green().whenever(when))?;
                } else {
                    writeln!(writer, "  {path}")?;
                }
            }
            writeln!(writer)?;
        }

        self.write_summary(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let when = self.condition();
        let s = self.summary;

        if s.duplicate_groups > 0 {
            writeln!(
                writer,
                "Found {} duplicate {} ({} duplicate {}), {} reclaimable.",
                s.duplicate_groups,
                plural(s.duplicate_groups, "group", "groups"),
                s.duplicate_files,
                plural(s.duplicate_files, "file", "files"),
                ByteSize(s.reclaimable_space).yellow().bold().whenever(when)
            )?;
        }

        writeln!(
            writer,
            "Scanned {} {} ({}) in {:.2}s with {} {}.",
            s.total_files,
            plural(s.total_files, "file", "files"),
            ByteSize(s.total_size),
            s.scan_duration.as_secs_f64(),
            s.workers,
            plural(s.workers, "worker", "workers")
        )?;

        if s.has_errors() {
            writeln!(
                writer,
                "{}",
                format!(
                    "{} {} could not be read; run with -v for details.",
                    s.scan_errors.len(),
                    plural(s.scan_errors.len(), "path", "paths")
                )
                .red()
                .whenever(when)
            )?;
        }

        Ok(())
    }

    /// Render the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn plural<'s>(n: usize, one: &'s str, many: &'s str) -> &'s str {
    if n == 1 {
        one
    } else {
        many
    }
}
