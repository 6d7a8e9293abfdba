use crate::cascade::CascadeResult;
use crate::sweep::SweepTable;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: &str = "windshield_size,heat_load,system_weight,fuel_burn";
pub const DEFAULT_EXPORT_NAME: &str = "airplane_cascade_results.csv";

pub struct CsvWriter<W: Write> {
    w: W,
}

impl CsvWriter<BufWriter<File>> {
    /// Creates the file (and any missing parent directories).
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let f = File::create(path)
            .with_context(|| format!("failed to create CSV: {}", path.display()))?;
        Ok(Self::new(BufWriter::new(f)))
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    pub fn write_header(&mut self) -> Result<()> {
        writeln!(self.w, "{}", CSV_HEADER)?;
        Ok(())
    }

    pub fn write_row(&mut self, r: &CascadeResult) -> Result<()> {
        writeln!(
            self.w,
            "{:.6},{:.6},{:.6},{:.6}",
            r.windshield_size, r.heat_load, r.system_weight, r.fuel_burn
        )?;
        Ok(())
    }

    /// Header plus one row per sample.
    pub fn write_table(&mut self, table: &SweepTable) -> Result<()> {
        self.write_header()?;
        for row in table {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Free-form `# ...` line, used for trailing notes.
    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        writeln!(self.w, "# {}", text)?;
        Ok(())
    }

    pub fn write_blank(&mut self) -> Result<()> {
        writeln!(self.w)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.w.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.w
    }
}

/// Renders a sweep table as CSV in memory.
pub fn to_csv_string(table: &SweepTable) -> Result<String> {
    let mut w = CsvWriter::new(Vec::new());
    w.write_table(table)?;
    Ok(String::from_utf8(w.into_inner())?)
}

/// Writes a sweep table to `path`.
pub fn export_table(path: &Path, table: &SweepTable) -> Result<()> {
    let mut w = CsvWriter::create(path)?;
    w.write_table(table)?;
    w.flush()?;
    tracing::debug!(path = %path.display(), rows = table.len(), "CSV written");
    Ok(())
}

/// Writes pretty JSON to `path`, creating parent directories.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write JSON: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Derives a sibling path by replacing the `.csv` extension with `suffix`.
pub fn sibling_path(csv_path: &Path, suffix: &str) -> std::path::PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    csv_path.with_file_name(format!("{}{}", stem, suffix))
}
