use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::SinkError;
use crate::report::{CellStyle, Report};

pub trait ReportSink {
    /// Persists `report` at `destination`. On failure nothing is left at the
    /// destination that was not there before.
    fn write(&self, report: &Report, destination: &Path) -> Result<(), SinkError>;
}

/// Writes the report as an `.xlsx` workbook.
pub struct XlsxSink;

impl XlsxSink {
    pub fn encode(report: &Report) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&report.sheet_name)?;
        worksheet.set_screen_gridlines(report.show_gridlines);

        let rows = std::iter::once(&report.header).chain(report.rows.iter());
        for (row_idx, row) in rows.enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let format = cell_format(&cell.style);
                worksheet.write_string_with_format(row_idx as u32, col_idx as u16, &cell.text, &format)?;
            }
        }

        for (col_idx, width) in report.column_widths.iter().enumerate() {
            worksheet.set_column_width(col_idx as u16, *width as f64)?;
        }

        workbook.save_to_buffer()
    }
}

fn cell_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if style.thin_border {
        format = format.set_border(FormatBorder::Thin);
    }
    if let Some(rgb) = style.font_color {
        format = format.set_font_color(Color::RGB(rgb));
    }
    format
}

/// Creates the staging file with the permissions the report should end up
/// with: those of the report being replaced, or the umask default for a new one.
fn stage_file(dir: &Path, destination: &Path) -> io::Result<NamedTempFile> {
    let staged = new_staging_file(dir)?;
    match fs::metadata(destination) {
        Ok(existing) => staged.as_file().set_permissions(existing.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    Ok(staged)
}

#[cfg(unix)]
fn new_staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    // Applied at open(2), so the process umask still trims it.
    tempfile::Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn new_staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

impl ReportSink for XlsxSink {
    fn write(&self, report: &Report, destination: &Path) -> Result<(), SinkError> {
        let io_err = |source: std::io::Error| SinkError::Io { path: destination.to_path_buf(), source };

        let bytes = Self::encode(report)
            .map_err(|source| SinkError::Encode { path: destination.to_path_buf(), source })?;

        // Stage next to the destination so the final rename stays on one filesystem.
        let dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut staged = stage_file(dir, destination).map_err(io_err)?;
        staged.write_all(&bytes).map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;
        staged.persist(destination).map_err(|e| io_err(e.error))?;

        debug!("Wrote {} bytes to {}", bytes.len(), destination.display());
        Ok(())
    }
}
