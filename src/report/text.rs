use std::io::{self, Write};

use super::SnapshotReport;

const INDENT_WIDTH: usize = 2;

pub(super) fn write_text<W: Write + ?Sized>(report: &SnapshotReport, out: &mut W) -> io::Result<()> {
    let (Some(index), Some(name)) = (report.index, report.name.as_deref()) else {
        return writeln!(out, "-- no data --");
    };
    match report.timestamp.as_deref() {
        Some(ts) => writeln!(out, "Snapshot {index}: {name} ({ts})")?,
        None => writeln!(out, "Snapshot {index}: {name}")?,
    }

    for thread in &report.threads {
        writeln!(out)?;
        writeln!(out, "Thread {}", thread.label)?;
        if thread.rows.is_empty() {
            writeln!(out, "  -- none --")?;
            continue;
        }
        let name_width = thread
            .rows
            .iter()
            .map(|row| row.depth * INDENT_WIDTH + row.name.chars().count())
            .chain(std::iter::once("name".len()))
            .max()
            .unwrap_or_default();
        writeln!(
            out,
            "  {:<name_width$}  {:>10}  {:>14}  {:>12}",
            "name", "calls", "total us", "avg us"
        )?;
        for row in &thread.rows {
            let label = format!("{}{}", " ".repeat(row.depth * INDENT_WIDTH), row.name);
            writeln!(
                out,
                "  {label:<name_width$}  {:>10}  {:>14}  {:>12}",
                row.calls, row.total_us, row.avg_us
            )?;
        }
    }
    Ok(())
}
