use std::io::{self, Write};

use super::{SnapshotReport, ThreadReport};

const INDENT: &str = "&nbsp;&nbsp;";

pub(super) fn write_html<W: Write + ?Sized>(report: &SnapshotReport, out: &mut W) -> io::Result<()> {
    out.write_all(b"<html><body>")?;
    let (Some(index), Some(name)) = (report.index, report.name.as_deref()) else {
        out.write_all(b"<p><em>-- no data --</em></p>")?;
        return out.write_all(b"</body></html>");
    };
    writeln!(out, "<h2>Snapshot {index}: {}</h2>", escape(name))?;
    for thread in &report.threads {
        write_thread(thread, out)?;
    }
    out.write_all(b"</body></html>")
}

fn write_thread<W: Write + ?Sized>(thread: &ThreadReport, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "<h1>Thread {} ({})</h1>",
        escape(&thread.label.name),
        thread.key
    )?;
    writeln!(
        out,
        "<table style=\"width:100%; font-family: monospace\"><tr><th>name</th><th>calls</th><th>total time</th><th>avg time</th></tr>"
    )?;
    if thread.rows.is_empty() {
        writeln!(out, "<tr><td colspan=\"4\"><em>-- none -- </em></td></tr>")?;
    }
    for row in &thread.rows {
        writeln!(out, "<tr>")?;
        writeln!(out, "<td>{}{}</td>", INDENT.repeat(row.depth), escape(&row.name))?;
        writeln!(out, "<td style=\"text-align: right\">{}</td>", row.calls)?;
        writeln!(out, "<td style=\"text-align: right\">{}</td>", row.total_us)?;
        writeln!(out, "<td style=\"text-align: right\">{}</td></tr>", row.avg_us)?;
    }
    writeln!(out, "</table>")
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
