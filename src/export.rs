//! CSV dump of the visible grid.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::model::scope;
use crate::table::TableController;

/// Writes the visible grid of `table` into `dir` and returns the file path.
///
/// The file is named `<namespace>-<kind>-<unix-nanos>.csv`, or
/// `<kind>-<unix-nanos>.csv` when the view spans every namespace.
pub fn dump(table: &TableController, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let ts = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let ns = table.namespace();
    let name = if scope::is_all_namespaces(ns) || scope::is_cluster_scoped(ns) {
        format!("{}-{ts}.csv", table.kind())
    } else {
        format!("{}-{}-{ts}.csv", ns.replace('/', "-"), table.kind())
    };
    let path = dir.join(name);

    let mut w = BufWriter::new(fs::File::create(&path)?);
    let header: Vec<&str> = table.plan().header.iter().map(|c| c.name.as_str()).collect();
    write_record(&mut w, header)?;
    for row in table.grid() {
        write_record(&mut w, row.iter().map(|c| c.text.trim()))?;
    }
    w.flush()?;

    info!(path = %path.display(), rows = table.grid().len(), "table dumped");
    Ok(path)
}

fn write_record<'a>(w: &mut impl Write, fields: impl IntoIterator<Item = &'a str>) -> io::Result<()> {
    let line = fields.into_iter().map(escape).collect::<Vec<_>>().join(",");
    writeln!(w, "{line}")
}

/// Quotes a field holding a separator, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
