//! Tab-separated export of finished run tables.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{IsingError, Result};
use crate::recorder::{RunTable, Value};
use crate::simulation::RunParams;
use crate::statistics::Moments;

/// Destination for a run's table once the run has finished.
///
/// Implementations are shared by every concurrently executing run.
pub trait Exporter: Send + Sync {
    fn export(&self, run: &RunParams, table: &RunTable) -> Result<PathBuf>;
}

/// Writes one tab-separated file per run into a folder.
///
/// Scalar columns become one output column; series columns become two, the
/// mean (`<name>`) and sample standard deviation (`<name> sd`) of the
/// micro-samples.
#[derive(Debug, Clone)]
pub struct TableExporter {
    folder: PathBuf,
    pattern: String,
}

impl TableExporter {
    pub fn new(folder: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            pattern: pattern.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Create the output folder and check that files can be created in it.
    pub fn prepare_output(&self) -> Result<()> {
        fs::create_dir_all(&self.folder)
            .map_err(|e| IsingError::output_location(&self.folder, e))?;
        let probe = self.folder.join(".ising-write-probe");
        File::create(&probe).map_err(|e| IsingError::output_location(&probe, e))?;
        fs::remove_file(&probe).map_err(|e| IsingError::output_location(&probe, e))?;
        Ok(())
    }

    /// Output file for a run. A pattern without `{index}` gets `_{index}`
    /// before its extension so runs never share a file.
    pub fn path_for(&self, run: &RunParams) -> PathBuf {
        let pattern = if self.pattern.contains("{index}") {
            self.pattern.clone()
        } else {
            match self.pattern.rsplit_once('.') {
                Some((stem, ext)) => format!("{stem}_{{index}}.{ext}"),
                None => format!("{}_{{index}}", self.pattern),
            }
        };
        let name = pattern
            .replace("{index}", &run.index.to_string())
            .replace("{temperature}", &format!("{:.4}", run.temperature))
            .replace("{field}", &format!("{:.4}", run.field));
        self.folder.join(name)
    }
}

impl Exporter for TableExporter {
    fn export(&self, run: &RunParams, table: &RunTable) -> Result<PathBuf> {
        let path = self.path_for(run);
        let mut out = BufWriter::new(File::create(&path)?);
        write_table(&mut out, table)?;
        out.flush()?;
        Ok(path)
    }
}

/// Write `table` as tab-separated text with a header row.
pub fn write_table(out: &mut impl Write, table: &RunTable) -> std::io::Result<()> {
    let mut header = Vec::new();
    for col in table.columns() {
        header.push(col.name.clone());
        if matches!(col.cells.first(), Some(Value::Series(_))) {
            header.push(format!("{} sd", col.name));
        }
    }
    writeln!(out, "{}", header.join("\t"))?;

    for row in 0..table.rows() {
        let mut fields = Vec::with_capacity(header.len());
        for col in table.columns() {
            let series = matches!(col.cells.first(), Some(Value::Series(_)));
            match col.cells.get(row) {
                Some(Value::Scalar(v)) => fields.push(v.to_string()),
                Some(Value::Series(s)) => {
                    let m = Moments::from_slice(s);
                    fields.push(m.mean().to_string());
                    fields.push(m.std_dev().to_string());
                }
                None => {
                    fields.push(String::new());
                    if series {
                        fields.push(String::new());
                    }
                }
            }
        }
        writeln!(out, "{}", fields.join("\t"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::Recorder;

    fn params(index: usize) -> RunParams {
        RunParams {
            index,
            temperature: 2.5,
            field: -0.125,
        }
    }

    #[test]
    fn test_path_for_substitutes_placeholders() {
        let exp = TableExporter::new("/tmp/out", "T{temperature}_H{field}_{index}.tsv");
        assert_eq!(
            exp.path_for(&params(3)),
            PathBuf::from("/tmp/out/T2.5000_H-0.1250_3.tsv")
        );

        let shared = TableExporter::new("/tmp/out", "results.tsv");
        assert_eq!(
            shared.path_for(&params(7)),
            PathBuf::from("/tmp/out/results_7.tsv")
        );
        let bare = TableExporter::new("/tmp/out", "results");
        assert_eq!(bare.path_for(&params(1)), PathBuf::from("/tmp/out/results_1"));
    }

    #[test]
    fn test_write_table_layout() {
        let mut table = RunTable::new();
        table.append("Temperature", 2.0.into());
        table.append("Magnetization", vec![1.0, 3.0].into());
        table.append("Temperature", 2.0.into());
        table.append("Magnetization", vec![0.5].into());

        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Temperature\tMagnetization\tMagnetization sd");
        let sd = 2.0f64.sqrt().to_string();
        assert_eq!(lines[1], format!("2\t2\t{sd}"));
        assert_eq!(lines[2], "2\t0.5\t0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_and_prepare() {
        let dir = tempfile::tempdir().unwrap();
        let exp = TableExporter::new(dir.path().join("nested"), "run_{index}.tsv");
        exp.prepare_output().unwrap();
        assert!(dir.path().join("nested").is_dir());

        let mut table = RunTable::new();
        table.append("Field", 0.0.into());
        let path = exp.export(&params(0), &table).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "Field\n0\n");
    }

    #[test]
    fn test_prepare_rejects_file_as_folder() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        File::create(&blocker).unwrap();
        let exp = TableExporter::new(&blocker, "run.tsv");
        assert!(matches!(
            exp.prepare_output(),
            Err(IsingError::OutputLocation { .. })
        ));
    }
}
