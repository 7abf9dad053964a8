//! Multi-file analysis
//!
//! Files are read concurrently, one task per file. Each read is joined
//! explicitly and in input order, and the bridge then runs for that file
//! alone, so a result is always paired with the file that produced it.
//! The module is used by one file at a time.

use std::path::{Path, PathBuf};

use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::module::ForeignModule;
use crate::types::AnalysisResult;

/// Suffix a path must carry to take part in a batch
pub const CSV_SUFFIX: &str = ".csv";

/// Outcome for one file of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Display name (last path component)
    pub name: String,
    pub path: PathBuf,
    pub outcome: BridgeResult<AnalysisResult>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Whether the file name ends in `.csv`
pub fn is_csv(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(CSV_SUFFIX))
        .unwrap_or(false)
}

/// Name shown for a file
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a file as text, replacing invalid UTF-8 sequences
pub async fn read_file(path: PathBuf) -> BridgeResult<String> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => Err(BridgeError::AcquisitionFailure {
            path,
            message: e.to_string(),
        }),
    }
}

/// Analyse every `.csv` path
///
/// Paths without the suffix are skipped. Fails with
/// [`BridgeError::NoCsvFiles`] when nothing is left. A failing file only
/// affects its own [`FileReport`].
pub async fn analyse_files<M, I>(bridge: &mut Bridge<M>, paths: I) -> BridgeResult<Vec<FileReport>>
where
    M: ForeignModule,
    I: IntoIterator<Item = PathBuf>,
{
    let (csv, skipped): (Vec<PathBuf>, Vec<PathBuf>) = paths.into_iter().partition(|p| is_csv(p));
    for path in &skipped {
        tracing::debug!(path = %path.display(), "skipping non-csv file");
    }
    if csv.is_empty() {
        return Err(BridgeError::NoCsvFiles);
    }

    let reads: Vec<_> = csv
        .into_iter()
        .map(|path| {
            let handle = tokio::spawn(read_file(path.clone()));
            (path, handle)
        })
        .collect();

    let mut reports = Vec::with_capacity(reads.len());
    for (path, handle) in reads {
        let name = display_name(&path);
        let text = match handle.await {
            Ok(text) => text,
            Err(e) => Err(BridgeError::AcquisitionFailure {
                path: path.clone(),
                message: e.to_string(),
            }),
        };

        let outcome = text.and_then(|text| bridge.analyse(&name, &text));
        if let Err(e) = &outcome {
            tracing::warn!(file = %name, error = %e, "file skipped");
        }

        reports.push(FileReport {
            name,
            path,
            outcome,
        });
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv() {
        assert!(is_csv(Path::new("/data/sensor.csv")));
        assert!(is_csv(Path::new("a.b.csv")));
        assert!(!is_csv(Path::new("sensor.CSV")));
        assert!(!is_csv(Path::new("sensor.tsv")));
        assert!(!is_csv(Path::new("/data/csv")));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/data/sensor.csv")), "sensor.csv");
        assert_eq!(display_name(Path::new("plain.csv")), "plain.csv");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = read_file(PathBuf::from("/nonexistent/x.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::AcquisitionFailure { .. }));
    }
}
