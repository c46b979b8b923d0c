//! Directory-to-directory conversion.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{BatchConfig, OnError};
use crate::error::BatchError;
use crate::output::{Converted, convert, to_json, to_value};

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Names of converted documents, in processing order
    pub converted: Vec<String>,
    /// Documents that failed and were skipped, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Files written
    pub outputs: Vec<PathBuf>,
}

/// Input documents in `config.source`, sorted by file name
pub fn list_inputs(config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    let entries = fs::read_dir(&config.source).map_err(|e| BatchError::io(&config.source, e))?;

    let mut inputs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BatchError::io(&config.source, e))?;
        let path = entry.path();
        if path.is_file() && config.accepts(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Names key the aggregate map and the per-document files
fn check_unique_names(inputs: &[PathBuf]) -> Result<(), BatchError> {
    let mut seen: BTreeMap<String, &PathBuf> = BTreeMap::new();
    for path in inputs {
        if let Some(first) = seen.insert(document_name(path), path) {
            return Err(BatchError::DuplicateName {
                name: document_name(path),
                first: first.clone(),
                second: path.clone(),
            });
        }
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), BatchError> {
    fs::write(path, contents).map_err(|e| BatchError::io(path, e))?;
    info!(path = %path.display(), "wrote");
    Ok(())
}

/// Convert every matching document of `config.source` into `config.destination`
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport, BatchError> {
    let options = config.parse_options();
    let inputs = list_inputs(config)?;
    check_unique_names(&inputs)?;
    fs::create_dir_all(&config.destination).map_err(|e| BatchError::io(&config.destination, e))?;

    let mut report = BatchReport::default();
    let mut converted: Vec<(String, Converted)> = Vec::with_capacity(inputs.len());

    for path in inputs {
        let name = document_name(&path);
        let result = fs::read_to_string(&path)
            .map_err(|e| BatchError::io(&path, e))
            .and_then(|text| {
                convert(&text, config.mode, config.backend, &options).map_err(|source| {
                    BatchError::Parse {
                        file: path.clone(),
                        source,
                    }
                })
            });

        match result {
            Ok(document) => {
                report.converted.push(name.clone());
                converted.push((name, document));
            }
            Err(e) if config.on_error == OnError::Skip => {
                warn!(file = %path.display(), error = %e, "skipping document");
                report.skipped.push((path, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    if config.aggregate {
        let mut combined = BTreeMap::new();
        for (name, document) in &converted {
            combined.insert(name.clone(), to_value(document, None)?);
        }
        let json = if config.pretty {
            serde_json::to_string_pretty(&combined)?
        } else {
            serde_json::to_string(&combined)?
        };
        let path = config.destination.join(&config.aggregate_file);
        write_file(&path, &json)?;
        report.outputs.push(path);
    } else {
        for (name, document) in &converted {
            let json = to_json(document, Some(name), config.pretty)?;
            let path = config.destination.join(format!("{}.json", name));
            write_file(&path, &json)?;
            report.outputs.push(path);
        }
    }

    Ok(report)
}
