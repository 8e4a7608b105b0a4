//! Discovery of per-sample configuration files from startup arguments.
//!
//! Two flags are recognised anywhere on the command line:
//! - `-i <config>`: one sample configuration; may be repeated.
//! - `-I <list>`: a file naming one configuration path per line.
//!
//! All other arguments belong to the simulation and are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use crate::vis_error::VisError;

/// Configuration paths in the order the samples were declared.
pub fn scan_startup_args<I, S>(args: I) -> Result<Vec<PathBuf>, VisError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<S> = args.into_iter().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_ref();
        if flag == "-i" || flag == "-I" {
            let Some(value) = args.get(i + 1) else {
                log::warn!("ignoring trailing `{flag}` flag without a path");
                break;
            };
            if flag == "-i" {
                out.push(PathBuf::from(value.as_ref()));
            } else {
                out.extend(read_config_list(Path::new(value.as_ref()))?);
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    Ok(out)
}

/// Read a `-I` list file: one path per line, blank lines skipped.
pub fn read_config_list(path: &Path) -> Result<Vec<PathBuf>, VisError> {
    let text = fs::read_to_string(path).map_err(|e| VisError::ConfigIo {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect())
}
