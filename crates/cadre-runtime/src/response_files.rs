//! Response-file expansion: `@file` arguments.
//!
//! An argument starting with `@` names a file whose lines are substituted in
//! place of the argument before tokenizing. Lines are trimmed and blank lines
//! dropped. A missing file is a distinguishable error carrying the filename.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use cadre_framework::{CommandContext, Middleware, Next, PipelineResult, exit_code};

/// Errors from response-file expansion.
#[derive(Debug, Error)]
pub enum ResponseFileError {
    /// The named file does not exist.
    #[error("response file not found: {path}")]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read response file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Expands every `@file` argument in place. Non-`@` arguments pass through
/// untouched; a lone `@` is left alone.
pub fn expand_response_files(args: &[String]) -> Result<Vec<String>, ResponseFileError> {
    let mut expanded = Vec::with_capacity(args.len());
    for arg in args {
        match arg.strip_prefix('@') {
            Some(name) if !name.is_empty() => {
                let path = Path::new(name);
                if !path.exists() {
                    return Err(ResponseFileError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                let content = std::fs::read_to_string(path).map_err(|source| {
                    ResponseFileError::Io {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                let before = expanded.len();
                expanded.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string),
                );
                debug!(file = name, substituted = expanded.len() - before, "expanded response file");
            }
            _ => expanded.push(arg.clone()),
        }
    }
    Ok(expanded)
}

/// Pre-tokenize middleware rewriting the context's effective arguments.
pub struct ResponseFilesMiddleware;

#[async_trait]
impl Middleware for ResponseFilesMiddleware {
    fn name(&self) -> &str {
        "response-files"
    }

    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult {
        match expand_response_files(&ctx.effective_args()) {
            Ok(args) => {
                ctx.set_effective_args(args);
                next.run(ctx).await
            }
            Err(error) => {
                // A bad response file is user input, not a crash.
                ctx.console().write_error_line(error.to_string());
                Ok(exit_code::VALIDATION)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn to_args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expands_in_place() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "--verbose").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  value  ").unwrap();
        let reference = format!("@{}", file.path().display());

        let expanded =
            expand_response_files(&to_args(&["before", &reference, "after"])).unwrap();
        assert_eq!(expanded, vec!["before", "--verbose", "value", "after"]);
    }

    #[test]
    fn test_missing_file_is_distinguishable() {
        let err = expand_response_files(&to_args(&["@no/such/file"])).unwrap_err();
        match err {
            ResponseFileError::NotFound { path } => {
                assert_eq!(path, PathBuf::from("no/such/file"));
            }
            other => panic!("expected NotFound, got {other}"),
        }
    }

    #[test]
    fn test_non_at_arguments_pass_through() {
        let args = to_args(&["plain", "@"]);
        assert_eq!(expand_response_files(&args).unwrap(), args);
    }
}
