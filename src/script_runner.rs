//! Process-backed statement execution
//!
//! `SnowSqlExecutor` runs each batch through the `snowsql` command line
//! client. The batch is fed on stdin, output is requested as TSV and parsed
//! back into rows.
//!
//! # Command Shape
//!
//! ```text
//! snowsql -c <connection> -o friendly=false -o header=false -o timing=false
//!         -o output_format=tsv -o exit_on_error=true [-o remove_comments=true]
//! ```
//!
//! Connection names refer to `[connections.<name>]` entries in the client's
//! own configuration; credentials never pass through this tool.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{DcrError, Result};
use crate::script_traits::{ResultCursor, StatementExecutor};

/// Default client binary
pub const DEFAULT_SNOWSQL: &str = "snowsql";

/// Executes batches by spawning the `snowsql` client
#[derive(Debug, Clone)]
pub struct SnowSqlExecutor {
    program: String,
}

impl SnowSqlExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to the client for one batch
    pub fn command_args(&self, connection: &str, remove_comments: bool) -> Vec<String> {
        let mut args = vec!["-c".to_string(), connection.to_string()];
        for option in [
            "friendly=false",
            "header=false",
            "timing=false",
            "output_format=tsv",
            "exit_on_error=true",
        ] {
            args.push("-o".to_string());
            args.push(option.to_string());
        }
        if remove_comments {
            args.push("-o".to_string());
            args.push("remove_comments=true".to_string());
        }
        args
    }
}

impl Default for SnowSqlExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SNOWSQL)
    }
}

impl StatementExecutor for SnowSqlExecutor {
    fn execute_stream(
        &mut self,
        connection: &str,
        batch: &str,
        remove_comments: bool,
    ) -> Result<Vec<ResultCursor>> {
        let args = self.command_args(connection, remove_comments);
        info!("execute_stream: {} args={:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DcrError::execution(connection, format!("failed to spawn {}: {}", self.program, e))
            })?;

        // Feed stdin from a helper thread so a chatty client cannot fill its
        // stdout pipe while we are still writing
        let writer = child.stdin.take().map(|mut stdin| {
            let batch = batch.to_string();
            std::thread::spawn(move || stdin.write_all(batch.as_bytes()))
        });

        let output = child.wait_with_output()?;
        let written = match writer.map(|handle| handle.join()) {
            Some(Ok(result)) => result,
            Some(Err(_)) => return Err(DcrError::execution(connection, "stdin writer panicked")),
            None => Ok(()),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            info!("{} failed with exit code {}", self.program, code);
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(DcrError::execution(
                connection,
                format!("exit code {}: {}", code, message),
            ));
        }

        // A client that exits early closes stdin; only report that on success
        written?;

        let rows = parse_tsv_rows(&stdout);
        debug!("{} returned {} rows", self.program, rows.len());
        Ok(vec![ResultCursor {
            query: batch.to_string(),
            rows,
        }])
    }
}

/// Split TSV client output into rows of column values, skipping blank lines
pub fn parse_tsv_rows(output: &str) -> Vec<Vec<String>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_include_connection_and_options() {
        let executor = SnowSqlExecutor::default();
        let args = executor.command_args("prov_admin", true);
        assert_eq!(&args[..2], &["-c", "prov_admin"]);
        assert!(args.contains(&"output_format=tsv".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("remove_comments=true"));

        let args = executor.command_args("prov_admin", false);
        assert!(!args.contains(&"remove_comments=true".to_string()));
    }

    #[test]
    fn test_parse_tsv_rows() {
        let rows = parse_tsv_rows("Statement executed successfully.\nA\tB\n\n1\t2\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["A", "B"]);
        assert_eq!(rows[2], vec!["1", "2"]);
    }

    #[test]
    fn test_missing_program_is_execution_error() {
        let mut executor = SnowSqlExecutor::new("/nonexistent/dcr-snowsql-binary");
        let err = executor
            .execute_stream("prov_admin", "select 1;", true)
            .unwrap_err();
        assert!(matches!(err, DcrError::Execution { .. }));
    }
}
