//! Execution collaborator contract.
//!
//! The renderer never talks to the data platform itself. It hands each
//! cleaned script to a `StatementExecutor` together with the name of the
//! connection the step is bound to, and logs the result cursors it gets back.
//!
//! # Contract
//!
//! - `execute_stream()` receives the whole script as one batch of statements.
//! - `remove_comments` asks the backend to strip comments before running;
//!   the renderer always sets it, since trailing comments break streamed
//!   execution.
//! - One cursor per executed statement (or one for the whole batch when the
//!   backend cannot tell statements apart).
//! - Errors are reported once and never retried.

use serde::{Deserialize, Serialize};

use crate::engine::plan::ConnectionTarget;
use crate::error::Result;

/// Result of one executed statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultCursor {
    /// Statement text as submitted
    pub query: String,
    /// Result rows, one vector of column values per row
    pub rows: Vec<Vec<String>>,
}

/// Something that can run a batch of SQL statements on a named connection.
///
/// # Example
///
/// ```
/// use dcr_assistant::script_traits::{ResultCursor, StatementExecutor};
/// use dcr_assistant::error::Result;
///
/// struct Echo;
///
/// impl StatementExecutor for Echo {
///     fn execute_stream(
///         &mut self,
///         _connection: &str,
///         batch: &str,
///         _remove_comments: bool,
///     ) -> Result<Vec<ResultCursor>> {
///         Ok(vec![ResultCursor { query: batch.to_string(), rows: vec![] }])
///     }
/// }
///
/// let cursors = Echo.execute_stream("provider", "select 1;", true).unwrap();
/// assert_eq!(cursors[0].query, "select 1;");
/// ```
pub trait StatementExecutor {
    /// Execute `batch` on `connection`, returning one cursor per statement.
    fn execute_stream(
        &mut self,
        connection: &str,
        batch: &str,
        remove_comments: bool,
    ) -> Result<Vec<ResultCursor>>;
}

/// Connection names for each plan target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionMap {
    pub provider: Option<String>,
    pub consumer: Option<String>,
    /// Connection of the account being uninstalled
    pub account: Option<String>,
}

impl ConnectionMap {
    /// Connection name configured for a target, if any
    pub fn name_for(&self, target: ConnectionTarget) -> Option<&str> {
        let name = match target {
            ConnectionTarget::Provider => self.provider.as_deref(),
            ConnectionTarget::Consumer => self.consumer.as_deref(),
            ConnectionTarget::Account => self.account.as_deref(),
        };
        name.map(str::trim).filter(|n| !n.is_empty())
    }
}
