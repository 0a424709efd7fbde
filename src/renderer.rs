//! Script Renderer
//!
//! Consumes a `DeploymentPlan` and turns each referenced template into two
//! texts:
//!
//! | Output    | Contents |
//! |-----------|----------|
//! | annotated | Substitutions applied, platform directive lines (`!set ...`) removed |
//! | cleaned   | Annotated text with trailing `//` and `--` comments cut off |
//!
//! Templates are streamed line by line. Scripts are processed strictly in
//! plan order, and a step's execution finishes before the next template is
//! opened: later scripts rely on objects earlier ones created.
//!
//! # Failure Semantics
//!
//! - Missing template: rendering stops, earlier scripts are kept.
//! - Executor error: rendering stops, the failing script's text is kept.
//!
//! Both surface through `RenderOutcome::error`, never by discarding output.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::{debug, error, info};

use crate::engine::plan::{DeploymentPlan, PlanStep};
use crate::error::{DcrError, Result};
use crate::script_traits::{ConnectionMap, ResultCursor, StatementExecutor};

// ============================================================================
// Line Rewriting
// ============================================================================

/// Whether a line is a client directive (`!set`, `!define`, ...)
pub fn is_directive(line: &str) -> bool {
    line.trim_start().starts_with('!')
}

/// Cut a line at its first `//` or `--` comment marker.
///
/// A marker directly after `:` is not a comment (`http://...`), so scanning
/// continues past it. Characters are only ever removed from the end.
///
/// ```
/// use dcr_assistant::renderer::strip_trailing_comment;
///
/// assert_eq!(strip_trailing_comment("SELECT 1 -- note"), "SELECT 1 ");
/// assert_eq!(strip_trailing_comment("'http://example.com'"), "'http://example.com'");
/// ```
pub fn strip_trailing_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        let pair = &bytes[i..i + 2];
        if (pair == b"//" || pair == b"--") && (i == 0 || bytes[i - 1] != b':') {
            return &line[..i];
        }
    }
    line
}

/// Split a line into its body and terminator (`\n`, `\r\n`, or nothing)
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Rewrite one template line.
///
/// Returns `None` for directive lines, which are dropped from both outputs,
/// otherwise `(annotated, cleaned)` with the original terminator kept.
pub fn render_line(plan: &DeploymentPlan, line: &str) -> Option<(String, String)> {
    let (body, terminator) = split_terminator(line);
    let substituted = plan.substitute(body);
    if is_directive(&substituted) {
        return None;
    }
    let cleaned = format!("{}{}", strip_trailing_comment(&substituted), terminator);
    let annotated = format!("{}{}", substituted, terminator);
    Some((annotated, cleaned))
}

/// Stream a template through the plan's rewrite rules
pub fn render_reader<R: BufRead>(plan: &DeploymentPlan, mut reader: R) -> io::Result<(String, String)> {
    let mut annotated = String::new();
    let mut cleaned = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if let Some((a, c)) = render_line(plan, &line) {
            annotated.push_str(&a);
            cleaned.push_str(&c);
        }
    }

    Ok((annotated, cleaned))
}

// ============================================================================
// Rendered Output
// ============================================================================

/// One rendered template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedScript {
    /// Base file name, directories stripped
    pub name: String,
    pub annotated: String,
    pub cleaned: String,
}

/// Annotated and cleaned texts keyed by file name, in plan order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedScripts {
    annotated: IndexMap<String, String>,
    cleaned: IndexMap<String, String>,
}

impl RenderedScripts {
    pub fn insert(&mut self, script: RenderedScript) {
        self.annotated.insert(script.name.clone(), script.annotated);
        self.cleaned.insert(script.name, script.cleaned);
    }

    /// Scripts with comments kept
    pub fn annotated(&self) -> &IndexMap<String, String> {
        &self.annotated
    }

    /// Scripts with trailing comments stripped
    pub fn cleaned(&self) -> &IndexMap<String, String> {
        &self.cleaned
    }

    /// The map a caller asked for
    pub fn select(&self, include_comments: bool) -> &IndexMap<String, String> {
        if include_comments {
            &self.annotated
        } else {
            &self.cleaned
        }
    }

    pub fn len(&self) -> usize {
        self.annotated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotated.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.annotated.keys().map(String::as_str)
    }
}

/// Cursors returned for one executed script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionBatch {
    pub script: String,
    pub connection: String,
    pub cursors: Vec<ResultCursor>,
}

/// Everything a render run produced, including how far it got
#[derive(Debug)]
pub struct RenderOutcome {
    pub scripts: RenderedScripts,
    pub batches: Vec<ExecutionBatch>,
    /// First fatal error; later steps were not attempted
    pub error: Option<DcrError>,
}

impl RenderOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, dropping partial output on failure
    pub fn ensure_success(self) -> Result<RenderedScripts> {
        match self.error {
            None => Ok(self.scripts),
            Some(err) => Err(err),
        }
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Renders plans from a template root, optionally executing cleaned output
pub struct ScriptRenderer<'a> {
    template_root: PathBuf,
    execution: Option<(&'a mut dyn StatementExecutor, &'a ConnectionMap)>,
}

impl<'a> ScriptRenderer<'a> {
    /// A dry-run renderer: renders everything, executes nothing
    pub fn new(template_root: impl Into<PathBuf>) -> Self {
        Self {
            template_root: template_root.into(),
            execution: None,
        }
    }

    /// Execute connected steps through `executor` after rendering them
    pub fn with_executor(
        mut self,
        executor: &'a mut dyn StatementExecutor,
        connections: &'a ConnectionMap,
    ) -> Self {
        self.execution = Some((executor, connections));
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.execution.is_none()
    }

    /// Render (and maybe execute) every step of `plan`, in order
    pub fn render(&mut self, plan: &DeploymentPlan) -> RenderOutcome {
        let mut outcome = RenderOutcome {
            scripts: RenderedScripts::default(),
            batches: Vec::new(),
            error: None,
        };

        for step in plan.steps() {
            info!("Starting {}", step.script);

            let rendered = match self.render_step(plan, step) {
                Ok(rendered) => rendered,
                Err(err) => {
                    error!("Rendering {} failed: {}", step.script, err);
                    outcome.error = Some(err);
                    break;
                }
            };
            let cleaned = rendered.cleaned.clone();
            let name = rendered.name.clone();
            outcome.scripts.insert(rendered);

            match self.execute_step(step, &name, &cleaned) {
                Ok(Some(batch)) => outcome.batches.push(batch),
                Ok(None) => {}
                Err(err) => {
                    error!("Execution of {} failed: {}", name, err);
                    outcome.error = Some(err);
                    break;
                }
            }
        }

        outcome
    }

    fn render_step(&self, plan: &DeploymentPlan, step: &PlanStep) -> Result<RenderedScript> {
        let path = self.template_root.join(step.script.path());
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DcrError::TemplateNotFound { path: path.clone() },
            _ => DcrError::Io(e),
        })?;

        let (annotated, cleaned) = render_reader(plan, BufReader::new(file))?;
        debug!(
            "Rendered {} ({} bytes annotated, {} bytes cleaned)",
            path.display(),
            annotated.len(),
            cleaned.len()
        );

        Ok(RenderedScript {
            name: step.script.file_name(),
            annotated,
            cleaned,
        })
    }

    fn execute_step(
        &mut self,
        step: &PlanStep,
        name: &str,
        cleaned: &str,
    ) -> Result<Option<ExecutionBatch>> {
        let Some((executor, connections)) = self.execution.as_mut() else {
            info!("Dry run: {} generated but not run", name);
            return Ok(None);
        };
        let Some(target) = step.connection else {
            info!("{} has no connection; generated but not run", name);
            return Ok(None);
        };
        let connection = connections.name_for(target).ok_or_else(|| {
            DcrError::connection(format!("no {} connection configured for {}", target, name))
        })?;

        info!("Running statements for {} on {}", name, connection);
        let cursors = executor
            .execute_stream(connection, cleaned, true)
            .map_err(|e| match e {
                DcrError::Execution { message, .. } => DcrError::execution(name, message),
                other => DcrError::execution(name, other.to_string()),
            })?;

        for cursor in &cursors {
            info!("{}", cursor.query.trim());
            for row in &cursor.rows {
                info!("{:?}", row);
            }
        }

        Ok(Some(ExecutionBatch {
            script: name.to_string(),
            connection: connection.to_string(),
            cursors,
        }))
    }
}
