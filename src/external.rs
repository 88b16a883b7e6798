// SPDX-License-Identifier: PMPL-1.0-or-later
//! External auditor integration
//!
//! Shells out to a third-party audit engine. The program receives the HTML
//! on stdin and prints its findings as JSON on stdout, using the same
//! violation, pass and incomplete shapes as [`AuditResult`](crate::AuditResult).

use crate::config::ExternalConfig;
use crate::document::Document;
use crate::error::{AuditError, Result};
use crate::result::{Accumulator, Incomplete, Pass, Violation};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::debug;

/// Findings reported by an external engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalFindings {
    pub violations: Vec<Violation>,
    pub passes: Vec<Pass>,
    pub incomplete: Vec<Incomplete>,
}

impl ExternalFindings {
    /// Merge into a run's accumulator
    pub fn merge_into(self, acc: &mut Accumulator) {
        for v in self.violations {
            acc.add_violation(v);
        }
        for p in self.passes {
            acc.add_pass(p);
        }
        for i in self.incomplete {
            acc.add_incomplete(i);
        }
    }
}

/// A third-party audit engine
pub trait ExternalAuditor: Send + Sync {
    fn name(&self) -> &str;

    fn audit(&self, document: &Document) -> Result<ExternalFindings>;
}

/// Runs a configured program over the document
#[derive(Debug, Clone)]
pub struct CommandAuditor {
    program: String,
    args: Vec<String>,
}

impl CommandAuditor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ExternalConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

impl ExternalAuditor for CommandAuditor {
    fn name(&self) -> &str {
        &self.program
    }

    fn audit(&self, document: &Document) -> Result<ExternalFindings> {
        debug!(program = %self.program, "running external auditor");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AuditError::External(format!("failed to start {}: {}", self.program, e)))?;

        // stdin is fed from its own thread so a child that writes before it
        // finishes reading cannot block on a full stdout pipe
        let source = document.source().as_bytes();
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, written)
        });
        let output = output?;
        match written {
            // the child may stop reading once it has what it needs
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }

        if !output.status.success() {
            return Err(AuditError::External(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let json_str = String::from_utf8(output.stdout)
            .map_err(|e| AuditError::External(format!("Invalid UTF-8: {}", e)))?;

        serde_json::from_str(&json_str)
            .map_err(|e| AuditError::External(format!("unreadable report from {}: {}", self.program, e)))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::result::Impact;

    fn shell(script: &str) -> CommandAuditor {
        CommandAuditor::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_reads_findings_from_stdout() {
        let auditor = shell(
            r#"cat > /dev/null; echo '{"violations":[{"id":"region","description":"Content outside landmarks","impact":"moderate","suggestion":"Wrap content in landmarks","affectedNodes":[]}],"passes":[{"id":"document-title","description":"ok"}]}'"#,
        );
        let findings = auditor.audit(&Document::parse("<p>x</p>")).unwrap();
        assert_eq!(findings.violations.len(), 1);
        assert_eq!(findings.violations[0].impact, Impact::Moderate);
        assert_eq!(findings.passes.len(), 1);
        assert!(findings.incomplete.is_empty());
    }

    #[test]
    fn test_document_is_piped_to_stdin() {
        let auditor = shell(
            r#"if grep -q 'marker-42'; then echo '{"passes":[{"id":"stdin","description":"seen"}]}'; else echo '{}'; fi"#,
        );
        let findings = auditor.audit(&Document::parse("<p>marker-42</p>")).unwrap();
        assert_eq!(findings.passes[0].id, "stdin");
    }

    #[test]
    fn test_large_output_before_reading_does_not_block() {
        // 200 KB of output before stdin is read overflows any pipe buffer
        let auditor = shell(
            r#"head -c 200000 /dev/zero | tr '\0' ' '; cat > /dev/null; echo '{"passes":[{"id":"big","description":"ok"}]}'"#,
        );
        let page = format!("<p>{}</p>", "x".repeat(300_000));
        let findings = auditor.audit(&Document::parse(page)).unwrap();
        assert_eq!(findings.passes[0].id, "big");
    }

    #[test]
    fn test_child_ignoring_stdin_is_not_an_error() {
        let auditor = shell(r#"echo '{}'"#);
        let page = format!("<p>{}</p>", "x".repeat(300_000));
        let findings = auditor.audit(&Document::parse(page)).unwrap();
        assert_eq!(findings, ExternalFindings::default());
    }

    #[test]
    fn test_failure_modes_are_errors() {
        let doc = Document::parse("<p>x</p>");
        let failed = shell("cat > /dev/null; echo broken >&2; exit 3").audit(&doc);
        assert!(matches!(failed, Err(AuditError::External(_))));

        let garbage = shell("cat > /dev/null; echo not-json").audit(&doc);
        assert!(matches!(garbage, Err(AuditError::External(_))));

        let missing = CommandAuditor::new("auditbot-no-such-program", Vec::new()).audit(&doc);
        assert!(matches!(missing, Err(AuditError::External(_))));
    }
}
