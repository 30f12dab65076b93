//! Build results: the model plus everything that went wrong on the way.

use std::fmt;

use crate::model::Module;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity
{
    Warning,
    Error,
}

impl fmt::Display for Severity
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A non-fatal problem met during a build.
///
/// `scope` is the full name of the type or registration being processed when
/// the problem was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic
{
    pub severity: Severity,
    pub scope: String,
    pub message: String,
}

impl fmt::Display for Diagnostic
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.scope.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{} [{}]: {}", self.severity, self.scope, self.message)
        }
    }
}

/// Counters reported when a build completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats
{
    pub registrations: usize,
    pub types: usize,
    pub template_instances: usize,
    pub fields: usize,
    pub functions: usize,
    pub dropped_fields: usize,
    pub dropped_functions: usize,
}

/// Everything one build produces.
#[derive(Debug)]
pub struct BuildOutput
{
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: BuildStats,
}

impl BuildOutput
{
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic>
    {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic>
    {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn has_errors(&self) -> bool
    {
        self.errors().next().is_some()
    }
}
