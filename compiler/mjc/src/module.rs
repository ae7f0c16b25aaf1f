//! One compilation unit and its build state.

use std::path::Path;
use std::sync::Arc;

use mj_diagnostic::emitter::tally;
use mj_diagnostic::{Diagnostic, DiagnosticQueue};
use mj_ir::{ItemTree, Name, SourceFile, SourceId};

use crate::declare::Exports;
use crate::parser::ImportRef;

/// Where a module got to in the build.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModuleStatus {
    /// Parsed, not yet declared.
    Parsed,
    /// Declared without errors; later phases may consume it.
    Ready,
    /// Has errors of its own.
    Failed,
    /// Skipped because an import failed or sits on an import cycle.
    Blocked,
}

/// A source file together with everything the build derived from it.
#[derive(Debug)]
pub struct Module {
    pub(crate) source: Arc<SourceFile>,
    pub(crate) name: Name,
    pub(crate) tree: Option<Arc<ItemTree>>,
    pub(crate) imports: Vec<ImportRef>,
    /// Resolved imports: the import directive and the module index it names.
    pub(crate) links: Vec<(ImportRef, usize)>,
    pub(crate) status: ModuleStatus,
    pub(crate) queue: DiagnosticQueue,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) exports: Arc<Exports>,
}

impl Module {
    pub(crate) fn new(source: Arc<SourceFile>, name: Name, queue: DiagnosticQueue) -> Self {
        Module {
            source,
            name,
            tree: None,
            imports: Vec::new(),
            links: Vec::new(),
            status: ModuleStatus::Failed,
            queue,
            diagnostics: Vec::new(),
            exports: Arc::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> SourceId {
        self.source.id()
    }

    pub fn source(&self) -> &Arc<SourceFile> {
        &self.source
    }

    pub fn path(&self) -> &Path {
        self.source.path()
    }

    /// Name the module declares, or its file stem.
    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// The parsed tree, absent if lexing or parsing gave up.
    pub fn tree(&self) -> Option<&Arc<ItemTree>> {
        self.tree.as_ref()
    }

    /// Import directives as written.
    pub fn imports(&self) -> &[ImportRef] {
        &self.imports
    }

    /// Indices of the modules this one imports, within the build.
    pub fn dependencies(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.links.iter().map(|&(_, module)| module)
    }

    #[inline]
    pub fn status(&self) -> ModuleStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == ModuleStatus::Ready
    }

    /// Diagnostics sorted by position.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        tally(&self.diagnostics).0
    }

    pub fn exports(&self) -> &Exports {
        &self.exports
    }

    /// Settle the status from the queued diagnostics and sort them.
    pub(crate) fn finish(&mut self) {
        if self.queue.has_errors().is_some() && self.status != ModuleStatus::Blocked {
            self.status = ModuleStatus::Failed;
        }
        self.diagnostics = self.queue.flush();
    }
}
