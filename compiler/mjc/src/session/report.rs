//! What a build produced.

use std::path::PathBuf;

use mj_diagnostic::emitter::{tally, ColorMode, DiagnosticEmitter, SourceContext, TerminalEmitter};
use mj_diagnostic::Diagnostic;
use mj_ir::Name;
use rustc_hash::FxHashMap;

use super::Session;
use crate::cache::{CachePolicy, ModuleStamp};
use crate::module::{Module, ModuleStatus};

/// Modules of one build, in the order their sources were given.
#[derive(Debug)]
pub struct BuildReport {
    modules: Vec<Module>,
    levels: Vec<Vec<usize>>,
    /// Diagnostics that belong to no module, such as unknown source ids.
    unattached: Vec<Diagnostic>,
}

impl BuildReport {
    pub(super) fn new(modules: Vec<Module>, levels: Vec<Vec<usize>>, unattached: Vec<Diagnostic>) -> Self {
        BuildReport {
            modules,
            levels,
            unattached,
        }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// The first module named `name`.
    pub fn module(&self, name: Name) -> Option<&Module> {
        self.modules.iter().find(|m| m.name() == name)
    }

    /// Module indices grouped by dependency depth; each level only imports
    /// from earlier ones.
    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    pub fn unattached(&self) -> &[Diagnostic] {
        &self.unattached
    }

    /// Every diagnostic, module by module.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.modules
            .iter()
            .flat_map(|m| m.diagnostics())
            .chain(&self.unattached)
    }

    pub fn error_count(&self) -> usize {
        self.modules.iter().map(Module::error_count).sum::<usize>() + tally(&self.unattached).0
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn count(&self, status: ModuleStatus) -> usize {
        self.modules.iter().filter(|m| m.status() == status).count()
    }

    /// Render every diagnostic as plain text, positions resolved through
    /// the session's sources, followed by a summary line.
    pub fn render(&self, session: &Session) -> String {
        let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false)
            .with_sources(SourceContext {
                registry: session.sources(),
                interner: &**session.interner(),
            });
        let mut errors = 0;
        let mut warnings = 0;
        for module in &self.modules {
            emitter.emit_all(module.diagnostics());
            let (e, w) = tally(module.diagnostics());
            errors += e;
            warnings += w;
        }
        emitter.emit_all(&self.unattached);
        let (e, w) = tally(&self.unattached);
        emitter.emit_summary(errors + e, warnings + w);
        emitter.flush();
        String::from_utf8_lossy(&emitter.into_inner()).into_owned()
    }

    /// Cache stamps of every module, dependencies listed by path.
    pub fn stamps(&self) -> Vec<ModuleStamp> {
        self.modules
            .iter()
            .map(|module| {
                let dependencies = module
                    .dependencies()
                    .map(|d| self.modules[d].path().to_path_buf())
                    .collect();
                ModuleStamp::of(module.source(), dependencies)
            })
            .collect()
    }

    /// Modules whose cached output is missing or out of date.
    pub fn stale<'r>(
        &'r self,
        policy: &CachePolicy,
        cached: &FxHashMap<PathBuf, ModuleStamp>,
    ) -> Vec<&'r Module> {
        self.modules
            .iter()
            .zip(self.stamps())
            .filter(|(_, stamp)| policy.needs_rebuild(stamp, cached.get(&stamp.path)))
            .map(|(module, _)| module)
            .collect()
    }
}
