//! The compilation session and its build driver.
//!
//! A [`Session`] owns the tables every phase shares: the interner, the
//! source registry and the type context. Dropping it tears them down.
//!
//! [`Session::build`] runs in phases:
//!
//! 1. lex and parse every source in parallel
//! 2. resolve imports by module name and schedule the import graph
//! 3. declare modules level by level; modules of one level run concurrently
//!
//! A module with errors is `Failed`, its importers are `Blocked`, and
//! independent modules carry on.

mod diagnostics;
mod report;

use std::sync::Arc;

use mj_diagnostic::{Diagnostic, DiagnosticQueue};
use mj_ir::item::views;
use mj_ir::{Lexer, Name, SharedInterner, SourceError, SourceFile, SourceId, SourceInput, SourceRegistry};
use mj_types::TypeContext;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::declare::{declare_module, Exports};
use crate::graph::DependencyGraph;
use crate::module::{Module, ModuleStatus};
use crate::parser::Parser;
use crate::SessionConfig;

pub use report::BuildReport;

/// Worker stack size. Declaration and specialization recurse with the
/// depth of nested template arguments.
const WORKER_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Per-compilation context.
pub struct Session {
    config: SessionConfig,
    interner: SharedInterner,
    sources: SourceRegistry,
    types: TypeContext,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let interner = SharedInterner::new();
        let types = TypeContext::new(interner.clone(), config.type_config());
        Session {
            config,
            interner,
            sources: SourceRegistry::new(),
            types,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn types(&self) -> &TypeContext {
        &self.types
    }

    /// Register in-memory source text.
    pub fn add_source(&self, input: SourceInput) -> Result<SourceId, SourceError> {
        self.sources.add_source_file(input)
    }

    /// Read and register a file.
    pub fn load_source(&self, path: impl AsRef<std::path::Path>) -> Result<SourceId, SourceError> {
        self.sources.load_source_file(path)
    }

    /// Lower a loading error for reporting alongside build diagnostics.
    pub fn source_error(error: &SourceError) -> Diagnostic {
        diagnostics::source_error(error)
    }

    /// Build the given sources.
    ///
    /// Runs on a scoped pool of `config.threads` workers (0 picks rayon's
    /// default) and falls back to a sequential build if the pool cannot be
    /// created.
    #[tracing::instrument(level = "debug", skip_all, fields(sources = ids.len()))]
    pub fn build(&self, lexer: &dyn Lexer, parser: &dyn Parser, ids: &[SourceId]) -> BuildReport {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .stack_size(WORKER_STACK_SIZE)
            .build_scoped(rayon::ThreadBuilder::run, |pool| {
                pool.install(|| self.build_with(lexer, parser, ids, true))
            })
            .unwrap_or_else(|e| {
                tracing::warn!("failed to create thread pool ({e}), building sequentially");
                self.build_with(lexer, parser, ids, false)
            })
    }

    fn build_with(
        &self,
        lexer: &dyn Lexer,
        parser: &dyn Parser,
        ids: &[SourceId],
        parallel: bool,
    ) -> BuildReport {
        let mut unattached = Vec::new();
        let mut seen = FxHashSet::default();
        let files: Vec<Arc<SourceFile>> = ids
            .iter()
            .filter(|&&id| seen.insert(id))
            .filter_map(|&id| match self.sources.source_of(id) {
                Ok(file) => Some(file),
                Err(err) => {
                    unattached.push(diagnostics::source_error(&err));
                    None
                }
            })
            .collect();

        let mut modules: Vec<Module> = map_maybe_parallel(parallel, files, |file| {
            self.parse_module(lexer, parser, file)
        });

        let graph = self.link(&mut modules);
        let schedule = graph.schedule();
        tracing::debug!(
            levels = schedule.levels.len(),
            cyclic = schedule.cyclic.len(),
            blocked = schedule.blocked.len(),
            "scheduled modules"
        );

        for &m in &schedule.cyclic {
            self.report_cycle(&graph, &mut modules, m);
        }
        for &m in &schedule.blocked {
            modules[m].status = ModuleStatus::Blocked;
        }
        for level in &schedule.levels {
            self.declare_level(&mut modules, level, parallel);
        }

        for module in &mut modules {
            module.finish();
        }
        BuildReport::new(modules, schedule.levels, unattached)
    }

    // === Parsing ===

    fn parse_module(&self, lexer: &dyn Lexer, parser: &dyn Parser, file: Arc<SourceFile>) -> Module {
        let _span = tracing::debug_span!("parse", path = %file.path().display()).entered();
        let queue = DiagnosticQueue::with_config(self.config.diagnostics.clone());
        let stem = file
            .path()
            .file_stem()
            .map_or(Name::EMPTY, |stem| self.interner.intern(&stem.to_string_lossy()));
        let mut module = Module::new(Arc::clone(&file), stem, queue);

        let tokens = match file.tokens_with(lexer, &self.interner) {
            Ok(tokens) => tokens,
            Err(errors) => {
                for error in &errors {
                    module.queue.add(diagnostics::lex_error(file.id(), error));
                }
                return module;
            }
        };

        let output = parser.parse(&file, tokens, &self.interner);
        for error in &output.errors {
            module.queue.add(error.to_diagnostic(file.id()));
        }
        module.imports = output.imports;
        if let Some(tree) = output.tree {
            match tree.root().try_cast::<views::Module<'_>>() {
                Ok(root) if root.name() != Name::EMPTY => module.name = root.name(),
                Ok(_) => {}
                Err(cast) => {
                    let diag = diagnostics::invalid_root(file.id(), tree.root().span(), &cast);
                    module.queue.add(diag);
                    return module;
                }
            }
            module.tree = Some(Arc::new(tree));
            module.status = ModuleStatus::Parsed;
        }
        module
    }

    // === Linking ===

    /// Resolve imports by module name into a dependency graph.
    fn link(&self, modules: &mut [Module]) -> DependencyGraph {
        let mut by_name: FxHashMap<Name, usize> = FxHashMap::default();
        for (index, module) in modules.iter_mut().enumerate() {
            if let Some(&first) = by_name.get(&module.name) {
                tracing::debug!(first, second = index, "duplicate module name");
                let span = module.tree.as_ref().map(|t| t.root().span()).unwrap_or_default();
                let diag = diagnostics::duplicate_module(module.id(), span, self.interner.lookup(module.name));
                module.queue.add(diag);
                module.status = ModuleStatus::Failed;
            } else {
                by_name.insert(module.name, index);
            }
        }

        let mut graph = DependencyGraph::new(modules.len());
        for (index, module) in modules.iter_mut().enumerate() {
            for &import in &module.imports {
                match by_name.get(&import.path) {
                    Some(&target) => {
                        graph.add_edge(index, target);
                        module.links.push((import, target));
                    }
                    None => {
                        let diag = diagnostics::unresolved_import(
                            module.source.id(),
                            import.span,
                            self.interner.lookup(import.path),
                        );
                        module.queue.add(diag);
                        module.status = ModuleStatus::Failed;
                    }
                }
            }
        }
        graph
    }

    fn report_cycle(&self, graph: &DependencyGraph, modules: &mut [Module], m: usize) {
        let Some(cycle) = graph.cycle_through(m) else {
            return;
        };
        let names: Vec<&str> = cycle
            .iter()
            .map(|&i| self.interner.lookup(modules[i].name))
            .collect();
        let next = cycle.get(1).copied();
        let module = &mut modules[m];
        let span = module
            .links
            .iter()
            .find(|&&(_, target)| Some(target) == next)
            .map(|(import, _)| import.span)
            .unwrap_or_default();
        module
            .queue
            .add(diagnostics::import_cycle(module.source.id(), span, &names));
        module.status = ModuleStatus::Failed;
    }

    // === Declaration ===

    /// Declare the runnable modules of one level concurrently.
    ///
    /// A module runs if it parsed and every import is `Ready`; one whose
    /// import did not make it is `Blocked`.
    fn declare_level(&self, modules: &mut [Module], level: &[usize], parallel: bool) {
        let mut runnable = Vec::new();
        for &m in level {
            if modules[m].status != ModuleStatus::Parsed {
                continue;
            }
            if modules[m].dependencies().all(|d| modules[d].is_ready()) {
                runnable.push(m);
            } else {
                modules[m].status = ModuleStatus::Blocked;
            }
        }
        let _span = tracing::debug_span!("declare_level", modules = runnable.len()).entered();

        // Queues move out so the shared borrow of `modules` can cross threads.
        let jobs: Vec<(usize, DiagnosticQueue)> = runnable
            .iter()
            .map(|&m| (m, std::mem::take(&mut modules[m].queue)))
            .collect();
        let shared: &[Module] = modules;
        let outcomes = map_maybe_parallel(parallel, jobs, |(m, mut queue)| {
            let exports = self.declare(shared, m, &mut queue);
            (m, exports, queue)
        });

        for (m, exports, queue) in outcomes {
            let module = &mut modules[m];
            module.exports = Arc::new(exports);
            module.status = if queue.has_errors().is_some() {
                ModuleStatus::Failed
            } else {
                ModuleStatus::Ready
            };
            module.queue = queue;
        }
    }

    fn declare(&self, modules: &[Module], m: usize, queue: &mut DiagnosticQueue) -> Exports {
        let module = &modules[m];
        let Some(tree) = &module.tree else {
            return Exports::default();
        };
        let imports: Vec<&Exports> = module.dependencies().map(|d| &*modules[d].exports).collect();
        declare_module(&self.types, tree, &imports, queue)
    }
}

/// Map over `items` on the current rayon pool, or in order when `parallel`
/// is off. Results keep the order of `items`.
fn map_maybe_parallel<T, R, F>(parallel: bool, items: Vec<T>, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    if parallel {
        items.into_par_iter().map(f).collect()
    } else {
        items.into_iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests;
