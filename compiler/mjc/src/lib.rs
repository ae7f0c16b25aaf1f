//! Session context and build driver for the Mj compiler.
//!
//! A [`Session`] owns the interner, source registry and type context of one
//! compilation. [`Session::build`] takes the lexer and parser collaborators,
//! parses every source in parallel, orders modules by their imports and
//! declares them level by level. The [`BuildReport`] holds each module's
//! status, exports and diagnostics.
//!
//! ```text
//! let session = Session::new(SessionConfig::default());
//! let id = session.load_source("src/main.mj")?;
//! let report = session.build(&lexer, &parser, &[id]);
//! eprint!("{}", report.render(&session));
//! ```

pub mod cache;
mod config;
pub mod declare;
pub mod graph;
mod module;
mod parser;
mod session;

use std::sync::Once;

pub use cache::{CachePolicy, InvalidationPolicy, ModuleStamp};
pub use config::SessionConfig;
pub use declare::{DeclareError, Exports, FunctionDecl};
pub use module::{Module, ModuleStatus};
pub use parser::{ImportRef, ParseError, ParseOutput, Parser};
pub use session::{BuildReport, Session};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=mjc=debug` or `RUST_LOG=mj_types=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .init();
        }
    });
}
