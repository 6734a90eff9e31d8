//! A compilation session: one loader, one cache, one diagnostics sink.

use crate::cache::ResolutionCache;
use crate::diagnostics::Diagnostics;
use crate::error::{ResolveError, Result};
use crate::loader::{Acquired, LoadStats, Loader, Module, ModuleParser};
use crate::matcher::{SignatureMatcher, StructuralMatcher};
use crate::reference::InstanceId;
use crate::resolver::Resolver;
use larch_source::{canonicalize, LoaderConfig};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Owns all state shared by the modules of one run.
///
/// A session is `Sync`: several threads may call [`Session::load`] at once, and
/// each canonical path is still parsed and resolved exactly once.
pub struct Session {
    config: LoaderConfig,
    parser: Box<dyn ModuleParser>,
    matcher: Box<dyn SignatureMatcher>,
    loader: Loader,
    cache: ResolutionCache,
    diagnostics: Diagnostics,
    instances: AtomicU32,
}

impl Session {
    pub fn new(config: LoaderConfig, parser: impl ModuleParser + 'static) -> Self {
        Self {
            config,
            parser: Box::new(parser),
            matcher: Box::new(StructuralMatcher),
            loader: Loader::new(),
            cache: ResolutionCache::new(),
            diagnostics: Diagnostics::new(),
            instances: AtomicU32::new(0),
        }
    }

    pub fn with_matcher(mut self, matcher: impl SignatureMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Loads, parses and resolves a module and everything it imports.
    ///
    /// `path` follows import path rules; relative paths are taken from the current
    /// working directory. Failures are reported to [`Session::diagnostics`] once,
    /// against the module that raised them.
    pub fn load(&self, path: &str) -> Result<Arc<Module>> {
        self.load_from(path, None)
    }

    /// A resolver for direct queries against loaded modules.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn stats(&self) -> LoadStats {
        self.loader.stats()
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn matcher(&self) -> &dyn SignatureMatcher {
        self.matcher.as_ref()
    }

    /// Number of instantiations created so far.
    pub fn instances_created(&self) -> u32 {
        self.instances.load(Ordering::SeqCst)
    }

    pub(crate) fn next_instance(&self) -> InstanceId {
        InstanceId(self.instances.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn load_from(&self, raw: &str, base_dir: Option<&Path>) -> Result<Arc<Module>> {
        let path = canonicalize(raw, &self.config, base_dir)?;

        let id = match self.loader.acquire(&path) {
            Acquired::Ready(module) | Acquired::Cycle(module) => return Ok(module),
            Acquired::Failed(error) => return Err(error),
            Acquired::Claimed(id) => id,
        };

        log::debug!("Parsing module {}", path.display());
        let tree = match self.parser.parse(&path) {
            Ok(tree) => tree,
            Err(err) => {
                let error = ResolveError::from(err);
                self.diagnostics.report(&path, error.clone());
                self.loader.complete(id, Err((None, error.clone())));
                return Err(error);
            }
        };
        let module = match self.loader.publish_parsed(id, tree) {
            Ok(module) => module,
            Err(error) => {
                self.loader.complete(id, Err((None, error.clone())));
                return Err(error);
            }
        };

        log::debug!("Resolving module {}", path.display());
        self.loader.note_resolve();
        match self.resolver().resolve_module(&module) {
            Ok(()) => {
                self.loader.complete(id, Ok(Arc::clone(&module)));
                Ok(module)
            }
            Err(error) => {
                self.diagnostics.report(&path, error.clone());
                self.loader.complete(id, Err((Some(module), error.clone())));
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("loader", &self.loader)
            .field("instances", &self.instances)
            .finish_non_exhaustive()
    }
}
