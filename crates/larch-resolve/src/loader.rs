//! The module registry.
//!
//! Every canonical path is parsed and resolved at most once per session. The
//! first caller of a path claims it under the registry lock; other threads asking
//! for the same path wait until the claimant publishes the outcome. A thread that
//! asks again for a path it is itself still resolving (an import cycle) receives
//! the parsed, partially resolved module.

use crate::error::{ResolveError, Result};
use crate::reference::ModuleId;
use fxhash::FxHashMap;
use indexmap::IndexMap;
use larch_syntax::{SyntaxError, SyntaxTree};
use parking_lot::{Condvar, Mutex};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::ThreadId;

/// A parsed module, shared by every importer.
#[derive(Debug)]
pub struct Module {
    pub id: ModuleId,
    pub path: PathBuf,
    pub tree: SyntaxTree,
}

impl Module {
    /// Directory relative imports of this module resolve against.
    pub fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Produces syntax trees for canonical module paths.
pub trait ModuleParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<SyntaxTree, SyntaxError>;
}

impl<P: ModuleParser + ?Sized> ModuleParser for Arc<P> {
    fn parse(&self, path: &Path) -> Result<SyntaxTree, SyntaxError> {
        (**self).parse(path)
    }
}

/// A parser over prebuilt trees keyed by canonical path.
///
/// Used by tests and by embedders that build trees themselves.
#[derive(Debug, Default)]
pub struct MemoryParser {
    sources: Mutex<FxHashMap<PathBuf, SyntaxTree>>,
    parses: AtomicUsize,
}

impl MemoryParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(self, path: impl Into<PathBuf>, tree: SyntaxTree) -> Self {
        self.insert(path, tree);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, tree: SyntaxTree) {
        self.sources.lock().insert(path.into(), tree);
    }

    /// Number of `parse` calls served so far, including failed ones.
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::SeqCst)
    }
}

impl ModuleParser for MemoryParser {
    fn parse(&self, path: &Path) -> Result<SyntaxTree, SyntaxError> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        self.sources
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| SyntaxError::MissingSource { path: path.to_path_buf() })
    }
}

/// Counters of the work the loader performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub parses: usize,
    pub resolves: usize,
    /// Requests answered from the registry without parsing.
    pub hits: usize,
}

#[derive(Debug)]
enum Slot {
    Claimed { owner: ThreadId },
    Parsed { module: Arc<Module>, owner: ThreadId },
    Ready(Arc<Module>),
    Failed { module: Option<Arc<Module>>, error: ResolveError },
}

impl Slot {
    fn owner(&self) -> Option<ThreadId> {
        match self {
            Slot::Claimed { owner } | Slot::Parsed { owner, .. } => Some(*owner),
            _ => None,
        }
    }

    fn module(&self) -> Option<&Arc<Module>> {
        match self {
            Slot::Parsed { module, .. } | Slot::Ready(module) => Some(module),
            Slot::Failed { module, .. } => module.as_ref(),
            Slot::Claimed { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    slots: IndexMap<PathBuf, Slot>,
    /// Threads blocked on a slot owned by another thread.
    waiting: FxHashMap<ThreadId, ModuleId>,
}

impl Registry {
    /// Whether waiting on `owner` would close a wait cycle back to `me`.
    fn waits_on(&self, owner: ThreadId, me: ThreadId) -> bool {
        let mut current = owner;
        for _ in 0..=self.waiting.len() {
            if current == me {
                return true;
            }
            let Some(next) = self
                .waiting
                .get(&current)
                .and_then(|id| self.slots.get_index(id.index()))
                .and_then(|(_, slot)| slot.owner())
            else {
                return false;
            };
            current = next;
        }
        false
    }
}

/// Outcome of asking the registry for a path.
#[derive(Debug)]
pub(crate) enum Acquired {
    /// The caller owns the path and must parse, resolve and complete it.
    Claimed(ModuleId),
    /// The path is being resolved further up this thread's own load chain.
    Cycle(Arc<Module>),
    Ready(Arc<Module>),
    Failed(ResolveError),
}

#[derive(Debug, Default)]
pub struct Loader {
    registry: Mutex<Registry>,
    published: Condvar,
    parses: AtomicUsize,
    resolves: AtomicUsize,
    hits: AtomicUsize,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn acquire(&self, path: &Path) -> Acquired {
        let me = std::thread::current().id();
        let mut registry = self.registry.lock();
        loop {
            let Some((index, _, slot)) = registry.slots.get_full(path) else {
                let (index, _) = registry.slots.insert_full(path.to_path_buf(), Slot::Claimed { owner: me });
                log::debug!("Claimed module {} as #{index}", path.display());
                return Acquired::Claimed(ModuleId(index as u32));
            };
            let id = ModuleId(index as u32);
            match slot {
                Slot::Ready(module) => {
                    self.hits.fetch_add(1, Ordering::SeqCst);
                    log::debug!("Module cache hit for {}", path.display());
                    return Acquired::Ready(Arc::clone(module));
                }
                Slot::Failed { error, .. } => {
                    self.hits.fetch_add(1, Ordering::SeqCst);
                    return Acquired::Failed(error.clone());
                }
                Slot::Parsed { module, owner } if *owner == me || registry.waits_on(*owner, me) => {
                    self.hits.fetch_add(1, Ordering::SeqCst);
                    log::debug!("Import cycle through {}, using the parsed module", path.display());
                    return Acquired::Cycle(Arc::clone(module));
                }
                Slot::Claimed { owner } if *owner == me => {
                    return Acquired::Failed(ResolveError::internal(format!(
                        "module {} was requested while it is being parsed",
                        path.display()
                    )));
                }
                Slot::Claimed { .. } | Slot::Parsed { .. } => {
                    registry.waiting.insert(me, id);
                    self.published.wait(&mut registry);
                    registry.waiting.remove(&me);
                }
            }
        }
    }

    /// Records the parsed tree of a claimed slot.
    pub(crate) fn publish_parsed(&self, id: ModuleId, tree: SyntaxTree) -> Result<Arc<Module>> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        let mut registry = self.registry.lock();
        let (path, slot) = registry
            .slots
            .get_index_mut(id.index())
            .ok_or_else(|| ResolveError::internal(format!("no registry slot #{}", id.0)))?;
        let owner = slot.owner().unwrap_or_else(|| std::thread::current().id());
        let module = Arc::new(Module { id, path: path.clone(), tree });
        *slot = Slot::Parsed { module: Arc::clone(&module), owner };
        drop(registry);
        self.published.notify_all();
        Ok(module)
    }

    pub(crate) fn note_resolve(&self) {
        self.resolves.fetch_add(1, Ordering::SeqCst);
    }

    /// Publishes the final outcome of a claimed slot and wakes waiting threads.
    pub(crate) fn complete(&self, id: ModuleId, outcome: std::result::Result<Arc<Module>, (Option<Arc<Module>>, ResolveError)>) {
        let mut registry = self.registry.lock();
        if let Some((path, slot)) = registry.slots.get_index_mut(id.index()) {
            *slot = match outcome {
                Ok(module) => {
                    log::debug!("Module {} resolved", path.display());
                    Slot::Ready(module)
                }
                Err((module, error)) => {
                    log::warn!("Module {} failed: {error}", path.display());
                    Slot::Failed { module, error }
                }
            };
        }
        drop(registry);
        self.published.notify_all();
    }

    /// The module stored under `id`, once parsed.
    pub fn module(&self, id: ModuleId) -> Option<Arc<Module>> {
        let registry = self.registry.lock();
        registry.slots.get_index(id.index()).and_then(|(_, slot)| slot.module().cloned())
    }

    /// The module registered for a canonical path, once parsed.
    pub fn lookup(&self, path: &Path) -> Option<Arc<Module>> {
        let registry = self.registry.lock();
        registry.slots.get(path).and_then(|slot| slot.module().cloned())
    }

    pub fn len(&self) -> usize {
        self.registry.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> LoadStats {
        LoadStats {
            parses: self.parses.load(Ordering::SeqCst),
            resolves: self.resolves.load(Ordering::SeqCst),
            hits: self.hits.load(Ordering::SeqCst),
        }
    }
}
