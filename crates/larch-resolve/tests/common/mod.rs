// Shared fixtures for the resolver integration tests.
#![allow(dead_code)]

use larch_resolve::{Candidates, MemoryParser, Module, Resolved, Session};
use larch_source::LoaderConfig;
use larch_syntax::{Modifiers, SyntaxTree, TreeBuilder};
use std::path::Path;
use std::sync::Arc;

pub const MAIN: &str = "/app/main.lr";
pub const PRELUDE: &str = "/lib/prelude.lr";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `Array<T>`, `Set<T>` and `Map<K, V>`, all exported.
pub fn prelude_tree() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let t = b.generic("T", None, None);
    let array = b.class("Array", Modifiers::EXPORT, vec![t], vec![], vec![]);
    let t = b.generic("T", None, None);
    let set = b.class("Set", Modifiers::EXPORT, vec![t], vec![], vec![]);
    let k = b.generic("K", None, None);
    let v = b.generic("V", None, None);
    let map = b.class("Map", Modifiers::EXPORT, vec![k, v], vec![], vec![]);
    let root = b.module(vec![array, set, map]);
    b.finish(root).unwrap()
}

pub fn config() -> LoaderConfig {
    LoaderConfig::default().with_library_root("/lib").with_prelude("prelude")
}

/// A session over in-memory modules, with the prelude at `/lib/prelude.lr`.
pub fn session(modules: Vec<(&str, SyntaxTree)>) -> (Session, Arc<MemoryParser>) {
    init_logging();
    let parser = Arc::new(MemoryParser::new().with_module(PRELUDE, prelude_tree()));
    for (path, tree) in modules {
        parser.insert(path, tree);
    }
    (Session::new(config(), Arc::clone(&parser)), parser)
}

/// A session without a prelude; every parse is one of `modules`.
pub fn bare_session(modules: Vec<(&str, SyntaxTree)>) -> (Session, Arc<MemoryParser>) {
    init_logging();
    let parser = Arc::new(MemoryParser::new());
    for (path, tree) in modules {
        parser.insert(path, tree);
    }
    let config = LoaderConfig::default().with_library_root("/lib");
    (Session::new(config, Arc::clone(&parser)), parser)
}

pub fn only(candidates: Candidates) -> Resolved {
    assert_eq!(candidates.len(), 1, "expected exactly one candidate, got {candidates:?}");
    candidates[0]
}

/// Name of the declaration a reference points at.
pub fn target_name(session: &Session, resolved: Resolved) -> String {
    let module = session.loader().module(resolved.target.module).unwrap();
    let node = module.tree.node(resolved.target.node);
    node.name_str().unwrap_or(node.kind.describe()).to_string()
}

pub fn loaded(session: &Session, path: &str) -> Arc<Module> {
    session.loader().lookup(Path::new(path)).unwrap()
}
