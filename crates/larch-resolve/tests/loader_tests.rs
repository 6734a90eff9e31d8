mod common;

use common::{bare_session, loaded, only, target_name, MAIN, PRELUDE};
use larch_resolve::{DeclRef, MemoryParser, Module, ResolveError, Session};
use larch_source::{LoaderConfig, SourceError};
use larch_syntax::{Modifiers, NodeId, NodeKind, SyntaxError, SyntaxTree, TreeBuilder};
use std::path::Path;
use std::sync::Arc;

fn shared() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let class = b.class("Shared", Modifiers::EXPORT, vec![], vec![], vec![]);
    let root = b.module(vec![class]);
    b.finish(root).unwrap()
}

/// `using "./shared"; var instance = Shared()`
fn importer() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let using = b.using("./shared");
    let callee = b.identifier("Shared");
    let call = b.call(callee, vec![]);
    let instance = b.variable("instance", Modifiers::empty(), None, Some(call));
    let root = b.module(vec![using, instance]);
    b.finish(root).unwrap()
}

fn uses(paths: &[&str]) -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let items = paths.iter().map(|path| b.using(path)).collect();
    let root = b.module(items);
    b.finish(root).unwrap()
}

#[test]
fn test_shared_import_is_loaded_once() {
    let (session, parser) = bare_session(vec![
        (MAIN, uses(&["./a", "./b"])),
        ("/app/a.lr", importer()),
        ("/app/b.lr", importer()),
        ("/app/shared.lr", shared()),
    ]);

    session.load(MAIN).unwrap();
    let stats = session.stats();
    assert_eq!(stats.parses, 4);
    assert_eq!(stats.resolves, 4);
    assert_eq!(parser.parse_count(), 4);
    assert_eq!(session.loader().len(), 4);

    let first = session.load("/app/shared").unwrap();
    let second = session.load("/app/./a/../shared.lr").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &loaded(&session, "/app/shared.lr")));
    assert_eq!(session.stats().parses, 4);

    // both importers constructed the one `Shared` declaration
    for path in ["/app/a.lr", "/app/b.lr"] {
        let module = loaded(&session, path);
        let call = module.tree.ids().find(|id| matches!(module.tree.kind(*id), NodeKind::Call { .. })).unwrap();
        let instance = only(session.resolver().resolve_value(&module, call).unwrap());
        assert_eq!(instance.target, DeclRef::new(first.id, module_root_class(&first)));
    }
}

fn module_root_class(module: &Module) -> NodeId {
    module.tree.items()[0]
}

#[test]
fn test_concurrent_loads_share_modules() {
    let (session, parser) = bare_session(vec![
        ("/app/a.lr", importer()),
        ("/app/b.lr", importer()),
        ("/app/shared.lr", shared()),
    ]);

    let (a, b) = std::thread::scope(|scope| {
        let a = scope.spawn(|| session.load("/app/a"));
        let b = scope.spawn(|| session.load("/app/b"));
        (a.join().unwrap(), b.join().unwrap())
    });
    a.unwrap();
    b.unwrap();

    assert_eq!(parser.parse_count(), 3);
    assert_eq!(session.stats().resolves, 3);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_import_cycle_resolves_both_modules() {
    let mut b = TreeBuilder::new();
    let using = b.using("./y");
    let class = b.class("X", Modifiers::EXPORT, vec![], vec![], vec![]);
    let root = b.module(vec![using, class]);
    let x = b.finish(root).unwrap();

    let mut b = TreeBuilder::new();
    let using = b.using("./x");
    let class = b.class("Y", Modifiers::EXPORT, vec![], vec![], vec![]);
    let callee = b.identifier("X");
    let call = b.call(callee, vec![]);
    let v = b.variable("v", Modifiers::empty(), None, Some(call));
    let root = b.module(vec![using, class, v]);
    let y = b.finish(root).unwrap();

    let (session, parser) = bare_session(vec![("/app/x.lr", x), ("/app/y.lr", y)]);
    let x = session.load("/app/x").unwrap();
    let y = loaded(&session, "/app/y.lr");
    assert_eq!(parser.parse_count(), 2);

    let instance = only(session.resolver().resolve_value(&y, call).unwrap());
    assert_eq!(instance.target.module, x.id);
    assert_eq!(target_name(&session, instance), "X");
}

#[test]
fn test_missing_import_fails_the_importer() {
    let (session, _) = bare_session(vec![(MAIN, uses(&["./missing"]))]);

    let err = session.load(MAIN).unwrap_err();
    expect_test::expect![[r#"Import failed: module `./missing` could not be loaded"#]].assert_eq(&err.to_string());

    let entries = session.diagnostics().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].module, Path::new("/app/missing.lr"));
    assert!(matches!(entries[0].error, ResolveError::Syntax(SyntaxError::MissingSource { .. })));
    assert_eq!(entries[1].module, Path::new(MAIN));

    // a failed module keeps its error instead of being parsed again
    let again = session.load("/app/missing").unwrap_err();
    assert_eq!(again, entries[0].error);
    assert_eq!(session.stats().parses, 1);
}

#[test]
fn test_root_import_without_library_root() {
    common::init_logging();
    let mut b = TreeBuilder::new();
    let using = b.using("std/io");
    let root = b.module(vec![using]);
    let tree = b.finish(root).unwrap();

    let config = LoaderConfig::default();
    let parser = MemoryParser::new().with_module(MAIN, tree);
    let session = Session::new(config, parser);
    let err = session.load(MAIN).unwrap_err();
    assert!(matches!(err, ResolveError::Source(SourceError::LibraryRootUnset { .. })), "{err:?}");
    assert_eq!(session.diagnostics().len(), 1);
}

#[test]
fn test_package_alias_selects_exported_classes() {
    let mut b = TreeBuilder::new();
    let vec2 = b.class("Vec2", Modifiers::EXPORT, vec![], vec![], vec![]);
    let hidden = b.class("Hidden", Modifiers::empty(), vec![], vec![], vec![]);
    let root = b.module(vec![vec2, hidden]);
    let geo = b.finish(root).unwrap();

    let build = |member: &str| {
        let mut b = TreeBuilder::new();
        let package = b.package("Geo", "geo");
        let using = b.using_packages(vec![package]);
        let left = b.identifier("Geo");
        let callee = b.attribute(left, member);
        let call = b.call(callee, vec![]);
        let v = b.variable("v", Modifiers::empty(), None, Some(call));
        let root = b.module(vec![using, v]);
        (b.finish(root).unwrap(), call)
    };

    let (main, call) = build("Vec2");
    let (session, _) = common::session(vec![(MAIN, main), ("/lib/geo.lr", geo.clone())]);
    let main = session.load(MAIN).unwrap();
    let instance = only(session.resolver().resolve_value(&main, call).unwrap());
    assert_eq!(target_name(&session, instance), "Vec2");
    assert_eq!(instance.target.module, loaded(&session, "/lib/geo.lr").id);
    assert!(instance.is_instance());

    let (main, _) = build("Hidden");
    let (session, _) = common::session(vec![(MAIN, main), ("/lib/geo.lr", geo)]);
    let err = session.load(MAIN).unwrap_err();
    assert!(matches!(&err, ResolveError::PrivateAccess { name, .. } if name == "Hidden"), "{err:?}");
}

#[test]
fn test_prelude_is_loaded_on_demand() {
    let mut b = TreeBuilder::new();
    let class = b.class("Local", Modifiers::EXPORT, vec![], vec![], vec![]);
    let root = b.module(vec![class]);
    let (session, _) = common::session(vec![(MAIN, b.finish(root).unwrap())]);
    session.load(MAIN).unwrap();
    assert!(session.loader().lookup(Path::new(PRELUDE)).is_none());

    let mut b = TreeBuilder::new();
    let callee = b.identifier("Set");
    let call = b.call(callee, vec![]);
    let s = b.variable("s", Modifiers::empty(), None, Some(call));
    let root = b.module(vec![s]);
    let (session, _) = common::session(vec![(MAIN, b.finish(root).unwrap())]);
    let main = session.load(MAIN).unwrap();
    let set = only(session.resolver().resolve_value(&main, call).unwrap());
    assert_eq!(set.target.module, loaded(&session, PRELUDE).id);
    assert_eq!(session.stats().parses, 2);
}
