mod common;

use common::{bare_session, MAIN};
use larch_resolve::ResolveError;
use larch_syntax::{Modifiers, NodeId, SyntaxTree, TreeBuilder};

fn module(build: impl FnOnce(&mut TreeBuilder) -> Vec<NodeId>) -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let items = build(&mut b);
    let root = b.module(items);
    b.finish(root).unwrap()
}

fn load_error(tree: SyntaxTree) -> ResolveError {
    let (session, _) = bare_session(vec![(MAIN, tree)]);
    let err = session.load(MAIN).unwrap_err();
    assert_eq!(session.diagnostics().len(), 1);
    err
}

#[test]
fn test_variable_selecting_from_itself() {
    // var a = a.x
    let tree = module(|b| {
        let left = b.identifier("a");
        let access = b.attribute(left, "x");
        vec![b.variable("a", Modifiers::empty(), None, Some(access))]
    });
    let err = load_error(tree);
    expect_test::expect![[r#"Typing mismatch: the value of `a` depends on itself"#]].assert_eq(&err.to_string());
}

#[test]
fn test_variable_calling_itself() {
    // var f = f()
    let tree = module(|b| {
        let callee = b.identifier("f");
        let call = b.call(callee, vec![]);
        vec![b.variable("f", Modifiers::empty(), None, Some(call))]
    });
    let err = load_error(tree);
    expect_test::expect![[r#"Typing mismatch: the value of `f` depends on itself"#]].assert_eq(&err.to_string());
}

#[test]
fn test_values_depending_on_each_other() {
    // var a = b.x; var b = a.y
    let tree = module(|b| {
        let left = b.identifier("b");
        let access = b.attribute(left, "x");
        let a = b.variable("a", Modifiers::empty(), None, Some(access));
        let left = b.identifier("a");
        let access = b.attribute(left, "y");
        let bb = b.variable("b", Modifiers::empty(), None, Some(access));
        vec![a, bb]
    });
    let err = load_error(tree);
    assert!(matches!(err, ResolveError::TypingMismatch { .. }), "{err:?}");
}

#[test]
fn test_generic_bound_selecting_from_itself() {
    // class C<T: T.x> {}
    let tree = module(|b| {
        let left = b.identifier("T");
        let bound = b.attribute(left, "x");
        let t = b.generic("T", Some(bound), None);
        vec![b.class("C", Modifiers::EXPORT, vec![t], vec![], vec![])]
    });
    let err = load_error(tree);
    expect_test::expect![[r#"Typing mismatch: the bound of `T` depends on itself"#]].assert_eq(&err.to_string());
}

#[test]
fn test_generic_bounds_through_each_other() {
    // class C<T: U.x, U: T> {}
    let tree = module(|b| {
        let left = b.identifier("U");
        let bound = b.attribute(left, "x");
        let t = b.generic("T", Some(bound), None);
        let bound = b.identifier("T");
        let u = b.generic("U", Some(bound), None);
        vec![b.class("C", Modifiers::EXPORT, vec![t, u], vec![], vec![])]
    });
    let err = load_error(tree);
    assert!(matches!(err, ResolveError::TypingMismatch { .. }), "{err:?}");
}

#[test]
fn test_failed_cycle_leaves_the_resolver_reusable() {
    let tree = module(|b| {
        let left = b.identifier("a");
        let access = b.attribute(left, "x");
        vec![b.variable("a", Modifiers::empty(), None, Some(access))]
    });
    let a = tree.items()[0];
    let (session, _) = bare_session(vec![(MAIN, tree)]);
    let first = session.load(MAIN).unwrap_err();

    let main = common::loaded(&session, MAIN);
    let resolver = session.resolver();
    assert_eq!(resolver.value_of_node(&main, a).unwrap_err(), first);
    assert_eq!(resolver.value_of_node(&main, a).unwrap_err(), first);
}
