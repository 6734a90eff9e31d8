mod common;

use common::{bare_session, only, target_name, MAIN};
use larch_resolve::{DeclRef, ResolveError};
use larch_syntax::{Modifiers, NodeId, PrimitiveKind, SyntaxTree, TreeBuilder};

/// `class Point { constructor(x: int) {} constructor(x: int, y: int) {} }`
fn point(b: &mut TreeBuilder) -> NodeId {
    let int = b.primitive(PrimitiveKind::Int);
    let x = b.parameter("x", Some(int), None);
    let body = b.body(vec![]);
    let one = b.function("constructor", Modifiers::EXPORT, vec![], vec![x], None, Some(body));
    let (int_x, int_y) = (b.primitive(PrimitiveKind::Int), b.primitive(PrimitiveKind::Int));
    let x = b.parameter("x", Some(int_x), None);
    let y = b.parameter("y", Some(int_y), None);
    let body = b.body(vec![]);
    let two = b.function("constructor", Modifiers::EXPORT, vec![], vec![x, y], None, Some(body));
    b.class("Point", Modifiers::EXPORT, vec![], vec![], vec![one, two])
}

fn construct(b: &mut TreeBuilder, var: &str, arity: i64) -> (NodeId, NodeId) {
    let callee = b.identifier("Point");
    let arguments = (0..arity).map(|n| b.int(n)).collect();
    let call = b.call(callee, arguments);
    (b.variable(var, Modifiers::empty(), None, Some(call)), call)
}

#[test]
fn test_constructor_overloads_by_arity() {
    let mut b = TreeBuilder::new();
    let class = point(&mut b);
    let (p1, call1) = construct(&mut b, "p1", 1);
    let (p2, call2) = construct(&mut b, "p2", 2);
    let root = b.module(vec![class, p1, p2]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);

    let main = session.load(MAIN).unwrap();
    let resolver = session.resolver();
    let first = only(resolver.resolve_value(&main, call1).unwrap());
    let second = only(resolver.resolve_value(&main, call2).unwrap());
    assert_eq!(first.target, DeclRef::new(main.id, class));
    assert_eq!(second.target, DeclRef::new(main.id, class));
    assert!(first.is_instance() && second.is_instance());
    assert_ne!(first, second, "every instantiation is distinct");
    let (first_id, second_id) = (first.instance_id().unwrap(), second.instance_id().unwrap());
    assert_ne!(first_id, second_id);

    // the class name itself carries no instance id
    let declaration = only(resolver.lookup(&main, call1, "Point").unwrap());
    assert_eq!(declaration.instance_id(), None);
}

#[test]
fn test_constructor_without_matching_arity_is_a_wrong_call() {
    let mut b = TreeBuilder::new();
    let class = point(&mut b);
    let (p3, _) = construct(&mut b, "p3", 3);
    let root = b.module(vec![class, p3]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);

    let err = session.load(MAIN).unwrap_err();
    expect_test::expect![[r#"Wrong call: no overload of `Point` accepts these arguments"#]].assert_eq(&err.to_string());
}

#[test]
fn test_named_arguments_and_defaults() {
    let mut b = TreeBuilder::new();
    let int = b.primitive(PrimitiveKind::Int);
    let width = b.parameter("width", Some(int), None);
    let (int, zero) = (b.primitive(PrimitiveKind::Int), b.int(0));
    let height = b.parameter("height", Some(int), Some(zero));
    let int = b.primitive(PrimitiveKind::Int);
    let area = b.function("area", Modifiers::empty(), vec![], vec![width, height], Some(int), None);

    let callee = b.identifier("area");
    let (two, three) = (b.int(2), b.int(3));
    let named = b.named("height", three);
    let call = b.call(callee, vec![two, named]);
    let a = b.variable("a", Modifiers::empty(), None, Some(call));

    let callee = b.identifier("area");
    let five = b.int(5);
    let defaulted = b.call(callee, vec![five]);
    let d = b.variable("d", Modifiers::empty(), None, Some(defaulted));
    let root = b.module(vec![area, a, d]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);

    let main = session.load(MAIN).unwrap();
    let resolver = session.resolver();
    let result = only(resolver.resolve_value(&main, call).unwrap());
    assert!(result.is_instance());
    assert_eq!(target_name(&session, result), "primitive type");
    assert_eq!(resolver.resolve_value(&main, defaulted).unwrap().len(), 1);
}

#[test]
fn test_void_call_has_no_result() {
    let mut b = TreeBuilder::new();
    let body = b.body(vec![]);
    let log = b.function("log", Modifiers::empty(), vec![], vec![], None, Some(body));
    let callee = b.identifier("log");
    let call = b.call(callee, vec![]);
    let stmt = b.expression(call);
    let root = b.module(vec![log, stmt]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);
    let main = session.load(MAIN).unwrap();
    assert!(session.resolver().resolve_value(&main, call).unwrap().is_empty());

    // selecting from a call without a result has nothing to select from
    let mut b = TreeBuilder::new();
    let body = b.body(vec![]);
    let log = b.function("log", Modifiers::empty(), vec![], vec![], None, Some(body));
    let callee = b.identifier("log");
    let call = b.call(callee, vec![]);
    let member = b.attribute(call, "length");
    let stmt = b.expression(member);
    let root = b.module(vec![log, stmt]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);
    let err = session.load(MAIN).unwrap_err();
    assert!(matches!(&err, ResolveError::BaseHasNoResult { name, .. } if name == "length"), "{err:?}");
}

#[test]
fn test_function_overloads_are_allowed_but_variables_collide() {
    let mut b = TreeBuilder::new();
    let int = b.primitive(PrimitiveKind::Int);
    let n = b.parameter("n", Some(int), None);
    let first = b.function("show", Modifiers::empty(), vec![], vec![n], None, None);
    let string = b.primitive(PrimitiveKind::String);
    let s = b.parameter("s", Some(string), None);
    let second = b.function("show", Modifiers::empty(), vec![], vec![s], None, None);
    let root = b.module(vec![first, second]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);
    let main = session.load(MAIN).unwrap();
    let overloads = session.resolver().lookup(&main, main.tree.root(), "show").unwrap();
    assert_eq!(overloads.len(), 2);

    let mut b = TreeBuilder::new();
    b.at(1, 5);
    let one = b.int(1);
    let x = b.variable("x", Modifiers::empty(), None, Some(one));
    b.at(2, 5);
    let two = b.int(2);
    let again = b.variable("x", Modifiers::empty(), None, Some(two));
    let body = b.body(vec![x, again]);
    let f = b.function("f", Modifiers::empty(), vec![], vec![], None, Some(body));
    let root = b.module(vec![f]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);
    let err = session.load(MAIN).unwrap_err();
    expect_test::expect![[r#"Already defined: `x` was first defined at /app/main.lr:1:5"#]].assert_eq(&err.to_string());
}

#[test]
fn test_static_members_through_the_class() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let ret = b.return_(Some(one));
    let body = b.body(vec![ret]);
    let int = b.primitive(PrimitiveKind::Int);
    let helper = b.function("one", Modifiers::EXPORT | Modifiers::STATIC, vec![], vec![], Some(int), Some(body));
    let math = b.class("Math", Modifiers::EXPORT | Modifiers::STATIC, vec![], vec![], vec![helper]);
    let left = b.identifier("Math");
    let callee = b.attribute(left, "one");
    let call = b.call(callee, vec![]);
    let x = b.variable("x", Modifiers::empty(), None, Some(call));
    let root = b.module(vec![math, x]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);

    let main = session.load(MAIN).unwrap();
    let resolver = session.resolver();
    assert_eq!(only(resolver.resolve_value(&main, callee).unwrap()).target, DeclRef::new(main.id, helper));
    assert!(only(resolver.resolve_value(&main, call).unwrap()).is_instance());
}

#[test]
fn test_instance_members_through_the_class_are_non_static() {
    let mut b = TreeBuilder::new();
    let body = b.body(vec![]);
    let helper = b.function("helper", Modifiers::EXPORT, vec![], vec![], None, Some(body));
    let util = b.class("Util", Modifiers::EXPORT, vec![], vec![], vec![helper]);
    let left = b.identifier("Util");
    let callee = b.attribute(left, "helper");
    let call = b.call(callee, vec![]);
    let stmt = b.expression(call);
    let root = b.module(vec![util, stmt]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);

    let err = session.load(MAIN).unwrap_err();
    assert!(matches!(&err, ResolveError::NonStatic { name, .. } if name == "helper"), "{err:?}");
}

#[test]
fn test_static_class_shape() {
    let mut b = TreeBuilder::new();
    let int = b.primitive(PrimitiveKind::Int);
    let count = b.property("count", Modifiers::EXPORT, Some(int), None);
    let class = b.class("Registry", Modifiers::EXPORT | Modifiers::STATIC, vec![], vec![], vec![count]);
    let root = b.module(vec![class]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);
    let err = session.load(MAIN).unwrap_err();
    assert!(matches!(&err, ResolveError::NonStatic { name, .. } if name == "count"), "{err:?}");

    let mut b = TreeBuilder::new();
    let t = b.generic("T", None, None);
    let class = b.class("Registry", Modifiers::EXPORT | Modifiers::STATIC, vec![t], vec![], vec![]);
    let root = b.module(vec![class]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);
    let err = session.load(MAIN).unwrap_err();
    expect_test::expect![[r#"Static class `Registry` cannot declare generic parameters"#]].assert_eq(&err.to_string());
}

/// `class Pair<A, B> {}` followed by `var p: Pair<arguments>`.
fn pair_with(arguments: impl FnOnce(&mut TreeBuilder) -> Vec<NodeId>) -> (SyntaxTree, NodeId) {
    let mut b = TreeBuilder::new();
    let a = b.generic("A", None, None);
    let bg = b.generic("B", None, None);
    let class = b.class("Pair", Modifiers::EXPORT, vec![a, bg], vec![], vec![]);
    let callee = b.identifier("Pair");
    let arguments = arguments(&mut b);
    let ty = b.pseudonym(callee, arguments);
    let p = b.variable("p", Modifiers::empty(), Some(ty), None);
    let root = b.module(vec![class, p]);
    (b.finish(root).unwrap(), ty)
}

#[test]
fn test_generic_instantiation() {
    let (tree, ty) = pair_with(|b| {
        let string = b.primitive(PrimitiveKind::String);
        let int = b.primitive(PrimitiveKind::Int);
        vec![b.named("B", string), b.named("A", int)]
    });
    let (session, _) = bare_session(vec![(MAIN, tree)]);
    let main = session.load(MAIN).unwrap();
    let hit = only(session.resolver().resolve_type(&main, ty).unwrap());
    assert_eq!(target_name(&session, hit), "Pair");
    assert!(!hit.is_instance());
}

#[test]
fn test_generic_argument_errors() {
    let cases: Vec<(&str, Box<dyn FnOnce(&mut TreeBuilder) -> Vec<NodeId>>)> = vec![
        (
            "a named type argument cannot follow a positional one",
            Box::new(|b: &mut TreeBuilder| {
                let int = b.primitive(PrimitiveKind::Int);
                let string = b.primitive(PrimitiveKind::String);
                let named = b.named("A", string);
                vec![int, named]
            }),
        ),
        (
            "type argument `A` is given twice",
            Box::new(|b: &mut TreeBuilder| {
                let int = b.primitive(PrimitiveKind::Int);
                let string = b.primitive(PrimitiveKind::String);
                vec![b.named("A", int), b.named("A", string)]
            }),
        ),
        (
            "no declaration accepts these type arguments",
            Box::new(|b: &mut TreeBuilder| vec![b.primitive(PrimitiveKind::Int)]),
        ),
    ];
    for (reason, arguments) in cases {
        let (tree, _) = pair_with(arguments);
        let (session, _) = bare_session(vec![(MAIN, tree)]);
        let err = session.load(MAIN).unwrap_err();
        assert_eq!(err.to_string(), format!("Non-generic: cannot apply type arguments to `Pair`: {reason}"));
    }
}

#[test]
fn test_generic_parameters_take_no_type_arguments() {
    let mut b = TreeBuilder::new();
    let t = b.generic("T", None, None);
    let callee = b.identifier("T");
    let int = b.primitive(PrimitiveKind::Int);
    let ty = b.pseudonym(callee, vec![int]);
    let inner = b.property("inner", Modifiers::EXPORT, Some(ty), None);
    let class = b.class("Box", Modifiers::EXPORT, vec![t], vec![], vec![inner]);
    let root = b.module(vec![class]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);

    let err = session.load(MAIN).unwrap_err();
    assert!(matches!(&err, ResolveError::NonGeneric { name, .. } if name == "T"), "{err:?}");
}

#[test]
fn test_bounded_generic_members() {
    let mut b = TreeBuilder::new();
    let int = b.primitive(PrimitiveKind::Int);
    let size = b.property("size", Modifiers::EXPORT, Some(int), None);
    let shape = b.class("Shape", Modifiers::EXPORT, vec![], vec![], vec![size]);
    let bound = b.identifier("Shape");
    let t = b.generic("T", Some(bound), None);
    let item_ty = b.identifier("T");
    let item = b.property("item", Modifiers::EXPORT, Some(item_ty), None);
    let left = b.identifier("item");
    let access = b.attribute(left, "size");
    let ret = b.return_(Some(access));
    let body = b.body(vec![ret]);
    let int = b.primitive(PrimitiveKind::Int);
    let measure = b.function("measure", Modifiers::EXPORT, vec![], vec![], Some(int), Some(body));
    let holder = b.class("Holder", Modifiers::EXPORT, vec![t], vec![], vec![item, measure]);
    let root = b.module(vec![shape, holder]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);

    let main = session.load(MAIN).unwrap();
    let resolver = session.resolver();
    let hit = only(resolver.resolve_value(&main, access).unwrap());
    assert_eq!(hit.target, DeclRef::new(main.id, size));

    // the bound is instantiated once per generic
    let item_value = resolver.value_of_node(&main, item).unwrap();
    assert_eq!(item_value.target, DeclRef::new(main.id, shape));
    assert_eq!(resolver.value_of_node(&main, item).unwrap(), item_value);
}

#[test]
fn test_call_results_must_name_a_class() {
    // fn make(): <result>; var r = make()
    fn calling(result: fn(&mut TreeBuilder) -> (Vec<NodeId>, NodeId)) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let (generics, result) = result(&mut b);
        let make = b.function("make", Modifiers::empty(), generics, vec![], Some(result), None);
        let callee = b.identifier("make");
        let call = b.call(callee, vec![]);
        let r = b.variable("r", Modifiers::empty(), None, Some(call));
        let root = b.module(vec![make, r]);
        b.finish(root).unwrap()
    }

    let cases: [(&str, fn(&mut TreeBuilder) -> (Vec<NodeId>, NodeId)); 3] = [
        ("Typing mismatch: a call result must be a class, found tuple", |b| {
            let (int, string) = (b.primitive(PrimitiveKind::Int), b.primitive(PrimitiveKind::String));
            (vec![], b.tuple(vec![int, string]))
        }),
        ("Typing mismatch: a call result must be a class, found lambda", |b| (vec![], b.lambda(vec![], vec![], None, None))),
        ("Typing mismatch: the result type `T` has no class bound", |b| {
            let t = b.generic("T", None, None);
            (vec![t], b.identifier("T"))
        }),
    ];
    for (expected, result) in cases {
        let (session, _) = bare_session(vec![(MAIN, calling(result))]);
        let err = session.load(MAIN).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    // a generic bounded by a class produces an instance of the bound
    let mut b = TreeBuilder::new();
    let shape = b.class("Shape", Modifiers::EXPORT, vec![], vec![], vec![]);
    let bound = b.identifier("Shape");
    let t = b.generic("T", Some(bound), None);
    let result = b.identifier("T");
    let pick = b.function("pick", Modifiers::empty(), vec![t], vec![], Some(result), None);
    let callee = b.identifier("pick");
    let call = b.call(callee, vec![]);
    let p = b.variable("p", Modifiers::empty(), None, Some(call));
    let root = b.module(vec![shape, pick, p]);
    let (session, _) = bare_session(vec![(MAIN, b.finish(root).unwrap())]);

    let main = session.load(MAIN).unwrap();
    let instance = only(session.resolver().resolve_value(&main, call).unwrap());
    assert_eq!(instance.target, DeclRef::new(main.id, shape));
    assert!(instance.is_instance());
}
