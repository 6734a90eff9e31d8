//! Signature matching predicates used by call and generic-instantiation resolution.

use larch_syntax::{NodeId, NodeKind, SyntaxTree};

/// Result of matching declared parameters against supplied arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Match,
    NoMatch,
    /// The matcher could not evaluate the inputs; aborts resolution.
    InternalError(String),
}

/// Pure predicates deciding whether an argument list fits a declaration.
///
/// `callee` is the tree holding the declared parameters or generics, `site` the
/// tree holding the arguments. An argument that is a `Pair` with an identifier key
/// is a named argument.
pub trait SignatureMatcher: Send + Sync {
    fn parameters(&self, callee: &SyntaxTree, parameters: &[NodeId], site: &SyntaxTree, arguments: &[NodeId]) -> MatchOutcome;

    fn generics(&self, callee: &SyntaxTree, generics: &[NodeId], site: &SyntaxTree, arguments: &[NodeId]) -> MatchOutcome;
}

/// Arity and name matching. Arguments are taken in order: a named argument fills
/// the declaration of the same name, a positional one the first declaration not
/// yet filled. Filling a declaration twice fails, and every declaration left
/// unfilled must carry a default. Call arguments must list positional arguments
/// before named ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralMatcher;

impl SignatureMatcher for StructuralMatcher {
    fn parameters(&self, callee: &SyntaxTree, parameters: &[NodeId], site: &SyntaxTree, arguments: &[NodeId]) -> MatchOutcome {
        let first_named = arguments.iter().position(|arg| argument_name(site, *arg).is_some());
        if let Some(first_named) = first_named {
            if arguments[first_named..].iter().any(|arg| argument_name(site, *arg).is_none()) {
                return MatchOutcome::NoMatch;
            }
        }
        match_declared(callee, parameters, site, arguments, |kind| match kind {
            NodeKind::Parameter { value, .. } => Some(value.is_some()),
            _ => None,
        })
    }

    fn generics(&self, callee: &SyntaxTree, generics: &[NodeId], site: &SyntaxTree, arguments: &[NodeId]) -> MatchOutcome {
        match_declared(callee, generics, site, arguments, |kind| match kind {
            NodeKind::Generic { default, .. } => Some(default.is_some()),
            _ => None,
        })
    }
}

/// Name of a named argument, `None` for positional ones.
pub fn argument_name(site: &SyntaxTree, argument: NodeId) -> Option<&str> {
    match site.kind(argument) {
        NodeKind::Pair { key, .. } if matches!(site.kind(*key), NodeKind::Identifier) => site.node(*key).name_str(),
        _ => None,
    }
}

fn match_declared(
    callee: &SyntaxTree,
    declared: &[NodeId],
    site: &SyntaxTree,
    arguments: &[NodeId],
    has_default: impl Fn(&NodeKind) -> Option<bool>,
) -> MatchOutcome {
    let mut filled = vec![false; declared.len()];
    let mut next = 0;

    for argument in arguments {
        let index = match argument_name(site, *argument) {
            Some(name) => match declared.iter().position(|decl| callee.node(*decl).name_str() == Some(name)) {
                Some(index) => index,
                None => return MatchOutcome::NoMatch,
            },
            None => {
                while next < filled.len() && filled[next] {
                    next += 1;
                }
                next
            }
        };
        if index >= filled.len() || filled[index] {
            return MatchOutcome::NoMatch;
        }
        filled[index] = true;
    }

    for (decl, filled) in declared.iter().zip(filled) {
        if filled {
            continue;
        }
        match has_default(callee.kind(*decl)) {
            Some(true) => {}
            Some(false) => return MatchOutcome::NoMatch,
            None => {
                return MatchOutcome::InternalError(format!(
                    "expected a declaration in a signature, found {}",
                    callee.kind(*decl).describe()
                ))
            }
        }
    }
    MatchOutcome::Match
}
