//! Syntax-level expressions, their static types, and positional lookup.

use super::position::{Pos, Span};
use super::types::{Method, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExprId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub id: ExprId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LitKind {
    String,
    Int,
    Float,
    Char,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Ident {
        name: String,
    },
    BasicLit {
        kind: LitKind,
        value: String,
    },
    /// `base.sel`
    Selector {
        base: Box<Expr>,
        sel: String,
    },
    Call(CallExpr),
    Paren(Box<Expr>),
    /// Any expression the rule does not need to look into.
    Other {
        #[serde(default)]
        children: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub lparen: Pos,
    #[serde(default)]
    pub args: Vec<Expr>,
    /// Position of `...` when the last argument is spread.
    #[serde(default)]
    pub ellipsis: Option<Pos>,
    pub rparen: Pos,
}

impl CallExpr {
    pub fn has_spread(&self) -> bool {
        self.ellipsis.is_some_and(Pos::is_valid)
    }
}

impl Expr {
    pub fn as_call(&self) -> Option<&CallExpr> {
        match &self.kind {
            ExprKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Strip redundant parentheses.
    pub fn unparen(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }

    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Ident { .. } | ExprKind::BasicLit { .. } => Vec::new(),
            ExprKind::Selector { base, .. } => vec![base.as_ref()],
            ExprKind::Call(call) => std::iter::once(call.fun.as_ref())
                .chain(call.args.iter())
                .collect(),
            ExprKind::Paren(inner) => vec![inner.as_ref()],
            ExprKind::Other { children } => children.iter().collect(),
        }
    }

    /// Whether `pos` falls on a token that belongs to this node itself rather
    /// than to one of its children.
    fn owns_token_at(&self, pos: Pos) -> bool {
        match &self.kind {
            ExprKind::Ident { .. } | ExprKind::BasicLit { .. } => true,
            ExprKind::Call(call) => {
                pos == call.lparen || pos == call.rparen || call.ellipsis == Some(pos)
            }
            ExprKind::Paren(_) => pos == self.span.start || pos.0 + 1 == self.span.end.0,
            ExprKind::Selector { .. } | ExprKind::Other { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    FieldVal,
    MethodVal,
    MethodExpr,
}

/// Resolution of a selector expression to the member it denotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub kind: SelectionKind,
    pub recv: TypeId,
    pub method: Option<Method>,
}

/// Static type facts recorded by the front end for syntax nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeInfo {
    #[serde(default)]
    pub types: HashMap<ExprId, TypeId>,
    #[serde(default)]
    pub selections: HashMap<ExprId, Selection>,
}

impl TypeInfo {
    pub fn type_of(&self, expr: &Expr) -> Option<TypeId> {
        self.types.get(&expr.id).copied()
    }

    pub fn selection(&self, expr: &Expr) -> Option<&Selection> {
        self.selections.get(&expr.id)
    }
}

/// Nodes enclosing a position, innermost first.
#[derive(Debug)]
pub struct EnclosingPath<'a> {
    pub path: Vec<&'a Expr>,
    /// `pos` lies on a token of `path[0]` itself.
    pub exact: bool,
}

impl<'a> EnclosingPath<'a> {
    pub fn innermost(&self) -> Option<&'a Expr> {
        self.path.first().copied()
    }
}

#[derive(Debug)]
struct IndexedNode<'a> {
    span: Span,
    depth: usize,
    parent: Option<usize>,
    expr: &'a Expr,
}

/// Position-to-node index for one file, built once and queried on demand.
#[derive(Debug)]
pub struct SyntaxIndex<'a> {
    /// Sorted by span start, ties broken by depth.
    nodes: Vec<IndexedNode<'a>>,
}

impl<'a> SyntaxIndex<'a> {
    pub fn build(exprs: &'a [Expr]) -> Self {
        let mut nodes = Vec::new();
        let mut stack: Vec<(&'a Expr, usize, Option<usize>)> =
            exprs.iter().rev().map(|expr| (expr, 0, None)).collect();

        while let Some((expr, depth, parent)) = stack.pop() {
            let index = nodes.len();
            nodes.push(IndexedNode {
                span: expr.span,
                depth,
                parent,
                expr,
            });
            for child in expr.children().into_iter().rev() {
                stack.push((child, depth + 1, Some(index)));
            }
        }

        // `enclosing` binary-searches on span start
        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by_key(|&i| (nodes[i].span.start, nodes[i].depth));
        let mut remap = vec![0; nodes.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }
        let mut sorted: Vec<Option<IndexedNode<'a>>> = nodes.into_iter().map(Some).collect();
        let nodes = order
            .iter()
            .filter_map(|&old| sorted[old].take())
            .map(|mut node| {
                node.parent = node.parent.map(|p| remap[p]);
                node
            })
            .collect();

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Path of nodes enclosing `pos`, innermost first.
    pub fn enclosing(&self, pos: Pos) -> Option<EnclosingPath<'a>> {
        let candidates = self.nodes.partition_point(|node| node.span.start <= pos);
        let innermost = self.nodes[..candidates]
            .iter()
            .enumerate()
            .filter(|(_, node)| node.span.contains(pos))
            .max_by_key(|(_, node)| node.depth)
            .map(|(index, _)| index)?;

        let path: Vec<&'a Expr> =
            std::iter::successors(Some(innermost), |&index| self.nodes[index].parent)
                .map(|index| self.nodes[index].expr)
                .collect();
        let exact = path.first().is_some_and(|expr| expr.owns_token_at(pos));

        Some(EnclosingPath { path, exact })
    }
}
