//! Decides whether a candidate call site violates the template convention.

use super::scanner::CallSite;
use super::verbs::{Policy, Verb};
use super::Pass;
use crate::ir::{CallInstr, ConstValue, ErrorCapability, Expr, ExprKind, Pos, SelectionKind};

/// Why an interpolation argument makes the call site relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    /// The argument's static type satisfies the error capability.
    DirectError,
    /// The argument is `x.Error()` on an error-typed `x`.
    StringifiedError,
}

/// Why a call site could not be analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NonConstantTemplate,
    /// The position belongs to no file of the package.
    UnknownFile,
    /// The position does not resolve to exactly one call expression.
    NoEnclosingCall,
    /// `fmt.Errorf(format, args...)`
    SpreadArguments,
    /// Only the template is passed.
    NoArguments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Skipped(SkipReason),
    /// No argument carries an error, so any template is fine.
    NoErrorArgument,
    Accepted(Verb),
    Rejected(ArgClass),
}

impl Verdict {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Verdict::Rejected(_))
    }
}

/// The call's first argument as a compile-time string.
pub fn template(call: &CallInstr) -> Option<&str> {
    call.common
        .args
        .first()
        .and_then(|arg| arg.as_const())
        .and_then(ConstValue::as_str)
}

/// Syntactic arguments following the template of the call expression whose
/// opening parenthesis is at `pos`.
pub fn interpolation_args<'a>(pass: &Pass<'a>, pos: Pos) -> Result<&'a [Expr], SkipReason> {
    let index = pass.syntax_at(pos).ok_or(SkipReason::UnknownFile)?;
    let enclosing = index.enclosing(pos).ok_or(SkipReason::NoEnclosingCall)?;
    if !enclosing.exact {
        return Err(SkipReason::NoEnclosingCall);
    }
    let call = enclosing
        .innermost()
        .and_then(Expr::as_call)
        .ok_or(SkipReason::NoEnclosingCall)?;

    if call.has_spread() {
        return Err(SkipReason::SpreadArguments);
    }
    match call.args.split_first() {
        Some((_, rest)) if !rest.is_empty() => Ok(rest),
        _ => Err(SkipReason::NoArguments),
    }
}

/// Classify one interpolation argument, `None` when it carries no error.
pub fn classify(pass: &Pass<'_>, capability: &ErrorCapability, arg: &Expr) -> Option<ArgClass> {
    let ty = pass.type_info().type_of(arg)?;
    if capability.is_satisfied_by(pass.types(), ty) {
        return Some(ArgClass::DirectError);
    }
    if pass.types().is_string(ty) && is_error_method_call(pass, capability, arg) {
        return Some(ArgClass::StringifiedError);
    }
    None
}

/// Matches `x.Error()` where the method has the `func() string` shape and the
/// receiver satisfies the capability. The method is matched by name and
/// signature, not by identity with the interface method.
pub fn is_error_method_call(pass: &Pass<'_>, capability: &ErrorCapability, expr: &Expr) -> bool {
    let Some(call) = expr.unparen().as_call() else {
        return false;
    };
    let fun = call.fun.unparen();
    if !matches!(fun.kind, ExprKind::Selector { .. }) {
        return false;
    }
    let Some(selection) = pass.type_info().selection(fun) else {
        return false;
    };
    if selection.kind != SelectionKind::MethodVal {
        return false;
    }

    selection
        .method
        .as_ref()
        .is_some_and(|method| capability.matches_method(pass.types(), method))
        && capability.is_satisfied_by(pass.types(), selection.recv)
}

/// Run every step for one call site.
pub fn evaluate(
    pass: &Pass<'_>,
    capability: &ErrorCapability,
    policy: Policy,
    site: &CallSite<'_>,
) -> Verdict {
    let Some(template) = template(site.call) else {
        return Verdict::Skipped(SkipReason::NonConstantTemplate);
    };
    let args = match interpolation_args(pass, site.call.pos) {
        Ok(args) => args,
        Err(reason) => return Verdict::Skipped(reason),
    };
    let Some(class) = args.iter().find_map(|arg| classify(pass, capability, arg)) else {
        return Verdict::NoErrorArgument;
    };

    match policy.accepted_verb(template) {
        Some(verb) => Verdict::Accepted(verb),
        None => Verdict::Rejected(class),
    }
}
