//! Locates candidate `fmt.Errorf` call instructions.

use crate::ir::{CallInstr, FuncRef, Function, Package};

pub const ERRORF_PACKAGE: &str = "fmt";
pub const ERRORF_NAME: &str = "Errorf";

/// Lowered arity of `Errorf(format string, a ...any)`: the template and the
/// packed variadic slice.
pub const ERRORF_ARITY: usize = 2;

/// A call instruction that statically targets `fmt.Errorf`.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub function: &'a Function,
    pub block: u32,
    pub call: &'a CallInstr,
}

pub fn is_errorf(callee: &FuncRef) -> bool {
    callee.package == ERRORF_PACKAGE && callee.name == ERRORF_NAME
}

/// Direct call to `fmt.Errorf` with the expected lowered arity. Calls through
/// interfaces or function values have no static callee and never match.
pub fn is_candidate(call: &CallInstr) -> bool {
    call.common.static_callee().is_some_and(is_errorf) && call.common.args.len() == ERRORF_ARITY
}

/// Candidate call sites of one function in block and instruction order.
pub fn function_call_sites(function: &Function) -> impl Iterator<Item = CallSite<'_>> {
    function.blocks.iter().flat_map(move |block| {
        block
            .instructions
            .iter()
            .filter_map(|instr| instr.as_call())
            .filter(|call| is_candidate(call))
            .map(move |call| CallSite {
                function,
                block: block.index,
                call,
            })
    })
}

/// Candidate call sites of every source function of `package`, in discovery order.
pub fn call_sites(package: &Package) -> impl Iterator<Item = CallSite<'_>> {
    package.source_functions().flat_map(function_call_sites)
}
