//! The analyzed unit as handed over by the front end.
//!
//! A front end parses and type-checks source files, lowers every function to
//! a control-flow graph of typed instructions, and dumps the result as JSON.
//! Nothing here is computed by the rule itself; it is a read-only view.

pub mod position;
pub mod syntax;
pub mod types;

pub use position::{find_file, Location, Pos, SourceFile, Span};
pub use syntax::{
    CallExpr, Expr, ExprId, ExprKind, LitKind, Selection, SelectionKind, SyntaxIndex, TypeInfo,
};
pub use types::{BasicKind, ErrorCapability, Method, TypeDef, TypeId, TypeKind, TypeTable};

use crate::errors::CheckError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Everything the front end produced for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl AnalysisInput {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a front-end dump from disk.
    pub fn load(path: &Path) -> Result<Self, CheckError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CheckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents).map_err(|source| CheckError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn function_count(&self) -> usize {
        self.packages.iter().map(|pkg| pkg.functions.len()).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Package {
    /// Import path, e.g. `example.com/errorf`.
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub types: TypeTable,
    #[serde(default)]
    pub type_info: TypeInfo,
}

impl Package {
    /// Functions written in source, in declaration order.
    pub fn source_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|func| !func.synthetic)
    }

    pub fn location(&self, pos: Pos) -> Option<Location> {
        find_file(&self.files, pos).and_then(|file| file.position(pos))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub pos: Pos,
    /// Wrappers and other functions generated by the front end.
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default)]
    pub blocks: Vec<BasicBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicBlock {
    pub index: u32,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    Call(CallInstr),
    /// Any instruction other than a call; only its opcode and position are kept.
    Other {
        op: String,
        #[serde(default)]
        pos: Pos,
    },
}

impl Instruction {
    pub fn pos(&self) -> Pos {
        match self {
            Instruction::Call(call) => call.pos,
            Instruction::Other { pos, .. } => *pos,
        }
    }

    pub fn as_call(&self) -> Option<&CallInstr> {
        match self {
            Instruction::Call(call) => Some(call),
            Instruction::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallInstr {
    /// Position of the opening parenthesis of the originating call expression.
    pub pos: Pos,
    pub common: CallCommon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallCommon {
    pub target: CallTarget,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl CallCommon {
    /// The callee when the call is a direct call to a known function.
    pub fn static_callee(&self) -> Option<&FuncRef> {
        match &self.target {
            CallTarget::Static(func) => Some(func),
            CallTarget::Dynamic | CallTarget::Invoke { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallTarget {
    Static(FuncRef),
    /// Call through a function value.
    Dynamic,
    /// Dynamic dispatch through an interface method.
    Invoke { method: String },
}

/// Fully-qualified identity of a function: package path plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuncRef {
    pub package: String,
    pub name: String,
}

impl FuncRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FuncRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Const {
        value: ConstValue,
        #[serde(default)]
        ty: Option<TypeId>,
    },
    /// Result of another instruction.
    Register {
        name: String,
        #[serde(default)]
        ty: Option<TypeId>,
    },
    Parameter {
        name: String,
        #[serde(default)]
        ty: Option<TypeId>,
    },
    Global {
        name: String,
        #[serde(default)]
        ty: Option<TypeId>,
    },
    Function(FuncRef),
}

impl Value {
    pub fn string_const(value: impl Into<String>) -> Self {
        Value::Const {
            value: ConstValue::String(value.into()),
            ty: None,
        }
    }

    pub fn as_const(&self) -> Option<&ConstValue> {
        match self {
            Value::Const { value, .. } => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
}

impl ConstValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }
}
