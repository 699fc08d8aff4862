//! Static type model and the error capability check.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Invalid,
    Bool,
    Int,
    Int64,
    Uint,
    Float64,
    String,
    UntypedString,
    UntypedInt,
    UntypedNil,
}

impl BasicKind {
    pub fn is_string(self) -> bool {
        matches!(self, BasicKind::String | BasicKind::UntypedString)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Basic(BasicKind),
    Named,
    Interface,
    Pointer,
    Slice,
    Struct,
    Signature,
    Tuple,
}

/// A method declared on a type or required by an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub params: Vec<TypeId>,
    #[serde(default)]
    pub results: Vec<TypeId>,
    #[serde(default)]
    pub pointer_receiver: bool,
}

impl Method {
    pub fn new(name: impl Into<String>, params: Vec<TypeId>, results: Vec<TypeId>) -> Self {
        Self {
            name: name.into(),
            params,
            results,
            pointer_receiver: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    pub id: TypeId,
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub methods: Vec<Method>,
    /// Pointee of a pointer, element of a slice.
    #[serde(default)]
    pub elem: Option<TypeId>,
}

/// All types referenced by a package, indexed by [`TypeId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTable {
    types: Vec<TypeDef>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type and return its id. Ids are assigned densely in insertion order.
    pub fn insert(&mut self, name: impl Into<String>, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeDef {
            id,
            name: name.into(),
            kind,
            methods: Vec::new(),
            elem: None,
        });
        id
    }

    pub fn insert_pointer(&mut self, elem: TypeId) -> TypeId {
        let name = format!("*{}", self.name(elem));
        let id = self.insert(name, TypeKind::Pointer);
        self.types[id.0 as usize].elem = Some(elem);
        id
    }

    pub fn add_method(&mut self, ty: TypeId, method: Method) {
        if let Some(def) = self.types.get_mut(ty.0 as usize) {
            def.methods.push(method);
        }
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.0 as usize).filter(|def| def.id == id)
    }

    pub fn name(&self, id: TypeId) -> &str {
        self.get(id).map(|def| def.name.as_str()).unwrap_or("<invalid>")
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_string(&self, id: TypeId) -> bool {
        matches!(
            self.get(id).map(|def| def.kind),
            Some(TypeKind::Basic(kind)) if kind.is_string()
        )
    }

    /// Methods callable on a value of type `id`.
    ///
    /// Interfaces expose their declared methods, named types their value
    /// receiver methods, and a pointer to a named type every method of the
    /// pointee.
    pub fn method_set(&self, id: TypeId) -> Vec<&Method> {
        let Some(def) = self.get(id) else {
            return Vec::new();
        };
        match def.kind {
            TypeKind::Interface => def.methods.iter().collect(),
            TypeKind::Named => def
                .methods
                .iter()
                .filter(|m| !m.pointer_receiver)
                .collect(),
            TypeKind::Pointer => match def.elem.and_then(|elem| self.get(elem)) {
                Some(elem) if elem.kind == TypeKind::Named => elem.methods.iter().collect(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

/// The "produces a human-readable message" contract that marks a type as an
/// error: a single `Error()` method with no parameters and one string result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCapability {
    method: &'static str,
}

impl Default for ErrorCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorCapability {
    pub const METHOD: &'static str = "Error";

    pub fn new() -> Self {
        Self {
            method: Self::METHOD,
        }
    }

    /// True for a method named like the capability's method with the
    /// `func() string` signature.
    pub fn matches_method(&self, types: &TypeTable, method: &Method) -> bool {
        method.name == self.method
            && method.params.is_empty()
            && matches!(method.results.as_slice(), [result] if types.is_string(*result))
    }

    /// Whether values of type `ty` satisfy the capability.
    pub fn is_satisfied_by(&self, types: &TypeTable, ty: TypeId) -> bool {
        types
            .method_set(ty)
            .into_iter()
            .any(|method| self.matches_method(types, method))
    }
}
