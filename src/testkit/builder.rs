//! Fluent construction of front-end output for `fmt.Errorf` scenarios.
//!
//! The builder writes a small Go-looking source text as it goes, so every
//! node, instruction and diagnostic gets a real line and column.

use crate::ir::position::line_starts;
use crate::ir::{
    BasicBlock, BasicKind, CallCommon, CallExpr, CallInstr, CallTarget, ConstValue, Expr, ExprId,
    ExprKind, FuncRef, Function, Instruction, LitKind, Method, Package, Pos, Selection,
    SelectionKind, SourceFile, Span, TypeId, TypeInfo, TypeKind, TypeTable, Value,
};

/// One interpolation argument of a generated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// `name` of type `error`.
    Error(&'static str),
    /// `name` of type `*MyErr`, whose pointer receiver implements `Error() string`.
    CustomError(&'static str),
    /// `name.Error()` with `name` of type `error`.
    ErrorString(&'static str),
    /// `name.Error()` with `name` of type `MyErr`; the value type's method set
    /// lacks the pointer-receiver method.
    ValueErrorString(&'static str),
    /// `name.method()` returning string, with `name` of type `error`.
    MethodString(&'static str, &'static str),
    /// `func(name)` returning `error`, with `name` of type `error`.
    Wrapped(&'static str, &'static str),
    /// `(name.Error())` with `name` of type `error`.
    ParenErrorString(&'static str),
    /// `name` of type `string`.
    Str(&'static str),
    /// `name` of type `int`.
    Int(&'static str),
    /// `nil`.
    Nil,
}

#[derive(Debug, Clone, Copy)]
struct Universe {
    string: TypeId,
    untyped_string: TypeId,
    int: TypeId,
    untyped_nil: TypeId,
    error: TypeId,
    any_slice: TypeId,
    my_err: TypeId,
    my_err_ptr: TypeId,
}

impl Universe {
    fn install(types: &mut TypeTable, package: &str) -> Self {
        let string = types.insert("string", TypeKind::Basic(BasicKind::String));
        let untyped_string = types.insert("untyped string", TypeKind::Basic(BasicKind::UntypedString));
        let int = types.insert("int", TypeKind::Basic(BasicKind::Int));
        let untyped_nil = types.insert("untyped nil", TypeKind::Basic(BasicKind::UntypedNil));

        let error = types.insert("error", TypeKind::Interface);
        types.add_method(error, Method::new("Error", vec![], vec![string]));

        let any_slice = types.insert("[]any", TypeKind::Slice);

        let my_err = types.insert(format!("{package}.MyErr"), TypeKind::Named);
        let mut error_method = Method::new("Error", vec![], vec![string]);
        error_method.pointer_receiver = true;
        types.add_method(my_err, error_method);
        let my_err_ptr = types.insert_pointer(my_err);

        Self {
            string,
            untyped_string,
            int,
            untyped_nil,
            error,
            any_slice,
            my_err,
            my_err_ptr,
        }
    }
}

enum Template<'t> {
    Literal(&'t str),
    Variable(&'t str),
}

struct PendingFunction {
    name: String,
    pos: Pos,
    blocks: Vec<BasicBlock>,
}

/// Builds a [`Package`], one file at a time.
pub struct PackageBuilder {
    name: String,
    files: Vec<SourceFile>,
    file_name: String,
    base: u32,
    text: String,
    exprs: Vec<Expr>,
    types: TypeTable,
    type_info: TypeInfo,
    universe: Universe,
    functions: Vec<Function>,
    current: PendingFunction,
    next_expr: u32,
    next_register: u32,
}

impl PackageBuilder {
    pub fn new(name: &str) -> Self {
        let mut types = TypeTable::new();
        let universe = Universe::install(&mut types, name);
        let mut builder = Self {
            name: name.to_string(),
            files: Vec::new(),
            file_name: format!("{name}/{name}.go"),
            base: 1,
            text: format!("package {name}\n\n"),
            exprs: Vec::new(),
            types,
            type_info: TypeInfo::default(),
            universe,
            functions: Vec::new(),
            current: PendingFunction {
                name: String::new(),
                pos: Pos::NONE,
                blocks: Vec::new(),
            },
            next_expr: 1,
            next_register: 0,
        };
        builder.open_function("main");
        builder
    }

    /// Start a new source file of the same package, beginning with `func init()`.
    /// Its positions follow those of the previous file.
    pub fn file(mut self, file_name: &str) -> Self {
        self.close_function();
        self.finish_file();
        self.file_name = file_name.to_string();
        self.text = format!("package {}\n\n", self.name);
        self.open_function("init");
        self
    }

    /// Start a new function; following calls land in it.
    pub fn func(mut self, name: &str) -> Self {
        self.close_function();
        self.text.push('\n');
        self.open_function(name);
        self
    }

    /// Start a new basic block in the current function.
    pub fn block(mut self) -> Self {
        let index = self.current.blocks.len() as u32;
        self.current.blocks.push(BasicBlock {
            index,
            instructions: Vec::new(),
        });
        self
    }

    /// `fmt.Errorf("<template>", args...)`
    pub fn errorf<const N: usize>(self, template: &str, args: [Arg; N]) -> Self {
        self.call(
            FuncRef::new("fmt", "Errorf"),
            Template::Literal(template),
            &args,
            None,
        )
    }

    /// `fmt.Errorf("<template>", <slice>...)`
    pub fn errorf_spread(self, template: &str, slice: &str) -> Self {
        self.call(
            FuncRef::new("fmt", "Errorf"),
            Template::Literal(template),
            &[],
            Some(slice),
        )
    }

    /// `fmt.Errorf(<variable>, args...)`
    pub fn errorf_dynamic_template<const N: usize>(self, variable: &str, args: [Arg; N]) -> Self {
        self.call(
            FuncRef::new("fmt", "Errorf"),
            Template::Variable(variable),
            &args,
            None,
        )
    }

    /// `<pkg>.<name>("<template>", args...)` for any other function.
    pub fn call_to<const N: usize>(self, callee: FuncRef, template: &str, args: [Arg; N]) -> Self {
        self.call(callee, Template::Literal(template), &args, None)
    }

    /// `fmt.Errorf` reached through a function value; there is no static callee.
    pub fn errorf_via_value<const N: usize>(mut self, template: &str, args: [Arg; N]) -> Self {
        self = self.call(
            FuncRef::new("fmt", "Errorf"),
            Template::Literal(template),
            &args,
            None,
        );
        if let Some(Instruction::Call(call)) = self.last_instruction_mut() {
            call.common.target = CallTarget::Dynamic;
        }
        self
    }

    pub fn build(mut self) -> Package {
        self.close_function();
        self.finish_file();
        Package {
            path: self.name.clone(),
            name: self.name,
            files: self.files,
            functions: self.functions,
            types: self.types,
            type_info: self.type_info,
        }
    }

    fn finish_file(&mut self) {
        let size = self.text.len() as u32;
        let text = std::mem::take(&mut self.text);
        self.files.push(SourceFile {
            name: self.file_name.clone(),
            base: self.base,
            size,
            line_starts: line_starts(&text),
            exprs: std::mem::take(&mut self.exprs),
        });
        // the end position belongs to the file, so leave a gap
        self.base += size + 1;
    }

    fn open_function(&mut self, name: &str) {
        let pos = self.pos_here();
        self.text.push_str(&format!("func {name}() {{\n"));
        self.current = PendingFunction {
            name: name.to_string(),
            pos,
            blocks: vec![BasicBlock {
                index: 0,
                instructions: Vec::new(),
            }],
        };
    }

    fn close_function(&mut self) {
        let ret = Instruction::Other {
            op: "return".into(),
            pos: self.pos_here(),
        };
        self.text.push_str("}\n");
        let pending = std::mem::replace(
            &mut self.current,
            PendingFunction {
                name: String::new(),
                pos: Pos::NONE,
                blocks: Vec::new(),
            },
        );
        let mut blocks = pending.blocks;
        if let Some(last) = blocks.last_mut() {
            last.instructions.push(ret);
        }
        self.functions.push(Function {
            name: pending.name,
            pos: pending.pos,
            synthetic: false,
            blocks,
        });
    }

    fn last_instruction_mut(&mut self) -> Option<&mut Instruction> {
        self.current
            .blocks
            .last_mut()
            .and_then(|block| block.instructions.last_mut())
    }

    fn pos_here(&self) -> Pos {
        Pos(self.base + self.text.len() as u32)
    }

    fn expr_id(&mut self) -> ExprId {
        let id = ExprId(self.next_expr);
        self.next_expr += 1;
        id
    }

    fn register(&mut self, ty: TypeId) -> Value {
        let name = format!("t{}", self.next_register);
        self.next_register += 1;
        Value::Register { name, ty: Some(ty) }
    }

    fn typed(&mut self, expr: &Expr, ty: TypeId) {
        self.type_info.types.insert(expr.id, ty);
    }

    fn ident(&mut self, name: &str, ty: TypeId) -> Expr {
        let expr = self.untyped_ident(name);
        self.typed(&expr, ty);
        expr
    }

    /// Identifiers such as package names carry no type.
    fn untyped_ident(&mut self, name: &str) -> Expr {
        let start = self.pos_here();
        self.text.push_str(name);
        Expr {
            id: self.expr_id(),
            span: Span::new(start, self.pos_here()),
            kind: ExprKind::Ident { name: name.into() },
        }
    }

    fn string_lit(&mut self, value: &str) -> Expr {
        let start = self.pos_here();
        let quoted = format!("{value:?}");
        self.text.push_str(&quoted);
        let expr = Expr {
            id: self.expr_id(),
            span: Span::new(start, self.pos_here()),
            kind: ExprKind::BasicLit {
                kind: LitKind::String,
                value: quoted,
            },
        };
        self.typed(&expr, self.universe.untyped_string);
        expr
    }

    /// `<base>.<method>()` returning a string.
    fn method_call(&mut self, base: &str, base_ty: TypeId, method: Method) -> Expr {
        let start = self.pos_here();
        let base_expr = self.ident(base, base_ty);
        self.text.push('.');
        self.text.push_str(&method.name);
        let selector = Expr {
            id: self.expr_id(),
            span: Span::new(start, self.pos_here()),
            kind: ExprKind::Selector {
                base: Box::new(base_expr),
                sel: method.name.clone(),
            },
        };
        self.type_info.selections.insert(
            selector.id,
            Selection {
                kind: SelectionKind::MethodVal,
                recv: base_ty,
                method: Some(method),
            },
        );

        let lparen = self.pos_here();
        self.text.push('(');
        let rparen = self.pos_here();
        self.text.push(')');
        let call = Expr {
            id: self.expr_id(),
            span: Span::new(start, self.pos_here()),
            kind: ExprKind::Call(CallExpr {
                fun: Box::new(selector),
                lparen,
                args: Vec::new(),
                ellipsis: None,
                rparen,
            }),
        };
        self.typed(&call, self.universe.string);
        call
    }

    /// `<func>(<name>)` returning an error.
    fn wrapped(&mut self, func: &str, name: &str) -> Expr {
        let start = self.pos_here();
        let fun = self.untyped_ident(func);
        let lparen = self.pos_here();
        self.text.push('(');
        let error = self.universe.error;
        let arg = self.ident(name, error);
        let rparen = self.pos_here();
        self.text.push(')');
        let call = Expr {
            id: self.expr_id(),
            span: Span::new(start, self.pos_here()),
            kind: ExprKind::Call(CallExpr {
                fun: Box::new(fun),
                lparen,
                args: vec![arg],
                ellipsis: None,
                rparen,
            }),
        };
        self.typed(&call, error);
        call
    }

    fn arg(&mut self, arg: Arg) -> Expr {
        let u = self.universe;
        let error_method = |name: &str| Method::new(name, vec![], vec![u.string]);
        match arg {
            Arg::Error(name) => self.ident(name, u.error),
            Arg::CustomError(name) => self.ident(name, u.my_err_ptr),
            Arg::ErrorString(name) => self.method_call(name, u.error, error_method("Error")),
            Arg::ValueErrorString(name) => {
                let mut method = error_method("Error");
                method.pointer_receiver = true;
                self.method_call(name, u.my_err, method)
            }
            Arg::MethodString(name, method) => self.method_call(name, u.error, error_method(method)),
            Arg::Wrapped(func, name) => self.wrapped(func, name),
            Arg::ParenErrorString(name) => {
                let start = self.pos_here();
                self.text.push('(');
                let inner = self.method_call(name, u.error, error_method("Error"));
                self.text.push(')');
                let expr = Expr {
                    id: self.expr_id(),
                    span: Span::new(start, self.pos_here()),
                    kind: ExprKind::Paren(Box::new(inner)),
                };
                self.typed(&expr, u.string);
                expr
            }
            Arg::Str(name) => self.ident(name, u.string),
            Arg::Int(name) => self.ident(name, u.int),
            Arg::Nil => self.ident("nil", u.untyped_nil),
        }
    }

    fn call(
        mut self,
        callee: FuncRef,
        template: Template<'_>,
        args: &[Arg],
        spread: Option<&str>,
    ) -> Self {
        self.text.push('\t');
        let start = self.pos_here();
        let pkg = self.untyped_ident(&callee.package);
        self.text.push('.');
        self.text.push_str(&callee.name);
        let fun = Expr {
            id: self.expr_id(),
            span: Span::new(start, self.pos_here()),
            kind: ExprKind::Selector {
                base: Box::new(pkg),
                sel: callee.name.clone(),
            },
        };

        let lparen = self.pos_here();
        self.text.push('(');
        let (template_expr, template_value) = match template {
            Template::Literal(text) => (self.string_lit(text), Value::string_const(text)),
            Template::Variable(name) => {
                let string = self.universe.string;
                (self.ident(name, string), self.register(string))
            }
        };

        let mut syntax_args = vec![template_expr];
        for arg in args {
            self.text.push_str(", ");
            syntax_args.push(self.arg(*arg));
        }
        let ellipsis = spread.map(|slice| {
            self.text.push_str(", ");
            let any_slice = self.universe.any_slice;
            syntax_args.push(self.ident(slice, any_slice));
            let pos = self.pos_here();
            self.text.push_str("...");
            pos
        });

        let rparen = self.pos_here();
        self.text.push(')');
        let expr = Expr {
            id: self.expr_id(),
            span: Span::new(start, self.pos_here()),
            kind: ExprKind::Call(CallExpr {
                fun: Box::new(fun),
                lparen,
                args: syntax_args,
                ellipsis,
                rparen,
            }),
        };
        self.typed(&expr, self.universe.error);
        self.exprs.push(expr);
        self.text.push('\n');

        // Lowered form: the variadic tail is packed into a single slice (or a
        // nil slice when empty), so the instruction always has two arguments.
        let packed = if args.is_empty() && spread.is_none() {
            Value::Const {
                value: ConstValue::Nil,
                ty: Some(self.universe.any_slice),
            }
        } else {
            let any_slice = self.universe.any_slice;
            self.register(any_slice)
        };
        let instruction = Instruction::Call(CallInstr {
            pos: lparen,
            common: CallCommon {
                target: CallTarget::Static(callee),
                args: vec![template_value, packed],
            },
        });
        if let Some(block) = self.current.blocks.last_mut() {
            block.instructions.push(instruction);
        }
        self
    }
}
