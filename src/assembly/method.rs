//! Methods, instruction streams and member references.

use crate::assembly::types::{CustomAttribute, TypeRef};

/// A method declaration with its signature and body.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<TypeRef>,
    pub return_type: TypeRef,
    /// Local variable types declared by the body.
    pub locals: Vec<TypeRef>,
    /// Native module this method is bound to, for platform-invoke
    /// methods.
    pub pinvoke_module: Option<String>,
    pub custom_attributes: Vec<CustomAttribute>,
    pub body: Vec<Instruction>,
}

impl Method {
    /// Create a method with a `void` return type and no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: TypeRef::external("mscorlib", "System.Void"),
            locals: Vec::new(),
            pinvoke_module: None,
            custom_attributes: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: TypeRef) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, return_type: TypeRef) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn with_local(mut self, local: TypeRef) -> Self {
        self.locals.push(local);
        self
    }

    pub fn with_pinvoke(mut self, module: impl Into<String>) -> Self {
        self.pinvoke_module = Some(module.into());
        self
    }

    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.body.push(instruction);
        self
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

/// One instruction of a method body. Only the operand participates in
/// reachability; the opcode is carried for diagnostics.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub opcode: &'static str,
    pub operand: Operand,
}

impl Instruction {
    pub fn new(opcode: &'static str, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// An instruction without a metadata operand (arithmetic, branches,
    /// loads of constants).
    pub fn plain(opcode: &'static str) -> Self {
        Self {
            opcode,
            operand: Operand::None,
        }
    }

    pub fn call(target: MethodRef) -> Self {
        Self::new("call", Operand::Method(target))
    }

    pub fn newobj(target: MethodRef) -> Self {
        Self::new("newobj", Operand::Method(target))
    }

    pub fn ldtoken(target: TypeRef) -> Self {
        Self::new("ldtoken", Operand::Type(target))
    }

    pub fn ldfld(target: FieldRef) -> Self {
        Self::new("ldfld", Operand::Field(target))
    }
}

/// Metadata operand of an instruction, resolvable through the type
/// index.
#[derive(Debug, Clone, Default)]
pub enum Operand {
    #[default]
    None,
    Type(TypeRef),
    Method(MethodRef),
    Field(FieldRef),
}

/// A reference to a method, carrying everything reachability needs from
/// its signature.
#[derive(Debug, Clone)]
pub struct MethodRef {
    pub name: String,
    pub declaring_type: TypeRef,
    pub return_type: TypeRef,
    pub parameters: Vec<TypeRef>,
    /// Type arguments of a generic method instantiation.
    pub generic_args: Vec<TypeRef>,
}

impl MethodRef {
    pub fn new(name: impl Into<String>, declaring_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            return_type: TypeRef::external("mscorlib", "System.Void"),
            parameters: Vec::new(),
            generic_args: Vec::new(),
        }
    }

    pub fn ctor(declaring_type: TypeRef) -> Self {
        Self::new(".ctor", declaring_type)
    }

    pub fn with_return_type(mut self, return_type: TypeRef) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn with_parameter(mut self, parameter: TypeRef) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_generic_arg(mut self, arg: TypeRef) -> Self {
        self.generic_args.push(arg);
        self
    }
}

/// A reference to a field.
#[derive(Debug, Clone)]
pub struct FieldRef {
    pub name: String,
    pub declaring_type: TypeRef,
    pub field_type: TypeRef,
}

impl FieldRef {
    pub fn new(name: impl Into<String>, declaring_type: TypeRef, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            field_type,
        }
    }
}
