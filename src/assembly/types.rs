//! Type definitions, references and custom attributes.
//!
//! Types live in a flat arena on [`crate::assembly::Assembly`] and are
//! addressed by [`TypeId`]. Every edge between types (base class,
//! interfaces, member signatures, attribute types) is a [`TypeRef`]
//! resolved by name through the type index, never an owning pointer, so
//! reference cycles are harmless and removal never chases live
//! references.

use bitflags::bitflags;

use crate::assembly::method::Method;

/// Full name of the module pseudo-type present in every assembly.
pub const MODULE_TYPE_NAME: &str = "<Module>";

/// Name prefix of the compiler-synthesized constants container.
/// Compilers may append a generation suffix, so this is a prefix match.
pub const PRIVATE_IMPL_DETAILS_PREFIX: &str = "<PrivateImplementationDetails>";

/// Full name of the compiler-generated marker attribute.
pub const COMPILER_GENERATED_ATTRIBUTE: &str =
    "System.Runtime.CompilerServices.CompilerGeneratedAttribute";

bitflags! {
    /// Type-level metadata flags. Values follow the ECMA-335 layout.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TypeAttributes: u32 {
        /// Externally visible top-level type.
        const PUBLIC = 0x0000_0001;
        /// Externally visible nested type.
        const NESTED_PUBLIC = 0x0000_0002;
        /// Interface semantics.
        const INTERFACE = 0x0000_0020;
        const ABSTRACT = 0x0000_0080;
        const SEALED = 0x0000_0100;
    }
}

/// Stable identity of a type in the assembly arena.
///
/// Ids are never reused; removing a type from the live tables leaves its
/// arena slot orphaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structural role of a type, assigned once when the type enters the
/// arena. Replaces repeated reserved-name string comparisons in the
/// passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeTag {
    /// Ordinary user-declared type.
    #[default]
    Regular,
    /// The `<Module>` pseudo-type. Never a removal candidate.
    ModuleType,
    /// The compiler-synthesized constants container. Never a removal
    /// candidate.
    PrivateImplDetails,
    /// Carries the compiler-generated marker attribute. Excluded from
    /// unused classification and visibility downgrade.
    CompilerGenerated,
}

/// A reference to a type, resolvable through the type index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A type expected in the current assembly, by full name.
    /// Nested names use the `Outer/Inner` form.
    Named(String),
    /// A type owned by another assembly. Marks the referenced assembly
    /// used at whole-module granularity; external bodies are not walked.
    External { assembly: String, name: String },
    /// A generic instantiation. Arguments are walked one by one before
    /// the definition is resolved.
    Generic {
        definition: Box<TypeRef>,
        args: Vec<TypeRef>,
    },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn external(assembly: impl Into<String>, name: impl Into<String>) -> Self {
        Self::External {
            assembly: assembly.into(),
            name: name.into(),
        }
    }

    pub fn generic(definition: TypeRef, args: Vec<TypeRef>) -> Self {
        Self::Generic {
            definition: Box::new(definition),
            args,
        }
    }

    /// The referenced type's full name, regardless of where it lives.
    /// For generic instantiations, the definition's name.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::External { name, .. } => name,
            Self::Generic { definition, .. } => definition.type_name(),
        }
    }

    /// The namespace portion of the referenced type's name.
    pub fn namespace(&self) -> &str {
        namespace_of(self.type_name())
    }
}

/// Extract the namespace portion of a full type name.
///
/// Nested qualifiers (`Outer/Inner`) belong to the type, not the
/// namespace, so only the segment before the first `/` is considered.
pub fn namespace_of(full_name: &str) -> &str {
    let top = full_name.split('/').next().unwrap_or(full_name);
    match top.rfind('.') {
        Some(pos) => &top[..pos],
        None => "",
    }
}

/// A custom attribute attached to a type, member or generic parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttribute {
    pub attribute_type: TypeRef,
    /// Constructor arguments. Type arguments (`typeof(..)`) participate
    /// in reachability; everything else is opaque.
    pub ctor_args: Vec<AttributeArg>,
}

impl CustomAttribute {
    pub fn new(attribute_type: TypeRef) -> Self {
        Self {
            attribute_type,
            ctor_args: Vec::new(),
        }
    }

    pub fn with_type_arg(mut self, arg: TypeRef) -> Self {
        self.ctor_args.push(AttributeArg::Type(arg));
        self
    }

    pub fn with_value_arg(mut self, arg: impl Into<String>) -> Self {
        self.ctor_args.push(AttributeArg::Value(arg.into()));
        self
    }
}

/// A single custom attribute constructor argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeArg {
    /// A `typeof(..)`-style type reference argument.
    Type(TypeRef),
    /// Any non-type constant, kept as its display form.
    Value(String),
}

/// A field declaration.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: TypeRef,
    pub custom_attributes: Vec<CustomAttribute>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            field_type,
            custom_attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }
}

/// A property declaration.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub property_type: TypeRef,
    pub custom_attributes: Vec<CustomAttribute>,
}

impl Property {
    pub fn new(name: impl Into<String>, property_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            property_type,
            custom_attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }
}

/// A generic parameter declaration on a type.
#[derive(Debug, Clone)]
pub struct GenericParam {
    pub name: String,
    pub custom_attributes: Vec<CustomAttribute>,
}

impl GenericParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            custom_attributes: Vec::new(),
        }
    }
}

/// One declared type.
///
/// Ownership is strictly tree-shaped: the assembly's top-level table
/// owns roots, `nested` ids form the containment forest. Everything
/// else is a [`TypeRef`].
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Namespace-qualified full name, unique within the assembly.
    pub name: String,
    pub attributes: TypeAttributes,
    pub tag: TypeTag,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub generic_params: Vec<GenericParam>,
    pub fields: Vec<Field>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub custom_attributes: Vec<CustomAttribute>,
    /// Nested type forward-list, pruned on removal.
    pub nested: Vec<TypeId>,
    /// Containment back-reference for nested types.
    pub enclosing: Option<TypeId>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: TypeAttributes::empty(),
            tag: TypeTag::Regular,
            base: None,
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            custom_attributes: Vec::new(),
            nested: Vec::new(),
            enclosing: None,
        }
    }

    pub fn public(mut self) -> Self {
        self.attributes |= TypeAttributes::PUBLIC;
        self
    }

    pub fn interface(mut self) -> Self {
        self.attributes |= TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_interface(mut self, iface: TypeRef) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn with_generic_param(mut self, param: GenericParam) -> Self {
        self.generic_params.push(param);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    pub fn is_nested(&self) -> bool {
        self.enclosing.is_some()
    }

    pub fn namespace(&self) -> &str {
        namespace_of(&self.name)
    }

    pub fn is_public(&self) -> bool {
        self.attributes.contains(TypeAttributes::PUBLIC)
    }

    /// Compute the structural tag for this definition. Called once by
    /// the arena when the type is added.
    pub(crate) fn compute_tag(&self) -> TypeTag {
        if self.name == MODULE_TYPE_NAME {
            TypeTag::ModuleType
        } else if self.name.starts_with(PRIVATE_IMPL_DETAILS_PREFIX) {
            TypeTag::PrivateImplDetails
        } else if self
            .custom_attributes
            .iter()
            .any(|a| a.attribute_type.type_name() == COMPILER_GENERATED_ATTRIBUTE)
        {
            TypeTag::CompilerGenerated
        } else {
            TypeTag::Regular
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_of() {
        assert_eq!(namespace_of("Acme.Widgets.Button"), "Acme.Widgets");
        assert_eq!(namespace_of("Acme.Outer/Inner"), "Acme");
        assert_eq!(namespace_of("NoNamespace"), "");
        assert_eq!(namespace_of("<Module>"), "");
    }

    #[test]
    fn test_type_ref_names() {
        let generic = TypeRef::generic(
            TypeRef::external("mscorlib", "System.Collections.Generic.List`1"),
            vec![TypeRef::named("Acme.Item")],
        );
        assert_eq!(generic.type_name(), "System.Collections.Generic.List`1");
        assert_eq!(generic.namespace(), "System.Collections.Generic");
    }

    #[test]
    fn test_compute_tag() {
        assert_eq!(
            TypeDef::new(MODULE_TYPE_NAME).compute_tag(),
            TypeTag::ModuleType
        );
        assert_eq!(
            TypeDef::new("<PrivateImplementationDetails>{A1B2}").compute_tag(),
            TypeTag::PrivateImplDetails
        );
        let generated = TypeDef::new("Acme.Closure").with_attribute(CustomAttribute::new(
            TypeRef::external("mscorlib", COMPILER_GENERATED_ATTRIBUTE),
        ));
        assert_eq!(generated.compute_tag(), TypeTag::CompilerGenerated);
        assert_eq!(TypeDef::new("Acme.Plain").compute_tag(), TypeTag::Regular);
    }

    #[test]
    fn test_visibility_bit() {
        let def = TypeDef::new("Acme.Widget").public();
        assert!(def.is_public());
        assert!(!def.attributes.contains(TypeAttributes::NESTED_PUBLIC));
    }
}
