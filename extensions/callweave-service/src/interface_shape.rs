use callweave::types::TypeRef;
use std::sync::Arc;

/// How a parameter travels between caller and callee.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PassingMode {
    /// Sent to the callee only.
    Val,
    /// Sent to the callee and sent back after the call.
    Ref,
    /// Produced by the callee and sent back.
    Out,
}

impl PassingMode {
    pub fn is_request(self) -> bool {
        matches!(self, PassingMode::Val | PassingMode::Ref)
    }

    pub fn is_response(self) -> bool {
        matches!(self, PassingMode::Ref | PassingMode::Out)
    }
}

/// The declared shape of a service interface, as handed to
/// [`ServiceDescription::build`](crate::ServiceDescription::build).
///
/// ```rust,no_run
/// use callweave::types::TypeRef;
/// use callweave_service::{InterfaceShape, MethodShape, ParamShape};
///
/// let shape = InterfaceShape::new("Demo.IMyService").method(
///     MethodShape::new("Add", TypeRef::I32)
///         .param(ParamShape::val("a", TypeRef::I32))
///         .param(ParamShape::val("b", TypeRef::I32)),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct InterfaceShape {
    pub id: String,
    pub methods: Vec<MethodShape>,
    pub properties: Vec<PropertyShape>,
}

impl InterfaceShape {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodShape) -> Self {
        self.methods.push(method);
        self
    }

    pub fn property(mut self, property: PropertyShape) -> Self {
        self.properties.push(property);
        self
    }

    /// Shorthand for a read-only property whose type is another service.
    pub fn subservice(self, name: impl Into<String>, shape: Arc<InterfaceShape>) -> Self {
        self.property(PropertyShape::service(name, shape))
    }
}

#[derive(Debug, Clone)]
pub struct MethodShape {
    pub name: String,
    /// Declared return type. `Pending(T)` selects an async remoting style.
    pub return_type: TypeRef,
    pub generic_parameters: Vec<String>,
    pub parameters: Vec<ParamShape>,
}

impl MethodShape {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            return_type,
            generic_parameters: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Declares the next generic parameter; it is referenced as
    /// `TypeRef::Generic(position)`.
    pub fn generic(mut self, name: impl Into<String>) -> Self {
        self.generic_parameters.push(name.into());
        self
    }

    pub fn param(mut self, param: ParamShape) -> Self {
        self.parameters.push(param);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ParamShape {
    pub name: String,
    pub type_ref: TypeRef,
    pub mode: PassingMode,
}

impl ParamShape {
    pub fn new(name: impl Into<String>, type_ref: TypeRef, mode: PassingMode) -> Self {
        Self {
            name: name.into(),
            type_ref,
            mode,
        }
    }

    pub fn val(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self::new(name, type_ref, PassingMode::Val)
    }

    pub fn by_ref(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self::new(name, type_ref, PassingMode::Ref)
    }

    pub fn out(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self::new(name, type_ref, PassingMode::Out)
    }
}

#[derive(Debug, Clone)]
pub enum PropertyType {
    /// The property exposes a nested service.
    Service(Arc<InterfaceShape>),
    /// The property exposes a plain value, remoted as a getter method.
    Value(TypeRef),
}

#[derive(Debug, Clone)]
pub struct PropertyShape {
    pub name: String,
    pub property_type: PropertyType,
    pub has_setter: bool,
}

impl PropertyShape {
    pub fn service(name: impl Into<String>, shape: Arc<InterfaceShape>) -> Self {
        Self {
            name: name.into(),
            property_type: PropertyType::Service(shape),
            has_setter: false,
        }
    }

    pub fn value(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            property_type: PropertyType::Value(type_ref),
            has_setter: false,
        }
    }

    pub fn with_setter(mut self) -> Self {
        self.has_setter = true;
        self
    }
}
