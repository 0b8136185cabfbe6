use crate::{
    DescriptionError, InterfaceShape, MethodShape, PROPERTY_GETTER_PREFIX, PassingMode,
    PropertyType, RoutingError, ServicePath,
};
use callweave::types::TypeRef;
use std::collections::HashSet;
use std::sync::Arc;

/// How a method's result travels back to the caller.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RemotingStyle {
    /// Blocking call and return.
    Direct,
    /// A pending operation with no value.
    AsyncVoid,
    /// A pending operation yielding the decoded return value.
    AsyncWithRetval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameterDescription {
    pub name: String,
    pub type_ref: TypeRef,
    pub mode: PassingMode,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescription {
    name: String,
    return_type: TypeRef,
    parameters: Vec<MethodParameterDescription>,
    generic_parameters: Vec<String>,
    remoting: RemotingStyle,
}

impl MethodDescription {
    fn build(interface: &str, shape: &MethodShape) -> Result<Self, DescriptionError> {
        let qualified = format!("{interface}.{}", shape.name);

        ensure_identifier("method", &shape.name)?;
        for generic in &shape.generic_parameters {
            ensure_identifier("generic parameter", generic)?;
        }
        for param in &shape.parameters {
            ensure_identifier("parameter", &param.name)?;
        }
        ensure_unique(
            &qualified,
            "generic parameter",
            shape.generic_parameters.iter().map(String::as_str),
        )?;
        ensure_unique(
            &qualified,
            "parameter",
            shape.parameters.iter().map(|param| param.name.as_str()),
        )?;

        let (remoting, return_type) = match &shape.return_type {
            TypeRef::Pending(inner) if **inner == TypeRef::Unit => {
                (RemotingStyle::AsyncVoid, TypeRef::Unit)
            }
            TypeRef::Pending(inner) => (RemotingStyle::AsyncWithRetval, (**inner).clone()),
            other => (RemotingStyle::Direct, other.clone()),
        };

        let declared = shape.generic_parameters.len();
        for type_ref in shape
            .parameters
            .iter()
            .map(|param| &param.type_ref)
            .chain([&return_type])
        {
            if contains_pending(type_ref) {
                return Err(DescriptionError::MisplacedPending { method: qualified });
            }

            if let Some(index) = type_ref.max_generic_index() {
                if index as usize >= declared {
                    return Err(DescriptionError::UnknownGenericParameter {
                        method: qualified,
                        index,
                        declared,
                    });
                }
            }
        }

        if remoting != RemotingStyle::Direct {
            if let Some(param) = shape.parameters.iter().find(|p| p.mode.is_response()) {
                return Err(DescriptionError::ByRefOnAsync {
                    method: qualified,
                    parameter: param.name.clone(),
                });
            }
        }

        let parameters = shape
            .parameters
            .iter()
            .enumerate()
            .map(|(position, param)| MethodParameterDescription {
                name: param.name.clone(),
                type_ref: param.type_ref.clone(),
                mode: param.mode,
                position,
            })
            .collect();

        Ok(Self {
            name: shape.name.clone(),
            return_type,
            parameters,
            generic_parameters: shape.generic_parameters.clone(),
            remoting,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value type of the result. For async methods this is the type the
    /// pending operation yields; `Unit` means no value.
    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    pub fn parameters(&self) -> &[MethodParameterDescription] {
        &self.parameters
    }

    pub fn generic_parameters(&self) -> &[String] {
        &self.generic_parameters
    }

    pub fn generic_arity(&self) -> usize {
        self.generic_parameters.len()
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    pub fn remoting(&self) -> RemotingStyle {
        self.remoting
    }

    pub fn returns_value(&self) -> bool {
        self.return_type != TypeRef::Unit
    }

    /// Val and Ref parameters, in declaration order.
    pub fn request_parameters(&self) -> impl Iterator<Item = &MethodParameterDescription> {
        self.parameters.iter().filter(|param| param.mode.is_request())
    }

    /// Ref and Out parameters, in declaration order.
    pub fn response_parameters(&self) -> impl Iterator<Item = &MethodParameterDescription> {
        self.parameters.iter().filter(|param| param.mode.is_response())
    }

    /// Whether a Direct call carries anything back.
    pub fn has_response(&self) -> bool {
        self.returns_value() || self.response_parameters().next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubserviceDescription {
    name: String,
    description: Arc<ServiceDescription>,
}

impl SubserviceDescription {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &Arc<ServiceDescription> {
        &self.description
    }
}

/// Validated, immutable model of a service interface.
///
/// Built once per interface (see [`DescriptionCache`](crate::DescriptionCache))
/// and shared by the client compiler and the server dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    interface_id: Arc<str>,
    name: String,
    methods: Vec<Arc<MethodDescription>>,
    subservices: Vec<SubserviceDescription>,
}

impl ServiceDescription {
    /// Builds and validates the description of `shape`, recursing into every
    /// read-only property whose type is itself a service. Read-only value
    /// properties become `get_<Name>` methods.
    ///
    /// This is a pure function of the shape; it does not cache.
    pub fn build(shape: &InterfaceShape) -> Result<Self, DescriptionError> {
        let description = Self::build_nested(shape, &mut Vec::new())?;

        tracing::debug!(
            interface = %description.interface_id,
            methods = description.methods.len(),
            subservices = description.subservices.len(),
            "built service description"
        );

        Ok(description)
    }

    fn build_nested(
        shape: &InterfaceShape,
        ancestors: &mut Vec<String>,
    ) -> Result<Self, DescriptionError> {
        if ancestors.contains(&shape.id) {
            return Err(DescriptionError::RecursiveSubservice {
                interface: shape.id.clone(),
            });
        }

        let name = service_name(&shape.id);
        ensure_identifier("service", &name)?;

        let mut methods = shape
            .methods
            .iter()
            .map(|method| MethodDescription::build(&shape.id, method))
            .collect::<Result<Vec<_>, _>>()?;

        ancestors.push(shape.id.clone());

        let mut subservices = Vec::new();
        for property in &shape.properties {
            if property.has_setter {
                return Err(DescriptionError::PropertySetter {
                    interface: shape.id.clone(),
                    property: property.name.clone(),
                });
            }

            ensure_identifier("property", &property.name)?;

            match &property.property_type {
                PropertyType::Service(nested) => subservices.push(SubserviceDescription {
                    name: property.name.clone(),
                    description: Arc::new(Self::build_nested(nested, ancestors)?),
                }),
                PropertyType::Value(type_ref) => {
                    let getter = MethodShape::new(
                        format!("{PROPERTY_GETTER_PREFIX}{}", property.name),
                        type_ref.clone(),
                    );
                    methods.push(MethodDescription::build(&shape.id, &getter)?);
                }
            }
        }

        ancestors.pop();

        ensure_unique(&shape.id, "method", methods.iter().map(|m| m.name.as_str()))?;
        ensure_unique(
            &shape.id,
            "sub-service",
            subservices.iter().map(|s| s.name.as_str()),
        )?;

        Ok(Self {
            interface_id: Arc::from(shape.id.as_str()),
            name,
            methods: methods.into_iter().map(Arc::new).collect(),
            subservices,
        })
    }

    pub fn interface_id(&self) -> &Arc<str> {
        &self.interface_id
    }

    /// The service name, used as the root segment of every path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[Arc<MethodDescription>] {
        &self.methods
    }

    pub fn subservices(&self) -> &[SubserviceDescription] {
        &self.subservices
    }

    pub fn method(&self, name: &str) -> Option<&Arc<MethodDescription>> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn subservice(&self, name: &str) -> Option<&SubserviceDescription> {
        self.subservices.iter().find(|sub| sub.name == name)
    }

    /// Resolves `path` to the leaf service and its method.
    ///
    /// Segments are matched case-sensitively, left to right. Any miss is a
    /// `RoutingError::InvalidPath`.
    pub fn resolve(
        &self,
        path: &ServicePath,
    ) -> Result<(&ServiceDescription, &Arc<MethodDescription>), RoutingError> {
        let invalid = |kind: &'static str, segment: &str| RoutingError::InvalidPath {
            path: path.format(),
            kind,
            segment: segment.to_owned(),
        };

        if path.root() != self.name {
            return Err(invalid("service", path.root()));
        }

        let mut current = self;
        for segment in path.subservices() {
            current = current
                .subservice(segment)
                .ok_or_else(|| invalid("sub-service", segment))?
                .description();
        }

        let method = current
            .method(path.method())
            .ok_or_else(|| invalid("method", path.method()))?;

        Ok((current, method))
    }
}

/// Derives the service name from an interface identity: the last `.`
/// segment, without a leading `I` when it is followed by an uppercase
/// letter (`Demo.IMyService` becomes `MyService`).
pub fn service_name(interface_id: &str) -> String {
    let simple = interface_id.rsplit('.').next().unwrap_or(interface_id);

    let mut chars = simple.chars();
    match (chars.next(), chars.next()) {
        (Some('I'), Some(second)) if second.is_ascii_uppercase() => simple[1..].to_owned(),
        _ => simple.to_owned(),
    }
}

/// `[_a-zA-Z]\w*`, ASCII only.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

fn ensure_identifier(kind: &'static str, name: &str) -> Result<(), DescriptionError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(DescriptionError::InvalidIdentifier {
            kind,
            name: name.to_owned(),
        })
    }
}

fn ensure_unique<'n>(
    interface: &str,
    kind: &'static str,
    names: impl Iterator<Item = &'n str>,
) -> Result<(), DescriptionError> {
    let mut seen = HashSet::new();

    for name in names {
        if !seen.insert(name) {
            return Err(DescriptionError::DuplicateName {
                interface: interface.to_owned(),
                kind,
                name: name.to_owned(),
            });
        }
    }

    Ok(())
}

fn contains_pending(type_ref: &TypeRef) -> bool {
    match type_ref {
        TypeRef::Pending(_) => true,
        TypeRef::Array(inner) | TypeRef::Nullable(inner) => contains_pending(inner),
        _ => false,
    }
}
