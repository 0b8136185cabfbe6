use crate::ServiceDescription;
use callweave::types::{MemberInfo, MemberRegistry};

/// Registers every method and sub-service property reachable from
/// `description` so that identity-based codecs can resolve them.
pub fn register_service(registry: &mut MemberRegistry, description: &ServiceDescription) {
    let interface = description.interface_id().as_ref();

    for method in description.methods() {
        registry.register(MemberInfo::method(
            interface,
            method.name(),
            method
                .parameters()
                .iter()
                .map(|param| param.type_ref.clone())
                .collect(),
            method.generic_arity() as u16,
        ));
    }

    for subservice in description.subservices() {
        registry.register(MemberInfo::property(interface, subservice.name()));
        register_service(registry, subservice.description());
    }

    tracing::debug!(interface, members = registry.len(), "registered service surface");
}
