use crate::{DescriptionError, InterfaceShape, ServiceDescription};
use dashmap::DashMap;
use std::sync::Arc;

/// Get-or-create store of service descriptions, keyed by interface identity.
///
/// Concurrent first requests for the same interface may each build a
/// description, but only the first one inserted is kept and every caller
/// receives that instance.
#[derive(Debug, Default)]
pub struct DescriptionCache {
    descriptions: DashMap<Arc<str>, Arc<ServiceDescription>>,
}

impl DescriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &self,
        shape: &InterfaceShape,
    ) -> Result<Arc<ServiceDescription>, DescriptionError> {
        if let Some(existing) = self.descriptions.get(shape.id.as_str()) {
            return Ok(existing.clone());
        }

        let built = Arc::new(ServiceDescription::build(shape)?);

        Ok(self
            .descriptions
            .entry(built.interface_id().clone())
            .or_insert(built)
            .clone())
    }

    pub fn get(&self, interface_id: &str) -> Option<Arc<ServiceDescription>> {
        self.descriptions
            .get(interface_id)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}
