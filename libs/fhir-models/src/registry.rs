//! Per-document creation registry
//!
//! The registry is the single authoritative store for every resource created
//! while converting one document. It is append-only: resources keep their
//! creation order and their identity for the lifetime of the registry, and
//! references are resolved against it by identity.

use crate::error::{Error, Result};
use crate::resource::{Ref, Resource, ResourceId, ResourceKind, ResourceType};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CreationRegistry {
    resources: Vec<Resource>,
    index: HashMap<ResourceId, usize>,
}

impl CreationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resource under a fresh identity and append it
    pub fn create<T: ResourceType>(&mut self, value: T) -> Ref<T> {
        self.create_with_extensions(value, Map::new())
    }

    /// Create a resource carrying kind-specific attributes
    pub fn create_with_extensions<T: ResourceType>(
        &mut self,
        value: T,
        extensions: Map<String, Value>,
    ) -> Ref<T> {
        let id = ResourceId::new_random();
        self.push(Resource::new(id, value.into_body()).with_extensions(extensions));
        Ref::new(id)
    }

    /// Append a resource built elsewhere
    ///
    /// Identities are never reused, so re-registering one is rejected.
    pub fn register(&mut self, resource: Resource) -> Result<ResourceId> {
        let id = resource.id();
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateResource(id));
        }
        self.push(resource);
        Ok(id)
    }

    fn push(&mut self, resource: Resource) {
        self.index.insert(resource.id(), self.resources.len());
        self.resources.push(resource);
    }

    pub fn get(&self, id: ResourceId) -> Result<&Resource> {
        self.index
            .get(&id)
            .map(|&slot| &self.resources[slot])
            .ok_or(Error::DanglingReference(id))
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Result<&mut Resource> {
        match self.index.get(&id) {
            Some(&slot) => Ok(&mut self.resources[slot]),
            None => Err(Error::DanglingReference(id)),
        }
    }

    /// Resolve a typed reference to its payload
    pub fn resolve<T: ResourceType>(&self, reference: Ref<T>) -> Result<&T> {
        let resource = self.get(reference.id())?;
        T::from_body(resource.body()).ok_or(Error::KindMismatch {
            id: reference.id(),
            expected: T::KIND,
            found: resource.kind(),
        })
    }

    pub fn resolve_mut<T: ResourceType>(&mut self, reference: Ref<T>) -> Result<&mut T> {
        let resource = self.get_mut(reference.id())?;
        let found = resource.kind();
        T::from_body_mut(resource.body_mut()).ok_or(Error::KindMismatch {
            id: reference.id(),
            expected: T::KIND,
            found,
        })
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.index.contains_key(&id)
    }

    /// All resources in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Resources of any of the given kinds, in creation order
    pub fn of_kinds<'a>(
        &'a self,
        kinds: &'a [ResourceKind],
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .iter()
            .filter(move |resource| kinds.contains(&resource.kind()))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
