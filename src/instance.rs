//! Instance registry: maps opaque [`InstanceId`]s to live native objects.
//!
//! The remote caller never holds native objects directly. It refers to them by an
//! integer identifier, and every host API call resolves that identifier through the
//! [`InstanceManager`]. Identifiers below [`MIN_HOST_CREATED_IDENTIFIER`] are chosen by
//! the caller; identifiers at or above it are handed out by the host.
//!
//! The registry only supports point operations keyed by identifier. It is internally
//! synchronized and can be shared behind an `Arc` between the bridge and whoever owns
//! instance lifetimes.
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::InstanceError;

/// First identifier reserved for host-created instances.
pub const MIN_HOST_CREATED_IDENTIFIER: i64 = 65536;

/// Identifier of an instance shared with the remote caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(i64);

impl InstanceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// True when the identifier lies in the range the caller is allowed to assign.
    pub fn is_caller_assignable(&self) -> bool {
        (0..MIN_HOST_CREATED_IDENTIFIER).contains(&self.0)
    }
}

impl From<i64> for InstanceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

type InstanceHandle = Arc<dyn Any + Send + Sync>;

/// Registry of native objects shared with the remote caller.
pub struct InstanceManager {
    instances: RwLock<HashMap<InstanceId, InstanceHandle>>,
    next_host_id: AtomicI64,
}

impl Default for InstanceManager {
    fn default() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            next_host_id: AtomicI64::new(MIN_HOST_CREATED_IDENTIFIER),
        }
    }
}

impl InstanceManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers an instance created on behalf of the caller under `id`.
    ///
    /// Fails when `id` is already taken or lies outside the caller-assignable range.
    pub fn add_dart_created_instance<T>(&self, instance: T, id: InstanceId) -> Result<(), InstanceError>
    where
        T: Any + Send + Sync,
    {
        if !id.is_caller_assignable() {
            warn!("InstanceManager: rejected caller-created identifier {}", id);
            return Err(InstanceError::InvalidIdentifier(id));
        }

        let mut instances = self.instances.write();
        if instances.contains_key(&id) {
            warn!("InstanceManager: identifier {} is already registered", id);
            return Err(InstanceError::AlreadyRegistered(id));
        }

        instances.insert(id, Arc::new(instance));
        debug!("InstanceManager: registered {} as {}", type_name::<T>(), id);
        Ok(())
    }

    /// Registers an instance created by the host and returns its new identifier.
    pub fn add_host_created_instance<T>(&self, instance: T) -> InstanceId
    where
        T: Any + Send + Sync,
    {
        let id = InstanceId(self.next_host_id.fetch_add(1, Ordering::Relaxed));
        self.instances.write().insert(id, Arc::new(instance));
        debug!("InstanceManager: registered host-created {} as {}", type_name::<T>(), id);
        id
    }

    /// Returns a clone of the instance registered under `id`.
    ///
    /// Registered objects are expected to be cheap handles (`Arc<...>`), so cloning
    /// hands out another reference to the same native object.
    pub fn get_instance<T>(&self, id: InstanceId) -> Result<T, InstanceError>
    where
        T: Any + Clone,
    {
        let instances = self.instances.read();
        let instance = instances.get(&id).ok_or(InstanceError::NotFound(id))?;

        instance
            .downcast_ref::<T>()
            .cloned()
            .ok_or(InstanceError::TypeMismatch {
                id,
                expected: type_name::<T>(),
            })
    }

    /// Removes the instance registered under `id` and returns it if it was a `T`.
    pub fn remove<T>(&self, id: InstanceId) -> Option<T>
    where
        T: Any + Clone,
    {
        let removed = self.instances.write().remove(&id)?;
        debug!("InstanceManager: removed {}", id);
        removed.downcast_ref::<T>().cloned()
    }

    pub fn contains_instance(&self, id: InstanceId) -> bool {
        self.instances.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    /// Drops every registered instance.
    pub fn clear(&self) {
        self.instances.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_instance_can_be_retrieved() {
        let manager = InstanceManager::new();
        let id = InstanceId::from(1);

        manager.add_dart_created_instance(Arc::new(42u32), id).unwrap();

        let value: Arc<u32> = manager.get_instance(id).unwrap();
        assert_eq!(*value, 42);
        assert!(manager.contains_instance(id));
    }

    #[test]
    fn retrieved_instances_share_the_same_object() {
        let manager = InstanceManager::new();
        let id = InstanceId::from(5);
        let original = Arc::new(String::from("native"));

        manager.add_dart_created_instance(original.clone(), id).unwrap();

        let a: Arc<String> = manager.get_instance(id).unwrap();
        let b: Arc<String> = manager.get_instance(id).unwrap();
        assert!(Arc::ptr_eq(&a, &original));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let manager = InstanceManager::new();
        let id = InstanceId::from(1);

        manager.add_dart_created_instance(Arc::new(1u8), id).unwrap();
        let err = manager.add_dart_created_instance(Arc::new(2u8), id).unwrap_err();

        assert_eq!(err, InstanceError::AlreadyRegistered(id));
        let value: Arc<u8> = manager.get_instance(id).unwrap();
        assert_eq!(*value, 1);
    }

    #[test]
    fn caller_cannot_use_host_range_or_negative_ids() {
        let manager = InstanceManager::new();

        let host_id = InstanceId::from(MIN_HOST_CREATED_IDENTIFIER);
        assert_eq!(
            manager.add_dart_created_instance(Arc::new(1u8), host_id),
            Err(InstanceError::InvalidIdentifier(host_id))
        );

        let negative = InstanceId::from(-1);
        assert_eq!(
            manager.add_dart_created_instance(Arc::new(1u8), negative),
            Err(InstanceError::InvalidIdentifier(negative))
        );
        assert!(manager.is_empty());
    }

    #[test]
    fn missing_identifier_is_not_found() {
        let manager = InstanceManager::new();
        let result = manager.get_instance::<Arc<u8>>(InstanceId::from(99));
        assert_eq!(result, Err(InstanceError::NotFound(InstanceId::from(99))));
    }

    #[test]
    fn wrong_type_is_reported() {
        let manager = InstanceManager::new();
        let id = InstanceId::from(2);
        manager.add_dart_created_instance(Arc::new(1u8), id).unwrap();

        let result = manager.get_instance::<Arc<String>>(id);
        assert!(matches!(result, Err(InstanceError::TypeMismatch { id: got, .. }) if got == id));
    }

    #[test]
    fn host_created_ids_start_at_reserved_range() {
        let manager = InstanceManager::new();

        let first = manager.add_host_created_instance(Arc::new(1u8));
        let second = manager.add_host_created_instance(Arc::new(2u8));

        assert_eq!(first.value(), MIN_HOST_CREATED_IDENTIFIER);
        assert_eq!(second.value(), MIN_HOST_CREATED_IDENTIFIER + 1);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn remove_and_clear() {
        let manager = InstanceManager::new();
        manager.add_dart_created_instance(Arc::new(1u8), InstanceId::from(1)).unwrap();
        manager.add_dart_created_instance(Arc::new(2u8), InstanceId::from(2)).unwrap();

        let removed: Option<Arc<u8>> = manager.remove(InstanceId::from(1));
        assert_eq!(removed.as_deref(), Some(&1));
        assert!(!manager.contains_instance(InstanceId::from(1)));

        manager.clear();
        assert!(manager.is_empty());
    }
}
