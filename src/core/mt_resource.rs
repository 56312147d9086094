use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` is the only shape of shared state the world core allows: the
/// persistence stores hand one out so that a store and every clone of it see
/// the same blobs, no matter which thread saves or loads.
///
/// # Examples
///
/// ```
/// use voxel_world::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let shared = counter.clone();
/// *shared.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Poisoning
/// A panic while a guard is held does not make the resource unusable: the
/// guard of a poisoned lock is recovered and handed out as usual.
pub struct MtResource<T: Send + Sync> {
    /// The shared value behind its lock.
    pub resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard over the contained value.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard over the contained value.
    ///
    /// Blocks until every outstanding read guard is released.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of handles currently sharing this resource.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Send + Sync + Default + 'static> Default for MtResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_the_value() {
        let resource = MtResource::new(Vec::<u8>::new());
        let clone = resource.clone();
        clone.get_mut().push(7);

        assert_eq!(resource.get().as_slice(), &[7]);
        assert_eq!(resource.handle_count(), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let counter = MtResource::new(0u32);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        *counter.get_mut() += 1;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*counter.get(), 400);
    }
}
