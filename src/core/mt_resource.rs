use std::sync::Arc;

/// A thread-safe, reference-counted resource with copy-on-write mutation.
///
/// `MtResource` is the handle through which column block/light storage is shared
/// between the owning thread (which edits it) and the mesh worker (which only reads
/// it). Cloning the handle is cheap and never copies the contained value. A worker
/// holding a clone sees an immutable snapshot: writing through
/// [`get_mut`](Self::get_mut) while a clone is alive copies the value first, so the
/// writer never waits for a reader.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use voxel_runtime::core::MtResource;
///
/// let mut counter = MtResource::new(0);
/// let snapshot = counter.clone();
/// *counter.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// assert_eq!(*snapshot.get(), 0);
/// ```
pub struct MtResource<T: Send + Sync> {
    resource: Arc<T>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(resource),
        }
    }

    /// Returns a reference to the contained value. Never blocks.
    pub fn get(&self) -> &T {
        &self.resource
    }

    /// Returns `true` if another handle currently shares the value.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.resource) > 1
    }

    /// Returns `true` if both handles refer to the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync + Clone> MtResource<T> {
    /// Returns a mutable reference to the contained value.
    ///
    /// If other handles share the value it is cloned first and this handle moves to
    /// the copy; the others keep the value as it was.
    pub fn get_mut(&mut self) -> &mut T {
        Arc::make_mut(&mut self.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Send + Sync> std::fmt::Debug for MtResource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MtResource")
            .field("strong_count", &Arc::strong_count(&self.resource))
            .finish()
    }
}
