use std::any::type_name;
use std::fmt;
use std::mem;

use tracing::{debug, trace};

use crate::error::Result;
use crate::resource::{activate, deactivate};
use crate::{Error, ExecutionContext, GrowthPolicy, PoolSpec, PooledResource, ResourceFactory};

/// The instances of one resource kind, split into an in-use part and an available part.
///
/// The pool keeps every instance it ever created in one sequence. A single boundary index
/// separates the two parts:
///
/// * `[0, boundary)` are the instances currently handed out, oldest acquisition first.
/// * `[boundary, len)` are the deactivated instances waiting to be handed out, next one first.
///
/// The boundary is the only record of which instances are in use; nothing is tagged on the
/// instances themselves. Acquiring hands out the instance at the boundary and advances it.
/// Returning moves the instance to the slot just below the boundary and retreats it, which
/// makes the returned instance the next one to be handed out.
///
/// Instances leave the sequence only through [`sweep_unused()`][1] and [`destroy_all()`][2].
///
/// When a [`GrowthPolicy::Loop`] pool wraps around, the instances handed out before the wrap
/// become available again while their holders still use them. Such displaced instances stay
/// active until they are either handed out again or returned by their previous holder.
///
/// [1]: Self::sweep_unused
/// [2]: Self::destroy_all
pub struct Pool<R: PooledResource> {
    spec: PoolSpec<R::Kind>,
    context: ExecutionContext,
    instances: Vec<R>,

    /// Index of the first available instance. Always `<= instances.len()`.
    available_index: usize,

    /// Available instances that a wrap-around took back from holders who still use them.
    displaced: Vec<R>,
}

impl<R: PooledResource> fmt::Debug for Pool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("spec", &self.spec)
            .field("context", &self.context)
            .field("len", &self.instances.len())
            .field("available_index", &self.available_index)
            .field("displaced", &self.displaced.len())
            .finish_non_exhaustive()
    }
}

impl<R: PooledResource + 'static> Pool<R> {
    /// Creates a pool and eagerly fills it with `spec.initial_count()` deactivated instances.
    pub fn new<F>(spec: PoolSpec<R::Kind>, context: ExecutionContext, factory: &mut F) -> Self
    where
        F: ResourceFactory<R>,
    {
        let mut pool = Self {
            instances: Vec::with_capacity(spec.initial_count()),
            spec,
            context,
            available_index: 0,
            displaced: Vec::new(),
        };

        for _ in 0..pool.spec.initial_count() {
            pool.create_instance(factory);
        }

        debug!(
            kind = ?pool.spec.kind(),
            count = pool.instances.len(),
            ?context,
            "constructed pool"
        );

        pool
    }

    /// Hands out the next available instance, applying the acquire settings of the pool.
    ///
    /// If every instance is in use, the growth policy of the pool decides what happens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] if no instance is available and the growth policy did
    /// not make one available.
    pub fn acquire<F>(&mut self, factory: &mut F) -> Result<R>
    where
        F: ResourceFactory<R>,
    {
        self.acquire_with_policy(factory, self.spec.growth_policy())
    }

    /// Like [`acquire()`][Self::acquire] but with the growth policy overridden.
    pub(crate) fn acquire_with_policy<F>(
        &mut self,
        factory: &mut F,
        policy: GrowthPolicy,
    ) -> Result<R>
    where
        F: ResourceFactory<R>,
    {
        if self.is_exhausted() {
            match policy {
                GrowthPolicy::Fixed => {}
                GrowthPolicy::CreateNew => {
                    self.create_instance(factory);
                    debug!(kind = ?self.spec.kind(), len = self.instances.len(), "pool grew");
                }
                GrowthPolicy::Loop => {
                    self.available_index = 0;
                    self.displaced.clone_from(&self.instances);
                    debug!(kind = ?self.spec.kind(), "pool wrapped around to its oldest instance");
                }
            }
        }

        let Some(resource) = self.instances.get(self.available_index).cloned() else {
            debug!(kind = ?self.spec.kind(), ?policy, "pool exhausted");
            return Err(Error::pool_exhausted(self.spec.kind()));
        };

        if !self.displaced.is_empty() {
            self.displaced
                .retain(|displaced| !displaced.is_same_resource(&resource));
        }

        activate(&resource, self.spec.acquire_settings());

        self.available_index = self
            .available_index
            .checked_add(1)
            .expect("boundary was below the instance count, so it cannot overflow");

        trace!(
            kind = ?self.spec.kind(),
            available_index = self.available_index,
            "acquired instance"
        );

        Ok(resource)
    }

    /// Takes back an instance previously handed out by this pool and deactivates it.
    ///
    /// The pool state does not change if the return is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReturn`] if the resource was not created by this pool, if no
    /// instance of this pool is in use, or if the resource is already in the pool.
    pub fn return_resource(&mut self, resource: &R) -> Result<()> {
        let Some(index) = self.position_of(resource) else {
            debug!(kind = ?self.spec.kind(), "rejected return of foreign resource");
            return Err(Error::invalid_return(
                self.spec.kind(),
                "resource does not belong to this pool",
            ));
        };

        if let Some(displaced_index) = self
            .displaced
            .iter()
            .position(|displaced| displaced.is_same_resource(resource))
        {
            // Already on the available side of the boundary, it only needs to go inert.
            self.displaced.swap_remove(displaced_index);
            deactivate(resource);

            trace!(kind = ?self.spec.kind(), index, "returned displaced instance");

            return Ok(());
        }

        if self.available_index == 0 {
            debug!(kind = ?self.spec.kind(), "rejected return while nothing is in use");
            return Err(Error::invalid_return(
                self.spec.kind(),
                "no instance of this pool is in use",
            ));
        }

        if index >= self.available_index {
            debug!(kind = ?self.spec.kind(), index, "rejected double return");
            return Err(Error::invalid_return(
                self.spec.kind(),
                "resource is already in the pool",
            ));
        }

        deactivate(resource);

        self.available_index = self
            .available_index
            .checked_sub(1)
            .expect("we just verified that the boundary is above zero");

        // The returned instance moves to the boundary slot; the in-use instances after it
        // shift down by one, keeping their acquisition order.
        if let Some(shifted) = self.instances.get_mut(index..=self.available_index) {
            shifted.rotate_left(1);
        }

        trace!(
            kind = ?self.spec.kind(),
            available_index = self.available_index,
            "returned instance"
        );

        Ok(())
    }

    /// Destroys every available instance, keeping only the ones in use.
    ///
    /// Instances displaced by a wrap-around are kept as well, since their previous holders
    /// still use them.
    ///
    /// This reclaims memory from a pool that grew beyond its usual needs. Returns the number of
    /// destroyed instances.
    pub fn sweep_unused<F>(&mut self, factory: &mut F) -> usize
    where
        F: ResourceFactory<R>,
    {
        let (displaced, unused): (Vec<R>, Vec<R>) = self
            .instances
            .split_off(self.available_index)
            .into_iter()
            .partition(|resource| {
                self.displaced
                    .iter()
                    .any(|displaced| displaced.is_same_resource(resource))
            });

        self.instances.extend(displaced);
        let count = unused.len();

        for resource in unused {
            factory.destroy(resource);
        }

        debug!(kind = ?self.spec.kind(), count, "swept unused instances");

        count
    }

    /// Destroys every instance, including the ones in use, leaving an empty pool.
    pub fn destroy_all<F>(&mut self, factory: &mut F)
    where
        F: ResourceFactory<R>,
    {
        let instances = mem::take(&mut self.instances);
        let count = instances.len();
        self.displaced.clear();

        for resource in instances {
            factory.destroy(resource);
        }

        self.available_index = 0;

        debug!(kind = ?self.spec.kind(), count, "destroyed all instances");
    }

    fn create_instance<F>(&mut self, factory: &mut F)
    where
        F: ResourceFactory<R>,
    {
        let resource = factory.create(self.spec.kind(), self.context);
        deactivate(&resource);
        self.instances.push(resource);
    }
}

impl<R: PooledResource> Pool<R> {
    /// The configuration the pool was constructed with.
    #[must_use]
    pub const fn spec(&self) -> &PoolSpec<R::Kind> {
        &self.spec
    }

    /// The resource kind the pool serves.
    #[must_use]
    pub const fn kind(&self) -> &R::Kind {
        self.spec.kind()
    }

    /// The number of instances the pool owns, in use or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the pool owns no instances at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The number of instances currently handed out.
    #[must_use]
    pub const fn in_use_count(&self) -> usize {
        self.available_index
    }

    /// The number of instances ready to be handed out without growing.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.instances
            .len()
            .checked_sub(self.available_index)
            .expect("boundary never exceeds the instance count")
    }

    /// Whether `resource` is one of the instances of this pool.
    #[must_use]
    pub fn contains(&self, resource: &R) -> bool {
        self.position_of(resource).is_some()
    }

    /// A snapshot of the instance counts of the pool.
    #[must_use]
    pub fn stats(&self) -> PoolStats<R::Kind> {
        PoolStats {
            kind: self.spec.kind().clone(),
            total: self.len(),
            in_use: self.in_use_count(),
            available: self.available_count(),
            growth_policy: self.spec.growth_policy(),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.available_index == self.instances.len()
    }

    fn position_of(&self, resource: &R) -> Option<usize> {
        self.instances
            .iter()
            .position(|candidate| candidate.is_same_resource(resource))
    }
}

/// Instance counts of one pool at a point in time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolStats<K> {
    kind: K,
    total: usize,
    in_use: usize,
    available: usize,
    growth_policy: GrowthPolicy,
}

impl<K> PoolStats<K> {
    /// The resource kind of the pool.
    #[must_use]
    pub const fn kind(&self) -> &K {
        &self.kind
    }

    /// The number of instances the pool owns.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// The number of instances handed out.
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.in_use
    }

    /// The number of instances waiting in the pool.
    #[must_use]
    pub const fn available(&self) -> usize {
        self.available
    }

    /// The growth policy of the pool.
    #[must_use]
    pub const fn growth_policy(&self) -> GrowthPolicy {
        self.growth_policy
    }
}

impl<K: fmt::Debug> fmt::Display for PoolStats<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pool for {:?}: {} total, {} in use, {} available ({:?})",
            self.kind, self.total, self.in_use, self.available, self.growth_policy
        )
    }
}
