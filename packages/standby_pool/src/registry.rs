use std::any::type_name;
use std::fmt;

use foldhash::{HashMap, HashMapExt};
use tracing::debug;

use crate::error::Result;
use crate::{
    Error, ExecutionContext, GrowthPolicy, Pool, PoolSpec, PoolStats, PooledResource,
    ResourceFactory, ScopeFilter,
};

/// The pools of one execution scope, one pool per resource kind.
///
/// A registry is constructed when its scope becomes active and owns the factory that creates
/// and destroys instances for all of its pools. Dropping the registry ends the scope: every
/// instance of every pool is destroyed through the factory, including instances still in use.
///
/// Asking for a kind that has no pool is not an error condition for the registry as a whole;
/// it is the way to find out whether a kind is pool-managed at all.
pub struct PoolRegistry<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    /// We use foldhash for better performance with small hash tables.
    pools: HashMap<R::Kind, Pool<R>>,
    factory: F,
    context: ExecutionContext,

    /// Exhausted pools grow regardless of their policy and unknown kinds get a pool on demand.
    force_growth_when_empty: bool,
}

impl<R, F> fmt::Debug for PoolRegistry<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("pools", &self.pools.values().collect::<Vec<_>>())
            .field("context", &self.context)
            .field("force_growth_when_empty", &self.force_growth_when_empty)
            .finish_non_exhaustive()
    }
}

impl<R, F> PoolRegistry<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    /// Constructs a pool for every spec whose scope filter matches `context`.
    ///
    /// If several specs name the same kind, the first matching one is used.
    pub fn new<I>(specs: I, factory: F, context: ExecutionContext) -> Self
    where
        I: IntoIterator<Item = PoolSpec<R::Kind>>,
    {
        let mut registry = Self::empty(factory, context);

        for spec in specs {
            registry.register_pool(spec);
        }

        debug!(
            pool_count = registry.pools.len(),
            ?context,
            "constructed pool registry"
        );

        registry
    }

    /// A registry without any pools, e.g. because pooling is disabled.
    pub(crate) fn empty(factory: F, context: ExecutionContext) -> Self {
        Self {
            pools: HashMap::new(),
            factory,
            context,
            force_growth_when_empty: false,
        }
    }

    /// The execution context the registry was constructed in.
    #[must_use]
    pub const fn context(&self) -> ExecutionContext {
        self.context
    }

    /// Whether exhausted pools grow regardless of their growth policy.
    #[must_use]
    pub const fn force_growth_when_empty(&self) -> bool {
        self.force_growth_when_empty
    }

    /// Makes exhausted pools grow regardless of their growth policy, and makes acquiring a kind
    /// without a pool create a single-instance pool for it on demand.
    pub fn set_force_growth_when_empty(&mut self, enabled: bool) {
        self.force_growth_when_empty = enabled;
    }

    /// Whether resources of `kind` are pool-managed.
    #[must_use]
    pub fn is_poolable(&self, kind: &R::Kind) -> bool {
        self.pools.contains_key(kind)
    }

    /// Whether the kind of `resource` is pool-managed.
    #[must_use]
    pub fn is_resource_poolable(&self, resource: &R) -> bool {
        self.is_poolable(&resource.kind())
    }

    /// The pool serving `kind`, if there is one.
    #[must_use]
    pub fn pool(&self, kind: &R::Kind) -> Option<&Pool<R>> {
        self.pools.get(kind)
    }

    /// The number of pools in the registry.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Snapshots of the instance counts of every pool, in no particular order.
    #[must_use]
    pub fn stats(&self) -> Vec<PoolStats<R::Kind>> {
        self.pools.values().map(Pool::stats).collect()
    }

    /// Hands out an instance from the pool serving `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotPoolable`] if no pool serves `kind` and [`Error::PoolExhausted`] if
    /// the pool has no instance to give.
    pub fn acquire(&mut self, kind: &R::Kind) -> Result<R> {
        if self.force_growth_when_empty && !self.pools.contains_key(kind) {
            debug!(?kind, "creating pool on demand for unknown kind");

            let spec = PoolSpec::builder(kind.clone())
                .initial_count(1)
                .growth_policy(GrowthPolicy::CreateNew)
                .scope_filter(ScopeFilter::everywhere())
                .build();
            let pool = Pool::new(spec, self.context, &mut self.factory);
            self.pools.insert(kind.clone(), pool);
        }

        let Some(pool) = self.pools.get_mut(kind) else {
            debug!(?kind, "no pool for requested kind");
            return Err(Error::not_poolable(kind));
        };

        let policy = if self.force_growth_when_empty {
            GrowthPolicy::CreateNew
        } else {
            pool.spec().growth_policy()
        };

        pool.acquire_with_policy(&mut self.factory, policy)
    }

    /// Takes back an instance, routing it to the pool of its kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotPoolable`] if no pool serves the kind of `resource` and
    /// [`Error::InvalidReturn`] if that pool rejects it.
    pub fn return_resource(&mut self, resource: &R) -> Result<()> {
        let kind = resource.kind();

        let Some(pool) = self.pools.get_mut(&kind) else {
            debug!(?kind, "returned resource has no pool");
            return Err(Error::not_poolable(&kind));
        };

        pool.return_resource(resource)
    }

    /// Adds a pool for a kind that has none yet.
    ///
    /// Returns `false` without creating anything if the scope filter of `spec` does not match
    /// the context of the registry or if a pool for the kind already exists.
    pub fn register_pool(&mut self, spec: PoolSpec<R::Kind>) -> bool {
        if !spec.scope_filter().matches(self.context) {
            debug!(kind = ?spec.kind(), context = ?self.context, "pool not applicable to context");
            return false;
        }

        if self.pools.contains_key(spec.kind()) {
            debug!(kind = ?spec.kind(), "pool already registered");
            return false;
        }

        let kind = spec.kind().clone();
        let pool = Pool::new(spec, self.context, &mut self.factory);
        self.pools.insert(kind, pool);

        true
    }

    /// Destroys every instance of the pool serving `kind` and removes the pool.
    ///
    /// Returns `false` if there is no such pool.
    pub fn unregister_pool(&mut self, kind: &R::Kind) -> bool {
        let Some(mut pool) = self.pools.remove(kind) else {
            return false;
        };

        pool.destroy_all(&mut self.factory);
        debug!(?kind, "unregistered pool");

        true
    }

    /// Destroys the available instances of every pool. Returns the number of destroyed instances.
    pub fn sweep_unused(&mut self) -> usize {
        self.pools
            .values_mut()
            .map(|pool| pool.sweep_unused(&mut self.factory))
            .sum()
    }

    /// Destroys every instance of every pool and removes all pools.
    pub fn destroy_all(&mut self) {
        for pool in self.pools.values_mut() {
            pool.destroy_all(&mut self.factory);
        }

        self.pools.clear();
    }
}

impl<R, F> Drop for PoolRegistry<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    fn drop(&mut self) {
        if !self.pools.is_empty() {
            debug!(pool_count = self.pools.len(), "tearing down pool registry");
        }

        self.destroy_all();
    }
}
