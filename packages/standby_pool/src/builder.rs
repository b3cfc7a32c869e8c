use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{PoolManager, PooledResource, ResourceFactory};

/// Builder for creating an instance of [`PoolManager`].
///
/// You only need to use this builder if you want to change the runtime toggles of the manager.
/// The default configuration used by [`PoolManager::new()`][1] honors every growth policy and
/// constructs every configured pool.
///
/// Both toggles can also be changed later through the administrative setters of the manager.
///
/// [1]: PoolManager::new
#[must_use]
pub struct PoolManagerBuilder<R, F> {
    force_growth_when_empty: bool,
    disable_pools: bool,

    _types: PhantomData<(R, F)>,
}

impl<R, F> fmt::Debug for PoolManagerBuilder<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolManagerBuilder")
            .field("resource_type", &format_args!("{}", type_name::<R>()))
            .field("factory_type", &format_args!("{}", type_name::<F>()))
            .field("force_growth_when_empty", &self.force_growth_when_empty)
            .field("disable_pools", &self.disable_pools)
            .finish()
    }
}

impl<R, F> PoolManagerBuilder<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    pub(crate) fn new() -> Self {
        Self {
            force_growth_when_empty: false,
            disable_pools: false,
            _types: PhantomData,
        }
    }

    /// Makes exhausted pools grow regardless of their growth policy, and makes acquiring a
    /// kind without a pool create a single-instance pool for it on demand.
    ///
    /// This is a diagnostic aid for finding pools that are configured too small.
    pub fn force_growth_when_empty(mut self, enabled: bool) -> Self {
        self.force_growth_when_empty = enabled;
        self
    }

    /// Makes activation construct no pools at all, so that every kind is reported as not
    /// pool-managed and the host falls back to creating resources directly.
    pub fn disable_pools(mut self, disabled: bool) -> Self {
        self.disable_pools = disabled;
        self
    }

    /// Builds the manager with the specified configuration.
    ///
    /// The manager is not ready until it is [activated][1].
    ///
    /// [1]: PoolManager::activate
    #[must_use]
    pub fn build(self) -> PoolManager<R, F> {
        PoolManager::new_inner(self.force_growth_when_empty, self.disable_pools)
    }
}
