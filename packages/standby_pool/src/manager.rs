use std::any::type_name;
use std::fmt;
use std::mem;

use foldhash::{HashMap, HashMapExt};
use tracing::{debug, info, trace};

use crate::error::Result;
use crate::pending::PendingRequest;
use crate::resource::uses_deferred_activation;
use crate::token::TokenGenerator;
use crate::{
    Error, ExecutionContext, PoolManagerBuilder, PoolRegistry, PoolSpec, PoolStats,
    PooledResource, RequestToken, ResourceFactory,
};

type ReadyCallback<R, F> = Box<dyn FnOnce(&mut PoolManager<R, F>)>;

/// The entry point for acquiring and returning pooled resources within one execution scope.
///
/// The manager owns the [`PoolRegistry`] of the scope once the host [activates][1] it, and
/// coordinates two things the registry alone cannot:
///
/// * **Readiness.** Parts of the host may want resources before the pools exist. They register
///   with [`on_ready()`][2] and are called back exactly once, as soon as the pools are
///   constructed (or immediately, if they already are).
/// * **Deferred acquisition.** Resources that need asynchronous setup before they are usable
///   are delivered through [`acquire_async()`][3]. Their requester is called back only once the
///   resource reports completion via [`finish_acquire()`][4].
///
/// All operations are synchronous and the manager is single-threaded; it is neither `Send` nor
/// `Sync` because it stores the callbacks of its users.
///
/// # Examples
///
/// ```
/// use standby_pool::{ExecutionContext, PoolManager, PoolSpec};
/// # use standby_pool::{Dormancy, PooledResource, ResourceFactory};
/// # #[derive(Clone, Debug, PartialEq)]
/// # struct Crate(u32);
/// # impl PooledResource for Crate {
/// #     type Kind = &'static str;
/// #     type Placement = ();
/// #     fn kind(&self) -> &'static str { "crate" }
/// #     fn is_same_resource(&self, other: &Self) -> bool { self == other }
/// #     fn set_visible(&self, _: bool) {}
/// #     fn set_interaction_enabled(&self, _: bool) {}
/// #     fn set_dormancy(&self, _: Dormancy) {}
/// #     fn apply_placement(&self, _: ()) {}
/// # }
/// # #[derive(Debug, Default)]
/// # struct Crates(u32);
/// # impl ResourceFactory<Crate> for Crates {
/// #     fn create(&mut self, _: &&'static str, _: ExecutionContext) -> Crate {
/// #         self.0 += 1;
/// #         Crate(self.0)
/// #     }
/// #     fn destroy(&mut self, _: Crate) {}
/// # }
///
/// let mut manager = PoolManager::<Crate, Crates>::builder().build();
///
/// manager.activate(
///     [PoolSpec::builder("crate").initial_count(2).build()],
///     Crates::default(),
///     ExecutionContext::Standalone,
/// );
///
/// let resource = manager.acquire(&"crate").unwrap();
/// assert!(manager.return_to_pool(&resource));
/// ```
///
/// [1]: Self::activate
/// [2]: Self::on_ready
/// [3]: Self::acquire_async
/// [4]: Self::finish_acquire
pub struct PoolManager<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    registry: Option<PoolRegistry<R, F>>,

    ready_callbacks: Vec<ReadyCallback<R, F>>,

    pending: HashMap<RequestToken, PendingRequest<R>>,
    tokens: TokenGenerator,

    force_growth_when_empty: bool,
    disable_pools: bool,
}

impl<R, F> fmt::Debug for PoolManager<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("registry", &self.registry)
            .field("ready_callbacks", &self.ready_callbacks.len())
            .field("pending", &self.pending)
            .field("tokens", &self.tokens)
            .field("force_growth_when_empty", &self.force_growth_when_empty)
            .field("disable_pools", &self.disable_pools)
            .finish()
    }
}

impl<R, F> PoolManager<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    /// Creates a manager with the default configuration.
    ///
    /// The manager is not ready until it is [activated][1].
    ///
    /// [1]: Self::activate
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a manager with a custom configuration.
    #[cfg_attr(test, mutants::skip)] // Trivial pass-through.
    pub fn builder() -> PoolManagerBuilder<R, F> {
        PoolManagerBuilder::new()
    }

    pub(crate) fn new_inner(force_growth_when_empty: bool, disable_pools: bool) -> Self {
        Self {
            registry: None,
            ready_callbacks: Vec::new(),
            pending: HashMap::new(),
            tokens: TokenGenerator::default(),
            force_growth_when_empty,
            disable_pools,
        }
    }

    /// Constructs the pools of an execution scope and makes the manager ready.
    ///
    /// Every callback queued with [`on_ready()`][1] is invoked exactly once before this returns.
    /// If the manager is already active, the previous scope is [deactivated][2] first.
    ///
    /// If pooling is disabled, the manager becomes ready with no pools at all.
    ///
    /// [1]: Self::on_ready
    /// [2]: Self::deactivate
    pub fn activate<I>(&mut self, specs: I, factory: F, context: ExecutionContext)
    where
        I: IntoIterator<Item = PoolSpec<R::Kind>>,
    {
        if self.registry.is_some() {
            self.deactivate();
        }

        let mut registry = if self.disable_pools {
            debug!(?context, "pooling disabled, activating without pools");
            PoolRegistry::empty(factory, context)
        } else {
            PoolRegistry::new(specs, factory, context)
        };

        registry.set_force_growth_when_empty(self.force_growth_when_empty);
        self.registry = Some(registry);

        let callbacks = mem::take(&mut self.ready_callbacks);

        debug!(
            ?context,
            ready_callbacks = callbacks.len(),
            "pool manager is ready"
        );

        for callback in callbacks {
            callback(self);
        }
    }

    /// Ends the current execution scope.
    ///
    /// Deferred acquisitions that are still pending are resolved with no resource, after which
    /// every instance of every pool is destroyed. The manager is no longer ready afterwards.
    pub fn deactivate(&mut self) {
        let Some(registry) = self.registry.take() else {
            return;
        };

        let pending = mem::take(&mut self.pending);

        debug!(
            pending_requests = pending.len(),
            "deactivating pool manager"
        );

        for request in pending.into_values() {
            request.abandon();
        }

        drop(registry);
    }

    /// Whether the pools of the current scope have been constructed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.registry.is_some()
    }

    /// Invokes `callback` once the manager is ready.
    ///
    /// If the manager is already ready, `callback` is invoked immediately. Otherwise it is
    /// queued and invoked during the next [`activate()`][1].
    ///
    /// [1]: Self::activate
    pub fn on_ready(&mut self, callback: impl FnOnce(&mut Self) + 'static) {
        if self.is_ready() {
            callback(self);
        } else {
            trace!("queueing ready callback");
            self.ready_callbacks.push(Box::new(callback));
        }
    }

    /// The registry of the current scope, if the manager is ready.
    #[must_use]
    pub fn registry(&self) -> Option<&PoolRegistry<R, F>> {
        self.registry.as_ref()
    }

    /// The registry of the current scope, if the manager is ready.
    ///
    /// This is how pools are added or removed at runtime.
    #[must_use]
    pub fn registry_mut(&mut self) -> Option<&mut PoolRegistry<R, F>> {
        self.registry.as_mut()
    }

    /// Whether resources of `kind` are pool-managed in the current scope.
    ///
    /// Nothing is pool-managed before the manager is ready.
    #[must_use]
    pub fn is_poolable(&self, kind: &R::Kind) -> bool {
        self.registry
            .as_ref()
            .is_some_and(|registry| registry.is_poolable(kind))
    }

    /// Whether the kind of `resource` is pool-managed in the current scope.
    #[must_use]
    pub fn is_resource_poolable(&self, resource: &R) -> bool {
        self.is_poolable(&resource.kind())
    }

    /// Acquires a resource of `kind`, returning `None` if there is none to give.
    ///
    /// The resource is handed out as soon as its acquire settings are applied, even if it uses
    /// deferred activation. Use [`acquire_async()`][1] to wait for such resources to finish.
    ///
    /// [1]: Self::acquire_async
    #[must_use]
    pub fn acquire(&mut self, kind: &R::Kind) -> Option<R> {
        self.try_acquire(kind).ok()
    }

    /// Acquires a resource of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryNotReady`] before activation, [`Error::NotPoolable`] if no pool
    /// serves `kind` and [`Error::PoolExhausted`] if its pool has no instance to give.
    pub fn try_acquire(&mut self, kind: &R::Kind) -> Result<R> {
        let Some(registry) = self.registry.as_mut() else {
            debug!(?kind, "acquire attempted before pools are ready");
            return Err(Error::RegistryNotReady);
        };

        registry.acquire(kind)
    }

    /// Acquires a resource of `kind` and applies `placement` to it.
    #[must_use]
    pub fn acquire_with_placement(&mut self, kind: &R::Kind, placement: R::Placement) -> Option<R> {
        self.try_acquire_with_placement(kind, placement).ok()
    }

    /// Acquires a resource of `kind` and applies `placement` to it.
    ///
    /// # Errors
    ///
    /// Fails for the same reasons as [`try_acquire()`][1].
    ///
    /// [1]: Self::try_acquire
    pub fn try_acquire_with_placement(
        &mut self,
        kind: &R::Kind,
        placement: R::Placement,
    ) -> Result<R> {
        let resource = self.try_acquire(kind)?;
        resource.apply_placement(placement);
        Ok(resource)
    }

    /// Acquires a resource of `kind` and delivers it to `continuation`.
    ///
    /// If the resource can be used right away, `placement` is applied and `continuation` is
    /// invoked before this returns, and the result is `None`. The same happens, with no
    /// resource, if there is nothing to acquire.
    ///
    /// If the resource uses deferred activation, it is told the token of the request and the
    /// token is returned. The request then stays pending until the resource passes the token to
    /// [`finish_acquire()`][1], which applies `placement` and invokes `continuation`.
    ///
    /// [1]: Self::finish_acquire
    pub fn acquire_async(
        &mut self,
        kind: &R::Kind,
        placement: Option<R::Placement>,
        continuation: impl FnOnce(Option<R>) + 'static,
    ) -> Option<RequestToken> {
        let resource = match self.try_acquire(kind) {
            Ok(resource) => resource,
            Err(error) => {
                debug!(?kind, %error, "asynchronous acquire failed");
                continuation(None);
                return None;
            }
        };

        if !uses_deferred_activation(&resource) {
            if let Some(placement) = placement {
                resource.apply_placement(placement);
            }

            continuation(Some(resource));
            return None;
        }

        let token = self.tokens.next_token();

        self.pending.insert(
            token,
            PendingRequest::new(resource.clone(), placement, Box::new(continuation)),
        );

        trace!(?kind, %token, "deferred acquisition started");

        if let Some(hooks) = resource.hooks() {
            hooks.on_deferred_acquired(token);
        }

        Some(token)
    }

    /// Completes a deferred acquisition, delivering its resource to the requester.
    ///
    /// Returns `false` if `token` does not identify a pending request, including when the
    /// request has already been finished.
    pub fn finish_acquire(&mut self, token: RequestToken) -> bool {
        self.try_finish_acquire(token).is_ok()
    }

    /// Completes a deferred acquisition, delivering its resource to the requester.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidToken`] if `token` does not identify a pending request.
    pub fn try_finish_acquire(&mut self, token: RequestToken) -> Result<()> {
        let Some(request) = self.pending.remove(&token) else {
            debug!(%token, "finish requested for unknown token");
            return Err(Error::InvalidToken { token });
        };

        trace!(kind = ?request.resource().kind(), %token, "deferred acquisition finished");

        request.deliver();
        Ok(())
    }

    /// Gives a resource back to its pool. Returns `false` if the pool does not take it.
    pub fn return_to_pool(&mut self, resource: &R) -> bool {
        self.try_return(resource).is_ok()
    }

    /// Gives a resource back to its pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryNotReady`] before activation, [`Error::NotPoolable`] if no pool
    /// serves the kind of `resource` and [`Error::InvalidReturn`] if the pool rejects it or if
    /// the resource is still waiting to be delivered by [`finish_acquire()`][1].
    ///
    /// [1]: Self::finish_acquire
    pub fn try_return(&mut self, resource: &R) -> Result<()> {
        let Some(registry) = self.registry.as_mut() else {
            debug!(kind = ?resource.kind(), "return attempted before pools are ready");
            return Err(Error::RegistryNotReady);
        };

        if self
            .pending
            .values()
            .any(|request| request.resource().is_same_resource(resource))
        {
            debug!(kind = ?resource.kind(), "rejected return of resource with pending delivery");
            return Err(Error::invalid_return(
                &resource.kind(),
                "resource has a deferred acquisition that is not finished",
            ));
        }

        registry.return_resource(resource)
    }

    /// The number of deferred acquisitions waiting for their resource to finish activating.
    #[must_use]
    pub fn pending_request_count(&self) -> usize {
        self.pending.len()
    }

    /// Destroys the available instances of every pool. Returns the number of destroyed instances.
    pub fn sweep_unused(&mut self) -> usize {
        let swept = self
            .registry
            .as_mut()
            .map_or(0, PoolRegistry::sweep_unused);

        debug!(swept, "swept unused pool instances");

        swept
    }

    /// Snapshots of the instance counts of every pool, in no particular order.
    #[must_use]
    pub fn pool_stats(&self) -> Vec<PoolStats<R::Kind>> {
        self.registry
            .as_ref()
            .map(PoolRegistry::stats)
            .unwrap_or_default()
    }

    /// Logs the instance counts of every pool and returns them.
    pub fn dump_pool_state(&self) -> Vec<PoolStats<R::Kind>> {
        if !self.is_ready() {
            info!("pools are not ready");
            return Vec::new();
        }

        let stats = self.pool_stats();

        info!(
            pool_count = stats.len(),
            pending_requests = self.pending.len(),
            "pool state"
        );

        for pool in &stats {
            info!("{pool}");
        }

        stats
    }

    /// Whether exhausted pools grow regardless of their growth policy.
    #[must_use]
    pub fn force_growth_when_empty(&self) -> bool {
        self.force_growth_when_empty
    }

    /// Makes exhausted pools grow regardless of their growth policy, and makes acquiring a kind
    /// without a pool create a single-instance pool for it on demand.
    ///
    /// Takes effect immediately.
    pub fn set_force_growth_when_empty(&mut self, enabled: bool) {
        self.force_growth_when_empty = enabled;

        if let Some(registry) = self.registry.as_mut() {
            registry.set_force_growth_when_empty(enabled);
        }
    }

    /// Whether activation constructs no pools.
    #[must_use]
    pub fn disable_pools(&self) -> bool {
        self.disable_pools
    }

    /// Makes activation construct no pools.
    ///
    /// Takes effect at the next [`activate()`][1].
    ///
    /// [1]: Self::activate
    pub fn set_disable_pools(&mut self, disabled: bool) {
        self.disable_pools = disabled;
    }
}

impl<R, F> Default for PoolManager<R, F>
where
    R: PooledResource + 'static,
    F: ResourceFactory<R>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(
        clippy::indexing_slicing,
        reason = "we do not need to worry about these things when writing test code"
    )]

    use std::cell::RefCell;
    use std::rc::Rc;

    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::test_support::{FakeFactory, HookStyle, ProbeManager, ProbeResource};
    use crate::{GrowthPolicy, ScopeFilter};

    const TURRET: u32 = 1;
    const DRONE: u32 = 2;
    const UNKNOWN: u32 = 99;

    assert_not_impl_any!(ProbeManager: Send, Sync);

    fn specs() -> Vec<PoolSpec<u32>> {
        vec![
            PoolSpec::builder(TURRET)
                .initial_count(2)
                .growth_policy(GrowthPolicy::Fixed)
                .scope_filter(ScopeFilter::everywhere())
                .build(),
            PoolSpec::builder(DRONE)
                .initial_count(1)
                .growth_policy(GrowthPolicy::Fixed)
                .scope_filter(ScopeFilter::everywhere())
                .build(),
        ]
    }

    fn active_manager(factory: FakeFactory) -> ProbeManager {
        let mut manager = ProbeManager::new();
        manager.activate(specs(), factory, ExecutionContext::Standalone);
        manager
    }

    type Received = Rc<RefCell<Vec<Option<ProbeResource>>>>;

    fn recorder() -> (Received, impl FnOnce(Option<ProbeResource>) + 'static) {
        let received: Received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);

        (received, move |resource: Option<ProbeResource>| {
            sink.borrow_mut().push(resource);
        })
    }

    #[test]
    fn not_ready_before_activation() {
        let mut manager = ProbeManager::new();

        assert!(!manager.is_ready());
        assert!(!manager.is_poolable(&TURRET));
        assert!(matches!(
            manager.try_acquire(&TURRET),
            Err(Error::RegistryNotReady)
        ));
        assert!(manager.registry().is_none());
        assert!(manager.pool_stats().is_empty());
        assert_eq!(manager.sweep_unused(), 0);
    }

    #[test]
    fn return_before_activation_is_refused() {
        let mut manager = ProbeManager::new();
        let stray = ProbeResource::new(TURRET, 0, HookStyle::None);

        assert_eq!(manager.try_return(&stray), Err(Error::RegistryNotReady));
        assert!(!manager.return_to_pool(&stray));
    }

    #[test]
    fn acquire_and_return_through_manager() {
        let mut manager = active_manager(FakeFactory::new());

        assert!(manager.is_ready());
        assert!(manager.is_poolable(&TURRET));
        assert!(!manager.is_poolable(&UNKNOWN));

        let resource = manager.acquire(&TURRET).unwrap();
        assert!(manager.is_resource_poolable(&resource));
        assert!(!resource.is_pooled_state());

        assert!(manager.return_to_pool(&resource));
        assert!(resource.is_pooled_state());

        assert!(!manager.return_to_pool(&resource));
    }

    #[test]
    fn acquire_of_unknown_kind_is_not_poolable() {
        let mut manager = active_manager(FakeFactory::new());

        assert!(manager.acquire(&UNKNOWN).is_none());
        assert!(matches!(
            manager.try_acquire(&UNKNOWN),
            Err(Error::NotPoolable { .. })
        ));
    }

    #[test]
    fn acquire_with_placement_applies_it() {
        let mut manager = active_manager(FakeFactory::new());

        let resource = manager.acquire_with_placement(&TURRET, 17).unwrap();

        assert_eq!(resource.state().placement, Some(17));
    }

    #[test]
    fn ready_callbacks_fire_once_at_activation() {
        let mut manager = ProbeManager::new();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second"] {
            let fired = Rc::clone(&fired);
            manager.on_ready(move |manager| {
                assert!(manager.is_ready());
                fired.borrow_mut().push(label);
            });
        }

        assert!(fired.borrow().is_empty());

        manager.activate(specs(), FakeFactory::new(), ExecutionContext::Standalone);
        assert_eq!(*fired.borrow(), vec!["first", "second"]);

        manager.deactivate();
        manager.activate(specs(), FakeFactory::new(), ExecutionContext::Standalone);
        assert_eq!(fired.borrow().len(), 2);
    }

    #[test]
    fn ready_callback_fires_immediately_when_ready() {
        let mut manager = active_manager(FakeFactory::new());
        let fired = Rc::new(RefCell::new(false));

        let fired_clone = Rc::clone(&fired);
        manager.on_ready(move |_| *fired_clone.borrow_mut() = true);

        assert!(*fired.borrow());
    }

    #[test]
    fn ready_callback_can_register_pools() {
        let mut manager = ProbeManager::new();

        manager.on_ready(|manager| {
            let registry = manager.registry_mut().unwrap();
            assert!(registry.register_pool(
                PoolSpec::builder(UNKNOWN)
                    .initial_count(1)
                    .scope_filter(ScopeFilter::everywhere())
                    .build()
            ));
        });

        manager.activate(specs(), FakeFactory::new(), ExecutionContext::Server);

        assert!(manager.is_poolable(&UNKNOWN));
        assert!(manager.acquire(&UNKNOWN).is_some());
    }

    #[test]
    fn immediate_async_acquire_calls_continuation_synchronously() {
        let mut manager = active_manager(FakeFactory::new());
        let (received, continuation) = recorder();

        let token = manager.acquire_async(&TURRET, Some(5), continuation);

        assert_eq!(token, None);
        let received = received.borrow();
        assert_eq!(received.len(), 1);
        let resource = received[0].as_ref().unwrap();
        assert_eq!(resource.state().placement, Some(5));
        assert_eq!(manager.pending_request_count(), 0);
    }

    #[test]
    fn async_acquire_failure_reports_no_resource() {
        let mut manager = active_manager(FakeFactory::new());
        let (received, continuation) = recorder();

        let token = manager.acquire_async(&UNKNOWN, None, continuation);

        assert_eq!(token, None);
        assert_eq!(received.borrow().len(), 1);
        assert!(received.borrow()[0].is_none());
    }

    #[test]
    fn async_acquire_before_activation_reports_no_resource() {
        let mut manager = ProbeManager::new();
        let (received, continuation) = recorder();

        assert_eq!(manager.acquire_async(&TURRET, None, continuation), None);
        assert_eq!(received.borrow().len(), 1);
        assert!(received.borrow()[0].is_none());
    }

    #[test]
    fn deferred_acquire_waits_for_finish() {
        let factory = FakeFactory::new().with_style(DRONE, HookStyle::Deferred);
        let mut manager = active_manager(factory);
        let (received, continuation) = recorder();

        let token = manager
            .acquire_async(&DRONE, Some(3), continuation)
            .unwrap();

        assert!(received.borrow().is_empty());
        assert_eq!(manager.pending_request_count(), 1);

        let drone = manager.registry().unwrap().pool(&DRONE).unwrap().stats();
        assert_eq!(drone.in_use(), 1);

        assert!(manager.finish_acquire(token));

        {
            let received = received.borrow();
            assert_eq!(received.len(), 1);
            let resource = received[0].as_ref().unwrap();
            // The resource itself was told which token to finish with.
            assert_eq!(resource.state().deferred_token, Some(token));
            assert_eq!(resource.state().placement, Some(3));
        }

        assert_eq!(manager.pending_request_count(), 0);
        assert!(!manager.finish_acquire(token));
        assert_eq!(
            manager.try_finish_acquire(token),
            Err(Error::InvalidToken { token })
        );
        assert_eq!(received.borrow().len(), 1);
    }

    #[test]
    fn resource_awaiting_delivery_cannot_be_returned() {
        let factory = FakeFactory::new().with_style(DRONE, HookStyle::Deferred);
        let mut manager = active_manager(factory);
        let (received, continuation) = recorder();

        let token = manager.acquire_async(&DRONE, None, continuation).unwrap();
        let drone = manager.pending[&token].resource().clone();

        assert!(matches!(
            manager.try_return(&drone),
            Err(Error::InvalidReturn { .. })
        ));
        assert!(!manager.return_to_pool(&drone));

        // The single instance stays reserved for the pending request.
        assert!(manager.acquire(&DRONE).is_none());

        assert!(manager.finish_acquire(token));
        let delivered = received.borrow()[0].clone().unwrap();
        assert!(delivered.is_same_resource(&drone));

        // Once delivered, the requester returns it as usual.
        assert!(manager.return_to_pool(&delivered));
        assert!(delivered.is_pooled_state());
    }

    #[test]
    fn deferred_tokens_are_distinct() {
        let factory = FakeFactory::new().with_style(TURRET, HookStyle::Deferred);
        let mut manager = active_manager(factory);

        let first = manager.acquire_async(&TURRET, None, |_| {}).unwrap();
        let second = manager.acquire_async(&TURRET, None, |_| {}).unwrap();

        assert_ne!(first, second);
        assert_eq!(manager.pending_request_count(), 2);
    }

    #[test]
    fn notify_resources_are_delivered_immediately() {
        let factory = FakeFactory::new().with_style(TURRET, HookStyle::Notify);
        let mut manager = active_manager(factory);
        let (received, continuation) = recorder();

        assert_eq!(manager.acquire_async(&TURRET, None, continuation), None);

        let received = received.borrow();
        let resource = received[0].as_ref().unwrap();
        assert_eq!(resource.state().acquired_count, 1);
        assert_eq!(resource.state().deferred_token, None);
    }

    #[test]
    fn deactivate_abandons_pending_requests_and_destroys_instances() {
        let factory = FakeFactory::new().with_style(DRONE, HookStyle::Deferred);
        let mut manager = active_manager(factory.clone());
        let (received, continuation) = recorder();

        let token = manager.acquire_async(&DRONE, None, continuation).unwrap();

        manager.deactivate();

        assert!(!manager.is_ready());
        assert_eq!(manager.pending_request_count(), 0);
        assert_eq!(received.borrow().len(), 1);
        assert!(received.borrow()[0].is_none());
        assert_eq!(factory.destroyed_ids().len(), factory.created_count());
        assert!(!manager.finish_acquire(token));
    }

    #[test]
    fn reactivation_replaces_previous_scope() {
        let first = FakeFactory::new();
        let mut manager = active_manager(first.clone());

        let second = FakeFactory::new();
        manager.activate(specs(), second.clone(), ExecutionContext::Client);

        assert_eq!(first.destroyed_ids().len(), first.created_count());
        assert!(second.destroyed_ids().is_empty());
        assert_eq!(
            manager.registry().unwrap().context(),
            ExecutionContext::Client
        );
    }

    #[test]
    fn disabled_pools_activate_empty() {
        let factory = FakeFactory::new();
        let mut manager = ProbeManager::builder().disable_pools(true).build();

        manager.activate(specs(), factory.clone(), ExecutionContext::Standalone);

        assert!(manager.is_ready());
        assert!(!manager.is_poolable(&TURRET));
        assert_eq!(factory.created_count(), 0);
    }

    #[test]
    fn disable_pools_takes_effect_on_next_activation() {
        let mut manager = active_manager(FakeFactory::new());

        manager.set_disable_pools(true);
        assert!(manager.disable_pools());
        assert!(manager.is_poolable(&TURRET));

        manager.activate(specs(), FakeFactory::new(), ExecutionContext::Standalone);
        assert!(!manager.is_poolable(&TURRET));
    }

    #[test]
    fn force_growth_applies_to_active_registry() {
        let factory = FakeFactory::new();
        let mut manager = active_manager(factory.clone());

        assert!(manager.acquire(&DRONE).is_some());
        assert!(manager.acquire(&DRONE).is_none());

        manager.set_force_growth_when_empty(true);
        assert!(manager.force_growth_when_empty());

        assert!(manager.acquire(&DRONE).is_some());
        assert!(manager.acquire(&UNKNOWN).is_some());
        assert!(manager.is_poolable(&UNKNOWN));
    }

    #[test]
    fn force_growth_from_builder_reaches_registry() {
        let mut manager = ProbeManager::builder()
            .force_growth_when_empty(true)
            .build();

        manager.activate(specs(), FakeFactory::new(), ExecutionContext::Standalone);

        assert!(manager.registry().unwrap().force_growth_when_empty());
    }

    #[test]
    fn sweep_and_stats_cover_all_pools() {
        let factory = FakeFactory::new();
        let mut manager = active_manager(factory.clone());

        let _turret = manager.acquire(&TURRET).unwrap();

        let mut stats = manager.dump_pool_state();
        stats.sort_by_key(|stats| *stats.kind());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].in_use(), 1);
        assert_eq!(stats[0].available(), 1);
        assert_eq!(stats[1].available(), 1);

        assert_eq!(manager.sweep_unused(), 2);
        assert_eq!(factory.destroyed_ids().len(), 2);
    }

    #[test]
    fn dump_without_registry_is_empty() {
        let manager = ProbeManager::default();

        assert!(manager.dump_pool_state().is_empty());
    }
}
