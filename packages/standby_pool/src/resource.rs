use std::fmt::Debug;
use std::hash::Hash;

use crate::{AcquireSettings, Dormancy, RequestToken};

/// A handle to a heavyweight resource that can be kept in a pool.
///
/// The pool never copies the underlying resource. It keeps one clone of the handle and gives
/// another clone to whoever acquires the resource, so the handle is expected to be a cheap
/// reference such as an `Rc` wrapper or an entity identifier. Two handles refer to the same
/// resource exactly when [`is_same_resource()`][1] says so.
///
/// The state setters take `&self` because the pool only ever holds a shared handle; handle types
/// use interior mutability or forward to the host that owns the resource.
///
/// [1]: Self::is_same_resource
pub trait PooledResource: Clone {
    /// Identifies which pool a resource belongs to.
    type Kind: Clone + Eq + Hash + Debug;

    /// Parameters applied when the resource is delivered to its requester, e.g. a transform.
    type Placement;

    /// The kind of this resource.
    fn kind(&self) -> Self::Kind;

    /// Whether `self` and `other` refer to the same underlying resource.
    fn is_same_resource(&self, other: &Self) -> bool;

    /// Shows or hides the resource.
    fn set_visible(&self, visible: bool);

    /// Enables or disables collision and other interaction.
    fn set_interaction_enabled(&self, enabled: bool);

    /// Changes how far the resource is excluded from simulation and replication.
    fn set_dormancy(&self, dormancy: Dormancy);

    /// Applies post-construction parameters when the resource is delivered.
    fn apply_placement(&self, placement: Self::Placement);

    /// The optional pool lifecycle hooks of this resource.
    ///
    /// This is interrogated whenever the resource enters or leaves the pool. Resources that do
    /// not care about their pool lifecycle keep the default, which returns `None`.
    fn hooks(&self) -> Option<&dyn PoolHooks> {
        None
    }
}

/// Optional notifications a resource receives about its pool lifecycle.
///
/// Every method has a do-nothing default, so a resource implements only what it needs:
///
/// * Resources that reset transient state override [`on_acquired()`][1] and
///   [`on_returned()`][2].
/// * Resources that need asynchronous setup before they are usable additionally return `true`
///   from [`uses_deferred_activation()`][3]. Their requester is only called back once the
///   resource passes the token from [`on_deferred_acquired()`][4] to
///   [`PoolManager::finish_acquire()`][5].
///
/// [1]: Self::on_acquired
/// [2]: Self::on_returned
/// [3]: Self::uses_deferred_activation
/// [4]: Self::on_deferred_acquired
/// [5]: crate::PoolManager::finish_acquire
pub trait PoolHooks {
    /// Called after the acquire settings have been applied.
    fn on_acquired(&self) {}

    /// Called after the resource has been deactivated, both when it is first created and
    /// whenever it is returned.
    fn on_returned(&self) {}

    /// Whether delivery to the requester waits for [`PoolManager::finish_acquire()`][1].
    ///
    /// [1]: crate::PoolManager::finish_acquire
    fn uses_deferred_activation(&self) -> bool {
        false
    }

    /// Called when a deferred acquisition starts. The resource must eventually pass `token` to
    /// [`PoolManager::finish_acquire()`][1] for its requester to receive it.
    ///
    /// [1]: crate::PoolManager::finish_acquire
    fn on_deferred_acquired(&self, token: RequestToken) {
        _ = token;
    }
}

/// Puts a resource into the state it has while sitting in the pool.
pub(crate) fn deactivate<R: PooledResource>(resource: &R) {
    resource.set_visible(false);
    resource.set_interaction_enabled(false);
    resource.set_dormancy(Dormancy::DormantAll);

    if let Some(hooks) = resource.hooks() {
        hooks.on_returned();
    }
}

/// Puts a resource into the state its pool hands it out in.
pub(crate) fn activate<R: PooledResource>(resource: &R, settings: AcquireSettings) {
    resource.set_visible(settings.visible());
    resource.set_interaction_enabled(settings.interaction_enabled());

    if let Some(dormancy) = settings.dormancy() {
        resource.set_dormancy(dormancy);
    }

    if let Some(hooks) = resource.hooks() {
        hooks.on_acquired();
    }
}

/// Whether delivering `resource` has to wait for its activation to finish.
pub(crate) fn uses_deferred_activation<R: PooledResource>(resource: &R) -> bool {
    resource
        .hooks()
        .is_some_and(PoolHooks::uses_deferred_activation)
}
