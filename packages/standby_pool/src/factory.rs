use crate::{ExecutionContext, PooledResource};

/// Creates and destroys the resources that pools manage.
///
/// The host implements this to instantiate a resource of a given kind inside its execution
/// scope (e.g. by spawning an entity into the current world). Pools call [`create()`][1] when
/// they are constructed and whenever they grow, and [`destroy()`][2] when instances are swept
/// or the pools are torn down.
///
/// Newly created resources may be in any state; the pool deactivates them immediately.
///
/// [1]: Self::create
/// [2]: Self::destroy
#[cfg_attr(test, mockall::automock)]
pub trait ResourceFactory<R: PooledResource + 'static> {
    /// Creates a new resource of `kind` in the given execution context.
    fn create(&mut self, kind: &R::Kind, context: ExecutionContext) -> R;

    /// Destroys a resource that no pool will hand out again.
    fn destroy(&mut self, resource: R);
}
