use std::any::type_name;
use std::fmt;

use crate::PooledResource;

/// What the requester of a deferred acquisition wants done once the resource is usable.
pub(crate) type Continuation<R> = Box<dyn FnOnce(Option<R>)>;

/// A deferred acquisition that is waiting for its resource to finish activating.
///
/// The resource has already left its pool. It is delivered to the continuation, with the
/// placement applied, when the resource reports back with its token.
pub(crate) struct PendingRequest<R: PooledResource> {
    resource: R,
    placement: Option<R::Placement>,
    continuation: Continuation<R>,
}

impl<R: PooledResource> fmt::Debug for PendingRequest<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("kind", &self.resource.kind())
            .field("has_placement", &self.placement.is_some())
            .finish_non_exhaustive()
    }
}

impl<R: PooledResource> PendingRequest<R> {
    pub(crate) fn new(
        resource: R,
        placement: Option<R::Placement>,
        continuation: Continuation<R>,
    ) -> Self {
        Self {
            resource,
            placement,
            continuation,
        }
    }

    pub(crate) fn resource(&self) -> &R {
        &self.resource
    }

    /// Applies the placement and hands the resource to the requester.
    pub(crate) fn deliver(self) {
        if let Some(placement) = self.placement {
            self.resource.apply_placement(placement);
        }

        (self.continuation)(Some(self.resource));
    }

    /// Tells the requester that the resource will never arrive.
    pub(crate) fn abandon(self) {
        (self.continuation)(None);
    }
}
