use derive_more::Display;

/// Identifies a deferred acquisition that is waiting for its resource to finish activating.
///
/// A token is handed to the resource through [`PoolHooks::on_deferred_acquired()`][1] and is
/// consumed by exactly one call to [`PoolManager::finish_acquire()`][2]. Tokens are generated by
/// the manager that owns the request and are never reused by that manager.
///
/// Operations that complete immediately do not produce a token; they return `None` instead.
///
/// [1]: crate::PoolHooks::on_deferred_acquired
/// [2]: crate::PoolManager::finish_acquire
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RequestToken(u64);

impl RequestToken {
    #[cfg(test)]
    pub(crate) const fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

/// Hands out request tokens in strictly increasing order.
#[derive(Debug, Default)]
pub(crate) struct TokenGenerator {
    next: u64,
}

impl TokenGenerator {
    pub(crate) fn next_token(&mut self) -> RequestToken {
        let token = RequestToken(self.next);

        self.next = self
            .next
            .checked_add(1)
            .expect("generating 2^64 request tokens is not a realistic workload");

        token
    }
}
