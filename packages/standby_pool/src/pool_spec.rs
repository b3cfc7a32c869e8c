use crate::AcquireSettings;

/// What a pool does when it is asked for an instance while every instance is in use.
///
/// # Examples
///
/// ```
/// use standby_pool::{GrowthPolicy, PoolSpec};
///
/// // Effects are cosmetic, so stealing the oldest one is fine when we run out.
/// let spec = PoolSpec::builder("spark")
///     .initial_count(16)
///     .growth_policy(GrowthPolicy::Loop)
///     .build();
///
/// assert_eq!(spec.growth_policy(), GrowthPolicy::Loop);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum GrowthPolicy {
    /// The pool never grows. Acquiring from an exhausted pool fails.
    Fixed,

    /// The pool creates one more instance through the factory. This is the default.
    #[default]
    CreateNew,

    /// The pool wraps around and hands out the instance that has been in use the longest.
    ///
    /// The caller still holding that instance loses exclusive use of it. This trades
    /// correctness for callers that hold on to instances against a hard bound on memory use.
    Loop,
}

/// The kind of process a registry is constructed in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ExecutionContext {
    /// A process that is both server and client. Every pool is constructed here.
    Standalone,

    /// A dedicated server.
    Server,

    /// A client connected to a server.
    Client,
}

/// Decides in which execution contexts a pool is constructed.
///
/// By default a pool exists only on servers (and in standalone processes, which construct every
/// pool regardless of the filter).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ScopeFilter {
    on_server: bool,
    on_clients: bool,
}

impl ScopeFilter {
    /// A filter matching the given combination of servers and clients.
    #[must_use]
    pub const fn new(on_server: bool, on_clients: bool) -> Self {
        Self {
            on_server,
            on_clients,
        }
    }

    /// A filter matching servers and clients alike.
    #[must_use]
    pub const fn everywhere() -> Self {
        Self::new(true, true)
    }

    /// Whether the pool is constructed on servers.
    #[must_use]
    pub const fn on_server(&self) -> bool {
        self.on_server
    }

    /// Whether the pool is constructed on clients.
    #[must_use]
    pub const fn on_clients(&self) -> bool {
        self.on_clients
    }

    /// Whether a pool with this filter is constructed in `context`.
    #[must_use]
    pub const fn matches(&self, context: ExecutionContext) -> bool {
        match context {
            ExecutionContext::Standalone => true,
            ExecutionContext::Server => self.on_server,
            ExecutionContext::Client => self.on_clients,
        }
    }
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

/// Configuration of the pool for one resource kind.
///
/// Create one via [`PoolSpec::builder()`]. Specs are treated as already validated input; any
/// `initial_count` (including zero) is accepted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolSpec<K> {
    kind: K,
    initial_count: usize,
    growth_policy: GrowthPolicy,
    acquire_settings: AcquireSettings,
    scope_filter: ScopeFilter,
}

impl<K> PoolSpec<K> {
    /// Starts building the spec of a pool serving resources of `kind`.
    pub fn builder(kind: K) -> PoolSpecBuilder<K> {
        PoolSpecBuilder::new(kind)
    }

    /// The resource kind the pool serves.
    #[must_use]
    pub const fn kind(&self) -> &K {
        &self.kind
    }

    /// How many instances are created eagerly when the pool is constructed.
    #[must_use]
    pub const fn initial_count(&self) -> usize {
        self.initial_count
    }

    /// What the pool does when it runs out of instances.
    #[must_use]
    pub const fn growth_policy(&self) -> GrowthPolicy {
        self.growth_policy
    }

    /// How instances are set up when they leave the pool.
    #[must_use]
    pub const fn acquire_settings(&self) -> AcquireSettings {
        self.acquire_settings
    }

    /// In which execution contexts the pool is constructed.
    #[must_use]
    pub const fn scope_filter(&self) -> ScopeFilter {
        self.scope_filter
    }
}

/// Builder for creating a [`PoolSpec`].
///
/// Only the resource kind is mandatory. The defaults are an empty pool with the
/// [`GrowthPolicy::CreateNew`] policy, default [`AcquireSettings`] and a server-only
/// [`ScopeFilter`].
///
/// # Examples
///
/// ```
/// use standby_pool::{GrowthPolicy, PoolSpec, ScopeFilter};
///
/// let spec = PoolSpec::builder("bullet")
///     .initial_count(64)
///     .growth_policy(GrowthPolicy::Fixed)
///     .scope_filter(ScopeFilter::everywhere())
///     .build();
///
/// assert_eq!(*spec.kind(), "bullet");
/// assert_eq!(spec.initial_count(), 64);
/// ```
#[derive(Debug)]
#[must_use]
pub struct PoolSpecBuilder<K> {
    spec: PoolSpec<K>,
}

impl<K> PoolSpecBuilder<K> {
    pub(crate) fn new(kind: K) -> Self {
        Self {
            spec: PoolSpec {
                kind,
                initial_count: 0,
                growth_policy: GrowthPolicy::default(),
                acquire_settings: AcquireSettings::default(),
                scope_filter: ScopeFilter::default(),
            },
        }
    }

    /// Sets how many instances are created eagerly when the pool is constructed.
    pub fn initial_count(mut self, count: usize) -> Self {
        self.spec.initial_count = count;
        self
    }

    /// Sets what the pool does when it runs out of instances.
    pub fn growth_policy(mut self, policy: GrowthPolicy) -> Self {
        self.spec.growth_policy = policy;
        self
    }

    /// Sets how instances are set up when they leave the pool.
    pub fn acquire_settings(mut self, settings: AcquireSettings) -> Self {
        self.spec.acquire_settings = settings;
        self
    }

    /// Sets in which execution contexts the pool is constructed.
    pub fn scope_filter(mut self, filter: ScopeFilter) -> Self {
        self.spec.scope_filter = filter;
        self
    }

    /// Builds the spec.
    #[must_use]
    pub fn build(self) -> PoolSpec<K> {
        self.spec
    }
}
