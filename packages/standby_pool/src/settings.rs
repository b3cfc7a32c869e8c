/// How far an instance is excluded from simulation and replication.
///
/// Acquired instances take the level configured in their [`AcquireSettings`]; instances that sit
/// in the pool are always [`Dormancy::DormantAll`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Dormancy {
    /// The instance never goes dormant.
    Never,

    /// The instance is fully active. This is the default for acquired instances.
    #[default]
    Awake,

    /// The instance is excluded from everything. Pooled instances are in this state.
    DormantAll,

    /// The instance is excluded from some consumers, at the discretion of the host.
    DormantPartial,

    /// The instance stays in whatever dormancy it was created with until woken explicitly.
    Initial,
}

/// How an instance is set up at the moment it leaves the pool.
///
/// Returning an instance always fully deactivates it (hidden, non-interactive and
/// [`Dormancy::DormantAll`]), so there is no matching "return settings" type.
///
/// # Examples
///
/// ```
/// use standby_pool::{AcquireSettings, Dormancy};
///
/// // Acquired hidden, e.g. because the caller reveals it after placing it.
/// let settings = AcquireSettings::default().with_visible(false);
///
/// assert!(!settings.visible());
/// assert!(settings.interaction_enabled());
/// assert_eq!(settings.dormancy(), Some(Dormancy::Awake));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AcquireSettings {
    visible: bool,
    interaction_enabled: bool,
    dormancy: Option<Dormancy>,
}

impl AcquireSettings {
    /// Whether the instance is shown when acquired.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Whether collision and other interaction is enabled when acquired.
    #[must_use]
    pub const fn interaction_enabled(&self) -> bool {
        self.interaction_enabled
    }

    /// The dormancy level applied when acquired. `None` leaves dormancy untouched, so the
    /// instance stays [`Dormancy::DormantAll`] until the host changes it.
    #[must_use]
    pub const fn dormancy(&self) -> Option<Dormancy> {
        self.dormancy
    }

    /// Sets whether the instance is shown when acquired.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets whether collision and other interaction is enabled when acquired.
    #[must_use]
    pub const fn with_interaction_enabled(mut self, enabled: bool) -> Self {
        self.interaction_enabled = enabled;
        self
    }

    /// Sets the dormancy level applied when acquired, or `None` to leave it untouched.
    #[must_use]
    pub const fn with_dormancy(mut self, dormancy: Option<Dormancy>) -> Self {
        self.dormancy = dormancy;
        self
    }
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            visible: true,
            interaction_enabled: true,
            dormancy: Some(Dormancy::Awake),
        }
    }
}
