// Probe resources and a fake factory shared by the unit tests of this crate.

#![allow(
    clippy::arithmetic_side_effects,
    reason = "we do not need to worry about these things when writing test code"
)]

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use foldhash::HashMap;

use crate::{
    Dormancy, ExecutionContext, PoolHooks, PoolManager, PoolRegistry, PooledResource, RequestToken,
    ResourceFactory,
};

pub(crate) type ProbeRegistry = PoolRegistry<ProbeResource, FakeFactory>;
pub(crate) type ProbeManager = PoolManager<ProbeResource, FakeFactory>;

/// Which capability variant a probe resource exposes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum HookStyle {
    #[default]
    None,
    Notify,
    Deferred,
}

#[derive(Debug)]
pub(crate) struct ProbeState {
    pub(crate) visible: bool,
    pub(crate) interaction_enabled: bool,
    pub(crate) dormancy: Dormancy,
    pub(crate) acquired_count: usize,
    pub(crate) returned_count: usize,
    pub(crate) placement: Option<i32>,
    pub(crate) deferred_token: Option<RequestToken>,
    pub(crate) destroyed: bool,
}

#[derive(Debug)]
struct ProbeInner {
    kind: u32,
    id: u32,
    style: HookStyle,
    state: RefCell<ProbeState>,
}

impl PoolHooks for ProbeInner {
    fn on_acquired(&self) {
        self.state.borrow_mut().acquired_count += 1;
    }

    fn on_returned(&self) {
        self.state.borrow_mut().returned_count += 1;
    }

    fn uses_deferred_activation(&self) -> bool {
        self.style == HookStyle::Deferred
    }

    fn on_deferred_acquired(&self, token: RequestToken) {
        self.state.borrow_mut().deferred_token = Some(token);
    }
}

/// A resource handle that records everything the pool does to it.
#[derive(Clone, Debug)]
pub(crate) struct ProbeResource {
    inner: Rc<ProbeInner>,
}

impl ProbeResource {
    pub(crate) fn new(kind: u32, id: u32, style: HookStyle) -> Self {
        Self {
            inner: Rc::new(ProbeInner {
                kind,
                id,
                style,
                state: RefCell::new(ProbeState {
                    visible: true,
                    interaction_enabled: true,
                    dormancy: Dormancy::Awake,
                    acquired_count: 0,
                    returned_count: 0,
                    placement: None,
                    deferred_token: None,
                    destroyed: false,
                }),
            }),
        }
    }

    pub(crate) fn id(&self) -> u32 {
        self.inner.id
    }

    pub(crate) fn state(&self) -> Ref<'_, ProbeState> {
        self.inner.state.borrow()
    }

    pub(crate) fn is_pooled_state(&self) -> bool {
        let state = self.state();
        !state.visible && !state.interaction_enabled && state.dormancy == Dormancy::DormantAll
    }
}

impl PooledResource for ProbeResource {
    type Kind = u32;
    type Placement = i32;

    fn kind(&self) -> u32 {
        self.inner.kind
    }

    fn is_same_resource(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn set_visible(&self, visible: bool) {
        self.inner.state.borrow_mut().visible = visible;
    }

    fn set_interaction_enabled(&self, enabled: bool) {
        self.inner.state.borrow_mut().interaction_enabled = enabled;
    }

    fn set_dormancy(&self, dormancy: Dormancy) {
        self.inner.state.borrow_mut().dormancy = dormancy;
    }

    fn apply_placement(&self, placement: i32) {
        self.inner.state.borrow_mut().placement = Some(placement);
    }

    fn hooks(&self) -> Option<&dyn PoolHooks> {
        match self.inner.style {
            HookStyle::None => None,
            HookStyle::Notify | HookStyle::Deferred => Some(&*self.inner),
        }
    }
}

#[derive(Debug, Default)]
struct FakeFactoryState {
    next_id: u32,
    styles: HashMap<u32, HookStyle>,
    created: Vec<(u32, ExecutionContext)>,
    destroyed: Vec<u32>,
}

/// Creates probe resources with sequential ids. Clones share their records, so a test can keep
/// one clone while the registry owns another.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeFactory {
    state: Rc<RefCell<FakeFactoryState>>,
}

impl FakeFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resources of `kind` created from now on expose the given hooks.
    pub(crate) fn with_style(self, kind: u32, style: HookStyle) -> Self {
        self.state.borrow_mut().styles.insert(kind, style);
        self
    }

    pub(crate) fn created_count(&self) -> usize {
        self.state.borrow().created.len()
    }

    pub(crate) fn created_contexts(&self) -> Vec<ExecutionContext> {
        self.state
            .borrow()
            .created
            .iter()
            .map(|(_, context)| *context)
            .collect()
    }

    pub(crate) fn destroyed_ids(&self) -> Vec<u32> {
        self.state.borrow().destroyed.clone()
    }
}

impl ResourceFactory<ProbeResource> for FakeFactory {
    fn create(&mut self, kind: &u32, context: ExecutionContext) -> ProbeResource {
        let mut state = self.state.borrow_mut();

        let id = state.next_id;
        state.next_id += 1;
        state.created.push((id, context));

        let style = state.styles.get(kind).copied().unwrap_or_default();
        ProbeResource::new(*kind, id, style)
    }

    fn destroy(&mut self, resource: ProbeResource) {
        resource.inner.state.borrow_mut().destroyed = true;
        self.state.borrow_mut().destroyed.push(resource.id());
    }
}
