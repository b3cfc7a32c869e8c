//! Basic usage example for `standby_pool`.
//!
//! This example sets up a manager for two kinds of game entities, queues a consumer before the
//! pools exist and delivers a resource that needs asynchronous setup. Debug logging is enabled
//! so the pool lifecycle is visible in the output.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use standby_pool::{
    Dormancy, ExecutionContext, GrowthPolicy, PoolHooks, PoolManager, PoolSpec, PooledResource,
    RequestToken, ResourceFactory, ScopeFilter,
};
use tracing::Level;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum EntityKind {
    Bullet,
    Vehicle,
}

#[derive(Debug)]
struct EntityState {
    id: u32,
    kind: EntityKind,
    visible: Cell<bool>,
    position: Cell<(f32, f32)>,
    loading: Cell<Option<RequestToken>>,
}

impl PoolHooks for EntityState {
    fn on_acquired(&self) {
        println!("entity {} ({:?}) spawned", self.id, self.kind);
    }

    fn on_returned(&self) {
        println!("entity {} ({:?}) despawned", self.id, self.kind);
    }

    fn uses_deferred_activation(&self) -> bool {
        // Vehicles stream in their assets before they can be used.
        self.kind == EntityKind::Vehicle
    }

    fn on_deferred_acquired(&self, token: RequestToken) {
        self.loading.set(Some(token));
    }
}

#[derive(Clone, Debug)]
struct Entity(Rc<EntityState>);

impl PooledResource for Entity {
    type Kind = EntityKind;
    type Placement = (f32, f32);

    fn kind(&self) -> EntityKind {
        self.0.kind
    }

    fn is_same_resource(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn set_visible(&self, visible: bool) {
        self.0.visible.set(visible);
    }

    fn set_interaction_enabled(&self, _enabled: bool) {}

    fn set_dormancy(&self, _dormancy: Dormancy) {}

    fn apply_placement(&self, placement: (f32, f32)) {
        self.0.position.set(placement);
    }

    fn hooks(&self) -> Option<&dyn PoolHooks> {
        Some(&*self.0)
    }
}

#[derive(Debug, Default)]
struct World {
    next_id: u32,
}

impl ResourceFactory<Entity> for World {
    fn create(&mut self, kind: &EntityKind, context: ExecutionContext) -> Entity {
        self.next_id = self.next_id.wrapping_add(1);
        println!("creating entity {} ({kind:?}) on {context:?}", self.next_id);

        Entity(Rc::new(EntityState {
            id: self.next_id,
            kind: *kind,
            visible: Cell::new(true),
            position: Cell::new((0.0, 0.0)),
            loading: Cell::new(None),
        }))
    }

    fn destroy(&mut self, resource: Entity) {
        println!("destroying entity {}", resource.0.id);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .init();

    let mut manager = PoolManager::<Entity, World>::new();

    // This consumer arrives before the pools exist and is served once they do.
    manager.on_ready(|manager| {
        let bullet = manager
            .acquire_with_placement(&EntityKind::Bullet, (1.0, 2.0))
            .expect("bullet pool has idle instances right after activation");
        println!("ready callback got bullet {}", bullet.0.id);
        manager.return_to_pool(&bullet);
    });

    manager.activate(
        [
            PoolSpec::builder(EntityKind::Bullet)
                .initial_count(3)
                .growth_policy(GrowthPolicy::Loop)
                .scope_filter(ScopeFilter::everywhere())
                .build(),
            PoolSpec::builder(EntityKind::Vehicle)
                .initial_count(1)
                .growth_policy(GrowthPolicy::Fixed)
                .scope_filter(ScopeFilter::everywhere())
                .build(),
        ],
        World::default(),
        ExecutionContext::Standalone,
    );

    let delivered = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&delivered);

    let token = manager
        .acquire_async(&EntityKind::Vehicle, Some((10.0, -4.0)), move |vehicle| {
            *sink.borrow_mut() = vehicle;
        })
        .expect("vehicles use deferred activation");

    println!(
        "vehicle is loading, delivered yet: {}",
        delivered.borrow().is_some()
    );

    // Some frames later the vehicle has finished loading and reports back.
    manager.finish_acquire(token);

    if let Some(vehicle) = delivered.borrow().as_ref() {
        println!(
            "vehicle {} delivered at {:?}, visible: {}",
            vehicle.0.id,
            vehicle.0.position.get(),
            vehicle.0.visible.get()
        );
        println!("vehicle was told token {:?}", vehicle.0.loading.get());
    }

    manager.dump_pool_state();

    manager.deactivate();
}
