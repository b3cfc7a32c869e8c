#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Per-type pools of pre-created heavyweight resources.
//!
//! Creating and destroying resources such as simulation entities, projectiles or visual effects
//! is often far more expensive than keeping a few of them around in an inert state. This crate
//! keeps a fixed or growing number of instances of each resource kind alive, deactivates them
//! (hidden, non-interacting, dormant) while they wait in a pool and reactivates them with
//! per-kind settings when they are acquired.
//!
//! # Structure
//!
//! - [`Pool`] owns the instances of one kind and partitions them into in-use and available
//!   instances with a single boundary index. Its [`GrowthPolicy`] decides what happens when it
//!   runs out.
//! - [`PoolRegistry`] holds one pool per kind for an execution scope and owns the
//!   [`ResourceFactory`] that creates and destroys instances. It is constructed from a list of
//!   [`PoolSpec`]s, skipping those whose [`ScopeFilter`] excludes the [`ExecutionContext`].
//! - [`PoolManager`] is what the rest of the host talks to. It lets consumers wait for the pools
//!   to be constructed and delivers resources that need asynchronous setup through
//!   [`RequestToken`]s.
//!
//! Resources are handles implementing [`PooledResource`]; they may opt into lifecycle
//! notifications by exposing [`PoolHooks`].
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use standby_pool::{
//!     Dormancy, ExecutionContext, GrowthPolicy, PoolManager, PoolSpec, PooledResource,
//!     ResourceFactory,
//! };
//!
//! #[derive(Clone, Debug)]
//! struct Projectile {
//!     id: u32,
//!     visible: Rc<Cell<bool>>,
//! }
//!
//! impl PooledResource for Projectile {
//!     type Kind = &'static str;
//!     type Placement = (f32, f32);
//!
//!     fn kind(&self) -> &'static str {
//!         "projectile"
//!     }
//!
//!     fn is_same_resource(&self, other: &Self) -> bool {
//!         self.id == other.id
//!     }
//!
//!     fn set_visible(&self, visible: bool) {
//!         self.visible.set(visible);
//!     }
//!
//!     fn set_interaction_enabled(&self, _enabled: bool) {}
//!     fn set_dormancy(&self, _dormancy: Dormancy) {}
//!     fn apply_placement(&self, _placement: (f32, f32)) {}
//! }
//!
//! #[derive(Debug, Default)]
//! struct Spawner {
//!     next_id: u32,
//! }
//!
//! impl ResourceFactory<Projectile> for Spawner {
//!     fn create(&mut self, _kind: &&'static str, _context: ExecutionContext) -> Projectile {
//!         self.next_id += 1;
//!
//!         Projectile {
//!             id: self.next_id,
//!             visible: Rc::new(Cell::new(true)),
//!         }
//!     }
//!
//!     fn destroy(&mut self, _resource: Projectile) {}
//! }
//!
//! let mut manager = PoolManager::<Projectile, Spawner>::new();
//!
//! manager.activate(
//!     [PoolSpec::builder("projectile")
//!         .initial_count(2)
//!         .growth_policy(GrowthPolicy::Fixed)
//!         .build()],
//!     Spawner::default(),
//!     ExecutionContext::Server,
//! );
//!
//! let first = manager.acquire_with_placement(&"projectile", (1.0, 2.0)).unwrap();
//! let second = manager.acquire(&"projectile").unwrap();
//! assert!(first.visible.get());
//!
//! // Both instances are in use and the pool may not grow.
//! assert!(manager.acquire(&"projectile").is_none());
//!
//! assert!(manager.return_to_pool(&first));
//! assert!(!first.visible.get());
//!
//! assert!(manager.return_to_pool(&second));
//! ```

mod builder;
mod error;
mod factory;
mod manager;
mod pending;
mod pool;
mod pool_spec;
mod registry;
mod resource;
mod settings;
mod token;

#[cfg(test)]
mod test_support;

pub use builder::*;
pub use error::Error;
#[cfg(test)]
pub(crate) use factory::MockResourceFactory;
pub use factory::ResourceFactory;
pub use manager::PoolManager;
pub use pool::{Pool, PoolStats};
pub use pool_spec::*;
pub use registry::PoolRegistry;
pub use resource::{PoolHooks, PooledResource};
pub use settings::*;
pub use token::RequestToken;
