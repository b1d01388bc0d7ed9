//! The standard conftree type catalog.
//!
//! Everything here is data layered on the four engine shapes: scalar
//! leaves in [`values`], media composites in [`assets`], audience
//! gates in [`filters`] and command/trigger/response composites in
//! [`functions`]. A registry with the full set installed can rebuild
//! any tree these constructors produce from its stored descriptor.
//!
//! ```ignore
//! let mut registry = Registry::new();
//! conftree_catalog::register_defaults(&mut registry)?;
//! let command = registry.build("Command")?;
//! ```

pub mod assets;
pub mod filters;
pub mod functions;
pub mod values;

pub use values::KEYCODES;

use conftree::{Registry, RegistryError};

/// Install the whole standard catalog into `registry`.
pub fn register_defaults(registry: &mut Registry) -> Result<(), RegistryError> {
    values::register(registry)?;
    assets::register(registry)?;
    filters::register(registry)?;
    functions::register(registry)?;

    Ok(())
}
