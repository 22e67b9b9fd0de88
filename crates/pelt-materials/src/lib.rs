//! Material system: named shader properties, render queue ordering, per-renderer
//! override blocks, and a generational material store.

mod block;
mod material;
mod store;

pub use block::{PropertyBlock, resolve_float, resolve_vector};
pub use material::{Material, MaterialError, TRANSPARENT_QUEUE};
pub use store::{MaterialHandle, MaterialStore};
