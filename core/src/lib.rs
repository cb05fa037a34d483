//! Rule engine for a grid-based mine-clearing puzzle with arcade extras:
//! combos, consumable power-ups, achievements, and theme bookkeeping.
//!
//! The crate is pure simulation: it consumes discrete input operations
//! through [`GameController`] and produces immutable [`Snapshot`]s plus the
//! [`SaveData`] persistence schema. Rendering, input devices, and file I/O
//! live in the embedding layer.

pub use achievements::*;
pub use board::*;
pub use clock::*;
pub use combo::*;
pub use controller::*;
pub use error::*;
pub use generator::*;
pub use powerup::*;
pub use save::*;
pub use session::*;
pub use snapshot::*;
pub use tile::*;
pub use types::*;

mod achievements;
mod board;
mod clock;
mod combo;
mod controller;
mod error;
mod generator;
mod powerup;
mod save;
mod session;
mod snapshot;
mod tile;
mod types;
