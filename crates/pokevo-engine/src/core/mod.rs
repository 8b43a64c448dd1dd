//! Static battle data: stats, types, natures, abilities, moves and species.
//!
//! Everything in this module is immutable lookup data. Live battle state lives in
//! [`crate::engine`].

pub use self::{ability::*, element::*, moves::*, nature::*, species::*, stat::*, status::*};

mod ability;
mod element;
mod moves;
mod nature;
mod species;
mod stat;
mod status;
