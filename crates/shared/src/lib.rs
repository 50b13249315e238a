//! Wire and domain types shared by the voting client and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
