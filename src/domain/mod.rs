pub mod artifact;
pub mod game;
pub mod vote;

pub use artifact::*;
pub use game::*;
pub use vote::*;
