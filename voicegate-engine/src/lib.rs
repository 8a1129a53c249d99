pub mod dialogue;
pub mod policy;
pub mod traits;
pub mod turn;
