pub mod burst;
pub mod identity;
pub mod keys;
pub mod query;

pub use burst::Decision;
pub use identity::Identity;
