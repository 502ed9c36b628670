/// Core value types shared by every module.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
