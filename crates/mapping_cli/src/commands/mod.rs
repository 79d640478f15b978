pub mod check;
pub mod dir;
pub mod job;
pub mod ops;
pub mod validate;
