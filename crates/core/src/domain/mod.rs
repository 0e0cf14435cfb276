pub mod context;
pub mod fee;
pub mod result;
