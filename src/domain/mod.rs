//! 领域模型

pub mod container;
pub mod system;
