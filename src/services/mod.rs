//! 业务服务层

pub mod health;
pub mod inventory;
pub mod logs;
pub mod system;
