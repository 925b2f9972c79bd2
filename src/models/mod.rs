//! 数据模型模块
//! 用户账户与场所（健身房、水疗、活动）

pub mod auth;
pub mod place;
pub mod user;
