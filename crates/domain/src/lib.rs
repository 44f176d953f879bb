//! 社团平台核心领域模型
//!
//! 包含用户、社团、帖子、分类等核心实体，统一的错误码目录，以及分页等共享值对象。

pub mod entities;
pub mod errors;
pub mod pagination;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use pagination::{Page, PageRequest};
pub use value_objects::*;
