use serde::{Deserialize, Serialize};

use crate::value_objects::{CategoryId, Timestamp};

/// 社团分类，由迁移脚本预置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: Timestamp,
}
