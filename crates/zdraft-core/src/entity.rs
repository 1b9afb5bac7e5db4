//! 实体标识和管理
//!
//! ID 由文档持有的 `IdAllocator` 单调分配，不使用进程级全局计数器。

use crate::geometry::{EntityKind, Geometry};
use crate::math::{BoundingBox2, Point2};
use crate::properties::Properties;
use crate::snap::SnapPoint;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// 实体唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// 空ID（无效）
    pub const NULL: EntityId = EntityId(0);

    /// 检查是否为空ID
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 实体ID分配器
///
/// 从 1 开始单调递增。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// 分配新ID
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// 登记外部已有的ID（例如文件加载），保证之后分配的ID不会冲突
    pub fn observe(&mut self, id: EntityId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }

    /// 下一个将被分配的ID
    pub fn peek(&self) -> EntityId {
        EntityId(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// 共享实体句柄
///
/// 撤销历史、属性面板、约束参数表可能同时持有同一个实体。
pub type SharedEntity = Rc<RefCell<Entity>>;

/// CAD实体
///
/// 一个实体包含几何数据和属性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// 唯一标识符
    pub id: EntityId,

    /// 几何类型和数据
    pub geometry: Geometry,

    /// 视觉属性
    pub properties: Properties,
}

impl Entity {
    /// 创建新实体
    pub fn new(ids: &mut IdAllocator, geometry: impl Into<Geometry>) -> Self {
        Self {
            id: ids.allocate(),
            geometry: geometry.into(),
            properties: Properties::default(),
        }
    }

    /// 使用指定的属性
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// 转为共享句柄
    pub fn into_shared(self) -> SharedEntity {
        Rc::new(RefCell::new(self))
    }

    pub fn kind(&self) -> EntityKind {
        self.geometry.kind()
    }

    /// 获取包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        self.geometry.bounding_box()
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.geometry.hit_test(point, tolerance)
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        self.geometry.snap_points()
    }

    /// 深拷贝几何与全部属性，分配新的身份
    ///
    /// 块参照仍指向同一个共享的块定义。
    pub fn duplicate(&self, ids: &mut IdAllocator) -> Entity {
        Entity {
            id: ids.allocate(),
            geometry: self.geometry.clone(),
            properties: self.properties.clone(),
        }
    }

    // === 属性设置 ===

    pub fn set_layer(&mut self, layer: impl Into<String>) {
        self.properties.layer = layer.into();
    }

    pub fn set_color(&mut self, color: crate::properties::Color) {
        self.properties.color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.properties.line_width = width;
    }

    pub fn set_line_type(&mut self, line_type: crate::properties::LineType) {
        self.properties.line_type = line_type;
    }

    pub fn set_group(&mut self, group: Option<crate::properties::GroupId>) {
        self.properties.group = group;
    }
}
