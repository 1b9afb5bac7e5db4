//! 块定义与块参照
//!
//! 块定义通过 `Rc<RefCell<_>>` 共享：多个块参照指向同一个定义，
//! 修改定义（增删或复制其中的实体）会立即反映到所有参照上，
//! 不存在写时复制。块参照的世界几何始终由
//! (定义, 插入点, 旋转, 比例) 实时推导，不缓存世界坐标副本。

use super::Geometry;
use crate::entity::{Entity, IdAllocator};
use crate::math::{
    angles_approx_eq, normalize_angle, points_approx_eq, BoundingBox2, Point2, Vector2,
};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis, Transform2D};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// 共享的块定义句柄
pub type BlockHandle = Rc<RefCell<BlockDefinition>>;

/// 块定义：名称、基点、定义空间中的实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,
    pub base: Point2,
    pub entities: Vec<Entity>,
}

impl BlockDefinition {
    pub fn new(name: impl Into<String>, base: Point2) -> Self {
        Self {
            name: name.into(),
            base,
            entities: Vec::new(),
        }
    }

    pub fn into_handle(self) -> BlockHandle {
        Rc::new(RefCell::new(self))
    }

    /// 添加几何，分配新实体
    pub fn add_geometry(
        &mut self,
        ids: &mut IdAllocator,
        geometry: impl Into<Geometry>,
    ) -> &Entity {
        let index = self.entities.len();
        self.entities.push(Entity::new(ids, geometry));
        &self.entities[index]
    }

    /// 复制定义中已有的实体
    pub fn duplicate_entity(&mut self, ids: &mut IdAllocator, index: usize) -> Option<&Entity> {
        let copy = self.entities.get(index)?.duplicate(ids);
        self.entities.push(copy);
        self.entities.last()
    }

    /// 定义空间包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::empty();
        for entity in &self.entities {
            bbox.merge(&entity.bounding_box());
        }
        bbox
    }
}

/// 块参照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockReference {
    definition: BlockHandle,
    insert: Point2,
    rotation: f64,
    scale: f64,
}

impl BlockReference {
    pub fn new(definition: BlockHandle, insert: Point2, rotation: f64, scale: f64) -> Self {
        Self {
            definition,
            insert,
            rotation: normalize_angle(rotation),
            scale,
        }
    }

    pub fn definition(&self) -> &BlockHandle {
        &self.definition
    }

    pub fn insert(&self) -> Point2 {
        self.insert
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    pub fn set_insert(&mut self, insert: Point2) {
        self.insert = insert;
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = normalize_angle(rotation);
    }

    pub fn set_scale_factor(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// 定义空间 -> 世界空间 变换
    pub fn transform(&self) -> Transform2D {
        Transform2D::new(
            self.definition.borrow().base,
            self.insert,
            self.rotation,
            self.scale,
        )
    }

    /// 世界空间中的实体副本（分配新ID）
    pub fn explode(&self, ids: &mut IdAllocator) -> Vec<Entity> {
        let definition = self.definition.borrow();
        let origin = Point2::origin();
        definition
            .entities
            .iter()
            .map(|entity| {
                let mut copy = entity.duplicate(ids);
                copy.geometry.translate(&(origin - definition.base));
                copy.geometry.scale(&origin, self.scale);
                copy.geometry.rotate(&origin, self.rotation);
                copy.geometry.translate(&self.insert.coords);
                copy
            })
            .collect()
    }

    /// 各实体包围盒角点变换后的并集
    pub fn bounding_box(&self) -> BoundingBox2 {
        let transform = self.transform();
        let definition = self.definition.borrow();
        let mut bbox = BoundingBox2::empty();
        for entity in &definition.entities {
            let local = entity.bounding_box();
            if local.is_empty() {
                continue;
            }
            for corner in local.corners() {
                bbox.expand_to_include(&transform.apply(&corner));
            }
        }
        bbox
    }

    /// 查询点逆变换到定义空间，容差按比例缩放后委托给内部实体
    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        let transform = self.transform();
        let (Some(local), Some(local_tolerance)) = (
            transform.apply_inverse(point),
            transform.inverse_length(tolerance),
        ) else {
            return false;
        };
        self.definition
            .borrow()
            .entities
            .iter()
            .any(|entity| entity.hit_test(&local, local_tolerance))
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        let transform = self.transform();
        let mut snaps = vec![SnapPoint::insertion(self.insert)];
        for entity in &self.definition.borrow().entities {
            snaps.extend(
                entity
                    .snap_points()
                    .into_iter()
                    .map(|s| SnapPoint::new(transform.apply(&s.point), s.snap_type)),
            );
        }
        snaps
    }

    pub fn translate(&mut self, offset: &Vector2) {
        self.insert += *offset;
    }

    /// 统一比例取反以翻转内容，旋转角映射为 2α − rotation
    pub fn mirror(&mut self, axis: &MirrorAxis) {
        self.insert = axis.reflect(&self.insert);
        self.scale = -self.scale;
        self.rotation = axis.reflect_angle(self.rotation);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        self.insert = rotate_point(&self.insert, center, angle);
        self.set_rotation(self.rotation + angle);
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        self.insert = scale_point(&self.insert, center, factor);
        self.scale *= factor;
    }

    pub fn approx_eq(&self, other: &BlockReference, tolerance: f64) -> bool {
        Rc::ptr_eq(&self.definition, &other.definition)
            && points_approx_eq(&self.insert, &other.insert, tolerance)
            && angles_approx_eq(self.rotation, other.rotation, tolerance)
            && (self.scale - other.scale).abs() <= tolerance
    }
}

/// 同一个共享定义 + 相同的插入参数
impl PartialEq for BlockReference {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.definition, &other.definition)
            && self.insert == other.insert
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}
