//! 图纸文档
//!
//! 持有ID分配器、按插入顺序排列的共享实体、命名块定义和内核配置。

use crate::config::KernelConfig;
use crate::entity::{Entity, EntityId, IdAllocator, SharedEntity};
use crate::error::{KernelError, Result};
use crate::geometry::{BlockDefinition, BlockHandle, BlockReference, Geometry};
use crate::intersect;
use crate::math::{BoundingBox2, Point2};
use crate::properties::Properties;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct Drawing {
    ids: IdAllocator,
    entities: Vec<SharedEntity>,
    blocks: BTreeMap<String, BlockHandle>,
    config: KernelConfig,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: KernelConfig) {
        self.config = config;
    }

    /// ID分配器（向块定义添加实体时使用）
    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// 添加几何，使用默认属性
    pub fn add(&mut self, geometry: impl Into<Geometry>) -> SharedEntity {
        self.add_with_properties(geometry, Properties::default())
    }

    pub fn add_with_properties(
        &mut self,
        geometry: impl Into<Geometry>,
        properties: Properties,
    ) -> SharedEntity {
        let entity = Entity::new(&mut self.ids, geometry).with_properties(properties);
        self.push(entity)
    }

    /// 添加外部构造的实体（保留其ID）
    pub fn add_entity(&mut self, entity: Entity) -> SharedEntity {
        self.ids.observe(entity.id);
        self.push(entity)
    }

    fn push(&mut self, entity: Entity) -> SharedEntity {
        tracing::debug!(id = %entity.id, kind = %entity.kind(), "entity added");
        let shared = entity.into_shared();
        self.entities.push(shared.clone());
        shared
    }

    fn position(&self, id: EntityId) -> Result<usize> {
        self.entities
            .iter()
            .position(|e| e.borrow().id == id)
            .ok_or(KernelError::EntityNotFound(id))
    }

    pub fn remove(&mut self, id: EntityId) -> Result<SharedEntity> {
        let index = self.position(id)?;
        tracing::debug!(%id, "entity removed");
        Ok(self.entities.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<SharedEntity> {
        self.entities.iter().find(|e| e.borrow().id == id).cloned()
    }

    /// 按插入顺序排列的全部实体
    pub fn entities(&self) -> &[SharedEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// 定义块；同名块已存在时返回已有定义
    pub fn define_block(&mut self, name: impl Into<String>, base: Point2) -> BlockHandle {
        let name = name.into();
        self.blocks
            .entry(name.clone())
            .or_insert_with(|| {
                tracing::debug!(block = %name, "block defined");
                BlockDefinition::new(name.clone(), base).into_handle()
            })
            .clone()
    }

    pub fn block(&self, name: &str) -> Option<BlockHandle> {
        self.blocks.get(name).cloned()
    }

    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// 插入块参照
    pub fn insert_block(
        &mut self,
        name: &str,
        insert: Point2,
        rotation: f64,
        scale: f64,
    ) -> Result<SharedEntity> {
        let definition = self
            .block(name)
            .ok_or_else(|| KernelError::BlockNotFound(name.to_string()))?;
        Ok(self.add(BlockReference::new(definition, insert, rotation, scale)))
    }

    /// 复制实体（新ID，追加到末尾）
    pub fn duplicate(&mut self, id: EntityId) -> Result<SharedEntity> {
        let source = self.get(id).ok_or(KernelError::EntityNotFound(id))?;
        let copy = source.borrow().duplicate(&mut self.ids);
        Ok(self.push(copy))
    }

    /// 分解块参照或多段线，原实体被分解结果原位替换
    ///
    /// 其他类型的实体不可分解，返回空列表且不修改文档。
    pub fn explode(&mut self, id: EntityId) -> Result<Vec<SharedEntity>> {
        let index = self.position(id)?;
        let parts: Vec<Entity> = {
            let entity = self.entities[index].borrow();
            match &entity.geometry {
                Geometry::BlockReference(reference) => reference.explode(&mut self.ids),
                Geometry::Polyline(polyline) => polyline
                    .explode()
                    .into_iter()
                    .map(|g| {
                        Entity::new(&mut self.ids, g).with_properties(entity.properties.clone())
                    })
                    .collect(),
                _ => return Ok(Vec::new()),
            }
        };

        tracing::debug!(%id, parts = parts.len(), "entity exploded");
        let shared: Vec<SharedEntity> = parts.into_iter().map(Entity::into_shared).collect();
        self.entities.splice(index..=index, shared.iter().cloned());
        Ok(shared)
    }

    /// 点选：返回拾取容差内的实体ID（按插入顺序）
    pub fn hit_test(&self, point: &Point2) -> Vec<EntityId> {
        let tolerance = self.config.pick_tolerance;
        self.entities
            .iter()
            .filter_map(|e| {
                let entity = e.borrow();
                entity.hit_test(point, tolerance).then_some(entity.id)
            })
            .collect()
    }

    /// 全部实体的包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::empty();
        for entity in &self.entities {
            bbox.merge(&entity.borrow().bounding_box());
        }
        bbox
    }

    /// 两个实体的交点
    pub fn intersections(&self, a: EntityId, b: EntityId) -> Result<Vec<Point2>> {
        let first = self.get(a).ok_or(KernelError::EntityNotFound(a))?;
        let second = self.get(b).ok_or(KernelError::EntityNotFound(b))?;
        let first = first.borrow();
        let second = second.borrow();
        Ok(intersect::intersect_with(
            &first.geometry,
            &second.geometry,
            &self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line, Polyline};
    use crate::properties::Color;

    #[test]
    fn test_add_get_remove() {
        let mut drawing = Drawing::new();
        let line = drawing.add(Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)));
        let id = line.borrow().id;
        assert_eq!(id, EntityId(1));
        assert!(drawing.get(id).is_some());

        drawing.remove(id).unwrap();
        assert!(drawing.is_empty());
        assert!(matches!(
            drawing.remove(id),
            Err(KernelError::EntityNotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn test_hit_test_uses_pick_tolerance() {
        let mut drawing = Drawing::with_config(KernelConfig {
            pick_tolerance: 0.2,
            ..KernelConfig::default()
        });
        let a = drawing.add(Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)));
        drawing.add(Circle::new(Point2::new(50.0, 0.0), 5.0));

        assert_eq!(drawing.hit_test(&Point2::new(5.0, 0.1)), vec![a.borrow().id]);
        assert!(drawing.hit_test(&Point2::new(5.0, 0.5)).is_empty());
    }

    #[test]
    fn test_duplicate_keeps_properties() {
        let mut drawing = Drawing::new();
        let props = Properties::on_layer("轮廓").with_color(Color::RED);
        let original = drawing.add_with_properties(Circle::new(Point2::origin(), 3.0), props);
        let id = original.borrow().id;

        let copy = drawing.duplicate(id).unwrap();
        let copy = copy.borrow();
        assert_ne!(copy.id, id);
        assert_eq!(copy.properties, original.borrow().properties);
        assert_eq!(copy.geometry, original.borrow().geometry);
        assert_eq!(drawing.len(), 2);
    }

    #[test]
    fn test_blocks_and_explode() {
        let mut drawing = Drawing::new();
        let block = drawing.define_block("bolt", Point2::origin());
        let ids = drawing.ids_mut();
        block
            .borrow_mut()
            .add_geometry(ids, Line::new(Point2::origin(), Point2::new(1.0, 0.0)));

        assert!(matches!(
            drawing.insert_block("nut", Point2::origin(), 0.0, 1.0),
            Err(KernelError::BlockNotFound(_))
        ));
        let reference = drawing
            .insert_block("bolt", Point2::new(5.0, 5.0), 0.0, 2.0)
            .unwrap();
        let bbox = drawing.bounding_box();
        assert_eq!(bbox.max, Point2::new(7.0, 5.0));

        let id = reference.borrow().id;
        let parts = drawing.explode(id).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(drawing.len(), 1);
        assert!(drawing.get(id).is_none());
        let existing = drawing.define_block("bolt", Point2::new(9.0, 9.0));
        assert_eq!(existing.borrow().base, Point2::origin());
    }

    #[test]
    fn test_explode_polyline_and_intersections() {
        let mut drawing = Drawing::new();
        let square = drawing.add(Polyline::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 4.0),
                Point2::new(0.0, 4.0),
            ],
            true,
        ));
        let diagonal = drawing.add(Line::new(Point2::new(-1.0, -1.0), Point2::new(5.0, 5.0)));
        let (square_id, diagonal_id) = (square.borrow().id, diagonal.borrow().id);

        let points = drawing.intersections(square_id, diagonal_id).unwrap();
        assert_eq!(points.len(), 2);

        let parts = drawing.explode(square_id).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(drawing.len(), 5);
        // 分解结果保持原位置
        assert_eq!(drawing.entities()[4].borrow().id, diagonal_id);
    }
}
