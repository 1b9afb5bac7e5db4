//! 约束参数表
//!
//! 把被约束实体的自由参数展开到一个连续的 `f64` 缓冲区，供数值求解器读写；
//! 求解完成后再把缓冲区写回实体。
//!
//! 每种实体的参数布局固定：
//! - 线段: `[sx, sy, ex, ey]`
//! - 圆: `[cx, cy, r]`
//! - 圆弧: `[cx, cy, r, start_angle, end_angle]`
//! - 矩形: `[c1x, c1y, c2x, c2y]`
//! - 多段线: `[x0, y0, x1, y1, ...]`
//!
//! 起始下标只对当前参数表实例有效，参数表按求解会话临时构建。

use crate::entity::{Entity, EntityId, SharedEntity};
use crate::error::ParameterError;
use crate::geometry::{EntityKind, Geometry};
use crate::math::{polar, Point2};
use crate::parametric::{ConstraintSource, FeatureType, GeometryRef};
use std::collections::HashMap;

/// 参数布局类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Line,
    Circle,
    Arc,
    Rectangle,
    Polyline { closed: bool },
}

impl ParamKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            ParamKind::Line => EntityKind::Line,
            ParamKind::Circle => EntityKind::Circle,
            ParamKind::Arc => EntityKind::Arc,
            ParamKind::Rectangle => EntityKind::Rectangle,
            ParamKind::Polyline { .. } => EntityKind::Polyline,
        }
    }
}

/// 一个实体在缓冲区中占用的连续区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterBlock {
    pub entity_id: EntityId,
    pub start: usize,
    pub count: usize,
    pub kind: ParamKind,
}

impl ParameterBlock {
    fn point_count(&self) -> usize {
        self.count / 2
    }
}

/// 特征在缓冲区中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamIndex {
    /// 特征直接对应 `[i, i+1, ...]`
    Direct(usize),
    /// 特征由其他参数推导，没有独立的参数；`base` 为所属实体参数区间的起点
    Derived { base: usize },
}

/// 约束参数表
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    values: Vec<f64>,
    blocks: Vec<ParameterBlock>,
    index: HashMap<EntityId, usize>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只登记被启用约束引用的实体，保持文档顺序
    pub fn build_from_entities(
        entities: &[SharedEntity],
        constraints: &impl ConstraintSource,
    ) -> Self {
        let referenced = constraints.referenced_entities();
        let mut table = Self::new();
        for entity in entities {
            let entity = entity.borrow();
            if referenced.contains(&entity.id) {
                table.register_entity(&entity);
            }
        }
        tracing::debug!(
            blocks = table.blocks.len(),
            parameters = table.values.len(),
            "parameter table built"
        );
        table
    }

    /// 登记实体并返回其参数起始下标
    ///
    /// 没有参数布局的实体返回 None；重复登记返回已有的起始下标。
    pub fn register_entity(&mut self, entity: &Entity) -> Option<usize> {
        match self.try_register_entity(entity) {
            Ok(start) => Some(start),
            Err(err) => {
                tracing::trace!(entity = %entity.id, %err, "entity skipped");
                None
            }
        }
    }

    /// 同 `register_entity`，但对没有参数布局的实体返回
    /// `ParameterError::UnsupportedEntity`
    pub fn try_register_entity(&mut self, entity: &Entity) -> Result<usize, ParameterError> {
        if let Some(block) = self.block(entity.id) {
            return Ok(block.start);
        }

        let (kind, params): (ParamKind, Vec<f64>) = match &entity.geometry {
            Geometry::Line(line) => (
                ParamKind::Line,
                vec![line.start.x, line.start.y, line.end.x, line.end.y],
            ),
            Geometry::Circle(circle) => (
                ParamKind::Circle,
                vec![circle.center.x, circle.center.y, circle.radius],
            ),
            Geometry::Arc(arc) => (
                ParamKind::Arc,
                vec![
                    arc.center().x,
                    arc.center().y,
                    arc.radius(),
                    arc.start_angle(),
                    arc.end_angle(),
                ],
            ),
            Geometry::Rectangle(rect) => (
                ParamKind::Rectangle,
                vec![rect.corner1.x, rect.corner1.y, rect.corner2.x, rect.corner2.y],
            ),
            Geometry::Polyline(polyline) => (
                ParamKind::Polyline {
                    closed: polyline.closed,
                },
                polyline.points.iter().flat_map(|p| [p.x, p.y]).collect(),
            ),
            Geometry::Spline(_)
            | Geometry::Ellipse(_)
            | Geometry::Text(_)
            | Geometry::Hatch(_)
            | Geometry::BlockReference(_)
            | Geometry::LinearDimension(_)
            | Geometry::RadialDimension(_)
            | Geometry::AngularDimension(_)
            | Geometry::Leader(_) => {
                return Err(ParameterError::UnsupportedEntity(entity.kind()));
            }
        };

        let start = self.values.len();
        let block = ParameterBlock {
            entity_id: entity.id,
            start,
            count: params.len(),
            kind,
        };
        tracing::debug!(entity = %entity.id, start, count = block.count, "entity registered");

        self.values.extend(params);
        self.index.insert(entity.id, self.blocks.len());
        self.blocks.push(block);
        Ok(start)
    }

    fn require_block(&self, entity_id: EntityId) -> Result<&ParameterBlock, ParameterError> {
        self.block(entity_id)
            .ok_or(ParameterError::EntityNotRegistered(entity_id))
    }

    /// 特征的参数下标
    pub fn parameter_index(
        &self,
        geometry_ref: &GeometryRef,
    ) -> Result<ParamIndex, ParameterError> {
        let block = self.require_block(geometry_ref.entity_id)?;
        let start = block.start;
        let index = geometry_ref.feature_index;
        let out_of_range = || ParameterError::FeatureOutOfRange {
            entity: block.entity_id,
            feature_type: geometry_ref.feature_type,
            index,
        };

        match (block.kind, geometry_ref.feature_type) {
            (ParamKind::Line, FeatureType::Point) => match index {
                0 | 1 => Ok(ParamIndex::Direct(start + 2 * index)),
                _ => Err(out_of_range()),
            },
            (ParamKind::Line, FeatureType::Line) => match index {
                0 => Ok(ParamIndex::Direct(start)),
                _ => Err(out_of_range()),
            },
            (ParamKind::Circle, FeatureType::Point | FeatureType::Circle) => match index {
                0 => Ok(ParamIndex::Direct(start)),
                _ => Err(out_of_range()),
            },
            (ParamKind::Arc, FeatureType::Point) => match index {
                0 => Ok(ParamIndex::Direct(start)),
                1 | 2 => Ok(ParamIndex::Derived { base: start }),
                _ => Err(out_of_range()),
            },
            (ParamKind::Arc, FeatureType::Circle) => match index {
                0 => Ok(ParamIndex::Direct(start)),
                _ => Err(out_of_range()),
            },
            (ParamKind::Rectangle, FeatureType::Point) => match index {
                0 | 2 => Ok(ParamIndex::Direct(start + index)),
                1 | 3 => Ok(ParamIndex::Derived { base: start }),
                _ => Err(out_of_range()),
            },
            (ParamKind::Rectangle, FeatureType::Line) => match index {
                0..=3 => Ok(ParamIndex::Derived { base: start }),
                _ => Err(out_of_range()),
            },
            (ParamKind::Polyline { .. }, FeatureType::Point) => {
                if index < block.point_count() {
                    Ok(ParamIndex::Direct(start + 2 * index))
                } else {
                    Err(out_of_range())
                }
            }
            (ParamKind::Polyline { closed }, FeatureType::Line) => {
                let n = block.point_count();
                let segments = match n {
                    0 | 1 => 0,
                    n if closed => n,
                    n => n - 1,
                };
                if index < segments {
                    Ok(ParamIndex::Direct(start + 2 * index))
                } else {
                    Err(out_of_range())
                }
            }
            (kind, feature_type) => Err(ParameterError::FeatureTypeMismatch {
                entity: block.entity_id,
                kind: kind.entity_kind(),
                feature_type,
            }),
        }
    }

    fn point_at(&self, i: usize) -> Point2 {
        Point2::new(self.values[i], self.values[i + 1])
    }

    /// 点特征的当前位置；推导特征按当前参数重新计算
    pub fn point_position(&self, geometry_ref: &GeometryRef) -> Result<Point2, ParameterError> {
        if geometry_ref.feature_type != FeatureType::Point {
            let block = self.require_block(geometry_ref.entity_id)?;
            return Err(ParameterError::FeatureTypeMismatch {
                entity: block.entity_id,
                kind: block.kind.entity_kind(),
                feature_type: geometry_ref.feature_type,
            });
        }

        match self.parameter_index(geometry_ref)? {
            ParamIndex::Direct(i) => Ok(self.point_at(i)),
            ParamIndex::Derived { base } => {
                let block = self.require_block(geometry_ref.entity_id)?;
                let v = &self.values[base..base + block.count];
                let point = match (block.kind, geometry_ref.feature_index) {
                    (ParamKind::Arc, 1) => polar(&Point2::new(v[0], v[1]), v[2], v[3]),
                    (ParamKind::Arc, _) => polar(&Point2::new(v[0], v[1]), v[2], v[4]),
                    (ParamKind::Rectangle, 1) => Point2::new(v[2], v[1]),
                    _ => Point2::new(v[0], v[3]),
                };
                Ok(point)
            }
        }
    }

    /// 线特征的两个端点
    pub fn line_endpoints(
        &self,
        geometry_ref: &GeometryRef,
    ) -> Result<(Point2, Point2), ParameterError> {
        let block = self.require_block(geometry_ref.entity_id)?;
        if geometry_ref.feature_type != FeatureType::Line {
            return Err(ParameterError::FeatureTypeMismatch {
                entity: block.entity_id,
                kind: block.kind.entity_kind(),
                feature_type: geometry_ref.feature_type,
            });
        }
        self.parameter_index(geometry_ref)?;

        let i = geometry_ref.feature_index;
        let (a, b) = match block.kind {
            ParamKind::Line => (0, 1),
            ParamKind::Rectangle => (i, (i + 1) % 4),
            _ => (i, (i + 1) % block.point_count()),
        };
        let id = geometry_ref.entity_id;
        Ok((
            self.point_position(&GeometryRef::point(id, a))?,
            self.point_position(&GeometryRef::point(id, b))?,
        ))
    }

    /// 圆特征的圆心和半径
    pub fn circle_data(&self, geometry_ref: &GeometryRef) -> Result<(Point2, f64), ParameterError> {
        let block = self.require_block(geometry_ref.entity_id)?;
        if geometry_ref.feature_type != FeatureType::Circle {
            return Err(ParameterError::FeatureTypeMismatch {
                entity: block.entity_id,
                kind: block.kind.entity_kind(),
                feature_type: geometry_ref.feature_type,
            });
        }
        match self.parameter_index(geometry_ref)? {
            ParamIndex::Direct(i) => Ok((self.point_at(i), self.values[i + 2])),
            ParamIndex::Derived { .. } => Err(ParameterError::FeatureTypeMismatch {
                entity: block.entity_id,
                kind: block.kind.entity_kind(),
                feature_type: geometry_ref.feature_type,
            }),
        }
    }

    /// 把缓冲区的值写回实体
    ///
    /// 实体未登记、类型已改变或多段线顶点数不一致时不写入，返回 false。
    pub fn apply_to_entity(&self, entity: &mut Entity) -> bool {
        let Some(block) = self.block(entity.id).copied() else {
            return false;
        };
        let v = &self.values[block.start..block.start + block.count];

        match (&mut entity.geometry, block.kind) {
            (Geometry::Line(line), ParamKind::Line) => {
                line.start = Point2::new(v[0], v[1]);
                line.end = Point2::new(v[2], v[3]);
            }
            (Geometry::Circle(circle), ParamKind::Circle) => {
                circle.center = Point2::new(v[0], v[1]);
                circle.radius = v[2];
            }
            (Geometry::Arc(arc), ParamKind::Arc) => {
                arc.set_center(Point2::new(v[0], v[1]));
                arc.set_radius(v[2]);
                arc.set_angles(v[3], v[4]);
            }
            (Geometry::Rectangle(rect), ParamKind::Rectangle) => {
                rect.corner1 = Point2::new(v[0], v[1]);
                rect.corner2 = Point2::new(v[2], v[3]);
            }
            (Geometry::Polyline(polyline), ParamKind::Polyline { .. })
                if polyline.points.len() == block.point_count() =>
            {
                for (point, xy) in polyline.points.iter_mut().zip(v.chunks_exact(2)) {
                    *point = Point2::new(xy[0], xy[1]);
                }
            }
            (geometry, kind) => {
                tracing::warn!(
                    entity = %entity.id,
                    registered = %kind.entity_kind(),
                    current = %geometry.kind(),
                    "entity no longer matches its parameter layout"
                );
                return false;
            }
        }
        true
    }

    /// 写回一组实体，返回成功写回的数量；未登记的实体跳过
    pub fn apply_to_entities(&self, entities: &[SharedEntity]) -> usize {
        let applied = entities
            .iter()
            .filter(|entity| self.apply_to_entity(&mut entity.borrow_mut()))
            .count();
        tracing::debug!(applied, "parameters applied");
        applied
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// 下标越界时返回 false
    pub fn set_value(&mut self, index: usize, value: f64) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn blocks(&self) -> &[ParameterBlock] {
        &self.blocks
    }

    pub fn block(&self, entity_id: EntityId) -> Option<&ParameterBlock> {
        self.index.get(&entity_id).map(|&i| &self.blocks[i])
    }

    pub fn contains(&self, entity_id: EntityId) -> bool {
        self.index.contains_key(&entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::IdAllocator;
    use crate::geometry::{Arc, Circle, Ellipse, Line, Polyline, Rectangle};
    use crate::math::points_approx_eq;
    use crate::parametric::{constraints, ConstraintSystem};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_line_register_index_apply() {
        let mut ids = IdAllocator::new();
        let mut line = Entity::new(&mut ids, Line::new(p(0.0, 0.0), p(10.0, 0.0)));
        let mut table = ParameterTable::new();

        assert_eq!(table.register_entity(&line), Some(0));
        assert_eq!(table.len(), 4);
        assert_eq!(table.values(), &[0.0, 0.0, 10.0, 0.0]);

        let end = GeometryRef::point(line.id, 1);
        assert_eq!(table.parameter_index(&end), Ok(ParamIndex::Direct(2)));

        assert!(table.set_value(2, 20.0));
        assert!(table.set_value(3, 5.0));
        assert!(table.apply_to_entity(&mut line));
        let Geometry::Line(l) = &line.geometry else {
            panic!("expected a line");
        };
        assert_eq!(l.end, p(20.0, 5.0));
        assert_eq!(l.start, p(0.0, 0.0));
    }

    #[test]
    fn test_reregistration_returns_existing_start() {
        let mut ids = IdAllocator::new();
        let a = Entity::new(&mut ids, Circle::new(p(0.0, 0.0), 1.0));
        let b = Entity::new(&mut ids, Line::new(p(0.0, 0.0), p(1.0, 1.0)));
        let mut table = ParameterTable::new();
        assert_eq!(table.register_entity(&a), Some(0));
        assert_eq!(table.register_entity(&b), Some(3));
        assert_eq!(table.register_entity(&a), Some(0));
        assert_eq!(table.len(), 7);
        assert_eq!(table.blocks().len(), 2);
    }

    #[test]
    fn test_unsupported_entity_is_not_registered() {
        let mut ids = IdAllocator::new();
        let ellipse = Entity::new(&mut ids, Ellipse::new(p(0.0, 0.0), 2.0, 1.0, 0.0));
        let mut table = ParameterTable::new();
        assert_eq!(table.register_entity(&ellipse), None);
        assert_eq!(
            table.try_register_entity(&ellipse),
            Err(ParameterError::UnsupportedEntity(EntityKind::Ellipse))
        );
        assert!(table.is_empty());
        assert_eq!(
            table.parameter_index(&GeometryRef::point(ellipse.id, 0)),
            Err(ParameterError::EntityNotRegistered(ellipse.id))
        );
    }

    #[test]
    fn test_arc_endpoints_are_derived() {
        let mut ids = IdAllocator::new();
        let arc = Entity::new(&mut ids, Arc::new(p(1.0, 1.0), 2.0, 0.0, FRAC_PI_2));
        let mut table = ParameterTable::new();
        table.register_entity(&arc);

        assert_eq!(
            table.parameter_index(&GeometryRef::point(arc.id, 2)),
            Ok(ParamIndex::Derived { base: 0 })
        );
        let end = table.point_position(&GeometryRef::point(arc.id, 2)).unwrap();
        assert!(points_approx_eq(&end, &p(1.0, 3.0), 1e-12));
        let start = table.point_position(&GeometryRef::point(arc.id, 1)).unwrap();
        assert!(points_approx_eq(&start, &p(3.0, 1.0), 1e-12));

        let (center, radius) = table.circle_data(&GeometryRef::circle(arc.id, 0)).unwrap();
        assert_eq!(center, p(1.0, 1.0));
        assert_eq!(radius, 2.0);
    }

    #[test]
    fn test_arc_apply_normalizes_angles() {
        let mut ids = IdAllocator::new();
        let mut arc = Entity::new(&mut ids, Arc::new(p(0.0, 0.0), 1.0, 0.0, PI));
        let mut table = ParameterTable::new();
        table.register_entity(&arc);
        table.values_mut()[3] = -FRAC_PI_2;
        assert!(table.apply_to_entity(&mut arc));
        let Geometry::Arc(a) = &arc.geometry else {
            panic!("expected an arc");
        };
        assert!((a.start_angle() - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_rectangle_features() {
        let mut ids = IdAllocator::new();
        let rect = Entity::new(&mut ids, Rectangle::new(p(0.0, 0.0), p(4.0, 2.0)));
        let mut table = ParameterTable::new();
        table.register_entity(&rect);

        assert_eq!(
            table.parameter_index(&GeometryRef::point(rect.id, 2)),
            Ok(ParamIndex::Direct(2))
        );
        assert_eq!(
            table.parameter_index(&GeometryRef::point(rect.id, 3)),
            Ok(ParamIndex::Derived { base: 0 })
        );
        assert_eq!(
            table.point_position(&GeometryRef::point(rect.id, 1)),
            Ok(p(4.0, 0.0))
        );
        assert_eq!(
            table.line_endpoints(&GeometryRef::line(rect.id, 3)),
            Ok((p(0.0, 2.0), p(0.0, 0.0)))
        );
    }

    #[test]
    fn test_feature_errors() {
        let mut ids = IdAllocator::new();
        let line = Entity::new(&mut ids, Line::new(p(0.0, 0.0), p(1.0, 0.0)));
        let mut table = ParameterTable::new();
        table.register_entity(&line);

        assert_eq!(
            table.parameter_index(&GeometryRef::point(line.id, 2)),
            Err(ParameterError::FeatureOutOfRange {
                entity: line.id,
                feature_type: FeatureType::Point,
                index: 2,
            })
        );
        assert_eq!(
            table.circle_data(&GeometryRef::circle(line.id, 0)),
            Err(ParameterError::FeatureTypeMismatch {
                entity: line.id,
                kind: EntityKind::Line,
                feature_type: FeatureType::Circle,
            })
        );
    }

    #[test]
    fn test_closed_polyline_last_segment_wraps() {
        let mut ids = IdAllocator::new();
        let square = Polyline::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)], true);
        let open = Entity::new(&mut ids, Polyline::new(square.points.clone(), false));
        let closed = Entity::new(&mut ids, square);
        let mut table = ParameterTable::new();
        table.register_entity(&open);
        table.register_entity(&closed);

        assert_eq!(
            table.line_endpoints(&GeometryRef::line(closed.id, 3)),
            Ok((p(0.0, 1.0), p(0.0, 0.0)))
        );
        assert!(table.line_endpoints(&GeometryRef::line(open.id, 3)).is_err());
        assert_eq!(
            table.parameter_index(&GeometryRef::point(closed.id, 3)),
            Ok(ParamIndex::Direct(8 + 6))
        );
    }

    #[test]
    fn test_build_registers_only_constrained_entities() {
        let mut ids = IdAllocator::new();
        let entities: Vec<SharedEntity> = vec![
            Entity::new(&mut ids, Line::new(p(0.0, 0.0), p(1.0, 0.0))).into_shared(),
            Entity::new(&mut ids, Circle::new(p(5.0, 5.0), 1.0)).into_shared(),
            Entity::new(&mut ids, Line::new(p(0.0, 1.0), p(1.0, 1.0))).into_shared(),
        ];
        let first = entities[0].borrow().id;
        let circle = entities[1].borrow().id;
        let last = entities[2].borrow().id;

        let mut system = ConstraintSystem::new();
        system.add_constraint(constraints::parallel(
            GeometryRef::line(last, 0),
            GeometryRef::line(first, 0),
        ));
        let disabled =
            system.add_constraint(constraints::radius(GeometryRef::circle(circle, 0), 2.0));
        system.set_enabled(&disabled, false);

        let mut table = ParameterTable::build_from_entities(&entities, &system);
        assert_eq!(table.len(), 8);
        assert!(!table.contains(circle));
        // 按文档顺序登记
        assert_eq!(table.block(first).map(|b| b.start), Some(0));
        assert_eq!(table.block(last).map(|b| b.start), Some(4));

        table.values_mut()[5] = 3.0;
        assert_eq!(table.apply_to_entities(&entities), 2);
        let updated = entities[2].borrow();
        let Geometry::Line(l) = &updated.geometry else {
            panic!("expected a line");
        };
        assert_eq!(l.start, p(0.0, 3.0));
    }
}
