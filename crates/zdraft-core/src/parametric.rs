//! 参数化约束描述
//!
//! 约束通过 `GeometryRef` 指向某个实体的某个特征（点、线、圆），
//! 参数表据此只收集被启用约束引用的实体。数值求解不在本模块内。
//!
//! 核心组件：
//! - GeometryRef: 实体特征引用
//! - Constraint: 几何特征之间的约束关系
//! - ConstraintSystem: 约束集合及实体反向索引

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 特征类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    /// 点
    Point,
    /// 直线段
    Line,
    /// 圆（圆弧取其所在的圆）
    Circle,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureType::Point => f.write_str("Point"),
            FeatureType::Line => f.write_str("Line"),
            FeatureType::Circle => f.write_str("Circle"),
        }
    }
}

/// 实体特征引用
///
/// 各实体的特征编号：
///
/// | 实体 | 点 | 线 | 圆 |
/// |---|---|---|---|
/// | 线段 | 0 起点, 1 终点 | 0 线段本身 | - |
/// | 圆 | 0 圆心 | - | 0 圆本身 |
/// | 圆弧 | 0 圆心, 1 起点, 2 终点 | - | 0 所在圆 |
/// | 矩形 | 0..3 四个角点 | i 为点 i 到点 i+1 的边 | - |
/// | 多段线 | i 顶点 | i 第 i 段 | - |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeometryRef {
    pub entity_id: EntityId,
    pub feature_type: FeatureType,
    pub feature_index: usize,
}

impl GeometryRef {
    pub fn new(entity_id: EntityId, feature_type: FeatureType, feature_index: usize) -> Self {
        Self {
            entity_id,
            feature_type,
            feature_index,
        }
    }

    pub fn point(entity_id: EntityId, index: usize) -> Self {
        Self::new(entity_id, FeatureType::Point, index)
    }

    pub fn line(entity_id: EntityId, index: usize) -> Self {
        Self::new(entity_id, FeatureType::Line, index)
    }

    pub fn circle(entity_id: EntityId, index: usize) -> Self {
        Self::new(entity_id, FeatureType::Circle, index)
    }
}

impl fmt::Display for GeometryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}]", self.entity_id, self.feature_type, self.feature_index)
    }
}

/// 约束来源
///
/// 参数表构建时只关心哪些实体被启用的约束引用。
pub trait ConstraintSource {
    fn referenced_entities(&self) -> HashSet<EntityId>;
}

/// 约束ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintId(pub u64);

impl ConstraintId {
    pub fn null() -> Self {
        Self(0)
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// 约束类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    /// 距离约束
    Distance,

    /// 角度约束
    Angle,

    /// 水平约束
    Horizontal,

    /// 垂直约束
    Vertical,

    /// 平行约束
    Parallel,

    /// 垂直约束（两条线）
    Perpendicular,

    /// 相等约束
    Equal,

    /// 共点约束
    Coincident,

    /// 相切约束
    Tangent,

    /// 半径约束
    Radius,

    /// 固定约束
    Fixed,
}

/// 约束定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// 约束ID（加入约束系统时分配）
    pub id: ConstraintId,

    /// 约束类型
    pub constraint_type: ConstraintType,

    /// 约束作用的几何特征
    pub targets: Vec<GeometryRef>,

    /// 约束值（对于需要数值的约束）
    pub value: Option<f64>,

    /// 是否启用
    pub enabled: bool,

    /// 约束名称
    pub name: String,
}

impl Constraint {
    /// 创建新约束
    pub fn new(constraint_type: ConstraintType, targets: Vec<GeometryRef>) -> Self {
        Self {
            id: ConstraintId::null(),
            constraint_type,
            targets,
            value: None,
            enabled: true,
            name: String::new(),
        }
    }

    /// 设置约束值
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// 设置名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 启用/禁用约束
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// 目标数量与特征类型是否符合约束类型
    pub fn is_valid(&self) -> bool {
        let all = |ty: FeatureType| self.targets.iter().all(|t| t.feature_type == ty);
        match self.constraint_type {
            ConstraintType::Distance => self.targets.len() == 2 && self.value.is_some(),
            ConstraintType::Angle => {
                self.targets.len() == 2 && self.value.is_some() && all(FeatureType::Line)
            }
            ConstraintType::Horizontal | ConstraintType::Vertical => {
                self.targets.len() == 1 && all(FeatureType::Line)
            }
            ConstraintType::Parallel | ConstraintType::Perpendicular => {
                self.targets.len() == 2 && all(FeatureType::Line)
            }
            ConstraintType::Equal => self.targets.len() == 2,
            ConstraintType::Coincident => self.targets.len() == 2 && all(FeatureType::Point),
            ConstraintType::Tangent => {
                self.targets.len() == 2
                    && self
                        .targets
                        .iter()
                        .any(|t| t.feature_type == FeatureType::Circle)
            }
            ConstraintType::Radius => {
                self.targets.len() == 1 && self.value.is_some() && all(FeatureType::Circle)
            }
            ConstraintType::Fixed => self.targets.len() == 1,
        }
    }
}

/// 约束系统
///
/// 管理约束及 实体 -> 约束 的反向映射。
#[derive(Debug, Clone, Default)]
pub struct ConstraintSystem {
    /// 约束集合
    constraints: HashMap<ConstraintId, Constraint>,

    /// 实体到约束的映射（哪些约束作用于这个实体）
    entity_constraints: HashMap<EntityId, Vec<ConstraintId>>,

    next_id: u64,
}

impl ConstraintSystem {
    /// 创建新的约束系统
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加约束，分配并返回约束ID
    pub fn add_constraint(&mut self, mut constraint: Constraint) -> ConstraintId {
        self.next_id += 1;
        let id = ConstraintId(self.next_id);
        constraint.id = id;

        for target in &constraint.targets {
            let ids = self.entity_constraints.entry(target.entity_id).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        self.constraints.insert(id, constraint);
        id
    }

    /// 移除约束
    pub fn remove_constraint(&mut self, id: &ConstraintId) -> Option<Constraint> {
        let constraint = self.constraints.remove(id)?;
        for target in &constraint.targets {
            if let Some(ids) = self.entity_constraints.get_mut(&target.entity_id) {
                ids.retain(|cid| cid != id);
                if ids.is_empty() {
                    self.entity_constraints.remove(&target.entity_id);
                }
            }
        }
        Some(constraint)
    }

    /// 获取约束
    pub fn get_constraint(&self, id: &ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    /// 获取约束的可变引用
    pub fn get_constraint_mut(&mut self, id: &ConstraintId) -> Option<&mut Constraint> {
        self.constraints.get_mut(id)
    }

    /// 启用/禁用约束；约束不存在时返回 false
    pub fn set_enabled(&mut self, id: &ConstraintId, enabled: bool) -> bool {
        match self.constraints.get_mut(id) {
            Some(constraint) => {
                constraint.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// 获取作用于实体的约束
    pub fn get_entity_constraints(&self, entity_id: &EntityId) -> Vec<&Constraint> {
        self.entity_constraints
            .get(entity_id)
            .map(|ids| ids.iter().filter_map(|id| self.constraints.get(id)).collect())
            .unwrap_or_default()
    }

    /// 获取所有约束
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl ConstraintSource for ConstraintSystem {
    fn referenced_entities(&self) -> HashSet<EntityId> {
        self.constraints
            .values()
            .filter(|c| c.enabled)
            .flat_map(|c| c.targets.iter().map(|t| t.entity_id))
            .collect()
    }
}

/// 预定义约束构造器
pub mod constraints {
    use super::*;

    /// 创建距离约束
    pub fn distance(target1: GeometryRef, target2: GeometryRef, distance: f64) -> Constraint {
        Constraint::new(ConstraintType::Distance, vec![target1, target2])
            .with_value(distance)
            .with_name("Distance")
    }

    /// 创建角度约束
    pub fn angle(line1: GeometryRef, line2: GeometryRef, angle: f64) -> Constraint {
        Constraint::new(ConstraintType::Angle, vec![line1, line2])
            .with_value(angle)
            .with_name("Angle")
    }

    /// 创建水平约束
    pub fn horizontal(line: GeometryRef) -> Constraint {
        Constraint::new(ConstraintType::Horizontal, vec![line]).with_name("Horizontal")
    }

    /// 创建垂直约束
    pub fn vertical(line: GeometryRef) -> Constraint {
        Constraint::new(ConstraintType::Vertical, vec![line]).with_name("Vertical")
    }

    /// 创建平行约束
    pub fn parallel(line1: GeometryRef, line2: GeometryRef) -> Constraint {
        Constraint::new(ConstraintType::Parallel, vec![line1, line2]).with_name("Parallel")
    }

    /// 创建垂直约束（两条线）
    pub fn perpendicular(line1: GeometryRef, line2: GeometryRef) -> Constraint {
        Constraint::new(ConstraintType::Perpendicular, vec![line1, line2])
            .with_name("Perpendicular")
    }

    /// 创建相等约束
    pub fn equal(target1: GeometryRef, target2: GeometryRef) -> Constraint {
        Constraint::new(ConstraintType::Equal, vec![target1, target2]).with_name("Equal")
    }

    /// 创建共点约束
    pub fn coincident(point1: GeometryRef, point2: GeometryRef) -> Constraint {
        Constraint::new(ConstraintType::Coincident, vec![point1, point2]).with_name("Coincident")
    }

    /// 创建相切约束
    pub fn tangent(target1: GeometryRef, target2: GeometryRef) -> Constraint {
        Constraint::new(ConstraintType::Tangent, vec![target1, target2]).with_name("Tangent")
    }

    /// 创建半径约束
    pub fn radius(circle: GeometryRef, radius: f64) -> Constraint {
        Constraint::new(ConstraintType::Radius, vec![circle])
            .with_value(radius)
            .with_name("Radius")
    }

    /// 创建固定约束
    pub fn fixed(target: GeometryRef) -> Constraint {
        Constraint::new(ConstraintType::Fixed, vec![target]).with_name("Fixed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_ref_json_round_trip() {
        let r = GeometryRef::point(EntityId(7), 2);
        let json = serde_json::to_string(&r).unwrap();
        let back: GeometryRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
        assert_eq!(r.to_string(), "#7.Point[2]");
    }

    #[test]
    fn test_constraint_system() {
        let mut system = ConstraintSystem::new();
        let a = EntityId(1);
        let b = EntityId(2);

        let c1 = system.add_constraint(constraints::coincident(
            GeometryRef::point(a, 1),
            GeometryRef::point(b, 0),
        ));
        let c2 = system.add_constraint(constraints::horizontal(GeometryRef::line(a, 0)));
        assert_ne!(c1, c2);
        assert_eq!(system.len(), 2);
        assert_eq!(system.get_entity_constraints(&a).len(), 2);
        assert_eq!(system.get_entity_constraints(&b).len(), 1);

        let removed = system.remove_constraint(&c1).unwrap();
        assert_eq!(removed.id, c1);
        assert!(system.get_entity_constraints(&b).is_empty());
    }

    #[test]
    fn test_disabled_constraints_are_not_sources() {
        let mut system = ConstraintSystem::new();
        let id =
            system.add_constraint(constraints::radius(GeometryRef::circle(EntityId(3), 0), 5.0));
        system.add_constraint(constraints::fixed(GeometryRef::point(EntityId(4), 0)));

        assert_eq!(system.referenced_entities().len(), 2);
        assert!(system.set_enabled(&id, false));
        let referenced = system.referenced_entities();
        assert!(!referenced.contains(&EntityId(3)));
        assert!(referenced.contains(&EntityId(4)));
    }

    #[test]
    fn test_validity_checks_feature_types() {
        let a = EntityId(1);
        assert!(constraints::horizontal(GeometryRef::line(a, 0)).is_valid());
        assert!(!constraints::horizontal(GeometryRef::point(a, 0)).is_valid());
        let single = Constraint::new(ConstraintType::Distance, vec![GeometryRef::point(a, 0)]);
        assert!(!single.is_valid());
    }
}
