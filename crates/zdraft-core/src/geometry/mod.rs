//! 几何图元定义
//!
//! 支持的图元：
//! - 线段 (Line)、圆 (Circle)、圆弧 (Arc)、矩形 (Rectangle)
//! - 多段线 (Polyline)、样条曲线 (Spline)、椭圆 (Ellipse)
//! - 文本 (Text)、填充 (Hatch)、块参照 (BlockReference)
//! - 标注族：线性 / 半径 / 角度标注与引线 (Leader)
//!
//! 每种图元只保存自身的解析参数，包围盒、点选、捕捉点和仿射变换
//! 都由 `Geometry` 按变体穷尽分派。

mod arc;
mod block;
mod circle;
mod dimension;
mod ellipse;
mod hatch;
mod line;
mod polyline;
mod rectangle;
mod spline;
mod text;

pub use arc::Arc;
pub use block::{BlockDefinition, BlockHandle, BlockReference};
pub use circle::Circle;
pub use dimension::{AngularDimension, Leader, LinearDimension, RadialDimension};
pub use ellipse::Ellipse;
pub use hatch::Hatch;
pub use line::Line;
pub use polyline::Polyline;
pub use rectangle::Rectangle;
pub use spline::{Spline, DEFAULT_SEGMENTS_PER_SPAN};
pub use text::{Text, TextAlignment};

use crate::math::{BoundingBox2, Point2, Vector2};
use crate::snap::SnapPoint;
use crate::transform::MirrorAxis;
use serde::{Deserialize, Serialize};

/// 实体类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Line,
    Circle,
    Arc,
    Rectangle,
    Polyline,
    Spline,
    Ellipse,
    Text,
    Hatch,
    BlockReference,
    LinearDimension,
    RadialDimension,
    AngularDimension,
    Leader,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Line => "Line",
            EntityKind::Circle => "Circle",
            EntityKind::Arc => "Arc",
            EntityKind::Rectangle => "Rectangle",
            EntityKind::Polyline => "Polyline",
            EntityKind::Spline => "Spline",
            EntityKind::Ellipse => "Ellipse",
            EntityKind::Text => "Text",
            EntityKind::Hatch => "Hatch",
            EntityKind::BlockReference => "BlockReference",
            EntityKind::LinearDimension => "LinearDimension",
            EntityKind::RadialDimension => "RadialDimension",
            EntityKind::AngularDimension => "AngularDimension",
            EntityKind::Leader => "Leader",
        }
    }

    /// 是否属于标注族
    pub fn is_annotation(&self) -> bool {
        matches!(
            self,
            EntityKind::LinearDimension
                | EntityKind::RadialDimension
                | EntityKind::AngularDimension
                | EntityKind::Leader
        )
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 几何类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Rectangle(Rectangle),
    Polyline(Polyline),
    Spline(Spline),
    Ellipse(Ellipse),
    Text(Text),
    Hatch(Hatch),
    BlockReference(BlockReference),
    LinearDimension(LinearDimension),
    RadialDimension(RadialDimension),
    AngularDimension(AngularDimension),
    Leader(Leader),
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Geometry {
                fn from(value: $variant) -> Self {
                    Geometry::$variant(value)
                }
            }
        )*
    };
}

impl_from_variant!(
    Line,
    Circle,
    Arc,
    Rectangle,
    Polyline,
    Spline,
    Ellipse,
    Text,
    Hatch,
    BlockReference,
    LinearDimension,
    RadialDimension,
    AngularDimension,
    Leader,
);

impl Geometry {
    pub fn kind(&self) -> EntityKind {
        match self {
            Geometry::Line(_) => EntityKind::Line,
            Geometry::Circle(_) => EntityKind::Circle,
            Geometry::Arc(_) => EntityKind::Arc,
            Geometry::Rectangle(_) => EntityKind::Rectangle,
            Geometry::Polyline(_) => EntityKind::Polyline,
            Geometry::Spline(_) => EntityKind::Spline,
            Geometry::Ellipse(_) => EntityKind::Ellipse,
            Geometry::Text(_) => EntityKind::Text,
            Geometry::Hatch(_) => EntityKind::Hatch,
            Geometry::BlockReference(_) => EntityKind::BlockReference,
            Geometry::LinearDimension(_) => EntityKind::LinearDimension,
            Geometry::RadialDimension(_) => EntityKind::RadialDimension,
            Geometry::AngularDimension(_) => EntityKind::AngularDimension,
            Geometry::Leader(_) => EntityKind::Leader,
        }
    }

    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// 获取几何的包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        match self {
            Geometry::Line(g) => g.bounding_box(),
            Geometry::Circle(g) => g.bounding_box(),
            Geometry::Arc(g) => g.bounding_box(),
            Geometry::Rectangle(g) => g.bounding_box(),
            Geometry::Polyline(g) => g.bounding_box(),
            Geometry::Spline(g) => g.bounding_box(),
            Geometry::Ellipse(g) => g.bounding_box(),
            Geometry::Text(g) => g.bounding_box(),
            Geometry::Hatch(g) => g.bounding_box(),
            Geometry::BlockReference(g) => g.bounding_box(),
            Geometry::LinearDimension(g) => g.bounding_box(),
            Geometry::RadialDimension(g) => g.bounding_box(),
            Geometry::AngularDimension(g) => g.bounding_box(),
            Geometry::Leader(g) => g.bounding_box(),
        }
    }

    /// 点是否落在图元边界的容差范围内
    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        match self {
            Geometry::Line(g) => g.hit_test(point, tolerance),
            Geometry::Circle(g) => g.hit_test(point, tolerance),
            Geometry::Arc(g) => g.hit_test(point, tolerance),
            Geometry::Rectangle(g) => g.hit_test(point, tolerance),
            Geometry::Polyline(g) => g.hit_test(point, tolerance),
            Geometry::Spline(g) => g.hit_test(point, tolerance),
            Geometry::Ellipse(g) => g.hit_test(point, tolerance),
            Geometry::Text(g) => g.hit_test(point, tolerance),
            Geometry::Hatch(g) => g.hit_test(point, tolerance),
            Geometry::BlockReference(g) => g.hit_test(point, tolerance),
            Geometry::LinearDimension(g) => g.hit_test(point, tolerance),
            Geometry::RadialDimension(g) => g.hit_test(point, tolerance),
            Geometry::AngularDimension(g) => g.hit_test(point, tolerance),
            Geometry::Leader(g) => g.hit_test(point, tolerance),
        }
    }

    /// 有语义的捕捉点
    pub fn snap_points(&self) -> Vec<SnapPoint> {
        match self {
            Geometry::Line(g) => g.snap_points(),
            Geometry::Circle(g) => g.snap_points(),
            Geometry::Arc(g) => g.snap_points(),
            Geometry::Rectangle(g) => g.snap_points(),
            Geometry::Polyline(g) => g.snap_points(),
            Geometry::Spline(g) => g.snap_points(),
            Geometry::Ellipse(g) => g.snap_points(),
            Geometry::Text(g) => g.snap_points(),
            Geometry::Hatch(g) => g.snap_points(),
            Geometry::BlockReference(g) => g.snap_points(),
            Geometry::LinearDimension(g) => g.snap_points(),
            Geometry::RadialDimension(g) => g.snap_points(),
            Geometry::AngularDimension(g) => g.snap_points(),
            Geometry::Leader(g) => g.snap_points(),
        }
    }

    pub fn translate(&mut self, offset: &Vector2) {
        match self {
            Geometry::Line(g) => g.translate(offset),
            Geometry::Circle(g) => g.translate(offset),
            Geometry::Arc(g) => g.translate(offset),
            Geometry::Rectangle(g) => g.translate(offset),
            Geometry::Polyline(g) => g.translate(offset),
            Geometry::Spline(g) => g.translate(offset),
            Geometry::Ellipse(g) => g.translate(offset),
            Geometry::Text(g) => g.translate(offset),
            Geometry::Hatch(g) => g.translate(offset),
            Geometry::BlockReference(g) => g.translate(offset),
            Geometry::LinearDimension(g) => g.translate(offset),
            Geometry::RadialDimension(g) => g.translate(offset),
            Geometry::AngularDimension(g) => g.translate(offset),
            Geometry::Leader(g) => g.translate(offset),
        }
    }

    /// 关于过 `p1`、`p2` 的直线镜像
    ///
    /// 两点重合时不做任何修改并返回 false。
    pub fn mirror(&mut self, p1: &Point2, p2: &Point2) -> bool {
        let Some(axis) = MirrorAxis::new(*p1, *p2) else {
            return false;
        };
        self.mirror_axis(&axis);
        true
    }

    pub fn mirror_axis(&mut self, axis: &MirrorAxis) {
        match self {
            Geometry::Line(g) => g.mirror(axis),
            Geometry::Circle(g) => g.mirror(axis),
            Geometry::Arc(g) => g.mirror(axis),
            Geometry::Rectangle(g) => g.mirror(axis),
            Geometry::Polyline(g) => g.mirror(axis),
            Geometry::Spline(g) => g.mirror(axis),
            Geometry::Ellipse(g) => g.mirror(axis),
            Geometry::Text(g) => g.mirror(axis),
            Geometry::Hatch(g) => g.mirror(axis),
            Geometry::BlockReference(g) => g.mirror(axis),
            Geometry::LinearDimension(g) => g.mirror(axis),
            Geometry::RadialDimension(g) => g.mirror(axis),
            Geometry::AngularDimension(g) => g.mirror(axis),
            Geometry::Leader(g) => g.mirror(axis),
        }
    }

    /// 绕 `center` 逆时针旋转 `angle`（弧度）
    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        match self {
            Geometry::Line(g) => g.rotate(center, angle),
            Geometry::Circle(g) => g.rotate(center, angle),
            Geometry::Arc(g) => g.rotate(center, angle),
            Geometry::Rectangle(g) => g.rotate(center, angle),
            Geometry::Polyline(g) => g.rotate(center, angle),
            Geometry::Spline(g) => g.rotate(center, angle),
            Geometry::Ellipse(g) => g.rotate(center, angle),
            Geometry::Text(g) => g.rotate(center, angle),
            Geometry::Hatch(g) => g.rotate(center, angle),
            Geometry::BlockReference(g) => g.rotate(center, angle),
            Geometry::LinearDimension(g) => g.rotate(center, angle),
            Geometry::RadialDimension(g) => g.rotate(center, angle),
            Geometry::AngularDimension(g) => g.rotate(center, angle),
            Geometry::Leader(g) => g.rotate(center, angle),
        }
    }

    /// 以 `center` 为基点统一缩放
    pub fn scale(&mut self, center: &Point2, factor: f64) {
        match self {
            Geometry::Line(g) => g.scale(center, factor),
            Geometry::Circle(g) => g.scale(center, factor),
            Geometry::Arc(g) => g.scale(center, factor),
            Geometry::Rectangle(g) => g.scale(center, factor),
            Geometry::Polyline(g) => g.scale(center, factor),
            Geometry::Spline(g) => g.scale(center, factor),
            Geometry::Ellipse(g) => g.scale(center, factor),
            Geometry::Text(g) => g.scale(center, factor),
            Geometry::Hatch(g) => g.scale(center, factor),
            Geometry::BlockReference(g) => g.scale(center, factor),
            Geometry::LinearDimension(g) => g.scale(center, factor),
            Geometry::RadialDimension(g) => g.scale(center, factor),
            Geometry::AngularDimension(g) => g.scale(center, factor),
            Geometry::Leader(g) => g.scale(center, factor),
        }
    }

    /// 容差内的几何相等；类型不同时为 false
    pub fn approx_eq(&self, other: &Geometry, tolerance: f64) -> bool {
        match (self, other) {
            (Geometry::Line(a), Geometry::Line(b)) => a.approx_eq(b, tolerance),
            (Geometry::Circle(a), Geometry::Circle(b)) => a.approx_eq(b, tolerance),
            (Geometry::Arc(a), Geometry::Arc(b)) => a.approx_eq(b, tolerance),
            (Geometry::Rectangle(a), Geometry::Rectangle(b)) => a.approx_eq(b, tolerance),
            (Geometry::Polyline(a), Geometry::Polyline(b)) => a.approx_eq(b, tolerance),
            (Geometry::Spline(a), Geometry::Spline(b)) => a.approx_eq(b, tolerance),
            (Geometry::Ellipse(a), Geometry::Ellipse(b)) => a.approx_eq(b, tolerance),
            (Geometry::Text(a), Geometry::Text(b)) => a.approx_eq(b, tolerance),
            (Geometry::Hatch(a), Geometry::Hatch(b)) => a.approx_eq(b, tolerance),
            (Geometry::BlockReference(a), Geometry::BlockReference(b)) => {
                a.approx_eq(b, tolerance)
            }
            (Geometry::LinearDimension(a), Geometry::LinearDimension(b)) => {
                a.approx_eq(b, tolerance)
            }
            (Geometry::RadialDimension(a), Geometry::RadialDimension(b)) => {
                a.approx_eq(b, tolerance)
            }
            (Geometry::AngularDimension(a), Geometry::AngularDimension(b)) => {
                a.approx_eq(b, tolerance)
            }
            (Geometry::Leader(a), Geometry::Leader(b)) => a.approx_eq(b, tolerance),
            _ => false,
        }
    }
}

/// 点列逐个比较
pub(crate) fn point_lists_approx_eq(a: &[Point2], b: &[Point2], tolerance: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(p, q)| crate::math::points_approx_eq(p, q, tolerance))
}

/// 点列到折线的最短距离
pub(crate) fn polyline_distance(points: &[Point2], closed: bool, point: &Point2) -> f64 {
    match points.len() {
        0 => f64::MAX,
        1 => (point - points[0]).norm(),
        n => {
            let count = if closed { n } else { n - 1 };
            (0..count)
                .map(|i| crate::math::distance_to_segment(point, &points[i], &points[(i + 1) % n]))
                .fold(f64::MAX, f64::min)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_dispatch_matches_variant() {
        let mut g: Geometry = Circle::new(Point2::new(1.0, 1.0), 2.0).into();
        assert_eq!(g.kind(), EntityKind::Circle);
        assert_eq!(g.type_name(), "Circle");

        g.translate(&Vector2::new(1.0, 0.0));
        g.rotate(&Point2::origin(), FRAC_PI_2);
        let Geometry::Circle(c) = &g else {
            panic!("variant changed");
        };
        assert!((c.center - Point2::new(-1.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_degenerate_mirror_axis_is_noop() {
        let mut g: Geometry = Line::new(Point2::new(0.0, 0.0), Point2::new(1.0, 2.0)).into();
        let before = g.clone();
        let p = Point2::new(3.0, 3.0);
        assert!(!g.mirror(&p, &p));
        assert_eq!(g, before);
    }

    #[test]
    fn test_approx_eq_rejects_other_kinds() {
        let a: Geometry = Line::new(Point2::origin(), Point2::new(1.0, 0.0)).into();
        let b: Geometry = Circle::new(Point2::origin(), 1.0).into();
        assert!(!a.approx_eq(&b, 1e-9));
        assert!(EntityKind::Leader.is_annotation());
        assert!(!EntityKind::Arc.is_annotation());
    }
}
