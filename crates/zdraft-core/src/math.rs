//! 二维数学基础
//!
//! 点、向量使用 nalgebra 的双精度类型，并提供包围盒与角度工具。

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// 二维点
pub type Point2 = nalgebra::Point2<f64>;

/// 二维向量
pub type Vector2 = nalgebra::Vector2<f64>;

/// 退化判断使用的全局容差
pub const EPSILON: f64 = 1e-10;

/// 将角度归一化到 [0, 2π)
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid 对极小的负数可能正好返回 2π
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// 二维叉积（z 分量）
#[inline]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// 从 `center` 指向 `point` 的方向角，归一化到 [0, 2π)
#[inline]
pub fn angle_to(center: &Point2, point: &Point2) -> f64 {
    normalize_angle((point.y - center.y).atan2(point.x - center.x))
}

/// 单位向量；长度接近零时返回 None
#[inline]
pub fn unit(v: &Vector2) -> Option<Vector2> {
    v.try_normalize(EPSILON)
}

/// 两点中点
#[inline]
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// 极坐标点
#[inline]
pub fn polar(center: &Point2, radius: f64, angle: f64) -> Point2 {
    Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// 点到线段最近点（夹紧到线段两端）
pub fn closest_point_on_segment(point: &Point2, start: &Point2, end: &Point2) -> Point2 {
    let v = end - start;
    let w = point - start;

    let c1 = w.dot(&v);
    if c1 <= 0.0 {
        return *start;
    }

    let c2 = v.dot(&v);
    if c2 <= c1 {
        return *end;
    }

    start + v * (c1 / c2)
}

/// 点到线段的距离
#[inline]
pub fn distance_to_segment(point: &Point2, start: &Point2, end: &Point2) -> f64 {
    (point - closest_point_on_segment(point, start, end)).norm()
}

/// 点在容差内相等
#[inline]
pub fn points_approx_eq(a: &Point2, b: &Point2, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}

/// 角度在容差内相等（考虑 2π 周期）
pub fn angles_approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    let diff = normalize_angle(a - b);
    diff <= tolerance || TAU - diff <= tolerance
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// 空包围盒（任何点并入后都会变为有效）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// 合并另一个包围盒
    pub fn merge(&mut self, other: &BoundingBox2) {
        if other.is_empty() {
            return;
        }
        self.expand_to_include(&other.min);
        self.expand_to_include(&other.max);
    }

    pub fn union(&self, other: &BoundingBox2) -> BoundingBox2 {
        let mut result = *self;
        result.merge(other);
        result
    }

    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// 是否完整包含另一个包围盒
    pub fn contains_box(&self, other: &BoundingBox2) -> bool {
        !other.is_empty() && self.contains(&other.min) && self.contains(&other.max)
    }

    pub fn intersects(&self, other: &BoundingBox2) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || self.max.x < other.min.x
            || other.max.x < self.min.x
            || self.max.y < other.min.y
            || other.max.y < self.min.y)
    }

    /// 四周外扩
    pub fn expanded(&self, margin: f64) -> BoundingBox2 {
        if self.is_empty() {
            return *self;
        }
        BoundingBox2::new(
            Point2::new(self.min.x - margin, self.min.y - margin),
            Point2::new(self.max.x + margin, self.max.y + margin),
        )
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.x - self.min.x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.y - self.min.y
        }
    }

    pub fn center(&self) -> Point2 {
        midpoint(&self.min, &self.max)
    }

    /// 四个角点：左下、右下、右上、左上
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }
}

impl Default for BoundingBox2 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-PI / 2.0) - 1.5 * PI).abs() < EPSILON);
        assert!((normalize_angle(5.0 * PI) - PI).abs() < 1e-9);
        assert_eq!(normalize_angle(TAU), 0.0);
        assert!(normalize_angle(-1e-20) < TAU);
    }

    #[test]
    fn test_angles_approx_eq_wraps() {
        assert!(angles_approx_eq(0.0, TAU - 1e-12, 1e-9));
        assert!(!angles_approx_eq(0.0, PI, 1e-9));
    }

    #[test]
    fn test_segment_distance_clamps() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        assert!((distance_to_segment(&Point2::new(5.0, 3.0), &a, &b) - 3.0).abs() < EPSILON);
        assert!((distance_to_segment(&Point2::new(13.0, 4.0), &a, &b) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_bounding_box_union() {
        let a = BoundingBox2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let b = BoundingBox2::new(Point2::new(2.0, -1.0), Point2::new(3.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Point2::new(0.0, -1.0));
        assert_eq!(u.max, Point2::new(3.0, 1.0));
        assert!(u.contains_box(&a));
        assert!(!a.intersects(&b));
        assert!(BoundingBox2::empty().union(&a) == a);
    }
}
