//! 仿射变换
//!
//! - 平移、绕点旋转、绕点缩放、镜像
//! - `Transform2D`：块参照的 插入点 + 旋转 + 统一比例 变换及其逆变换

use crate::math::{normalize_angle, unit, Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};

/// 向量旋转
#[inline]
pub fn rotate_vector(v: &Vector2, angle: f64) -> Vector2 {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// 绕 `center` 旋转点
#[inline]
pub fn rotate_point(point: &Point2, center: &Point2, angle: f64) -> Point2 {
    center + rotate_vector(&(point - center), angle)
}

/// 以 `center` 为基点缩放点
#[inline]
pub fn scale_point(point: &Point2, center: &Point2, factor: f64) -> Point2 {
    center + (point - center) * factor
}

/// 镜像轴（过两点的直线）
#[derive(Debug, Clone, Copy)]
pub struct MirrorAxis {
    origin: Point2,
    dir: Vector2,
    angle: f64,
}

impl MirrorAxis {
    /// 两点重合时无法确定镜像轴
    pub fn new(p1: Point2, p2: Point2) -> Option<Self> {
        let dir = unit(&(p2 - p1))?;
        Some(Self {
            origin: p1,
            dir,
            angle: dir.y.atan2(dir.x),
        })
    }

    /// 镜像轴方向角
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// reflect(p) = a1 + dir·(2·((p−a1)·dir)) − (p−a1)
    pub fn reflect(&self, point: &Point2) -> Point2 {
        let v = point - self.origin;
        self.origin + self.dir * (2.0 * v.dot(&self.dir)) - v
    }

    /// 方向角镜像：2α − θ
    pub fn reflect_angle(&self, angle: f64) -> f64 {
        normalize_angle(2.0 * self.angle - angle)
    }
}

/// 块参照变换
///
/// world = insert + R(rotation)·(scale·(p − base))
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// 块定义基点
    pub base: Point2,
    /// 插入点
    pub insert: Point2,
    /// 旋转角（弧度）
    pub rotation: f64,
    /// 统一比例
    pub scale: f64,
}

impl Transform2D {
    pub fn new(base: Point2, insert: Point2, rotation: f64, scale: f64) -> Self {
        Self {
            base,
            insert,
            rotation,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self::new(Point2::origin(), Point2::origin(), 0.0, 1.0)
    }

    /// 定义空间 -> 世界空间
    pub fn apply(&self, point: &Point2) -> Point2 {
        self.insert + rotate_vector(&((point - self.base) * self.scale), self.rotation)
    }

    /// 世界空间 -> 定义空间；比例为零时不可逆
    pub fn apply_inverse(&self, point: &Point2) -> Option<Point2> {
        if self.scale.abs() < EPSILON {
            return None;
        }
        let local = rotate_vector(&(point - self.insert), -self.rotation) / self.scale;
        Some(self.base + local)
    }

    /// 世界空间距离换算到定义空间
    pub fn inverse_length(&self, length: f64) -> Option<f64> {
        if self.scale.abs() < EPSILON {
            None
        } else {
            Some(length / self.scale.abs())
        }
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::points_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_mirror_across_diagonal() {
        let axis = MirrorAxis::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)).unwrap();
        let p = axis.reflect(&Point2::new(3.0, 1.0));
        assert!(points_approx_eq(&p, &Point2::new(1.0, 3.0), 1e-12));
        assert!(MirrorAxis::new(Point2::new(2.0, 2.0), Point2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn test_transform_round_trip() {
        let t = Transform2D::new(
            Point2::new(1.0, 1.0),
            Point2::new(10.0, 5.0),
            FRAC_PI_2,
            2.0,
        );
        let local = Point2::new(2.0, 1.0);
        let world = t.apply(&local);
        assert!(points_approx_eq(&world, &Point2::new(10.0, 7.0), 1e-12));
        let back = t.apply_inverse(&world).unwrap();
        assert!(points_approx_eq(&back, &local, 1e-12));
    }

    #[test]
    fn test_zero_scale_has_no_inverse() {
        let t = Transform2D::new(Point2::origin(), Point2::origin(), 0.0, 0.0);
        assert!(t.apply_inverse(&Point2::new(1.0, 0.0)).is_none());
    }
}
