//! 带旋转角的椭圆

use crate::math::{
    angles_approx_eq, normalize_angle, points_approx_eq, BoundingBox2, Point2, Vector2, EPSILON,
};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, rotate_vector, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// 最近点搜索的粗采样数
const COARSE_SAMPLES: usize = 64;

/// 最近点牛顿迭代次数
const NEWTON_STEPS: usize = 12;

/// 椭圆
///
/// 长轴方向角在写入时归一化；构造时保证半长轴不小于半短轴。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    center: Point2,
    semi_major: f64,
    semi_minor: f64,
    /// 长轴旋转角（弧度）
    rotation: f64,
}

impl Ellipse {
    pub fn new(center: Point2, semi_major: f64, semi_minor: f64, rotation: f64) -> Self {
        let (a, b) = (semi_major.abs(), semi_minor.abs());
        if b > a {
            // 交换长短轴，长轴方向随之转 90°
            Self {
                center,
                semi_major: b,
                semi_minor: a,
                rotation: normalize_angle(rotation + FRAC_PI_2),
            }
        } else {
            Self {
                center,
                semi_major: a,
                semi_minor: b,
                rotation: normalize_angle(rotation),
            }
        }
    }

    pub fn center(&self) -> Point2 {
        self.center
    }

    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_center(&mut self, center: Point2) {
        self.center = center;
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = normalize_angle(rotation);
    }

    /// 修改半轴长度，必要时交换长短轴
    pub fn set_axes(&mut self, semi_major: f64, semi_minor: f64) {
        *self = Self::new(self.center, semi_major, semi_minor, self.rotation);
    }

    /// 参数方程上的点：center + R(rotation)·(a cos t, b sin t)
    pub fn point_at(&self, t: f64) -> Point2 {
        let local = Vector2::new(self.semi_major * t.cos(), self.semi_minor * t.sin());
        self.center + rotate_vector(&local, self.rotation)
    }

    /// 均匀参数采样（闭合，首尾不重复）
    pub fn sample_points(&self, segments: usize) -> Vec<Point2> {
        let segments = segments.max(3);
        (0..segments)
            .map(|i| self.point_at(TAU * i as f64 / segments as f64))
            .collect()
    }

    /// 面积
    pub fn area(&self) -> f64 {
        PI * self.semi_major * self.semi_minor
    }

    /// 周长（Ramanujan 近似）
    pub fn circumference(&self) -> f64 {
        let (a, b) = (self.semi_major, self.semi_minor);
        let h = ((a - b) / (a + b)).powi(2);
        if !h.is_finite() {
            return 0.0;
        }
        PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
    }

    /// 点到椭圆边界的距离
    ///
    /// 先粗采样选出最近参数，再用固定步数的牛顿迭代细化。
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        let q = rotate_vector(&(point - self.center), -self.rotation);
        let (a, b) = (self.semi_major, self.semi_minor);
        let local = |t: f64| Vector2::new(a * t.cos(), b * t.sin());

        let mut best_t = 0.0;
        let mut best_d = f64::MAX;
        for i in 0..COARSE_SAMPLES {
            let t = TAU * i as f64 / COARSE_SAMPLES as f64;
            let d = (local(t) - q).norm_squared();
            if d < best_d {
                best_d = d;
                best_t = t;
            }
        }

        let mut t = best_t;
        for _ in 0..NEWTON_STEPS {
            let (sin, cos) = t.sin_cos();
            let p = Vector2::new(a * cos, b * sin);
            let d1 = Vector2::new(-a * sin, b * cos);
            let d2 = Vector2::new(-a * cos, -b * sin);
            let diff = p - q;
            let f = diff.dot(&d1);
            let df = d1.dot(&d1) + diff.dot(&d2);
            if df.abs() < EPSILON {
                break;
            }
            t -= f / df;
        }

        let refined = (local(t) - q).norm_squared();
        best_d.min(refined).sqrt()
    }

    /// 精确包围盒：hx = √(a²cos²θ + b²sin²θ)，hy = √(a²sin²θ + b²cos²θ)
    pub fn bounding_box(&self) -> BoundingBox2 {
        let (sin, cos) = self.rotation.sin_cos();
        let (a, b) = (self.semi_major, self.semi_minor);
        let hx = (a * a * cos * cos + b * b * sin * sin).sqrt();
        let hy = (a * a * sin * sin + b * b * cos * cos).sqrt();
        BoundingBox2::new(
            Point2::new(self.center.x - hx, self.center.y - hy),
            Point2::new(self.center.x + hx, self.center.y + hy),
        )
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.distance_to_point(point) <= tolerance
    }

    /// 圆心 + 长短轴四个端点
    pub fn snap_points(&self) -> Vec<SnapPoint> {
        let mut snaps = vec![SnapPoint::center(self.center)];
        snaps.extend(
            [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]
                .into_iter()
                .map(|t| SnapPoint::quadrant(self.point_at(t))),
        );
        snaps
    }

    pub fn translate(&mut self, offset: &Vector2) {
        self.center += *offset;
    }

    pub fn mirror(&mut self, axis: &MirrorAxis) {
        self.center = axis.reflect(&self.center);
        self.rotation = axis.reflect_angle(self.rotation);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        self.center = rotate_point(&self.center, center, angle);
        self.set_rotation(self.rotation + angle);
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        self.center = scale_point(&self.center, center, factor);
        self.semi_major *= factor.abs();
        self.semi_minor *= factor.abs();
        if factor < 0.0 {
            self.set_rotation(self.rotation + PI);
        }
    }

    pub fn approx_eq(&self, other: &Ellipse, tolerance: f64) -> bool {
        points_approx_eq(&self.center, &other.center, tolerance)
            && (self.semi_major - other.semi_major).abs() <= tolerance
            && (self.semi_minor - other.semi_minor).abs() <= tolerance
            && angles_approx_eq(self.rotation, other.rotation, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_bounding_box() {
        let e = Ellipse::new(Point2::new(1.0, 2.0), 4.0, 2.0, 0.0);
        let bbox = e.bounding_box();
        assert!((bbox.min - Point2::new(-3.0, 0.0)).norm() < 1e-12);
        assert!((bbox.max - Point2::new(5.0, 4.0)).norm() < 1e-12);
    }

    #[test]
    fn test_rotated_bounding_box_is_exact() {
        let e = Ellipse::new(Point2::origin(), 4.0, 2.0, FRAC_PI_2);
        let bbox = e.bounding_box();
        assert!((bbox.max.x - 2.0).abs() < 1e-12);
        assert!((bbox.max.y - 4.0).abs() < 1e-12);

        // 采样点不会超出精确包围盒
        let e = Ellipse::new(Point2::origin(), 5.0, 1.0, 0.6);
        let bbox = e.bounding_box().expanded(1e-9);
        assert!(e.sample_points(720).iter().all(|p| bbox.contains(p)));
    }

    #[test]
    fn test_minor_larger_than_major_swaps() {
        let e = Ellipse::new(Point2::origin(), 1.0, 3.0, 0.0);
        assert_eq!(e.semi_major(), 3.0);
        assert_eq!(e.semi_minor(), 1.0);
        assert!((e.rotation() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_hit_test_near_boundary() {
        let e = Ellipse::new(Point2::origin(), 10.0, 4.0, 0.3);
        let on_curve = e.point_at(1.1);
        assert!(e.hit_test(&on_curve, 1e-6));
        assert!(!e.hit_test(&Point2::origin(), 0.5));
        let outside = e.point_at(0.0) + rotate_vector(&Vector2::new(0.4, 0.0), 0.3);
        assert!((e.distance_to_point(&outside) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_snap_points_axis_endpoints() {
        let e = Ellipse::new(Point2::origin(), 3.0, 1.0, 0.0);
        let snaps = e.snap_points();
        assert_eq!(snaps.len(), 5);
        assert!((snaps[1].point - Point2::new(3.0, 0.0)).norm() < 1e-12);
        assert!((snaps[2].point - Point2::new(0.0, 1.0)).norm() < 1e-12);
    }
}
