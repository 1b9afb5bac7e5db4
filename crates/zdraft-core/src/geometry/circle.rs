//! 圆

use crate::math::{points_approx_eq, polar, BoundingBox2, Point2, Vector2};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// 圆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// 计算周长
    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }

    /// 计算面积
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// 计算点到圆的距离（负值表示在圆内）
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        (point - self.center).norm() - self.radius
    }

    /// 获取圆上指定角度的点
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        polar(&self.center, self.radius, angle)
    }

    /// 0°, 90°, 180°, 270° 四个象限点
    pub fn quadrant_points(&self) -> [Point2; 4] {
        [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2].map(|a| self.point_at_angle(a))
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(
            Point2::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.distance_to_point(point).abs() <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        let mut snaps = Vec::with_capacity(5);
        snaps.push(SnapPoint::center(self.center));
        snaps.extend(self.quadrant_points().into_iter().map(SnapPoint::quadrant));
        snaps
    }

    pub fn translate(&mut self, offset: &Vector2) {
        self.center += *offset;
    }

    pub fn mirror(&mut self, axis: &MirrorAxis) {
        self.center = axis.reflect(&self.center);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        self.center = rotate_point(&self.center, center, angle);
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        self.center = scale_point(&self.center, center, factor);
        self.radius *= factor.abs();
    }

    pub fn approx_eq(&self, other: &Circle, tolerance: f64) -> bool {
        points_approx_eq(&self.center, &other.center, tolerance)
            && (self.radius - other.radius).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;

    #[test]
    fn test_circle_area() {
        let circle = Circle::new(Point2::origin(), 1.0);
        assert!((circle.area() - PI).abs() < EPSILON);
    }

    #[test]
    fn test_bounding_box_is_exact() {
        let circle = Circle::new(Point2::new(3.0, -2.0), 1.5);
        let bbox = circle.bounding_box();
        assert_eq!(bbox.min, Point2::new(1.5, -3.5));
        assert_eq!(bbox.max, Point2::new(4.5, -0.5));
    }

    #[test]
    fn test_hit_test_on_ring_only() {
        let circle = Circle::new(Point2::origin(), 5.0);
        assert!(circle.hit_test(&Point2::new(5.1, 0.0), 0.2));
        assert!(circle.hit_test(&Point2::new(0.0, -4.9), 0.2));
        assert!(!circle.hit_test(&Point2::origin(), 0.2));
    }

    #[test]
    fn test_snap_points_are_center_and_quadrants() {
        let snaps = Circle::new(Point2::origin(), 2.0).snap_points();
        assert_eq!(snaps.len(), 5);
        assert_eq!(snaps[0].point, Point2::origin());
        assert!((snaps[2].point - Point2::new(0.0, 2.0)).norm() < EPSILON);
    }

    #[test]
    fn test_negative_scale_keeps_radius_positive() {
        let mut circle = Circle::new(Point2::new(1.0, 0.0), 2.0);
        circle.scale(&Point2::origin(), -2.0);
        assert_eq!(circle.center, Point2::new(-2.0, 0.0));
        assert_eq!(circle.radius, 4.0);
    }
}
