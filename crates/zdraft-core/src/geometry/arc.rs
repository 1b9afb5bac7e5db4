//! 圆弧：角度在写入时归一化到 [0, 2π)

use crate::math::{
    angle_to, angles_approx_eq, normalize_angle, points_approx_eq, polar, BoundingBox2, Point2,
    Vector2, EPSILON,
};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// 圆弧
///
/// 起止角在写入时归一化到 [0, 2π)，从起始角逆时针扫到终止角，
/// 扫掠可以跨越 0°。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    center: Point2,
    radius: f64,
    /// 起始角度（弧度）
    start_angle: f64,
    /// 终止角度（弧度）
    end_angle: f64,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle: normalize_angle(start_angle),
            end_angle: normalize_angle(end_angle),
        }
    }

    /// 从三点创建圆弧：起点、弧上一点、终点
    pub fn from_three_points(p1: Point2, p2: Point2, p3: Point2) -> Option<Self> {
        let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));

        if d.abs() < EPSILON {
            return None; // 三点共线
        }

        let s1 = p1.x * p1.x + p1.y * p1.y;
        let s2 = p2.x * p2.x + p2.y * p2.y;
        let s3 = p3.x * p3.x + p3.y * p3.y;
        let ux = (s1 * (p2.y - p3.y) + s2 * (p3.y - p1.y) + s3 * (p1.y - p2.y)) / d;
        let uy = (s1 * (p3.x - p2.x) + s2 * (p1.x - p3.x) + s3 * (p2.x - p1.x)) / d;

        let center = Point2::new(ux, uy);
        let radius = (p1 - center).norm();

        let arc = Self::new(center, radius, angle_to(&center, &p1), angle_to(&center, &p3));
        if arc.contains_angle(angle_to(&center, &p2)) {
            Some(arc)
        } else {
            // 三点为顺时针顺序
            Some(Self::new(center, radius, arc.end_angle, arc.start_angle))
        }
    }

    pub fn center(&self) -> Point2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    pub fn set_center(&mut self, center: Point2) {
        self.center = center;
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    pub fn set_start_angle(&mut self, angle: f64) {
        self.start_angle = normalize_angle(angle);
    }

    pub fn set_end_angle(&mut self, angle: f64) {
        self.end_angle = normalize_angle(angle);
    }

    pub fn set_angles(&mut self, start: f64, end: f64) {
        self.set_start_angle(start);
        self.set_end_angle(end);
    }

    /// 逆时针扫掠角，位于 [0, 2π)
    pub fn sweep_angle(&self) -> f64 {
        normalize_angle(self.end_angle - self.start_angle)
    }

    /// 计算弧长
    pub fn length(&self) -> f64 {
        self.sweep_angle() * self.radius
    }

    /// 角度是否落在扫掠范围内（含端点，处理跨 0° 的情况）
    pub fn contains_angle(&self, angle: f64) -> bool {
        let rel = normalize_angle(angle - self.start_angle);
        rel <= self.sweep_angle() + EPSILON || rel >= TAU - EPSILON
    }

    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        polar(&self.center, self.radius, angle)
    }

    /// 获取起点
    pub fn start_point(&self) -> Point2 {
        self.point_at_angle(self.start_angle)
    }

    /// 获取终点
    pub fn end_point(&self) -> Point2 {
        self.point_at_angle(self.end_angle)
    }

    /// 弧的中点
    pub fn mid_point(&self) -> Point2 {
        self.point_at_angle(self.start_angle + self.sweep_angle() / 2.0)
    }

    /// 计算点到圆弧的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        if self.contains_angle(angle_to(&self.center, point)) {
            ((point - self.center).norm() - self.radius).abs()
        } else {
            // 返回到端点的最小距离
            let d1 = (point - self.start_point()).norm();
            let d2 = (point - self.end_point()).norm();
            d1.min(d2)
        }
    }

    /// 扫掠范围内的象限点
    fn contained_quadrants(&self) -> impl Iterator<Item = Point2> + '_ {
        [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]
            .into_iter()
            .filter(|a| self.contains_angle(*a))
            .map(|a| self.point_at_angle(a))
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::from_points([self.start_point(), self.end_point()]);
        for p in self.contained_quadrants() {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        ((point - self.center).norm() - self.radius).abs() <= tolerance
            && self.contains_angle(angle_to(&self.center, point))
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        let mut snaps = vec![
            SnapPoint::center(self.center),
            SnapPoint::endpoint(self.start_point()),
            SnapPoint::endpoint(self.end_point()),
            SnapPoint::midpoint(self.mid_point()),
        ];
        snaps.extend(self.contained_quadrants().map(SnapPoint::quadrant));
        snaps
    }

    pub fn translate(&mut self, offset: &Vector2) {
        self.center += *offset;
    }

    /// 镜像会反转绕向，因此起止角互换角色
    pub fn mirror(&mut self, axis: &MirrorAxis) {
        self.center = axis.reflect(&self.center);
        let start = axis.reflect_angle(self.end_angle);
        let end = axis.reflect_angle(self.start_angle);
        self.start_angle = start;
        self.end_angle = end;
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        self.center = rotate_point(&self.center, center, angle);
        self.set_angles(self.start_angle + angle, self.end_angle + angle);
    }

    /// 负比例等价于绕基点旋转 180°
    pub fn scale(&mut self, center: &Point2, factor: f64) {
        self.center = scale_point(&self.center, center, factor);
        self.radius *= factor.abs();
        if factor < 0.0 {
            self.set_angles(self.start_angle + PI, self.end_angle + PI);
        }
    }

    pub fn approx_eq(&self, other: &Arc, tolerance: f64) -> bool {
        points_approx_eq(&self.center, &other.center, tolerance)
            && (self.radius - other.radius).abs() <= tolerance
            && angles_approx_eq(self.start_angle, other.start_angle, tolerance)
            && angles_approx_eq(self.end_angle, other.end_angle, tolerance)
    }
}
