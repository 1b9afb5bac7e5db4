//! 线段

use crate::math::{
    distance_to_segment, midpoint, points_approx_eq, unit, BoundingBox2, Point2, Vector2,
};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 单位方向向量；零长度线段没有方向
    pub fn direction(&self) -> Option<Vector2> {
        unit(&(self.end - self.start))
    }

    /// 计算线段中点
    pub fn midpoint(&self) -> Point2 {
        midpoint(&self.start, &self.end)
    }

    /// 计算点到线段的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        distance_to_segment(point, &self.start, &self.end)
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points([self.start, self.end])
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.distance_to_point(point) <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        vec![
            SnapPoint::endpoint(self.start),
            SnapPoint::endpoint(self.end),
            SnapPoint::midpoint(self.midpoint()),
        ]
    }

    pub fn translate(&mut self, offset: &Vector2) {
        self.start += *offset;
        self.end += *offset;
    }

    pub fn mirror(&mut self, axis: &MirrorAxis) {
        self.start = axis.reflect(&self.start);
        self.end = axis.reflect(&self.end);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        self.start = rotate_point(&self.start, center, angle);
        self.end = rotate_point(&self.end, center, angle);
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        self.start = scale_point(&self.start, center, factor);
        self.end = scale_point(&self.end, center, factor);
    }

    pub fn approx_eq(&self, other: &Line, tolerance: f64) -> bool {
        points_approx_eq(&self.start, &other.start, tolerance)
            && points_approx_eq(&self.end, &other.end, tolerance)
    }
}
