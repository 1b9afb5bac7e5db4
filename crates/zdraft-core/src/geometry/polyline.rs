//! 多段线（开放或闭合）

use super::{point_lists_approx_eq, polyline_distance, Geometry, Line};
use crate::math::{midpoint, BoundingBox2, Point2, Vector2};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};

/// 多段线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point2>,
    /// 是否闭合
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point2>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// 从点列表创建
    pub fn from_points(points: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
        Self {
            points: points.into_iter().collect(),
            closed,
        }
    }

    /// 顶点数量
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// 线段数量
    pub fn segment_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// 第 `index` 段的两个端点（闭合时最后一段回到起点）
    pub fn segment(&self, index: usize) -> Option<(Point2, Point2)> {
        if index >= self.segment_count() {
            return None;
        }
        let n = self.points.len();
        Some((self.points[index], self.points[(index + 1) % n]))
    }

    /// 全部线段
    pub fn segments(&self) -> Vec<(Point2, Point2)> {
        (0..self.segment_count())
            .filter_map(|i| self.segment(i))
            .collect()
    }

    /// 计算总长度
    pub fn length(&self) -> f64 {
        self.segments().iter().map(|(a, b)| (b - a).norm()).sum()
    }

    /// 计算点到多段线的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        polyline_distance(&self.points, self.closed, point)
    }

    /// 爆炸为独立的线段
    pub fn explode(&self) -> Vec<Geometry> {
        self.segments()
            .into_iter()
            .map(|(a, b)| Geometry::Line(Line::new(a, b)))
            .collect()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.points.iter().copied())
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.distance_to_point(point) <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        let mut snaps: Vec<SnapPoint> =
            self.points.iter().copied().map(SnapPoint::endpoint).collect();
        snaps.extend(
            self.segments()
                .iter()
                .map(|(a, b)| SnapPoint::midpoint(midpoint(a, b))),
        );
        snaps
    }

    pub fn translate(&mut self, offset: &Vector2) {
        for p in &mut self.points {
            *p += *offset;
        }
    }

    pub fn mirror(&mut self, axis: &MirrorAxis) {
        for p in &mut self.points {
            *p = axis.reflect(p);
        }
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        for p in &mut self.points {
            *p = rotate_point(p, center, angle);
        }
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        for p in &mut self.points {
            *p = scale_point(p, center, factor);
        }
    }

    pub fn approx_eq(&self, other: &Polyline, tolerance: f64) -> bool {
        self.closed == other.closed && point_lists_approx_eq(&self.points, &other.points, tolerance)
    }
}
