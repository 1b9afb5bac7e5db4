//! 轴对齐矩形，由两个对角点定义

use super::Polyline;
use crate::math::{distance_to_segment, midpoint, points_approx_eq, BoundingBox2, Point2, Vector2};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};

/// 轴对齐矩形
///
/// 两个对角点按输入原样保存，不假定有序；需要有序角点时使用 `corners()`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub corner1: Point2,
    pub corner2: Point2,
}

impl Rectangle {
    pub fn new(corner1: Point2, corner2: Point2) -> Self {
        Self { corner1, corner2 }
    }

    fn min(&self) -> Point2 {
        Point2::new(
            self.corner1.x.min(self.corner2.x),
            self.corner1.y.min(self.corner2.y),
        )
    }

    fn max(&self) -> Point2 {
        Point2::new(
            self.corner1.x.max(self.corner2.x),
            self.corner1.y.max(self.corner2.y),
        )
    }

    /// 有序角点：左下、右下、右上、左上
    pub fn corners(&self) -> [Point2; 4] {
        let (min, max) = (self.min(), self.max());
        [
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ]
    }

    /// 以 corner1 为起点的角点序列：corner1, (c2.x, c1.y), corner2, (c1.x, c2.y)
    ///
    /// 约束特征索引按此顺序编号，0 和 2 是保存的独立点。
    pub fn stored_corners(&self) -> [Point2; 4] {
        [
            self.corner1,
            Point2::new(self.corner2.x, self.corner1.y),
            self.corner2,
            Point2::new(self.corner1.x, self.corner2.y),
        ]
    }

    /// 四条边（按 `corners()` 顺序首尾相接）
    pub fn edges(&self) -> [(Point2, Point2); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    pub fn width(&self) -> f64 {
        (self.corner2.x - self.corner1.x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.corner2.y - self.corner1.y).abs()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point2 {
        midpoint(&self.corner1, &self.corner2)
    }

    /// 转为闭合多段线
    pub fn to_polyline(&self) -> Polyline {
        Polyline::new(self.corners().to_vec(), true)
    }

    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        self.edges()
            .iter()
            .map(|(a, b)| distance_to_segment(point, a, b))
            .fold(f64::MAX, f64::min)
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(self.min(), self.max())
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.distance_to_point(point) <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        let mut snaps: Vec<SnapPoint> =
            self.corners().into_iter().map(SnapPoint::endpoint).collect();
        snaps.extend(
            self.edges()
                .iter()
                .map(|(a, b)| SnapPoint::midpoint(midpoint(a, b))),
        );
        snaps.push(SnapPoint::center(self.center()));
        snaps
    }

    pub fn translate(&mut self, offset: &Vector2) {
        self.corner1 += *offset;
        self.corner2 += *offset;
    }

    // 旋转与镜像只变换两个保存的角点，结果仍是轴对齐矩形。
    pub fn mirror(&mut self, axis: &MirrorAxis) {
        self.corner1 = axis.reflect(&self.corner1);
        self.corner2 = axis.reflect(&self.corner2);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        self.corner1 = rotate_point(&self.corner1, center, angle);
        self.corner2 = rotate_point(&self.corner2, center, angle);
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        self.corner1 = scale_point(&self.corner1, center, factor);
        self.corner2 = scale_point(&self.corner2, center, factor);
    }

    pub fn approx_eq(&self, other: &Rectangle, tolerance: f64) -> bool {
        points_approx_eq(&self.corner1, &other.corner1, tolerance)
            && points_approx_eq(&self.corner2, &other.corner2, tolerance)
    }
}
