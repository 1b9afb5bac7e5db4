//! 标注族
//!
//! - 线性（对齐）标注：两个测量点 + 尺寸线位置
//! - 半径/直径标注：圆心 + 曲线上一点
//! - 角度标注：顶点 + 两条射线上的点 + 圆弧位置
//! - 引线：折线路径 + 箭头 + 注释文字
//!
//! 标注不参与求交，也没有可约束的参数。

use super::{point_lists_approx_eq, polyline_distance, Arc};
use crate::math::{
    angle_to, distance_to_segment, midpoint, normalize_angle, points_approx_eq, unit, BoundingBox2,
    Point2, Vector2,
};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};

/// 默认标注文字高度
const DEFAULT_TEXT_HEIGHT: f64 = 2.5;

fn lines_distance(lines: &[(Point2, Point2)], point: &Point2) -> f64 {
    lines
        .iter()
        .map(|(a, b)| distance_to_segment(point, a, b))
        .fold(f64::MAX, f64::min)
}

fn text_approx_eq(a: &Option<String>, b: &Option<String>, ha: f64, hb: f64, tol: f64) -> bool {
    a == b && (ha - hb).abs() <= tol
}

/// 线性（对齐）标注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearDimension {
    /// 第一个测量点
    pub point1: Point2,
    /// 第二个测量点
    pub point2: Point2,
    /// 尺寸线经过的位置点
    pub location: Point2,
    /// 覆盖文本 (如果为空则显示测量值)
    pub text_override: Option<String>,
    pub text_height: f64,
}

impl LinearDimension {
    pub fn new(point1: Point2, point2: Point2, location: Point2) -> Self {
        Self {
            point1,
            point2,
            location,
            text_override: None,
            text_height: DEFAULT_TEXT_HEIGHT,
        }
    }

    pub fn with_text_override(mut self, text: impl Into<String>) -> Self {
        self.text_override = Some(text.into());
        self
    }

    /// 测量值：两测量点距离
    pub fn measurement(&self) -> f64 {
        (self.point2 - self.point1).norm()
    }

    pub fn display_text(&self) -> String {
        match &self.text_override {
            Some(text) => text.clone(),
            None => format!("{:.2}", self.measurement()),
        }
    }

    /// 尺寸线两端：测量点沿法向平移到位置点所在的平行线上
    pub fn dimension_line(&self) -> (Point2, Point2) {
        let Some(dir) = unit(&(self.point2 - self.point1)) else {
            return (self.location, self.location);
        };
        let normal = Vector2::new(-dir.y, dir.x);
        let offset = normal * (self.location - self.point1).dot(&normal);
        (self.point1 + offset, self.point2 + offset)
    }

    pub fn text_position(&self) -> Point2 {
        let (a, b) = self.dimension_line();
        midpoint(&a, &b)
    }

    /// 尺寸线与两条尺寸界线
    pub fn lines(&self) -> [(Point2, Point2); 3] {
        let (d1, d2) = self.dimension_line();
        [(d1, d2), (self.point1, d1), (self.point2, d2)]
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let (d1, d2) = self.dimension_line();
        BoundingBox2::from_points([self.point1, self.point2, d1, d2])
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        lines_distance(&self.lines(), point) <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        vec![
            SnapPoint::node(self.point1),
            SnapPoint::node(self.point2),
            SnapPoint::insertion(self.text_position()),
        ]
    }

    fn points_mut(&mut self) -> [&mut Point2; 3] {
        [&mut self.point1, &mut self.point2, &mut self.location]
    }

    pub fn translate(&mut self, offset: &Vector2) {
        for p in self.points_mut() {
            *p += *offset;
        }
    }

    pub fn mirror(&mut self, axis: &MirrorAxis) {
        for p in self.points_mut() {
            *p = axis.reflect(p);
        }
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        for p in self.points_mut() {
            *p = rotate_point(p, center, angle);
        }
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        for p in self.points_mut() {
            *p = scale_point(p, center, factor);
        }
        self.text_height *= factor.abs();
    }

    pub fn approx_eq(&self, other: &LinearDimension, tolerance: f64) -> bool {
        point_lists_approx_eq(
            &[self.point1, self.point2, self.location],
            &[other.point1, other.point2, other.location],
            tolerance,
        ) && text_approx_eq(
            &self.text_override,
            &other.text_override,
            self.text_height,
            other.text_height,
            tolerance,
        )
    }
}

/// 半径 / 直径标注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialDimension {
    pub center: Point2,
    /// 曲线上的测量点（同时作为文字位置）
    pub point: Point2,
    /// 直径标注
    pub diameter: bool,
    pub text_override: Option<String>,
    pub text_height: f64,
}

impl RadialDimension {
    pub fn radius(center: Point2, point: Point2) -> Self {
        Self {
            center,
            point,
            diameter: false,
            text_override: None,
            text_height: DEFAULT_TEXT_HEIGHT,
        }
    }

    pub fn diameter(center: Point2, point: Point2) -> Self {
        Self {
            diameter: true,
            ..Self::radius(center, point)
        }
    }

    pub fn with_text_override(mut self, text: impl Into<String>) -> Self {
        self.text_override = Some(text.into());
        self
    }

    pub fn measurement(&self) -> f64 {
        let r = (self.point - self.center).norm();
        if self.diameter {
            r * 2.0
        } else {
            r
        }
    }

    pub fn display_text(&self) -> String {
        match &self.text_override {
            Some(text) => text.clone(),
            None if self.diameter => format!("%%C{:.2}", self.measurement()), // %%C 是 CAD 中直径符号的转义
            None => format!("R{:.2}", self.measurement()),
        }
    }

    /// 尺寸线：半径从圆心出发，直径穿过圆心到对侧
    pub fn dimension_line(&self) -> (Point2, Point2) {
        if self.diameter {
            (self.center - (self.point - self.center), self.point)
        } else {
            (self.center, self.point)
        }
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let (a, b) = self.dimension_line();
        BoundingBox2::from_points([a, b])
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        let (a, b) = self.dimension_line();
        distance_to_segment(point, &a, &b) <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        vec![
            SnapPoint::center(self.center),
            SnapPoint::node(self.point),
        ]
    }

    pub fn translate(&mut self, offset: &Vector2) {
        self.center += *offset;
        self.point += *offset;
    }

    pub fn mirror(&mut self, axis: &MirrorAxis) {
        self.center = axis.reflect(&self.center);
        self.point = axis.reflect(&self.point);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        self.center = rotate_point(&self.center, center, angle);
        self.point = rotate_point(&self.point, center, angle);
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        self.center = scale_point(&self.center, center, factor);
        self.point = scale_point(&self.point, center, factor);
        self.text_height *= factor.abs();
    }

    pub fn approx_eq(&self, other: &RadialDimension, tolerance: f64) -> bool {
        self.diameter == other.diameter
            && points_approx_eq(&self.center, &other.center, tolerance)
            && points_approx_eq(&self.point, &other.point, tolerance)
            && text_approx_eq(
                &self.text_override,
                &other.text_override,
                self.text_height,
                other.text_height,
                tolerance,
            )
    }
}

/// 角度标注
///
/// 测量从 `vertex→point1` 逆时针转到 `vertex→point2` 的角度，
/// 标注圆弧的半径由 `location` 到顶点的距离决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngularDimension {
    pub vertex: Point2,
    pub point1: Point2,
    pub point2: Point2,
    pub location: Point2,
    pub text_override: Option<String>,
    pub text_height: f64,
}

impl AngularDimension {
    pub fn new(vertex: Point2, point1: Point2, point2: Point2, location: Point2) -> Self {
        Self {
            vertex,
            point1,
            point2,
            location,
            text_override: None,
            text_height: DEFAULT_TEXT_HEIGHT,
        }
    }

    pub fn with_text_override(mut self, text: impl Into<String>) -> Self {
        self.text_override = Some(text.into());
        self
    }

    /// 测量角（弧度，[0, 2π)）
    pub fn measurement(&self) -> f64 {
        normalize_angle(angle_to(&self.vertex, &self.point2) - angle_to(&self.vertex, &self.point1))
    }

    pub fn display_text(&self) -> String {
        match &self.text_override {
            Some(text) => text.clone(),
            None => format!("{:.2}°", self.measurement().to_degrees()),
        }
    }

    /// 标注圆弧
    pub fn dimension_arc(&self) -> Arc {
        Arc::new(
            self.vertex,
            (self.location - self.vertex).norm(),
            angle_to(&self.vertex, &self.point1),
            angle_to(&self.vertex, &self.point2),
        )
    }

    pub fn text_position(&self) -> Point2 {
        self.dimension_arc().mid_point()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = self.dimension_arc().bounding_box();
        for p in [self.vertex, self.point1, self.point2] {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.dimension_arc().hit_test(point, tolerance)
            || lines_distance(
                &[(self.vertex, self.point1), (self.vertex, self.point2)],
                point,
            ) <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        vec![
            SnapPoint::node(self.vertex),
            SnapPoint::node(self.point1),
            SnapPoint::node(self.point2),
            SnapPoint::insertion(self.text_position()),
        ]
    }

    fn points_mut(&mut self) -> [&mut Point2; 4] {
        [
            &mut self.vertex,
            &mut self.point1,
            &mut self.point2,
            &mut self.location,
        ]
    }

    pub fn translate(&mut self, offset: &Vector2) {
        for p in self.points_mut() {
            *p += *offset;
        }
    }

    /// 镜像反转绕向，交换两条射线以保持测量的是同一个角
    pub fn mirror(&mut self, axis: &MirrorAxis) {
        for p in self.points_mut() {
            *p = axis.reflect(p);
        }
        std::mem::swap(&mut self.point1, &mut self.point2);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        for p in self.points_mut() {
            *p = rotate_point(p, center, angle);
        }
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        for p in self.points_mut() {
            *p = scale_point(p, center, factor);
        }
        self.text_height *= factor.abs();
    }

    pub fn approx_eq(&self, other: &AngularDimension, tolerance: f64) -> bool {
        point_lists_approx_eq(
            &[self.vertex, self.point1, self.point2, self.location],
            &[other.vertex, other.point1, other.point2, other.location],
            tolerance,
        ) && text_approx_eq(
            &self.text_override,
            &other.text_override,
            self.text_height,
            other.text_height,
            tolerance,
        )
    }
}

/// 引线
///
/// 第一个顶点是箭头位置，最后一个顶点放置注释文字。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub vertices: Vec<Point2>,
    pub text: String,
    pub text_height: f64,
    pub arrow_size: f64,
}

impl Leader {
    pub fn new(vertices: Vec<Point2>, text: impl Into<String>) -> Self {
        Self {
            vertices,
            text: text.into(),
            text_height: DEFAULT_TEXT_HEIGHT,
            arrow_size: DEFAULT_TEXT_HEIGHT,
        }
    }

    pub fn arrow_point(&self) -> Option<Point2> {
        self.vertices.first().copied()
    }

    /// 箭头指向（从第二个顶点指向第一个顶点）
    pub fn arrow_direction(&self) -> Option<Vector2> {
        match self.vertices.as_slice() {
            [tip, next, ..] => unit(&(tip - next)),
            _ => None,
        }
    }

    pub fn text_position(&self) -> Option<Point2> {
        self.vertices.last().copied()
    }

    pub fn length(&self) -> f64 {
        self.vertices.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.vertices.iter().copied())
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        polyline_distance(&self.vertices, false, point) <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        self.vertices.iter().copied().map(SnapPoint::node).collect()
    }

    pub fn translate(&mut self, offset: &Vector2) {
        for p in &mut self.vertices {
            *p += *offset;
        }
    }

    pub fn mirror(&mut self, axis: &MirrorAxis) {
        for p in &mut self.vertices {
            *p = axis.reflect(p);
        }
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        for p in &mut self.vertices {
            *p = rotate_point(p, center, angle);
        }
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        for p in &mut self.vertices {
            *p = scale_point(p, center, factor);
        }
        self.text_height *= factor.abs();
        self.arrow_size *= factor.abs();
    }

    pub fn approx_eq(&self, other: &Leader, tolerance: f64) -> bool {
        self.text == other.text
            && (self.text_height - other.text_height).abs() <= tolerance
            && (self.arrow_size - other.arrow_size).abs() <= tolerance
            && point_lists_approx_eq(&self.vertices, &other.vertices, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_linear_dimension_offsets_line() {
        let dim = LinearDimension::new(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(3.0, 5.0),
        );
        assert_eq!(dim.measurement(), 10.0);
        assert_eq!(dim.display_text(), "10.00");
        let (d1, d2) = dim.dimension_line();
        assert!((d1 - Point2::new(0.0, 5.0)).norm() < 1e-12);
        assert!((d2 - Point2::new(10.0, 5.0)).norm() < 1e-12);
        assert!(dim.hit_test(&Point2::new(5.0, 5.05), 0.1));
        assert!(dim.hit_test(&Point2::new(0.0, 2.5), 0.1));
        assert!(!dim.hit_test(&Point2::new(5.0, 2.5), 0.1));
    }

    #[test]
    fn test_text_override_wins() {
        let dim = RadialDimension::diameter(Point2::origin(), Point2::new(3.0, 4.0));
        assert_eq!(dim.display_text(), "%%C10.00");
        let dim = dim.with_text_override("Ø10 H7");
        assert_eq!(dim.display_text(), "Ø10 H7");
        assert_eq!(
            RadialDimension::radius(Point2::origin(), Point2::new(0.0, 2.0)).display_text(),
            "R2.00"
        );
    }

    #[test]
    fn test_angular_dimension_measures_ccw() {
        let mut dim = AngularDimension::new(
            Point2::origin(),
            Point2::new(5.0, 0.0),
            Point2::new(0.0, 5.0),
            Point2::new(2.0, 2.0),
        );
        assert!((dim.measurement() - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(dim.display_text(), "90.00°");

        let axis = MirrorAxis::new(Point2::origin(), Point2::new(1.0, 0.0)).unwrap();
        dim.mirror(&axis);
        assert!((dim.measurement() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_leader_arrow() {
        let leader = Leader::new(
            vec![Point2::new(0.0, 0.0), Point2::new(3.0, 4.0), Point2::new(8.0, 4.0)],
            "NOTE",
        );
        assert_eq!(leader.length(), 10.0);
        let dir = leader.arrow_direction().unwrap();
        assert!((dir - Vector2::new(-0.6, -0.8)).norm() < 1e-12);
        assert_eq!(leader.text_position(), Some(Point2::new(8.0, 4.0)));
    }
}
