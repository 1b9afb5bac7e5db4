//! 填充：实体填充或图案填充，支持多个边界环（孤岛）

use super::{point_lists_approx_eq, polyline_distance};
use crate::math::{angles_approx_eq, normalize_angle, BoundingBox2, Point2, Vector2};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};

/// 填充
///
/// 边界由若干闭合环组成（环的最后一点隐式连回第一点），
/// 第一个环为外边界，其余为孤岛。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hatch {
    pub boundaries: Vec<Vec<Point2>>,
    /// 图案名称（实体填充为 "SOLID"）
    pub pattern_name: String,
    /// 图案角度（弧度）
    pattern_angle: f64,
    /// 图案比例
    pub pattern_scale: f64,
    /// 是否实体填充
    pub solid: bool,
}

impl Hatch {
    /// 实体填充
    pub fn solid(boundaries: Vec<Vec<Point2>>) -> Self {
        Self {
            boundaries,
            pattern_name: "SOLID".to_string(),
            pattern_angle: 0.0,
            pattern_scale: 1.0,
            solid: true,
        }
    }

    /// 图案填充
    pub fn pattern(boundaries: Vec<Vec<Point2>>, name: &str, angle: f64, scale: f64) -> Self {
        Self {
            boundaries,
            pattern_name: name.to_string(),
            pattern_angle: normalize_angle(angle),
            pattern_scale: scale,
            solid: false,
        }
    }

    pub fn pattern_angle(&self) -> f64 {
        self.pattern_angle
    }

    pub fn set_pattern_angle(&mut self, angle: f64) {
        self.pattern_angle = normalize_angle(angle);
    }

    /// 所有边界环的线段（每个环自动闭合）
    pub fn boundary_segments(&self) -> Vec<(Point2, Point2)> {
        let mut segments = Vec::new();
        for ring in &self.boundaries {
            let n = ring.len();
            if n < 2 {
                continue;
            }
            for i in 0..n {
                segments.push((ring[i], ring[(i + 1) % n]));
            }
        }
        segments
    }

    /// 奇偶规则判断点是否在填充区域内
    pub fn contains_point(&self, point: &Point2) -> bool {
        let mut inside = false;
        for (a, b) in self.boundary_segments() {
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn points_mut(&mut self) -> impl Iterator<Item = &mut Point2> {
        self.boundaries.iter_mut().flatten()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.boundaries.iter().flatten().copied())
    }

    /// 点选只检测边界
    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.boundaries
            .iter()
            .any(|ring| polyline_distance(ring, true, point) <= tolerance)
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        self.boundaries
            .iter()
            .flatten()
            .copied()
            .map(SnapPoint::node)
            .collect()
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
        self.pattern_angle = axis.reflect_angle(self.pattern_angle);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        for p in self.points_mut() {
            *p = rotate_point(p, center, angle);
        }
        self.set_pattern_angle(self.pattern_angle + angle);
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        for p in self.points_mut() {
            *p = scale_point(p, center, factor);
        }
        self.pattern_scale *= factor.abs();
    }

    pub fn approx_eq(&self, other: &Hatch, tolerance: f64) -> bool {
        self.solid == other.solid
            && self.pattern_name == other.pattern_name
            && (self.pattern_scale - other.pattern_scale).abs() <= tolerance
            && angles_approx_eq(self.pattern_angle, other.pattern_angle, tolerance)
            && self.boundaries.len() == other.boundaries.len()
            && self
                .boundaries
                .iter()
                .zip(&other.boundaries)
                .all(|(a, b)| point_lists_approx_eq(a, b, tolerance))
    }
}
