//! 均匀三次 B 样条曲线

use super::{point_lists_approx_eq, Polyline};
use crate::math::{BoundingBox2, Point2, Vector2};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};

/// 每个节段默认的采样数
pub const DEFAULT_SEGMENTS_PER_SPAN: usize = 16;

/// 均匀三次 B 样条
///
/// 只保存控制点，曲线在使用时按需求值，不缓存。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub control_points: Vec<Point2>,
    pub closed: bool,
}

impl Spline {
    pub fn new(control_points: Vec<Point2>, closed: bool) -> Self {
        Self {
            control_points,
            closed,
        }
    }

    /// 控制点不足以构成三次节段时退化为控制多边形
    pub fn is_degenerate(&self) -> bool {
        let n = self.control_points.len();
        if self.closed {
            n < 3
        } else {
            n < 4
        }
    }

    /// 节段数：开放为 n - 3，闭合为 n
    pub fn span_count(&self) -> usize {
        if self.is_degenerate() {
            return 0;
        }
        let n = self.control_points.len();
        if self.closed {
            n
        } else {
            n - 3
        }
    }

    /// 求值为折线点列
    ///
    /// 除最后一个节段外，每段输出 `segments_per_span` 个采样（t = j / segments），
    /// 最后一段多输出 t = 1 的采样，使曲线恰好结束在端点上
    /// （闭合曲线则回到起点）。
    pub fn evaluate(&self, segments_per_span: usize) -> Vec<Point2> {
        if self.is_degenerate() {
            return self.control_points.clone();
        }

        let segments = segments_per_span.max(1);
        let spans = self.span_count();
        let n = self.control_points.len();
        let mut out = Vec::with_capacity(spans * segments + 1);

        for span in 0..spans {
            let window = [0, 1, 2, 3].map(|k| self.control_points[(span + k) % n]);
            let samples = if span + 1 == spans { segments + 1 } else { segments };
            for j in 0..samples {
                let t = j as f64 / segments as f64;
                out.push(bspline_point(&window, t));
            }
        }
        out
    }

    /// 以默认精度求值
    pub fn evaluated(&self) -> Vec<Point2> {
        self.evaluate(DEFAULT_SEGMENTS_PER_SPAN)
    }

    /// 近似折线；只有退化的闭合样条需要多段线自行闭合
    pub fn to_polyline(&self, segments_per_span: usize) -> Polyline {
        Polyline::new(
            self.evaluate(segments_per_span),
            self.closed && self.is_degenerate(),
        )
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.evaluated())
    }

    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        self.to_polyline(DEFAULT_SEGMENTS_PER_SPAN)
            .distance_to_point(point)
    }

    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        self.distance_to_point(point) <= tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        let mut snaps: Vec<SnapPoint> = self
            .control_points
            .iter()
            .copied()
            .map(SnapPoint::node)
            .collect();
        if !self.closed {
            let curve = self.evaluated();
            if let (Some(first), Some(last)) = (curve.first(), curve.last()) {
                snaps.push(SnapPoint::endpoint(*first));
                snaps.push(SnapPoint::endpoint(*last));
            }
        }
        snaps
    }

    // B 样条具有仿射不变性，变换控制点即可。

    pub fn translate(&mut self, offset: &Vector2) {
        for p in &mut self.control_points {
            *p += *offset;
        }
    }

    pub fn mirror(&mut self, axis: &MirrorAxis) {
        for p in &mut self.control_points {
            *p = axis.reflect(p);
        }
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        for p in &mut self.control_points {
            *p = rotate_point(p, center, angle);
        }
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        for p in &mut self.control_points {
            *p = scale_point(p, center, factor);
        }
    }

    pub fn approx_eq(&self, other: &Spline, tolerance: f64) -> bool {
        self.closed == other.closed
            && point_lists_approx_eq(&self.control_points, &other.control_points, tolerance)
    }
}

/// 均匀三次 B 样条基函数
fn bspline_point(p: &[Point2; 4], t: f64) -> Point2 {
    let t2 = t * t;
    let t3 = t2 * t;
    let u = 1.0 - t;
    let b0 = u * u * u / 6.0;
    let b1 = (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0;
    let b2 = (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0;
    let b3 = t3 / 6.0;
    Point2::new(
        b0 * p[0].x + b1 * p[1].x + b2 * p[2].x + b3 * p[3].x,
        b0 * p[0].y + b1 * p[1].y + b2 * p[2].y + b3 * p[3].y,
    )
}
