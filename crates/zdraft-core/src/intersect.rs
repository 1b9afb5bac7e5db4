//! 求交引擎
//!
//! 所有图元先归约为两类操作数：
//! - 直线段集合（线段、矩形、多段线、样条、填充边界、块参照）
//! - 圆类曲线（圆、圆弧）
//!
//! 再按 段×段、段×圆、圆×圆 两两求交。椭圆、文本与标注不参与求交。

use crate::config::KernelConfig;
use crate::geometry::{Arc, Geometry, DEFAULT_SEGMENTS_PER_SPAN};
use crate::math::{angle_to, cross, points_approx_eq, Point2, Vector2, EPSILON};

/// 直线段
pub type Segment = (Point2, Point2);

/// 参数是否落在 [0, 1]（两端各放宽 EPSILON）
#[inline]
fn in_unit_range(t: f64) -> bool {
    (-EPSILON..=1.0 + EPSILON).contains(&t)
}

/// 线段与线段求交
///
/// 叉积解 2×2 线性方程组；平行或共线（分母接近零）时返回 None。
pub fn line_line(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> Option<Point2> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = cross(&da, &db);
    if denom.abs() < EPSILON {
        return None;
    }

    let w = b0 - a0;
    let t = cross(&w, &db) / denom;
    let s = cross(&w, &da) / denom;

    if in_unit_range(t) && in_unit_range(s) {
        Some(a0 + da * t)
    } else {
        None
    }
}

/// 线段与圆求交
///
/// 按圆心到直线的垂距判断相离、相切、相交，容差随半径缩放；
/// 只保留参数 t ∈ [0, 1] 的交点。
pub fn line_circle(p0: &Point2, p1: &Point2, center: &Point2, radius: f64) -> Vec<Point2> {
    let d = p1 - p0;
    let len2 = d.dot(&d);
    if len2 < EPSILON {
        return Vec::new();
    }

    let t_foot = (center - p0).dot(&d) / len2;
    let foot = p0 + d * t_foot;
    let dist = (center - foot).norm();
    let tol = EPSILON * radius.max(1.0);

    if dist > radius + tol {
        return Vec::new();
    }
    if (dist - radius).abs() <= tol {
        return if in_unit_range(t_foot) {
            vec![foot]
        } else {
            Vec::new()
        };
    }

    let half = (radius * radius - dist * dist).max(0.0).sqrt() / len2.sqrt();
    [t_foot - half, t_foot + half]
        .into_iter()
        .filter(|t| in_unit_range(*t))
        .map(|t| p0 + d * t)
        .collect()
}

/// 圆与圆求交
///
/// 同心、相离、内含时无交点；相切时返回一个点。
pub fn circle_circle(c1: &Point2, r1: f64, c2: &Point2, r2: f64) -> Vec<Point2> {
    let delta = c2 - c1;
    let d = delta.norm();
    let tol = EPSILON * r1.max(r2).max(1.0);
    if d < EPSILON || d > r1 + r2 + tol || d < (r1 - r2).abs() - tol {
        return Vec::new();
    }

    let a = (d * d + r1 * r1 - r2 * r2) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let dir = delta / d;
    let base = c1 + dir * a;

    if h <= tol {
        return vec![base];
    }

    let normal = Vector2::new(-dir.y, dir.x);
    vec![base + normal * h, base - normal * h]
}

/// 线段与圆弧求交：线圆交点中落在扫掠范围内的部分
pub fn line_arc(p0: &Point2, p1: &Point2, arc: &Arc) -> Vec<Point2> {
    let center = arc.center();
    line_circle(p0, p1, &center, arc.radius())
        .into_iter()
        .filter(|p| arc.contains_angle(angle_to(&center, p)))
        .collect()
}

/// 以默认样条精度提取直线段
pub fn segments(geometry: &Geometry) -> Vec<Segment> {
    segments_with(geometry, DEFAULT_SEGMENTS_PER_SPAN)
}

/// 把图元归约为直线段
///
/// 圆类曲线、椭圆、文本和标注没有直线段。
pub fn segments_with(geometry: &Geometry, spline_segments: usize) -> Vec<Segment> {
    match geometry {
        Geometry::Line(line) => vec![(line.start, line.end)],
        Geometry::Rectangle(rect) => rect.edges().to_vec(),
        Geometry::Polyline(polyline) => polyline.segments(),
        Geometry::Spline(spline) => spline.to_polyline(spline_segments).segments(),
        Geometry::Hatch(hatch) => hatch.boundary_segments(),
        Geometry::BlockReference(reference) => {
            let transform = reference.transform();
            let definition = reference.definition().borrow();
            definition
                .entities
                .iter()
                .flat_map(|entity| segments_with(&entity.geometry, spline_segments))
                .map(|(a, b)| (transform.apply(&a), transform.apply(&b)))
                .collect()
        }
        Geometry::Circle(_)
        | Geometry::Arc(_)
        | Geometry::Ellipse(_)
        | Geometry::Text(_)
        | Geometry::LinearDimension(_)
        | Geometry::RadialDimension(_)
        | Geometry::AngularDimension(_)
        | Geometry::Leader(_) => Vec::new(),
    }
}

/// 圆类操作数；圆弧额外携带扫掠范围
enum RoundCurve<'a> {
    Circle(Point2, f64),
    Arc(&'a Arc),
}

impl<'a> RoundCurve<'a> {
    fn of(geometry: &'a Geometry) -> Option<Self> {
        match geometry {
            Geometry::Circle(circle) => Some(RoundCurve::Circle(circle.center, circle.radius)),
            Geometry::Arc(arc) => Some(RoundCurve::Arc(arc)),
            _ => None,
        }
    }

    fn center(&self) -> Point2 {
        match self {
            RoundCurve::Circle(center, _) => *center,
            RoundCurve::Arc(arc) => arc.center(),
        }
    }

    fn radius(&self) -> f64 {
        match self {
            RoundCurve::Circle(_, radius) => *radius,
            RoundCurve::Arc(arc) => arc.radius(),
        }
    }

    /// 圆上的点是否属于该曲线
    fn accepts(&self, point: &Point2) -> bool {
        match self {
            RoundCurve::Circle(..) => true,
            RoundCurve::Arc(arc) => arc.contains_angle(angle_to(&arc.center(), point)),
        }
    }

    fn with_segment(&self, segment: &Segment) -> Vec<Point2> {
        match self {
            RoundCurve::Circle(center, radius) => {
                line_circle(&segment.0, &segment.1, center, *radius)
            }
            RoundCurve::Arc(arc) => line_arc(&segment.0, &segment.1, arc),
        }
    }
}

/// 两个图元的交点（默认配置）
pub fn intersect(a: &Geometry, b: &Geometry) -> Vec<Point2> {
    intersect_with(a, b, &KernelConfig::default())
}

/// 两个图元的交点
///
/// 结果按 `merge_tolerance` 去重，多段线顶点或矩形角点落在另一条曲线上时只报告一次。
pub fn intersect_with(a: &Geometry, b: &Geometry, config: &KernelConfig) -> Vec<Point2> {
    let segments_a = segments_with(a, config.spline_segments_per_span);
    let segments_b = segments_with(b, config.spline_segments_per_span);
    let curve_a = RoundCurve::of(a);
    let curve_b = RoundCurve::of(b);

    let mut points = Vec::new();

    for sa in &segments_a {
        for sb in &segments_b {
            points.extend(line_line(&sa.0, &sa.1, &sb.0, &sb.1));
        }
    }

    if let Some(curve) = &curve_b {
        for segment in &segments_a {
            points.extend(curve.with_segment(segment));
        }
    }
    if let Some(curve) = &curve_a {
        for segment in &segments_b {
            points.extend(curve.with_segment(segment));
        }
    }

    if let (Some(ca), Some(cb)) = (&curve_a, &curve_b) {
        points.extend(
            circle_circle(&ca.center(), ca.radius(), &cb.center(), cb.radius())
                .into_iter()
                .filter(|p| ca.accepts(p) && cb.accepts(p)),
        );
    }

    dedup_points(points, config.merge_tolerance)
}

fn dedup_points(points: Vec<Point2>, tolerance: f64) -> Vec<Point2> {
    let mut unique: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if !unique.iter().any(|q| points_approx_eq(&p, q, tolerance)) {
            unique.push(p);
        }
    }
    unique
}
