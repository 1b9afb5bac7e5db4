//! 单行文本

use crate::math::{
    angles_approx_eq, normalize_angle, points_approx_eq, BoundingBox2, Point2, Vector2,
};
use crate::snap::SnapPoint;
use crate::transform::{rotate_point, rotate_vector, scale_point, MirrorAxis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 文本对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextAlignment {
    /// 左对齐（默认）
    #[default]
    Left,
    /// 居中对齐
    Center,
    /// 右对齐
    Right,
}

/// 文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// 插入点
    pub position: Point2,
    /// 文本内容
    pub content: String,
    /// 文本高度
    pub height: f64,
    /// 旋转角度（弧度）
    rotation: f64,
    /// 对齐方式
    pub alignment: TextAlignment,
}

impl Text {
    /// 创建新的文本对象
    pub fn new(position: Point2, content: impl Into<String>, height: f64) -> Self {
        Self {
            position,
            content: content.into(),
            height,
            rotation: 0.0,
            alignment: TextAlignment::Left,
        }
    }

    /// 设置旋转角度
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// 设置对齐方式
    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = normalize_angle(rotation);
    }

    /// 估算文本宽度（CJK 字符宽度接近字高，其余约为字高的0.6倍）
    pub fn estimated_width(&self) -> f64 {
        let char_count = self.content.chars().count();
        let cjk_count = self.content.chars().filter(|c| Self::is_cjk(*c)).count();
        let ascii_count = char_count - cjk_count;

        (cjk_count as f64 * self.height) + (ascii_count as f64 * self.height * 0.6)
    }

    /// 检查是否是CJK字符
    fn is_cjk(c: char) -> bool {
        matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
    }

    /// 文本局部坐标系（插入点为原点、基线为 x 轴）下的 x 范围
    fn local_x_range(&self) -> (f64, f64) {
        let width = self.estimated_width();
        let left = match self.alignment {
            TextAlignment::Left => 0.0,
            TextAlignment::Center => -width / 2.0,
            TextAlignment::Right => -width,
        };
        (left, left + width)
    }

    /// 旋转后的四个角点
    pub fn corners(&self) -> [Point2; 4] {
        let (x0, x1) = self.local_x_range();
        [
            Vector2::new(x0, 0.0),
            Vector2::new(x1, 0.0),
            Vector2::new(x1, self.height),
            Vector2::new(x0, self.height),
        ]
        .map(|v| self.position + rotate_vector(&v, self.rotation))
    }

    /// 获取包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.corners())
    }

    /// 点是否在（外扩容差后的）文本框内；先把点转到文本局部坐标系
    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> bool {
        let local = rotate_vector(&(point - self.position), -self.rotation);
        let (x0, x1) = self.local_x_range();
        local.x >= x0 - tolerance
            && local.x <= x1 + tolerance
            && local.y >= -tolerance
            && local.y <= self.height + tolerance
    }

    pub fn snap_points(&self) -> Vec<SnapPoint> {
        vec![SnapPoint::insertion(self.position)]
    }

    pub fn translate(&mut self, offset: &Vector2) {
        self.position += *offset;
    }

    /// 镜像插入点与基线方向，字形保持可读
    pub fn mirror(&mut self, axis: &MirrorAxis) {
        self.position = axis.reflect(&self.position);
        self.rotation = axis.reflect_angle(self.rotation);
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        self.position = rotate_point(&self.position, center, angle);
        self.set_rotation(self.rotation + angle);
    }

    pub fn scale(&mut self, center: &Point2, factor: f64) {
        self.position = scale_point(&self.position, center, factor);
        self.height *= factor.abs();
        if factor < 0.0 {
            self.set_rotation(self.rotation + PI);
        }
    }

    pub fn approx_eq(&self, other: &Text, tolerance: f64) -> bool {
        self.content == other.content
            && self.alignment == other.alignment
            && points_approx_eq(&self.position, &other.position, tolerance)
            && (self.height - other.height).abs() <= tolerance
            && angles_approx_eq(self.rotation, other.rotation, tolerance)
    }
}
