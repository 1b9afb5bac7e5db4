//! 实体视觉属性：图层、颜色、线宽、线型、编组

use serde::{Deserialize, Serialize};

/// ARGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const BLUE: Color = Color(0xFF00_00FF);

    pub fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(u32::from_be_bytes([a, r, g, b]))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    pub fn argb(&self) -> u32 {
        self.0
    }

    pub fn a(&self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    pub fn r(&self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    pub fn g(&self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    pub fn b(&self) -> u8 {
        self.0.to_be_bytes()[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 线型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LineType {
    /// 实线
    #[default]
    Continuous,
    /// 虚线
    Dashed,
    /// 点线
    Dotted,
    /// 点划线
    DashDot,
    /// 中心线
    Center,
    /// 隐藏线
    Hidden,
}

/// 编组ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

/// 实体公共属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    /// 图层名称
    pub layer: String,
    pub color: Color,
    /// 线宽（图纸单位）
    pub line_width: f64,
    pub line_type: LineType,
    /// 所属编组
    pub group: Option<GroupId>,
}

impl Properties {
    pub fn on_layer(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            layer: "0".to_string(),
            color: Color::default(),
            line_width: 0.25,
            line_type: LineType::Continuous,
            group: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_channels() {
        let c = Color::from_argb(0x80, 0x11, 0x22, 0x33);
        assert_eq!(c.argb(), 0x8011_2233);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x80, 0x11, 0x22, 0x33));
    }
}
