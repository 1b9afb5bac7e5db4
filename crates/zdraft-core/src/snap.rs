//! 对象捕捉点
//!
//! 实体只负责给出有语义的特征点（端点、中点、圆心、象限点……），
//! 距离筛选和优先级由外部的捕捉逻辑完成。

use crate::math::Point2;
use serde::{Deserialize, Serialize};

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapType {
    /// 端点捕捉
    Endpoint,
    /// 中点捕捉
    Midpoint,
    /// 圆心捕捉
    Center,
    /// 象限点（圆/弧的0°, 90°, 180°, 270°位置）
    Quadrant,
    /// 节点（多段线顶点、样条控制点、填充边界顶点）
    Node,
    /// 插入点（文字、块参照）
    Insertion,
}

impl SnapType {
    /// 获取捕捉类型的名称
    pub fn name(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "端点",
            SnapType::Midpoint => "中点",
            SnapType::Center => "圆心",
            SnapType::Quadrant => "象限点",
            SnapType::Node => "节点",
            SnapType::Insertion => "插入点",
        }
    }

    /// 获取捕捉类型的快捷键
    pub fn shortcut(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "END",
            SnapType::Midpoint => "MID",
            SnapType::Center => "CEN",
            SnapType::Quadrant => "QUA",
            SnapType::Node => "NOD",
            SnapType::Insertion => "INS",
        }
    }
}

/// 捕捉点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapPoint {
    /// 世界坐标
    pub point: Point2,
    pub snap_type: SnapType,
}

impl SnapPoint {
    pub fn new(point: Point2, snap_type: SnapType) -> Self {
        Self { point, snap_type }
    }

    pub fn endpoint(point: Point2) -> Self {
        Self::new(point, SnapType::Endpoint)
    }

    pub fn midpoint(point: Point2) -> Self {
        Self::new(point, SnapType::Midpoint)
    }

    pub fn center(point: Point2) -> Self {
        Self::new(point, SnapType::Center)
    }

    pub fn quadrant(point: Point2) -> Self {
        Self::new(point, SnapType::Quadrant)
    }

    pub fn node(point: Point2) -> Self {
        Self::new(point, SnapType::Node)
    }

    pub fn insertion(point: Point2) -> Self {
        Self::new(point, SnapType::Insertion)
    }
}
