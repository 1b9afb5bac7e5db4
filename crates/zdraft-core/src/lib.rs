//! ZDraft 几何内核
//!
//! 提供2D绘图实体模型、两两求交引擎，以及连接约束求解器的参数表。
//!
//! # 架构设计
//!
//! 采用 Entity-Component 模式：
//! - `Entity`: 唯一标识符 + 视觉属性 + 几何数据
//! - `Geometry`: 封闭的几何枚举（线、圆、弧、样条、块参照、标注等）
//! - `Properties`: 视觉属性（颜色、线型、图层）
//!
//! 实体由 `Drawing` 以 `Rc<RefCell<_>>` 共享持有；块定义同样共享，
//! 修改块定义会立即反映到所有块参照上。
//!
//! # 示例
//!
//! ```rust
//! use zdraft_core::prelude::*;
//!
//! let mut drawing = Drawing::new();
//! let line = drawing.add(Line::new(Point2::origin(), Point2::new(100.0, 50.0)));
//! let circle = drawing.add(Circle::new(Point2::new(50.0, 25.0), 10.0));
//!
//! let a = line.borrow().id;
//! let b = circle.borrow().id;
//! let points = drawing.intersections(a, b).unwrap();
//! assert_eq!(points.len(), 2);
//! ```

pub mod config;
pub mod drawing;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod intersect;
pub mod math;
pub mod parametric;
pub mod params;
pub mod properties;
pub mod snap;
pub mod transform;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::config::KernelConfig;
    pub use crate::drawing::Drawing;
    pub use crate::entity::{Entity, EntityId, IdAllocator, SharedEntity};
    pub use crate::error::{KernelError, ParameterError};
    pub use crate::geometry::{
        AngularDimension, Arc, BlockDefinition, BlockHandle, BlockReference, Circle, Ellipse,
        EntityKind, Geometry, Hatch, Leader, Line, LinearDimension, Polyline, RadialDimension,
        Rectangle, Spline, Text, TextAlignment,
    };
    pub use crate::intersect::intersect;
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::parametric::{
        Constraint, ConstraintSource, ConstraintSystem, ConstraintType, FeatureType, GeometryRef,
    };
    pub use crate::params::{ParamIndex, ParameterTable};
    pub use crate::properties::{Color, LineType, Properties};
    pub use crate::snap::{SnapPoint, SnapType};
    pub use crate::transform::Transform2D;
}
