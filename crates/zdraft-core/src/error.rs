//! 内核错误定义

use crate::entity::EntityId;
use crate::geometry::EntityKind;
use crate::parametric::FeatureType;
use thiserror::Error;

/// 参数表查询错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Entity {0} is not registered in the parameter table")]
    EntityNotRegistered(EntityId),

    #[error("Entity kind {0} has no parameter layout")]
    UnsupportedEntity(EntityKind),

    #[error("Entity {entity} has no {feature_type:?} feature at index {index}")]
    FeatureOutOfRange {
        entity: EntityId,
        feature_type: FeatureType,
        index: usize,
    },

    #[error("Entity {entity} ({kind}) has no {feature_type:?} features")]
    FeatureTypeMismatch {
        entity: EntityId,
        kind: EntityKind,
        feature_type: FeatureType,
    },
}

/// 内核错误
#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Block not found: {0}")]
    BlockNotFound(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;
