// ==========================================
// 空间货舱储位管理系统 - API层错误类型
// ==========================================
// 职责: 定义服务层错误类型,转换 Repository 错误为用户友好的错误消息
// 红线: 校验错误在任何状态变更之前检出并拒绝
// 红线: 不变量破坏(重叠/越界入库)是内部错误,与普通校验失败显式区分
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因(哪个字段、哪个标识),便于调用方修正后重试
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方可修正错误
    // ==========================================
    /// 未知的货物/货柜标识
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 创建时标识重复
    #[error("标识冲突: {0}")]
    Conflict(String),

    /// 放置位置越界或与现有放置重叠
    #[error("无效放置位置: {0}")]
    InvalidPosition(String),

    /// 参数格式/组合错误(日期不可解析、互斥字段等)
    #[error("无效输入: {0}")]
    InvalidArgument(String),

    // ==========================================
    // 业务结果错误(不自动重试)
    // ==========================================
    /// 装载/腾挪均无法落位
    #[error("无可用容量: {0}")]
    NoCapacity(String),

    /// 存在废弃货物但回收方案一件也装不下
    #[error("回收容量不足: {0}")]
    CapacityExceeded(String),

    // ==========================================
    // 内部错误
    // ==========================================
    /// 占位不变量被破坏(重叠/越界已入库),属于程序缺陷,不可当作校验失败吞掉
    #[error("占位不变量破坏: {0}")]
    InvariantViolation(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将仓储层的技术错误转换为调用方可理解的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::Conflict(format!("外键约束违反: {}", msg))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InternalError(format!("字段{}读取错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<crate::importer::ImportError> for ApiError {
    fn from(err: crate::importer::ImportError) -> Self {
        match err {
            crate::importer::ImportError::Repository(repo) => repo.into(),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
