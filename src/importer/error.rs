// ==========================================
// 空间货舱储位管理系统 - 导入层错误类型
// ==========================================

use thiserror::Error;

/// 导入层错误类型(文件级失败;行级失败以 RowError 逐行报告)
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 解析失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("仓储写入失败: {0}")]
    Repository(#[from] crate::repository::RepositoryError),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
