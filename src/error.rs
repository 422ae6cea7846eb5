//! 定义了整个 `lyrics-resolver` 库的内部错误类型 `ResolverError`。

use thiserror::Error;

/// `lyrics-resolver` 库的通用错误枚举。
///
/// 这些错误只在提供商的策略链内部流转：每个策略步骤都会把它们
/// 吸收掉，转换成下一步的尝试或一个终态的 [`FetchOutcome`]，
/// 不会越过顶层的 `resolve` 边界。
///
/// [`FetchOutcome`]: crate::model::outcome::FetchOutcome
#[derive(Error, Debug)]
pub enum ResolverError {
    /// 网络请求失败 (源自 `reqwest::Error`)
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// JSON 解析失败 (源自 `serde_json::Error`)
    #[error("JSON 解析失败: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// API 返回错误或非预期的响应
    #[error("API 返回了非预期的响应: {0}")]
    ApiError(String),
}

/// `ResolverError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, ResolverError>;
