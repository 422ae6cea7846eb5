//! 解析器的构造期配置。
//!
//! 凭据和 HTTP 行为都在这里显式传入，库内部没有任何进程级的可变全局状态。
//! 凭据从哪里来（环境变量、配置文件、交互输入）由调用方决定，本库不做持久化。

use std::time::Duration;

/// 默认的浏览器 User-Agent。
///
/// 歌词站点会拒绝明显来自脚本的请求，统一伪装成桌面浏览器。
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// 默认的单次请求超时。
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`LyricsResolver`](crate::LyricsResolver) 的构造配置。
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Genius API 的访问令牌。缺失时 Genius 源会直接返回鉴权失败。
    pub genius_token: Option<String>,
    /// 发送请求时使用的 User-Agent。
    pub user_agent: String,
    /// 单次 HTTP 请求的超时时间。
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            genius_token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ResolverConfig {
    /// 创建一个携带 Genius 访问令牌的配置，其余字段使用默认值。
    pub fn with_genius_token(token: impl Into<String>) -> Self {
        Self {
            genius_token: Some(token.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_token() {
        let config = ResolverConfig::default();
        assert!(config.genius_token.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_with_genius_token() {
        let config = ResolverConfig::with_genius_token("abc123");
        assert_eq!(config.genius_token.as_deref(), Some("abc123"));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
