//! 提供商模块
//!
//! 该模块定义了与各歌词源交互的核心抽象：[`Provider`] trait、
//! 供各提供商共用的 HTTP 访问层 [`PageFetcher`]，以及 HTML 文本提取
//! 的辅助函数。每个源的策略链实现在各自的子模块里。

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::Result,
    model::{outcome::FetchOutcome, track::LyricsQuery},
};

pub mod darklyrics;
pub mod genius;
pub mod metal_archives;

pub(crate) mod html;

/// 定义了所有歌词源提供商需要实现的通用接口。
#[async_trait]
pub trait Provider: Send + Sync {
    ///
    /// 返回提供商的唯一名称。
    ///
    /// 一个全小写的静态字符串，例如 `"genius"`, `"darklyrics"`。
    ///
    fn name(&self) -> &'static str;

    ///
    /// 为给定的查询解析歌词。
    ///
    /// 实现内部是一条严格有序的策略链：每一步要么短路返回终态结果，
    /// 要么把自己的失败吸收掉、继续下一步；单步不做重试。任何异常
    /// 都不会逃出这个方法——调用方只会看到一个 [`FetchOutcome`]。
    ///
    /// # 参数
    /// * `query` - 标题已规范化的查询视图。
    ///
    async fn fetch_lyrics(&self, query: &LyricsQuery<'_>) -> FetchOutcome;
}

/// 一次 HTTP GET 的结果：状态码加正文。
///
/// 状态码不在这一层解释，各策略步骤自己决定 401/404/非 200 意味着什么。
#[derive(Debug, Clone)]
pub(crate) struct PageResponse {
    /// HTTP 状态码。
    pub status: u16,
    /// 响应正文。
    pub body: String,
}

impl PageResponse {
    /// 状态码是否为 200。
    pub(crate) fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// 提供商与网络之间的接缝。
///
/// 生产实现是 [`ReqwestFetcher`]；测试里用桩实现替换，
/// 这样每条策略链的分支决策都可以离线验证。
#[async_trait]
pub(crate) trait PageFetcher: Send + Sync {
    /// 发送一次 GET 请求。`bearer` 存在时附加 `Authorization: Bearer` 头。
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<PageResponse>;
}

/// 基于 `reqwest` 的 [`PageFetcher`] 实现。
///
/// 内部的 `Client` 自带连接池，在多个提供商之间共享同一个实例
/// 只是复用连接的优化，不是正确性要求。
pub(crate) struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// 创建一个新的 `ReqwestFetcher`。
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<PageResponse> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(PageResponse { status, body })
    }
}
