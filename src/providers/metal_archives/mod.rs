//! 此模块实现了与 Metal Archives 进行交互的 `Provider`。
//!
//! 流程分两跳：先用高级搜索接口按乐队名加歌名找到歌曲行，从行内
//! 单元格里挖出歌词链接的数字 ID，再请求歌词查看接口拿到正文片段。

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use crate::{
    config::ResolverConfig,
    error::Result,
    model::{
        outcome::{FetchOutcome, ProviderAttempt, log_attempts},
        track::LyricsQuery,
    },
    providers::{PageFetcher, Provider, ReqwestFetcher, html},
    text::cleanup,
};

pub mod models;

const SEARCH_URL: &str = "https://www.metal-archives.com/search/ajax-advanced/searching/songs";
const LYRICS_URL_BASE: &str = "https://www.metal-archives.com/release/ajax-view-lyrics/id";

/// 站点在歌曲没有歌词时返回的占位文本。
const NOT_AVAILABLE_SENTINEL: &str = "lyrics not available";

static LYRICS_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id="lyrics_link_(\d+)""#).expect("歌词链接正则应当合法"));

/// Metal Archives 的客户端实现。
pub struct MetalArchivesClient {
    fetcher: Arc<dyn PageFetcher>,
}

/// 搜索这一步的出口。
enum SearchStep {
    /// 链条到此为止。
    Terminal(FetchOutcome),
    /// 找到了歌词查看接口用的歌曲 ID。
    Found(String),
}

impl MetalArchivesClient {
    /// 创建一个新的 `MetalArchivesClient` 实例。
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let fetcher = Arc::new(ReqwestFetcher::new(&config.user_agent, config.timeout)?);
        Ok(Self::with_fetcher(fetcher))
    }

    pub(crate) fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// 策略 1：高级搜索，从结果行里挖出歌词 ID。
    async fn search_song_id(&self, query: &LyricsQuery<'_>) -> SearchStep {
        let url = format!(
            "{SEARCH_URL}?bandName={}&songTitle={}",
            urlencoding::encode(query.artist),
            urlencoding::encode(query.title)
        );

        let page = match self.fetcher.get(&url, None).await {
            Ok(page) if page.is_ok() => page,
            Ok(page) => {
                return SearchStep::Terminal(FetchOutcome::NetworkFailure {
                    detail: format!("搜索接口返回状态码 {}", page.status),
                });
            }
            Err(e) => {
                return SearchStep::Terminal(FetchOutcome::NetworkFailure {
                    detail: e.to_string(),
                });
            }
        };

        let parsed: models::SongSearchResponse = match serde_json::from_str(&page.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return SearchStep::Terminal(FetchOutcome::ParseFailure {
                    detail: format!("搜索响应不是合法 JSON: {e}"),
                });
            }
        };
        if parsed.rows.is_empty() {
            return SearchStep::Terminal(FetchOutcome::NotFound);
        }
        debug!("[MetalArchives] 搜索返回 {} 行结果。", parsed.total_records);

        for row in &parsed.rows {
            for cell in row {
                if let Some(captures) = LYRICS_LINK_RE.captures(cell) {
                    return SearchStep::Found(captures[1].to_string());
                }
            }
        }
        SearchStep::Terminal(FetchOutcome::ParseFailure {
            detail: "搜索结果里没有歌词链接".to_string(),
        })
    }

    /// 策略 2：按 ID 请求歌词正文。
    async fn fetch_lyrics_body(&self, song_id: &str) -> FetchOutcome {
        let url = format!("{LYRICS_URL_BASE}/{song_id}");
        info!("[MetalArchives] 请求歌词正文: {url}");

        let page = match self.fetcher.get(&url, None).await {
            Ok(page) if page.is_ok() => page,
            Ok(page) => {
                return FetchOutcome::NetworkFailure {
                    detail: format!("歌词接口返回状态码 {}", page.status),
                };
            }
            Err(e) => {
                return FetchOutcome::NetworkFailure {
                    detail: e.to_string(),
                };
            }
        };

        let text = html::fragment_text_with_breaks(&page.body);
        if text.to_lowercase().contains(NOT_AVAILABLE_SENTINEL) {
            return FetchOutcome::NotFound;
        }
        let cleaned = cleanup::clean(&text);
        FetchOutcome::from_cleaned_text(cleaned, "歌词正文清理后为空")
    }
}

#[async_trait]
impl Provider for MetalArchivesClient {
    fn name(&self) -> &'static str {
        "metal-archives"
    }

    async fn fetch_lyrics(&self, query: &LyricsQuery<'_>) -> FetchOutcome {
        let mut attempts: Vec<ProviderAttempt> = Vec::new();

        let song_id = match self.search_song_id(query).await {
            SearchStep::Terminal(outcome) => {
                attempts.push(ProviderAttempt::new("song-search", format!("{outcome:?}")));
                log_attempts(self.name(), &attempts);
                return outcome;
            }
            SearchStep::Found(song_id) => song_id,
        };

        let outcome = self.fetch_lyrics_body(&song_id).await;
        if !outcome.is_success() {
            attempts.push(ProviderAttempt::new("lyrics-fetch", format!("{outcome:?}")));
        }
        log_attempts(self.name(), &attempts);
        outcome
    }
}
