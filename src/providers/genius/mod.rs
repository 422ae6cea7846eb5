//! 此模块实现了与 Genius 进行交互的 `Provider`。
//!
//! Genius 有带令牌鉴权的搜索 API，但歌词正文不在 API 里，只能从歌曲
//! 页面的 HTML 里抓。页面的容器写法换过代：当前一代是类名带
//! `Lyrics__Container` 前缀的若干个 `div`，更早的页面是单个
//! `<div class="lyrics">`，两种都要认。

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::{
    config::ResolverConfig,
    error::{ResolverError, Result},
    model::{
        outcome::{FetchOutcome, ProviderAttempt, log_attempts},
        track::LyricsQuery,
    },
    providers::{PageFetcher, Provider, ReqwestFetcher, html},
    text::cleanup,
};

pub mod models;

const API_BASE_URL: &str = "https://api.genius.com";

/// 模板里的占位令牌，等同于未配置。
const PLACEHOLDER_TOKEN: &str = "INSERT_YOUR_GENIUS_ACCESS_TOKEN_HERE";

static CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class*="Lyrics__Container"]"#).expect("歌词容器选择器应当合法")
});

static LEGACY_CONTAINER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.lyrics").expect("旧版歌词容器选择器应当合法"));

/// Genius 的客户端实现。
pub struct GeniusClient {
    token: Option<String>,
    fetcher: Arc<dyn PageFetcher>,
}

/// 原始搜索回退这一步的出口。
enum RawSearchStep {
    /// 链条到此为止。
    Terminal(FetchOutcome),
    /// 找到了歌曲页面，交给抓取步骤。
    FoundUrl(String),
}

impl GeniusClient {
    /// 创建一个新的 `GeniusClient` 实例，令牌取自配置。
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let fetcher = Arc::new(ReqwestFetcher::new(&config.user_agent, config.timeout)?);
        Ok(Self::with_fetcher(config.genius_token.clone(), fetcher))
    }

    pub(crate) fn with_fetcher(token: Option<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { token, fetcher }
    }

    /// 可用的访问令牌。空串和占位符都视为未配置。
    fn usable_token(&self) -> Option<&str> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() && token != PLACEHOLDER_TOKEN => Some(token),
            _ => None,
        }
    }

    fn search_url(query: &LyricsQuery<'_>) -> String {
        let q = format!("{} {}", query.title, query.artist);
        format!("{API_BASE_URL}/search?q={}", urlencoding::encode(&q))
    }

    /// 策略 1：结构化搜索。
    ///
    /// 用类型化的模型解析搜索响应，并只接受主要艺术家对得上的命中。
    async fn structured_search(
        &self,
        query: &LyricsQuery<'_>,
        token: &str,
    ) -> Result<Option<models::SongSummary>> {
        let page = self.fetcher.get(&Self::search_url(query), Some(token)).await?;
        if !page.is_ok() {
            return Err(ResolverError::ApiError(format!(
                "搜索接口返回状态码 {}",
                page.status
            )));
        }

        let parsed: models::SearchResponse = serde_json::from_str(&page.body)?;
        let artist_key = query.artist.to_lowercase();
        let hit = parsed
            .response
            .hits
            .into_iter()
            .map(|hit| hit.result)
            .find(|song| song.primary_artist.name.to_lowercase().contains(&artist_key));
        Ok(hit)
    }

    /// 策略 2：原始搜索回退。
    ///
    /// 不再要求艺术家匹配，拿第一个命中就走。401 在这里被判定为
    /// 鉴权失败并终结整条链——令牌无效时继续抓页面毫无意义。
    async fn raw_search(&self, query: &LyricsQuery<'_>, token: &str) -> RawSearchStep {
        let page = match self.fetcher.get(&Self::search_url(query), Some(token)).await {
            Ok(page) => page,
            Err(e) => {
                return RawSearchStep::Terminal(FetchOutcome::NetworkFailure {
                    detail: e.to_string(),
                });
            }
        };

        if page.status == 401 {
            warn!("[Genius] 搜索接口返回 401，令牌无效。");
            return RawSearchStep::Terminal(FetchOutcome::AuthFailure);
        }
        if !page.is_ok() {
            return RawSearchStep::Terminal(FetchOutcome::NetworkFailure {
                detail: format!("搜索接口返回状态码 {}", page.status),
            });
        }

        let json: serde_json::Value = match serde_json::from_str(&page.body) {
            Ok(value) => value,
            Err(e) => {
                return RawSearchStep::Terminal(FetchOutcome::ParseFailure {
                    detail: format!("搜索响应不是合法 JSON: {e}"),
                });
            }
        };

        let Some(hits) = json["response"]["hits"].as_array() else {
            return RawSearchStep::Terminal(FetchOutcome::ParseFailure {
                detail: "搜索响应缺少 hits 字段".to_string(),
            });
        };
        let Some(first) = hits.first() else {
            return RawSearchStep::Terminal(FetchOutcome::NotFound);
        };
        match first["result"]["url"].as_str() {
            Some(url) => RawSearchStep::FoundUrl(url.to_string()),
            None => RawSearchStep::Terminal(FetchOutcome::ParseFailure {
                detail: "搜索命中缺少 url 字段".to_string(),
            }),
        }
    }

    /// 策略 3：抓取歌曲页面并提取歌词。
    async fn scrape_song_page(&self, url: &str) -> FetchOutcome {
        let page = match self.fetcher.get(url, None).await {
            Ok(page) => page,
            Err(e) => {
                return FetchOutcome::NetworkFailure {
                    detail: e.to_string(),
                };
            }
        };
        if !page.is_ok() {
            return FetchOutcome::NetworkFailure {
                detail: format!("歌曲页面返回状态码 {}", page.status),
            };
        }
        Self::extract_lyrics(&page.body)
    }

    /// 从歌曲页面的 HTML 里提取并清理歌词。
    ///
    /// 当前一代容器可能有多个，按文档顺序拼接；一个都没有时再找
    /// 旧版的单容器。
    fn extract_lyrics(page_html: &str) -> FetchOutcome {
        let document = Html::parse_document(page_html);

        let mut blocks: Vec<String> = document
            .select(&CONTAINER_SELECTOR)
            .map(html::element_text_with_breaks)
            .collect();
        if blocks.is_empty() {
            blocks = document
                .select(&LEGACY_CONTAINER_SELECTOR)
                .map(html::element_text_with_breaks)
                .collect();
        }
        if blocks.is_empty() {
            return FetchOutcome::ParseFailure {
                detail: "页面中找不到歌词容器".to_string(),
            };
        }

        let cleaned = cleanup::clean(&blocks.join("\n"));
        FetchOutcome::from_cleaned_text(cleaned, "歌词容器清理后为空")
    }
}

#[async_trait]
impl Provider for GeniusClient {
    fn name(&self) -> &'static str {
        "genius"
    }

    async fn fetch_lyrics(&self, query: &LyricsQuery<'_>) -> FetchOutcome {
        let Some(token) = self.usable_token() else {
            warn!("[Genius] 未配置访问令牌。");
            return FetchOutcome::AuthFailure;
        };

        let mut attempts: Vec<ProviderAttempt> = Vec::new();

        // 策略 1：结构化搜索
        match self.structured_search(query, token).await {
            Ok(Some(song)) => {
                info!("[Genius] 结构化搜索命中: '{}' ({})", song.title, song.url);
                match self.scrape_song_page(&song.url).await {
                    outcome @ FetchOutcome::Success { .. } => {
                        log_attempts(self.name(), &attempts);
                        return outcome;
                    }
                    other => {
                        attempts.push(ProviderAttempt::new("structured-search", format!("{other:?}")));
                    }
                }
            }
            Ok(None) => {
                attempts.push(ProviderAttempt::new("structured-search", "没有艺术家匹配的命中"));
            }
            Err(e) => {
                attempts.push(ProviderAttempt::new("structured-search", e.to_string()));
            }
        }

        // 策略 2：原始搜索回退
        let song_url = match self.raw_search(query, token).await {
            RawSearchStep::Terminal(outcome) => {
                attempts.push(ProviderAttempt::new("raw-search", format!("{outcome:?}")));
                log_attempts(self.name(), &attempts);
                return outcome;
            }
            RawSearchStep::FoundUrl(url) => url,
        };
        info!("[Genius] 原始搜索找到歌曲页面: {song_url}");

        // 策略 3：页面抓取
        let outcome = self.scrape_song_page(&song_url).await;
        if !outcome.is_success() {
            attempts.push(ProviderAttempt::new("page-scrape", format!("{outcome:?}")));
        }
        log_attempts(self.name(), &attempts);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::StubFetcher;

    fn query<'a>() -> LyricsQuery<'a> {
        LyricsQuery {
            artist: "Metallica",
            title: "Battery",
            album: Some("Master of Puppets"),
        }
    }

    fn client_with(stub: StubFetcher, token: Option<&str>) -> (GeniusClient, Arc<StubFetcher>) {
        let stub = Arc::new(stub);
        let client = GeniusClient::with_fetcher(
            token.map(str::to_string),
            Arc::clone(&stub) as Arc<dyn PageFetcher>,
        );
        (client, stub)
    }

    fn search_json(url: &str) -> String {
        format!(
            r#"{{"response":{{"hits":[{{"result":{{"title":"Battery","url":"{url}","primary_artist":{{"name":"Metallica"}}}}}}]}}}}"#
        )
    }

    #[tokio::test]
    async fn test_missing_token_is_auth_failure_without_any_request() {
        let (client, stub) = client_with(StubFetcher::new(), None);
        let outcome = client.fetch_lyrics(&query()).await;
        assert_eq!(outcome, FetchOutcome::AuthFailure);
        assert!(stub.requested_urls().is_empty(), "缺少令牌时不应发出任何请求");
    }

    #[tokio::test]
    async fn test_placeholder_token_is_auth_failure() {
        let (client, _) = client_with(StubFetcher::new(), Some(PLACEHOLDER_TOKEN));
        assert_eq!(client.fetch_lyrics(&query()).await, FetchOutcome::AuthFailure);
    }

    #[tokio::test]
    async fn test_search_401_is_auth_failure_and_skips_page_scrape() {
        let stub = StubFetcher::new().route("api.genius.com/search", 401, "");
        let (client, stub) = client_with(stub, Some("token"));

        let outcome = client.fetch_lyrics(&query()).await;
        assert_eq!(outcome, FetchOutcome::AuthFailure);

        let requested = stub.requested_urls();
        assert!(
            requested.iter().all(|url| url.contains("api.genius.com")),
            "401 之后不应再抓取任何页面: {requested:?}"
        );
    }

    #[tokio::test]
    async fn test_structured_search_hit_scrapes_and_cleans() {
        let page = concat!(
            r#"<html><body><div class="Lyrics__Container-sc-1 abc">"#,
            "[Verse 1]<br>Lashing out the action<br>returning the reaction",
            "</div></body></html>",
        );
        let stub = StubFetcher::new()
            .route("api.genius.com/search", 200, &search_json("https://genius.com/Metallica-battery-lyrics"))
            .route("genius.com/Metallica-battery-lyrics", 200, page);
        let (client, _) = client_with(stub, Some("token"));

        let outcome = client.fetch_lyrics(&query()).await;
        assert_eq!(
            outcome,
            FetchOutcome::Success {
                text: "Lashing out the action\nreturning the reaction".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_multiple_containers_join_in_document_order() {
        let page = concat!(
            r#"<html><body>"#,
            r#"<div class="Lyrics__Container-x">first part</div>"#,
            r#"<div class="Lyrics__Container-y">second part</div>"#,
            "</body></html>",
        );
        let stub = StubFetcher::new()
            .route("api.genius.com/search", 200, &search_json("https://genius.com/page"))
            .route("genius.com/page", 200, page);
        let (client, _) = client_with(stub, Some("token"));

        let outcome = client.fetch_lyrics(&query()).await;
        assert_eq!(
            outcome,
            FetchOutcome::Success {
                text: "first part\nsecond part".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_legacy_container_fallback() {
        let page = r#"<html><body><div class="lyrics">old style lines</div></body></html>"#;
        let stub = StubFetcher::new()
            .route("api.genius.com/search", 200, &search_json("https://genius.com/page"))
            .route("genius.com/page", 200, page);
        let (client, _) = client_with(stub, Some("token"));

        let outcome = client.fetch_lyrics(&query()).await;
        assert_eq!(
            outcome,
            FetchOutcome::Success {
                text: "old style lines".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_no_container_is_parse_failure() {
        let page = "<html><body><p>nothing here</p></body></html>";
        let stub = StubFetcher::new()
            .route("api.genius.com/search", 200, &search_json("https://genius.com/page"))
            .route("genius.com/page", 200, page);
        let (client, _) = client_with(stub, Some("token"));

        let outcome = client.fetch_lyrics(&query()).await;
        assert!(
            matches!(outcome, FetchOutcome::ParseFailure { .. }),
            "找不到容器应当是 ParseFailure: {outcome:?}"
        );
    }

    #[tokio::test]
    async fn test_no_hits_is_not_found() {
        let stub = StubFetcher::new().route(
            "api.genius.com/search",
            200,
            r#"{"response":{"hits":[]}}"#,
        );
        let (client, _) = client_with(stub, Some("token"));
        assert_eq!(client.fetch_lyrics(&query()).await, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_search_json_is_parse_failure() {
        let stub = StubFetcher::new().route("api.genius.com/search", 200, "<html>not json</html>");
        let (client, _) = client_with(stub, Some("token"));
        let outcome = client.fetch_lyrics(&query()).await;
        assert!(matches!(outcome, FetchOutcome::ParseFailure { .. }));
    }

    #[tokio::test]
    async fn test_search_server_error_is_network_failure() {
        let stub = StubFetcher::new().route("api.genius.com/search", 500, "");
        let (client, _) = client_with(stub, Some("token"));
        let outcome = client.fetch_lyrics(&query()).await;
        assert!(matches!(outcome, FetchOutcome::NetworkFailure { .. }));
    }
}
