//! 此模块实现了与 DarkLyrics 进行交互的 `Provider`。
//!
//! DarkLyrics 没有任何 API。专辑页的 URL 可以由艺术家和专辑名确定性地
//! 构造出来；构造失败时退回搜索引擎来发现页面。页面上一整张专辑的歌词
//! 连在一起，需要按歌名标题模糊匹配，截取目标歌曲自己的段落。

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info};

use crate::{
    config::ResolverConfig,
    error::Result,
    model::{
        outcome::{FetchOutcome, ProviderAttempt, log_attempts},
        track::LyricsQuery,
    },
    providers::{PageFetcher, Provider, ReqwestFetcher, html},
    text::{cleanup, normalizer},
};

const BASE_URL: &str = "https://www.darklyrics.com";
const LYRICS_PATH_PREFIX: &str = "/lyrics/";
const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

static ORDINAL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s*").expect("序号前缀正则应当合法"));

static CONTAINER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.lyrics").expect("歌词容器选择器应当合法"));

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("链接选择器应当合法"));

/// DarkLyrics 的客户端实现。
pub struct DarkLyricsClient {
    fetcher: Arc<dyn PageFetcher>,
}

/// 直连 URL 这一步的出口。
enum DirectStep {
    /// 拿到了专辑页正文。
    Page(String),
    /// 这一步失败，落到搜索引擎回退。
    FallThrough(String),
}

/// 搜索引擎回退这一步的出口。
enum SearchStep {
    /// 拿到了专辑页正文。
    Page(String),
    /// 链条到此为止。
    Terminal(FetchOutcome),
}

/// 单次提取期间的专辑页视图。
///
/// 持有容器的扁平子节点序列，以及每个歌名标题对应的
/// `(标题文本, 内容起始下标, 内容结束下标)` 三元组；提取结束即丢弃。
struct AlbumPage<'a> {
    nodes: Vec<NodeRef<'a, Node>>,
    headings: Vec<(String, usize, usize)>,
}

impl<'a> AlbumPage<'a> {
    fn from_container(container: ElementRef<'a>) -> Self {
        let nodes: Vec<_> = container.children().collect();

        let mut marks: Vec<(String, usize)> = Vec::new();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(element) = ElementRef::wrap(*node)
                && element.value().name() == "h3"
            {
                marks.push((element.text().collect::<String>(), index));
            }
        }

        let mut headings = Vec::with_capacity(marks.len());
        for (position, (text, start)) in marks.iter().enumerate() {
            let end = marks
                .get(position + 1)
                .map_or(nodes.len(), |(_, next_start)| *next_start);
            headings.push((text.clone(), start + 1, end));
        }

        Self { nodes, headings }
    }
}

/// 把文本压成小写的纯字母数字 slug，供专辑页 URL 使用。
fn slug(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// 解析搜索结果里的一个链接，认出指向歌词页的那种。
///
/// 链接可能直接指向目标页，也可能是带 `uddg` 参数的跳转链接；
/// 两种都还原成不带 fragment 的歌词页 URL。不合要求的返回 `None`。
fn resolve_result_href(href: &str) -> Option<String> {
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;

    let redirect_target: Option<String> = parsed
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, target)| target.into_owned());
    let mut candidate = match redirect_target {
        Some(target) => Url::parse(&target).ok()?,
        None => parsed,
    };

    if !candidate
        .host_str()
        .is_some_and(|host| host.ends_with("darklyrics.com"))
    {
        return None;
    }
    if !candidate.path().starts_with(LYRICS_PATH_PREFIX) {
        return None;
    }

    candidate.set_fragment(None);
    Some(candidate.to_string())
}

impl DarkLyricsClient {
    /// 创建一个新的 `DarkLyricsClient` 实例。
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let fetcher = Arc::new(ReqwestFetcher::new(&config.user_agent, config.timeout)?);
        Ok(Self::with_fetcher(fetcher))
    }

    pub(crate) fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// 策略 1：直接构造专辑页 URL。
    async fn fetch_direct(&self, query: &LyricsQuery<'_>, album: &str) -> DirectStep {
        let url = format!(
            "{BASE_URL}{LYRICS_PATH_PREFIX}{}/{}.html",
            slug(query.artist),
            slug(album)
        );
        debug!("[DarkLyrics] 尝试直连专辑页: {url}");

        match self.fetcher.get(&url, None).await {
            Ok(page) if page.is_ok() => DirectStep::Page(page.body),
            Ok(page) => DirectStep::FallThrough(format!("专辑页返回状态码 {}", page.status)),
            Err(e) => DirectStep::FallThrough(e.to_string()),
        }
    }

    /// 策略 2：搜索引擎回退。
    ///
    /// 在结果里找第一个路径落在歌词前缀下的链接，去掉 fragment 后抓取。
    async fn fetch_via_search(&self, query: &LyricsQuery<'_>) -> SearchStep {
        let q = format!(
            r#"site:darklyrics.com "{}" "{}""#,
            query.artist, query.title
        );
        let search_url = format!("{SEARCH_URL}?q={}", urlencoding::encode(&q));

        let results_page = match self.fetcher.get(&search_url, None).await {
            Ok(page) if page.is_ok() => page,
            Ok(page) => {
                return SearchStep::Terminal(FetchOutcome::NetworkFailure {
                    detail: format!("搜索引擎返回状态码 {}", page.status),
                });
            }
            Err(e) => {
                return SearchStep::Terminal(FetchOutcome::NetworkFailure {
                    detail: e.to_string(),
                });
            }
        };

        let Some(album_url) = Self::first_lyrics_link(&results_page.body) else {
            return SearchStep::Terminal(FetchOutcome::NotFound);
        };
        info!("[DarkLyrics] 搜索引擎找到专辑页: {album_url}");

        match self.fetcher.get(&album_url, None).await {
            Ok(page) if page.is_ok() => SearchStep::Page(page.body),
            Ok(page) => SearchStep::Terminal(FetchOutcome::NetworkFailure {
                detail: format!("专辑页返回状态码 {}", page.status),
            }),
            Err(e) => SearchStep::Terminal(FetchOutcome::NetworkFailure {
                detail: e.to_string(),
            }),
        }
    }

    /// 在搜索结果页里找出第一个指向歌词页的链接。
    fn first_lyrics_link(results_html: &str) -> Option<String> {
        let document = Html::parse_document(results_html);
        document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|anchor| anchor.value().attr("href"))
            .find_map(resolve_result_href)
    }

    /// 策略 3：在专辑页内截取目标歌曲的歌词段落。
    ///
    /// 标题先剥掉 "12. " 一类的序号前缀，再和目标标题互相做匹配键
    /// 子串比较（专辑页标题和播放器上报的标题常常只有一方带副标题）。
    /// 按文档顺序取第一个满足的标题。
    fn extract_song_block(page_html: &str, title: &str) -> FetchOutcome {
        let document = Html::parse_document(page_html);
        let Some(container) = document.select(&CONTAINER_SELECTOR).next() else {
            return FetchOutcome::ParseFailure {
                detail: "页面中找不到歌词容器".to_string(),
            };
        };

        let page = AlbumPage::from_container(container);
        let target_key = normalizer::match_key(title);
        if target_key.is_empty() {
            return FetchOutcome::ParseFailure {
                detail: "页面中找不到这首歌的标题".to_string(),
            };
        }

        let matched = page.headings.iter().find(|(heading, _, _)| {
            let stripped = ORDINAL_PREFIX_RE.replace(heading, "");
            let heading_key = normalizer::match_key(&stripped);
            !heading_key.is_empty()
                && (heading_key.contains(&target_key) || target_key.contains(&heading_key))
        });
        let Some((heading, start, end)) = matched else {
            return FetchOutcome::ParseFailure {
                detail: "页面中找不到这首歌的标题".to_string(),
            };
        };
        debug!("[DarkLyrics] 命中标题: '{}'", heading.trim());

        let mut raw = String::new();
        for node in &page.nodes[*start..*end] {
            html::node_text_with_breaks(*node, &mut raw);
        }
        let cleaned = cleanup::clean(&raw);
        FetchOutcome::from_cleaned_text(cleaned, "歌词段落解析后为空")
    }
}

#[async_trait]
impl Provider for DarkLyricsClient {
    fn name(&self) -> &'static str {
        "darklyrics"
    }

    async fn fetch_lyrics(&self, query: &LyricsQuery<'_>) -> FetchOutcome {
        let mut attempts: Vec<ProviderAttempt> = Vec::new();

        // 策略 1：直连专辑页（需要专辑名）
        let direct_body = match query.album.filter(|album| !album.is_empty()) {
            Some(album) => match self.fetch_direct(query, album).await {
                DirectStep::Page(body) => Some(body),
                DirectStep::FallThrough(detail) => {
                    attempts.push(ProviderAttempt::new("direct-url", detail));
                    None
                }
            },
            None => {
                attempts.push(ProviderAttempt::new("direct-url", "没有专辑名，跳过"));
                None
            }
        };

        // 策略 2：搜索引擎回退
        let body = match direct_body {
            Some(body) => body,
            None => match self.fetch_via_search(query).await {
                SearchStep::Page(body) => body,
                SearchStep::Terminal(outcome) => {
                    attempts.push(ProviderAttempt::new("search-fallback", format!("{outcome:?}")));
                    log_attempts(self.name(), &attempts);
                    return outcome;
                }
            },
        };

        // 策略 3：页内提取
        let outcome = Self::extract_song_block(&body, query.title);
        if !outcome.is_success() {
            attempts.push(ProviderAttempt::new("extract", format!("{outcome:?}")));
        }
        log_attempts(self.name(), &attempts);
        outcome
    }
}
