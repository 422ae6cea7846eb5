#![warn(missing_docs)]

//! # Lyrics Resolver
//!
//! 一个把 (艺术家, 标题, 专辑) 解析为干净歌词文本的 Rust 库。
//!
//! ## 主要功能
//!
//! - **标题规范化**: 剥掉播放器上报标题里的 "(Remastered)"、"[Live]" 一类噪声。
//! - **多源获取**: 支持 Genius（API + 页面抓取）、DarkLyrics（直连 URL +
//!   搜索引擎发现 + 页内标题匹配）和 Metal Archives（AJAX 接口两跳）。
//!   每个源内部是一条严格有序的回退策略链。
//! - **正文清理**: 去掉段落标记、回显的标题行和多余空行，输出可直接展示的文本。
//!
//! 所有失败都以带类别的 [`FetchOutcome`] 返回，调用方不需要捕获任何错误。
//!
//! ## 获取歌词
//!
//! ```rust,no_run
//! use lyrics_resolver::{FetchOutcome, LyricsResolver, LyricsSource, ResolverConfig, TrackRef};
//!
//! async {
//!     let config = ResolverConfig::with_genius_token("你的 Genius 令牌");
//!     let resolver = LyricsResolver::new(config).unwrap();
//!
//!     let track = TrackRef::new("Metallica", "Battery (Remastered 2009)")
//!         .with_album("Master of Puppets");
//!     match resolver.resolve(&track, LyricsSource::DarkLyrics).await {
//!         FetchOutcome::Success { text } => println!("{text}"),
//!         FetchOutcome::AuthFailure => eprintln!("请检查访问令牌。"),
//!         other => eprintln!("未能获取歌词: {other:?}"),
//!     }
//! };
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod providers;
pub mod text;

use std::sync::Arc;

pub use crate::{
    config::ResolverConfig,
    error::{ResolverError, Result},
    model::{outcome::FetchOutcome, track::TrackRef},
};

use crate::{
    model::track::LyricsQuery,
    providers::{
        PageFetcher, Provider, ReqwestFetcher, darklyrics::DarkLyricsClient, genius::GeniusClient,
        metal_archives::MetalArchivesClient,
    },
    text::normalizer,
};

/// 歌词来源选择器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricsSource {
    /// Genius（需要 API 访问令牌）。
    Genius,
    /// DarkLyrics。
    DarkLyrics,
    /// Metal Archives。
    MetalArchives,
}

/// 顶层歌词解析客户端，封装了所有提供商，为调用方提供统一、简单的接口。
///
/// 这是与本库交互的主要入口点。一次 [`resolve`] 调用就是一个完整的
/// 工作单元：内部顺序地发出若干网络请求，调用方应当把它放在 UI
/// 线程之外执行。解析器本身不在调用之间保留任何状态，并发的调用
/// 互不影响；同一个实例内部共享连接池，仅此而已。
///
/// [`resolve`]: LyricsResolver::resolve
pub struct LyricsResolver {
    genius: GeniusClient,
    darklyrics: DarkLyricsClient,
    metal_archives: MetalArchivesClient,
}

impl LyricsResolver {
    /// 用给定配置创建一个新的 `LyricsResolver` 实例。
    ///
    /// 凭据和 HTTP 行为全部来自 `config`，之后不可变。
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> =
            Arc::new(ReqwestFetcher::new(&config.user_agent, config.timeout)?);
        Ok(Self::with_fetcher(&config, fetcher))
    }

    pub(crate) fn with_fetcher(config: &ResolverConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            genius: GeniusClient::with_fetcher(config.genius_token.clone(), Arc::clone(&fetcher)),
            darklyrics: DarkLyricsClient::with_fetcher(Arc::clone(&fetcher)),
            metal_archives: MetalArchivesClient::with_fetcher(fetcher),
        }
    }

    /// 为一首歌解析歌词。
    ///
    /// 先把标题规范化，然后把查询交给选定的源。源内部的回退策略链
    /// 产出什么结果，这里就原样返回什么：不做重试，也不会在一次调用
    /// 里混用多个源。
    ///
    /// # 参数
    /// * `track` - 歌曲元数据。
    /// * `source` - 使用哪个歌词源。
    ///
    /// # 返回
    /// 一个 [`FetchOutcome`]。任何内部错误都已折叠进失败类别里，
    /// 这个方法不会 panic，也不返回 `Result`。
    pub async fn resolve(&self, track: &TrackRef, source: LyricsSource) -> FetchOutcome {
        let normalized_title = normalizer::normalize(&track.title);
        if normalized_title != track.title {
            tracing::info!("标题规范化: '{}' -> '{}'", track.title, normalized_title);
        }

        let query = LyricsQuery {
            artist: &track.artist,
            title: &normalized_title,
            album: track.album.as_deref(),
        };

        let provider: &dyn Provider = match source {
            LyricsSource::Genius => &self.genius,
            LyricsSource::DarkLyrics => &self.darklyrics,
            LyricsSource::MetalArchives => &self.metal_archives,
        };
        tracing::info!(
            "正在通过 '{}' 为 '{} - {}' 解析歌词...",
            provider.name(),
            track.artist,
            normalized_title
        );

        let outcome = provider.fetch_lyrics(&query).await;
        if !outcome.is_success() {
            tracing::info!("'{}' 未能取得歌词: {:?}", provider.name(), outcome);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::StubFetcher;

    fn init_tracing() {
        use tracing_subscriber::{EnvFilter, FmtSubscriber};
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,lyrics_resolver=debug"));
        let _ = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    fn resolver_with(stub: StubFetcher, config: &ResolverConfig) -> (LyricsResolver, Arc<StubFetcher>) {
        let stub = Arc::new(stub);
        let resolver = LyricsResolver::with_fetcher(config, Arc::clone(&stub) as Arc<dyn PageFetcher>);
        (resolver, stub)
    }

    #[tokio::test]
    async fn test_resolve_passes_normalized_title_to_provider() {
        let stub = StubFetcher::new().route("api.genius.com", 200, r#"{"response":{"hits":[]}}"#);
        let config = ResolverConfig::with_genius_token("token");
        let (resolver, stub) = resolver_with(stub, &config);

        let track = TrackRef::new("Metallica", "Battery (Live)");
        let outcome = resolver.resolve(&track, LyricsSource::Genius).await;
        assert_eq!(outcome, FetchOutcome::NotFound);

        let requested = stub.requested_urls();
        assert!(
            requested[0].contains("Battery%20Metallica"),
            "搜索词应当使用规范化后的标题: {requested:?}"
        );
        assert!(
            !requested[0].contains("Live"),
            "噪声后缀不应进入搜索词: {requested:?}"
        );
    }

    #[tokio::test]
    async fn test_resolve_without_token_is_auth_failure_and_silent() {
        let (resolver, stub) = resolver_with(StubFetcher::new(), &ResolverConfig::default());

        let track = TrackRef::new("Metallica", "Battery");
        let outcome = resolver.resolve(&track, LyricsSource::Genius).await;
        assert_eq!(outcome, FetchOutcome::AuthFailure);
        assert!(stub.requested_urls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_only_touches_the_selected_source() {
        let album_page = concat!(
            r#"<div class="lyrics">"#,
            "<h3>1. Battery</h3>Lashing out the action",
            "</div>",
        );
        let stub = StubFetcher::new().route("darklyrics.com", 200, album_page);
        let config = ResolverConfig::with_genius_token("token");
        let (resolver, stub) = resolver_with(stub, &config);

        let track = TrackRef::new("Metallica", "Battery").with_album("Master of Puppets");
        let outcome = resolver.resolve(&track, LyricsSource::DarkLyrics).await;
        assert_eq!(
            outcome,
            FetchOutcome::Success {
                text: "Lashing out the action".to_string()
            }
        );

        let requested = stub.requested_urls();
        assert!(
            requested.iter().all(|url| url.contains("darklyrics.com")),
            "不应请求未选中的源: {requested:?}"
        );
    }

    #[tokio::test]
    #[ignore]
    async fn test_genius_live_resolve() {
        init_tracing();
        let token = std::env::var("GENIUS_ACCESS_TOKEN").expect("需要 GENIUS_ACCESS_TOKEN");
        let resolver = LyricsResolver::new(ResolverConfig::with_genius_token(token)).unwrap();

        let track = TrackRef::new("Metallica", "Battery");
        let outcome = resolver.resolve(&track, LyricsSource::Genius).await;
        assert!(outcome.is_success(), "{outcome:?}");
    }

    #[tokio::test]
    #[ignore]
    async fn test_darklyrics_live_resolve() {
        init_tracing();
        let resolver = LyricsResolver::new(ResolverConfig::default()).unwrap();

        let track = TrackRef::new("Metallica", "Battery").with_album("Master of Puppets");
        let outcome = resolver.resolve(&track, LyricsSource::DarkLyrics).await;
        assert!(outcome.is_success(), "{outcome:?}");
    }

    #[tokio::test]
    #[ignore]
    async fn test_metal_archives_live_resolve() {
        init_tracing();
        let resolver = LyricsResolver::new(ResolverConfig::default()).unwrap();

        let track = TrackRef::new("Metallica", "Battery");
        let outcome = resolver.resolve(&track, LyricsSource::MetalArchives).await;
        assert!(outcome.is_success(), "{outcome:?}");
    }
}
