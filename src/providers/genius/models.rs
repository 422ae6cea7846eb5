//! 此模块定义了用于反序列化 Genius 搜索 API 响应的数据结构。
//! API 文档见 <https://docs.genius.com/>。

use serde::Deserialize;

/// 搜索接口 (`/search`) 的顶层响应结构。
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// 包含实际搜索结果的数据容器。
    pub response: SearchBody,
}

/// 搜索结果的数据部分。
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    /// 命中列表，按相关度排序。
    pub hits: Vec<SearchHit>,
}

/// 单个搜索命中。
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    /// 命中的歌曲摘要。
    pub result: SongSummary,
}

/// 命中歌曲的摘要信息。
#[derive(Debug, Deserialize)]
pub struct SongSummary {
    /// 歌曲标题。
    pub title: String,
    /// 歌曲页面的完整 URL，歌词正文要从这个页面抓取。
    pub url: String,
    /// 主要艺术家。
    pub primary_artist: ArtistSummary,
}

/// 艺术家摘要信息。
#[derive(Debug, Deserialize)]
pub struct ArtistSummary {
    /// 艺术家名。
    pub name: String,
}
