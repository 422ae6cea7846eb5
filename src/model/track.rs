//! 定义了作为解析输入的歌曲元数据结构。

/// 代表一首待解析歌曲的元数据，用作 [`resolve`] 的输入参数。
///
/// 这是一个不可变的输入值：解析过程中不会修改它，一次调用结束后
/// 也不会保留它的任何副本。`album` 允许缺失，缺失时 DarkLyrics
/// 的直连 URL 策略会被跳过。
///
/// [`resolve`]: crate::LyricsResolver::resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    /// 艺术家名。
    pub artist: String,
    /// 原始歌曲标题，可能携带 "(Remastered)" 之类的噪声后缀。
    pub title: String,
    /// 专辑名（可选）。
    pub album: Option<String>,
}

impl TrackRef {
    /// 创建一个没有专辑信息的 `TrackRef`。
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
        }
    }

    /// 附加专辑名。
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

/// 交给各提供商的借用视图，标题已经过规范化。
///
/// 搜索词和匹配键都从同一个规范化结果派生，两处不会各算各的。
#[derive(Debug, Clone, Copy)]
pub struct LyricsQuery<'a> {
    /// 艺术家名。
    pub artist: &'a str,
    /// 规范化后的歌曲标题。
    pub title: &'a str,
    /// 专辑名（可选）。
    pub album: Option<&'a str>,
}
