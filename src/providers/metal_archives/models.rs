//! 此模块定义了用于反序列化 Metal Archives AJAX 接口响应的数据结构。
//!
//! 站点的搜索接口是给 DataTables 前端用的，返回的行里每个单元格
//! 都是一段 HTML 字符串，歌词入口的 ID 要从单元格里再挖出来。

use serde::Deserialize;

/// 歌曲高级搜索接口的顶层响应结构。
#[derive(Debug, Deserialize)]
pub struct SongSearchResponse {
    /// 结果行。每行是一组 HTML 单元格字符串。
    #[serde(rename = "aaData")]
    pub rows: Vec<Vec<String>>,

    /// 结果总数。
    #[serde(rename = "iTotalRecords", default)]
    pub total_records: u64,
}
