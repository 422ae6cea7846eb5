//! 歌词正文的后处理。
//!
//! 各个源抓回来的正文都带有自己的杂质：Genius 会在开头回显一行
//! "《歌名》 Lyrics"，段落标记（`[Chorus]`、`[Verse 1]`）混在正文里，
//! 段落之间可能留下成串的空行。这里统一做一遍清理。

use std::sync::LazyLock;

use regex::Regex;

static SECTION_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("段落标记正则应当合法"));

static EXCESS_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("空行折叠正则应当合法"));

/// 清理一段原始歌词正文。
///
/// 依次执行：
/// 1. 删除所有 `[...]` 段落标记；
/// 2. 如果第一个非空行以 "Lyrics" 一词结尾，丢弃该行（站点回显的标题行）；
/// 3. 把三个及以上的连续换行折叠为两个；
/// 4. 去掉首尾空白。
///
/// 可能返回空串——调用方必须把空串当作失败处理，而不是成功。
pub fn clean(raw: &str) -> String {
    let without_markers = SECTION_MARKER_RE.replace_all(raw, "");
    let without_header = strip_echoed_title_line(&without_markers);
    let collapsed = EXCESS_NEWLINES_RE.replace_all(&without_header, "\n\n");
    collapsed.trim().to_string()
}

/// 丢弃开头回显的 "<标题> Lyrics" 行。
fn strip_echoed_title_line(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    if let Some(position) = lines.iter().position(|line| !line.trim().is_empty())
        && lines[position].trim().ends_with("Lyrics")
    {
        lines.remove(position);
        return lines.join("\n");
    }
    text.to_string()
}
