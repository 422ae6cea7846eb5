//! 歌曲标题规范化。
//!
//! 播放器上报的标题常带着 "(Remastered 2009)"、"[Live]"、"- 2021 Remix"
//! 一类的元数据噪声，直接拿去搜索会大幅降低命中率。这里把它们剥掉，
//! 得到一个既可用作搜索词、又可用作匹配键来源的规范形式。

use std::sync::LazyLock;

use regex::Regex;

/// 噪声剔除规则，按顺序逐条作用在上一条的结果上。
///
/// 1. 括号/方括号包裹、以已知噪声关键词开头的片段。
/// 2. 以 `- ... Remastered ...` 结尾的后缀。
/// 3. 以 `- ... Remix ...` 结尾的后缀。
static NOISE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s*[(\[]\s*(?:Remastered|Live|Remix|Demo|Version|feat\.|ft\.).*?[)\]]",
        r"(?i)\s*-\s*.*Remastered.*",
        r"(?i)\s*-\s*.*Remix.*",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("标题噪声规则应当是合法的正则"))
    .collect()
});

/// 剔除标题中的元数据噪声，返回规范化后的标题。
///
/// 规则按顺序累积作用，最后去掉首尾空白。规范化是幂等的：对已规范化
/// 的标题再调用一次，结果不变。
///
/// 如果所有规则作用完后标题被剥成了空串，则原样返回输入的标题，
/// 保证非空输入永远得到非空输出。
pub fn normalize(title: &str) -> String {
    let mut cleaned = title.to_string();
    for rule in NOISE_RULES.iter() {
        cleaned = rule.replace_all(&cleaned, "").into_owned();
    }

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return title.to_string();
    }
    cleaned.to_string()
}

/// 生成只用于比较的匹配键：转小写并去掉所有空白。
///
/// 专辑页上的歌名和播放器上报的标题往往只差副标题或空格，比较时
/// 双方都先过这一层。匹配键永远不用作搜索词。
pub fn match_key(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
