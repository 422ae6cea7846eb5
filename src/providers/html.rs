//! 提供商共用的 HTML 文本提取辅助函数。
//!
//! 歌词站点的正文里行与行靠 `<br>` 分隔，嵌套的 `<a>`/`<i>` 等元素
//! 只是包裹文本。提取时文本节点原样拼接，`<br>` 还原为换行。

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};

/// 收集一个元素内部的全部文本，`<br>` 还原为换行。
pub(crate) fn element_text_with_breaks(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        node_text_with_breaks(child, &mut out);
    }
    out
}

/// 递归收集单个节点的文本。
pub(crate) fn node_text_with_breaks(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&text),
        Node::Element(element) if element.name() == "br" => out.push('\n'),
        Node::Element(_) => {
            for child in node.children() {
                node_text_with_breaks(child, out);
            }
        }
        _ => {}
    }
}

/// 把一段独立的 HTML 片段还原为纯文本。
pub(crate) fn fragment_text_with_breaks(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    element_text_with_breaks(fragment.root_element())
}
