//! 定义了一次歌词解析的终态结果，以及策略链的内部诊断记录。

/// 一次歌词解析的终态结果。
///
/// 结果要么完全成功、要么带着明确的失败类别，不存在"部分成功"：
/// 抓取只得到一个 URL 而没有正文时是 [`ParseFailure`]，不是 `Success`。
/// 调用方据此区分"需要修正凭据"（[`AuthFailure`]）和"换个源再试 /
/// 显示未找到"（其余失败类别）。
///
/// [`ParseFailure`]: FetchOutcome::ParseFailure
/// [`AuthFailure`]: FetchOutcome::AuthFailure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 成功取得歌词。`text` 保证非空，并且已经过清理。
    Success {
        /// 清理后的歌词正文。
        text: String,
    },
    /// 源上没有匹配的内容。
    NotFound,
    /// 凭据缺失或无效。在一个提供商内部是终态，不再尝试后续策略。
    AuthFailure,
    /// 传输或 HTTP 层面的失败。
    NetworkFailure {
        /// 保留给诊断的失败详情。
        detail: String,
    },
    /// 内容可达，但无法按预期的结构提取。
    ParseFailure {
        /// 简短的、人类可读的失败原因。
        detail: String,
    },
}

impl FetchOutcome {
    /// 是否为成功结果。
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// 用清理后的文本构造结果；清理后为空则降级为 [`ParseFailure`]。
    ///
    /// [`ParseFailure`]: FetchOutcome::ParseFailure
    pub(crate) fn from_cleaned_text(text: String, empty_detail: &str) -> Self {
        if text.is_empty() {
            Self::ParseFailure {
                detail: empty_detail.to_string(),
            }
        } else {
            Self::Success { text }
        }
    }
}

/// 提供商内部一次策略尝试的记录，只用于诊断日志。
///
/// 永远不会出现在最终结果里。
#[derive(Debug)]
pub(crate) struct ProviderAttempt {
    /// 策略名，例如 `"direct-url"`。
    pub strategy: &'static str,
    /// 这一步没有得到结果的原因。
    pub detail: String,
}

impl ProviderAttempt {
    pub(crate) fn new(strategy: &'static str, detail: impl Into<String>) -> Self {
        Self {
            strategy,
            detail: detail.into(),
        }
    }
}

/// 在策略链结束时输出全部尝试记录。
pub(crate) fn log_attempts(provider: &str, attempts: &[ProviderAttempt]) {
    for (index, attempt) in attempts.iter().enumerate() {
        tracing::debug!(
            "[{}] 策略 {} ({}) 未得到结果: {}",
            provider,
            index + 1,
            attempt.strategy,
            attempt.detail
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cleaned_text_success() {
        let outcome = FetchOutcome::from_cleaned_text("Hello darkness".to_string(), "为空");
        assert_eq!(
            outcome,
            FetchOutcome::Success {
                text: "Hello darkness".to_string()
            }
        );
    }

    #[test]
    fn test_from_cleaned_text_empty_downgrades_to_parse_failure() {
        let outcome = FetchOutcome::from_cleaned_text(String::new(), "清理后为空");
        assert_eq!(
            outcome,
            FetchOutcome::ParseFailure {
                detail: "清理后为空".to_string()
            }
        );
    }

    #[test]
    fn test_is_success() {
        assert!(
            FetchOutcome::Success {
                text: "x".to_string()
            }
            .is_success()
        );
        assert!(!FetchOutcome::NotFound.is_success());
    }
}
