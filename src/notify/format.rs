use std::fmt;

use chrono::{DateTime, Utc};

/// Which runner produced a match; shown in the alert header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrigin {
    /// Historical scan
    Scan,
    /// Real-time monitor
    Monitor,
}

impl MatchOrigin {
    pub fn label(self) -> &'static str {
        match self {
            MatchOrigin::Scan => "📅 과거 검색",
            MatchOrigin::Monitor => "🔴 실시간 감지",
        }
    }
}

impl fmt::Display for MatchOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOrigin::Scan => write!(f, "scan"),
            MatchOrigin::Monitor => write!(f, "monitor"),
        }
    }
}

/// Everything an alert embeds
#[derive(Debug, Clone)]
pub struct AlertContent<'a> {
    pub body: &'a str,
    pub date: DateTime<Utc>,
    pub chat_id: i64,
    pub message_id: i32,
    pub keywords: &'a [&'a str],
    pub origin: MatchOrigin,
    pub link_host: &'a str,
}

/// Chat id as it appears in `t.me/c/...` links: the `-100` channel prefix is
/// stripped, anything else is used as-is.
pub fn link_chat_id(chat_id: i64) -> String {
    let id = chat_id.to_string();
    match id.strip_prefix("-100") {
        Some(rest) => rest.to_string(),
        None => id,
    }
}

pub fn message_link(host: &str, chat_id: i64, message_id: i32) -> String {
    format!("https://{}/c/{}/{}", host, link_chat_id(chat_id), message_id)
}

pub fn format_alert(alert: &AlertContent<'_>) -> String {
    format!(
        "🔔 키워드 알림 ({label}) 🔔\n\n\
         찾은 키워드: {keywords}\n\
         메시지 작성 시간: {date}\n\n\
         --- 원본 메시지 ---\n\
         {body}\n\
         ------------------\n\n\
         🔗 원본 메시지 링크:\n\
         {link}",
        label = alert.origin.label(),
        keywords = alert.keywords.join(", "),
        date = alert.date.format("%Y-%m-%d %H:%M"),
        body = alert.body,
        link = message_link(alert.link_host, alert.chat_id, alert.message_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn alert<'a>(body: &'a str, keywords: &'a [&'a str], origin: MatchOrigin) -> AlertContent<'a> {
        AlertContent {
            body,
            date: Utc.with_ymd_and_hms(2026, 2, 22, 9, 5, 59).unwrap(),
            chat_id: -1009876543210,
            message_id: 42,
            keywords,
            origin,
            link_host: "t.me",
        }
    }

    #[test]
    fn test_link_strips_channel_prefix() {
        assert_eq!(link_chat_id(-1001234567890), "1234567890");
        assert_eq!(
            message_link("t.me", -1009876543210, 42),
            "https://t.me/c/9876543210/42"
        );
    }

    #[test]
    fn test_link_keeps_other_ids() {
        assert_eq!(link_chat_id(1234567890), "1234567890");
        assert_eq!(link_chat_id(-4242), "-4242");
        // already normalized stays normalized
        assert_eq!(link_chat_id(9876543210), "9876543210");
    }

    #[test]
    fn test_alert_layout() {
        let keywords = ["긴급", "공지"];
        let text = format_alert(&alert("오늘 긴급 공지", &keywords, MatchOrigin::Scan));
        let expected = "🔔 키워드 알림 (📅 과거 검색) 🔔\n\n\
                        찾은 키워드: 긴급, 공지\n\
                        메시지 작성 시간: 2026-02-22 09:05\n\n\
                        --- 원본 메시지 ---\n\
                        오늘 긴급 공지\n\
                        ------------------\n\n\
                        🔗 원본 메시지 링크:\n\
                        https://t.me/c/9876543210/42";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_monitor_header_and_verbatim_body() {
        let keywords = ["긴급"];
        let body = "오늘 긴급 회의가 있습니다\n  두 번째 줄 ";
        let text = format_alert(&alert(body, &keywords, MatchOrigin::Monitor));
        assert!(text.starts_with("🔔 키워드 알림 (🔴 실시간 감지) 🔔"));
        assert!(text.contains(body));
        assert!(text.contains("찾은 키워드: 긴급\n"));
    }
}
