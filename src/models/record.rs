//! 待分类文本记录
//!
//! 一条记录 = 一段原始文本 + 三个分类字段。文本创建后不可修改；
//! 每个分类字段只由对应模型的一个任务写入一次。

use serde::Serialize;

use crate::models::kind::Slot;

/// 待分类文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRecord {
    text: String,
    topic: Option<String>,
    sentiment: Option<String>,
    hate: Option<String>,
}

impl TextRecord {
    /// 创建新的记录，所有分类字段为空
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            topic: None,
            sentiment: None,
            hate: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn sentiment(&self) -> Option<&str> {
        self.sentiment.as_deref()
    }

    pub fn hate(&self) -> Option<&str> {
        self.hate.as_deref()
    }

    /// 读取指定字段
    pub fn label(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Topic => self.topic(),
            Slot::Sentiment => self.sentiment(),
            Slot::Hate => self.hate(),
        }
    }

    /// 写入指定字段
    ///
    /// 字段已有值时不覆盖，返回 `false`。
    pub fn fill(&mut self, slot: Slot, label: String) -> bool {
        let target = match slot {
            Slot::Topic => &mut self.topic,
            Slot::Sentiment => &mut self.sentiment,
            Slot::Hate => &mut self.hate,
        };

        if target.is_some() {
            return false;
        }
        *target = Some(label);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_empty_slots() {
        let record = TextRecord::new("hello");
        assert_eq!(record.text(), "hello");
        assert_eq!(record.topic(), None);
        assert_eq!(record.sentiment(), None);
        assert_eq!(record.hate(), None);
    }

    #[test]
    fn test_fill_writes_once() {
        let mut record = TextRecord::new("hello");

        assert!(record.fill(Slot::Sentiment, "positive".to_string()));
        assert!(!record.fill(Slot::Sentiment, "negative".to_string()));
        assert_eq!(record.label(Slot::Sentiment), Some("positive"));
        assert_eq!(record.label(Slot::Topic), None);
    }

    #[test]
    fn test_serializes_unset_slots_as_null() {
        let mut record = TextRecord::new("a");
        record.fill(Slot::Hate, "NOT-HATE".to_string());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "text": "a",
                "topic": null,
                "sentiment": null,
                "hate": "NOT-HATE"
            })
        );
    }
}
