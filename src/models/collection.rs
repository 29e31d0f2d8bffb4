use std::sync::Arc;

use crate::models::record::TextRecord;

/// 命名的文本集合（如 articles、tweets）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// 输入文档中的字段名
    pub name: String,
    /// 输出文档中的字段名
    pub output_name: String,
    pub records: Vec<TextRecord>,
}

impl Collection {
    /// 创建集合，输出字段名与输入字段名相同
    pub fn new(name: impl Into<String>, texts: Vec<String>) -> Self {
        let name = name.into();
        Self {
            output_name: name.clone(),
            records: texts.into_iter().map(TextRecord::new).collect(),
            name,
        }
    }

    /// 指定输出字段名
    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = output_name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 文本快照，供并发任务只读共享
    pub fn texts(&self) -> Arc<[String]> {
        self.records
            .iter()
            .map(|r| r.text().to_string())
            .collect::<Vec<_>>()
            .into()
    }
}

/// 全部集合，保持输入顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collections {
    items: Vec<Collection>,
}

impl Collections {
    pub fn new(items: Vec<Collection>) -> Self {
        Self { items }
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.items.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.items.iter_mut().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 全部记录数
    pub fn total_records(&self) -> usize {
        self.items.iter().map(Collection::len).sum()
    }
}

impl IntoIterator for Collections {
    type Item = Collection;
    type IntoIter = std::vec::IntoIter<Collection>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
