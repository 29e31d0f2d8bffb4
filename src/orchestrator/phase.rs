use std::fmt;

/// 运行阶段
///
/// `Loading → Classifying → Done`，任一阶段失败则整个运行失败（`Failed`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// 加载模型
    Loading,
    /// 分类
    Classifying,
    /// 已完成，可以输出
    Done,
    /// 失败（终止状态）
    Failed,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Loading => "加载阶段",
            Phase::Classifying => "分类阶段",
            Phase::Done => "完成",
            Phase::Failed => "失败",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
