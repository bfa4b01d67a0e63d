/// 一次渲染周期的结果
///
/// `Rerun` 表示状态已变更，宿主必须重新开始完整的渲染周期，
/// 不能把它当作普通返回值继续使用。
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<T> {
    Continue(T),
    Rerun,
}

impl<T> Flow<T> {
    pub fn is_rerun(&self) -> bool {
        matches!(self, Flow::Rerun)
    }

    /// 未要求重新渲染时的值
    pub fn into_continue(self) -> Option<T> {
        match self {
            Flow::Continue(value) => Some(value),
            Flow::Rerun => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flow<U> {
        match self {
            Flow::Continue(value) => Flow::Continue(f(value)),
            Flow::Rerun => Flow::Rerun,
        }
    }
}
