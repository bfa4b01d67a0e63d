/// 一次渲染周期内引擎可访问的状态
///
/// 会话存储、cookie 存储和表单渲染都由宿主按会话提供，
/// 生命周期不超过本次渲染。
pub struct RenderContext<'a, S: ?Sized, C: ?Sized, U: ?Sized> {
    pub session: &'a S,
    pub cookies: &'a C,
    pub ui: &'a U,
}

impl<'a, S: ?Sized, C: ?Sized, U: ?Sized> RenderContext<'a, S, C, U> {
    pub fn new(session: &'a S, cookies: &'a C, ui: &'a U) -> Self {
        Self {
            session,
            cookies,
            ui,
        }
    }
}
