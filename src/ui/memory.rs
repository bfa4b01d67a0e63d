use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::{AuthUi, Payload, SigninDefaults};

/// 本周期渲染过的表单
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedForm {
    Signin {
        defaults: Option<SigninDefaults>,
        form: Map<String, Value>,
    },
    Signout {
        form: Map<String, Value>,
    },
}

#[derive(Debug, Default)]
struct UiState {
    pending: Option<Payload>,
    rendered: Vec<RenderedForm>,
    errors: Vec<(String, Option<String>)>,
    busy: Vec<String>,
    cleared: bool,
}

/// 记录渲染请求的 UI，提交由宿主预先放入
///
/// 一个实例对应一次渲染周期。
#[derive(Debug, Default)]
pub struct MemoryUi {
    state: Mutex<UiState>,
}

impl MemoryUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submission(payload: Payload) -> Self {
        let ui = Self::default();
        ui.submit(payload);
        ui
    }

    pub fn submit(&self, payload: Payload) {
        let mut state = self.state.lock();
        state.pending = Some(payload);
        state.cleared = false;
    }

    pub fn rendered(&self) -> Vec<RenderedForm> {
        self.state.lock().rendered.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.state
            .lock()
            .errors
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }

    pub fn error_icons(&self) -> Vec<Option<String>> {
        self.state
            .lock()
            .errors
            .iter()
            .map(|(_, icon)| icon.clone())
            .collect()
    }

    /// 显示过的忙碌提示
    pub fn busy_messages(&self) -> Vec<String> {
        self.state.lock().busy.clone()
    }

    pub fn was_cleared(&self) -> bool {
        self.state.lock().cleared
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}

#[async_trait]
impl AuthUi for MemoryUi {
    async fn signin_form(
        &self,
        defaults: Option<SigninDefaults>,
        form: &Map<String, Value>,
    ) -> Option<Payload> {
        let mut state = self.state.lock();
        state.rendered.push(RenderedForm::Signin {
            defaults,
            form: form.clone(),
        });
        state.pending.clone()
    }

    async fn signout_form(&self, form: &Map<String, Value>) -> Option<Payload> {
        let mut state = self.state.lock();
        state.rendered.push(RenderedForm::Signout { form: form.clone() });
        state.pending.clone()
    }

    fn show_error(&self, message: &str, icon: Option<&str>) {
        self.state
            .lock()
            .errors
            .push((message.to_string(), icon.map(String::from)));
    }

    fn set_busy(&self, message: Option<&str>) {
        if let Some(message) = message {
            self.state.lock().busy.push(message.to_string());
        }
    }

    fn clear_result(&self) {
        let mut state = self.state.lock();
        state.pending = None;
        state.cleared = true;
    }
}
