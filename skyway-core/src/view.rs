/// Per-view data state, replacing separate `loading`/`error`/`data` flags.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Idle
    }
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    /// Enter `Loading`. Returns false (and changes nothing) when a load is
    /// already running, so a second click does not issue a second request.
    pub fn begin(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        *self = ViewState::Loading;
        true
    }

    pub fn finish<E: std::fmt::Display>(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(data) => ViewState::Loaded(data),
            Err(e) => ViewState::Error(e.to_string()),
        };
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Drop loaded data so the next render refetches.
    pub fn invalidate(&mut self) {
        if !self.is_loading() {
            *self = ViewState::Idle;
        }
    }
}

/// Open/closed state of a dropdown or modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visibility {
    open: bool,
}

/// Where a pointer event landed relative to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Inside,
    Outside,
    Backdrop,
}

impl Visibility {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn on_click(&mut self, target: ClickTarget) {
        if target != ClickTarget::Inside {
            self.open = false;
        }
    }
}
