use core_types::NodeKey;
use dom::Document;
use runtime_timers::Timers;

/// Deferred work the core schedules on the page's timer queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Take a hidden panel out of layout once its fade has run.
    FinishFade,
    ReconcileTick,
    /// End of the bounded reconciliation window.
    StopReconcile,
    /// Back/forward navigation has had time to re-render.
    NavigationSettled,
    ClearHighlight { element: NodeKey },
}

/// What the core borrows from the page while one handler runs.
pub struct Host<'a> {
    pub doc: &'a mut Document,
    pub timers: &'a mut Timers<Task>,
}

impl<'a> Host<'a> {
    pub fn new(doc: &'a mut Document, timers: &'a mut Timers<Task>) -> Self {
        Self { doc, timers }
    }
}
