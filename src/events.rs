/// Commands accepted by a running slider task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderCommand {
    GoTo(usize),
    Next,
    Resize { width: u32, height: u32 },
}

/// Notifications emitted while the slider runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideEvent {
    TransitionStarted { from: usize, to: usize },
    SlideCommitted(usize),
}
