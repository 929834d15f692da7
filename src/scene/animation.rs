use std::fmt::Debug;

use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Finished,
}

/// Anything that mutates the surface once per frame.
pub trait Animation: Debug + Send {
    fn tick(&mut self, surface: &mut Surface) -> AnimationStatus;
}

/// Ticks every active animation once per frame and drops the finished ones.
#[derive(Debug, Default)]
pub struct FrameDriver {
    active: Vec<Box<dyn Animation>>,
}

impl FrameDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, animation: impl Animation + 'static) {
        self.active.push(Box::new(animation));
    }

    /// Returns how many animations finished during this frame.
    pub fn tick(&mut self, surface: &mut Surface) -> usize {
        let before = self.active.len();
        self.active
            .retain_mut(|animation| animation.tick(surface) == AnimationStatus::Running);
        before - self.active.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
