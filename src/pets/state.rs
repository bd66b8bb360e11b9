#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetLifecycle {
    #[default]
    Stopped,
    Running,
}

impl PetLifecycle {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

pub fn can_transition(from: PetLifecycle, to: PetLifecycle) -> bool {
    matches!(
        (from, to),
        (PetLifecycle::Stopped, PetLifecycle::Running)
            | (PetLifecycle::Running, PetLifecycle::Stopped)
    ) || from == to
}
