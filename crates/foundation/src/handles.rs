/// Generational handle: `(slot index, generation)`.
///
/// Reusing a slot bumps the generation, so a handle held across a reload
/// never compares equal to the new occupant of the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn generation_distinguishes_reused_slots() {
        let first = Handle::new(3, 0);
        let reloaded = Handle::new(3, 1);
        assert_eq!(first.index(), reloaded.index());
        assert_ne!(first, reloaded);
        assert_eq!(reloaded.to_string(), "3v1");
    }
}
