use bevy::prelude::*;

/// The open dialogue box, if any. The survival simulation pauses while it
/// is open.
#[derive(Resource, Debug, Clone, Default)]
pub struct DialogueState {
    pub lines: Vec<String>,
    pub index: usize,
}

impl DialogueState {
    pub fn start(&mut self, lines: &[&str]) {
        self.lines = lines.iter().map(|l| l.to_string()).collect();
        self.index = 0;
    }

    pub fn is_open(&self) -> bool {
        self.index < self.lines.len()
    }

    pub fn current_line(&self) -> Option<&str> {
        self.lines.get(self.index).map(String::as_str)
    }

    /// Moves to the next line. Returns true once the box has closed.
    pub fn advance(&mut self) -> bool {
        if self.is_open() {
            self.index += 1;
        }
        !self.is_open()
    }

    pub fn close(&mut self) {
        self.lines.clear();
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_through_lines_then_closes() {
        let mut dialogue = DialogueState::default();
        assert!(!dialogue.is_open());
        dialogue.start(&["one", "two"]);
        assert_eq!(dialogue.current_line(), Some("one"));
        assert!(!dialogue.advance());
        assert_eq!(dialogue.current_line(), Some("two"));
        assert!(dialogue.advance());
        assert!(!dialogue.is_open());
        assert!(dialogue.advance(), "advancing a closed box is a no-op");
    }

    #[test]
    fn empty_dialogue_is_closed() {
        let mut dialogue = DialogueState::default();
        dialogue.start(&[]);
        assert!(!dialogue.is_open());
    }
}
