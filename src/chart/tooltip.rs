//! Pointer-driven tooltip state
//!
//! Direct show/hide with no animation: enter shows the label at the pointer,
//! move repositions it, leave hides it.

use super::scene::TooltipBox;

/// Pixel offset between the pointer and the tooltip's corner
pub const POINTER_OFFSET: (f64, f64) = (10.0, 10.0);

#[derive(Debug, Clone)]
pub struct TooltipController<K> {
    target: Option<K>,
    pointer: (f64, f64),
}

impl<K> Default for TooltipController<K> {
    fn default() -> Self {
        Self {
            target: None,
            pointer: (0.0, 0.0),
        }
    }
}

impl<K: PartialEq + Clone> TooltipController<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_enter(&mut self, key: K, x: f64, y: f64) {
        self.target = Some(key);
        self.pointer = (x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    pub fn pointer_leave(&mut self) {
        self.target = None;
    }

    /// Key currently under the pointer
    pub fn target(&self) -> Option<&K> {
        self.target.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    /// Forget the target if it is no longer rendered
    pub fn retain(&mut self, still_present: impl Fn(&K) -> bool) {
        if let Some(key) = &self.target {
            if !still_present(key) {
                self.target = None;
            }
        }
    }

    /// Resolve the tooltip for the current frame
    ///
    /// `describe` returns the text and border colour for a key, or None if the
    /// key has no element any more.
    pub fn view<F>(&self, describe: F) -> Option<TooltipBox>
    where
        F: Fn(&K) -> Option<(String, [u8; 3])>,
    {
        let key = self.target.as_ref()?;
        let (text, border) = describe(key)?;
        Some(TooltipBox {
            text,
            x: self.pointer.0 + POINTER_OFFSET.0,
            y: self.pointer.1 + POINTER_OFFSET.1,
            border,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(key: &&str) -> Option<(String, [u8; 3])> {
        Some((format!("cell {}", key), [255, 0, 0]))
    }

    #[test]
    fn test_enter_move_leave() {
        let mut tip = TooltipController::new();
        assert!(tip.view(describe).is_none());

        tip.pointer_enter("Mon:01am", 100.0, 40.0);
        let shown = tip.view(describe).unwrap();
        assert_eq!(shown.text, "cell Mon:01am");
        assert_eq!((shown.x, shown.y), (110.0, 50.0));

        tip.pointer_move(120.0, 45.0);
        let moved = tip.view(describe).unwrap();
        assert_eq!((moved.x, moved.y), (130.0, 55.0));

        tip.pointer_leave();
        assert!(!tip.is_visible());
        assert!(tip.view(describe).is_none());
    }

    #[test]
    fn test_retain_hides_removed_target() {
        let mut tip = TooltipController::new();
        tip.pointer_enter("gone", 0.0, 0.0);
        tip.retain(|k| *k != "gone");
        assert!(tip.target().is_none());
    }
}
