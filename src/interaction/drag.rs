use crate::interaction::scrubber::TrackScale;
use crate::ops::overlay_ops::{shifted_window, snap_time};
use crate::store::SubtitleStore;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Moving a subtitle block. Original values are captured at pointer down
    /// so each move is computed from the same origin.
    Dragging {
        block_id: String,
        start_x: f32,
        original_start: f64,
        original_end: f64,
    },
}

/// Move-drag of subtitle blocks.
///
/// Every pointer move writes the shifted window to the store (there is no
/// commit step). Pointer move and up are expected from a global source: the
/// pointer may leave the block, or the strip, during a fast drag.
#[derive(Debug, Clone, Default)]
pub struct BlockDrag {
    state: DragState,
    snap_interval: f64,
}

impl BlockDrag {
    /// `snap_interval` of 0 disables snapping.
    pub fn new(snap_interval: f64) -> Self {
        Self {
            state: DragState::Idle,
            snap_interval,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { block_id, .. } => Some(block_id),
            DragState::Idle => None,
        }
    }

    /// Pointer down on a block. Refused on a locked track, for an unknown
    /// id, or while another drag is running.
    pub fn pointer_down(&mut self, store: &SubtitleStore, block_id: &str, x: f32, locked: bool) -> bool {
        if locked || self.is_dragging() || !x.is_finite() {
            return false;
        }
        let Some(subtitle) = store.get(block_id) else {
            return false;
        };
        log::debug!("drag start on {} at x={:.1}", block_id, x);
        self.state = DragState::Dragging {
            block_id: block_id.to_string(),
            start_x: x,
            original_start: subtitle.start,
            original_end: subtitle.end,
        };
        true
    }

    /// Live move. Returns the written window, if any.
    pub fn pointer_move(&mut self, x: f32, scale: Option<&TrackScale>, store: &SubtitleStore) -> Option<(f64, f64)> {
        let DragState::Dragging {
            block_id,
            start_x,
            original_start,
            original_end,
        } = &self.state
        else {
            return None;
        };
        let scale = scale?;
        if !x.is_finite() {
            return None;
        }
        let target = snap_time(original_start + scale.dx_to_dt(x - start_x), self.snap_interval);
        let (start, end) = shifted_window(*original_start, *original_end, target - original_start);
        store.set_window(block_id, start, end).then_some((start, end))
    }

    /// Pointer released anywhere. Returns the id that was being dragged.
    pub fn pointer_up(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { block_id, .. } => {
                log::debug!("drag end on {}", block_id);
                Some(block_id)
            }
            DragState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::subtitle::Subtitle;

    fn setup() -> (SubtitleStore, String, TrackScale) {
        let store = SubtitleStore::from_items(vec![Subtitle::new(2.0, 5.0, "drag me")]);
        let id = store.snapshot()[0].id.clone();
        let scale = TrackScale::new(800.0, Some(20.0)).unwrap();
        (store, id, scale)
    }

    #[test]
    fn test_drag_shifts_both_ends_by_dx_over_scale() {
        let (store, id, scale) = setup();
        let mut drag = BlockDrag::new(0.0);
        assert!(drag.pointer_down(&store, &id, 100.0, false));

        for dx in [13.0_f32, -37.0, 250.0, 3.5] {
            drag.pointer_move(100.0 + dx, Some(&scale), &store);
            let sub = store.get(&id).unwrap();
            let expected = f64::from(dx) / scale.px_per_sec();
            assert!((sub.start - (2.0 + expected)).abs() < 1e-9);
            assert!((sub.end - (5.0 + expected)).abs() < 1e-9);
            assert!(((sub.end - sub.start) - 3.0).abs() < 1e-9);
        }
        assert_eq!(drag.pointer_up(), Some(id));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_moves_after_release_do_nothing() {
        let (store, id, scale) = setup();
        let mut drag = BlockDrag::new(0.0);
        drag.pointer_down(&store, &id, 100.0, false);
        drag.pointer_move(140.0, Some(&scale), &store);
        drag.pointer_up();
        assert_eq!(drag.pointer_move(400.0, Some(&scale), &store), None);
        assert_eq!(store.get(&id).unwrap().start, 3.0);
        assert_eq!(drag.pointer_up(), None);
    }

    #[test]
    fn test_locked_track_and_unknown_id_refuse() {
        let (store, id, _) = setup();
        let mut drag = BlockDrag::new(0.0);
        assert!(!drag.pointer_down(&store, &id, 100.0, true));
        assert!(!drag.pointer_down(&store, "missing", 100.0, false));
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn test_drag_before_zero_clamps_keeping_length() {
        let (store, id, scale) = setup();
        let mut drag = BlockDrag::new(0.0);
        drag.pointer_down(&store, &id, 100.0, false);
        drag.pointer_move(-1000.0, Some(&scale), &store);
        let sub = store.get(&id).unwrap();
        assert_eq!(sub.start, 0.0);
        assert_eq!(sub.end, 3.0);
    }

    #[test]
    fn test_snap_and_missing_scale() {
        let (store, id, scale) = setup();
        let mut drag = BlockDrag::new(0.1);
        drag.pointer_down(&store, &id, 100.0, false);
        assert_eq!(drag.pointer_move(150.0, None, &store), None);
        let (start, end) = drag.pointer_move(101.0, Some(&scale), &store).unwrap();
        assert!((start - 2.0).abs() < 1e-9);
        assert!((end - 5.0).abs() < 1e-9);
        let (start, _) = drag.pointer_move(103.0, Some(&scale), &store).unwrap();
        assert!((start - 2.1).abs() < 1e-9);
    }

    #[test]
    fn test_text_edit_during_drag_survives() {
        let (store, id, scale) = setup();
        let mut drag = BlockDrag::new(0.0);
        drag.pointer_down(&store, &id, 0.0, false);
        store.update(&id, &crate::types::subtitle::SubtitlePatch::text("renamed"));
        drag.pointer_move(40.0, Some(&scale), &store);
        let sub = store.get(&id).unwrap();
        assert_eq!(sub.text, "renamed");
        assert_eq!(sub.start, 3.0);
    }
}
