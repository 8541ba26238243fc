//! Drag-and-drop reorder board
//!
//! Holds the admin's working order of sets. Gestures mutate it immediately
//! (optimistically, unpersisted); `order_assignments` produces the batch that a
//! save pushes to the store. The in-memory order is authoritative: there is no
//! conflict detection against changes made elsewhere.

use serde::Serialize;

use crate::models::{OrderAssignment, SetRecord};

/// Working order plus transient drag state
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReorderBoard {
    items: Vec<SetRecord>,
    /// Source index of the drag in progress
    dragging: Option<usize>,
    /// Slot currently hovered (visual only)
    hovering: Option<usize>,
}

impl ReorderBoard {
    pub fn new(items: Vec<SetRecord>) -> Self {
        Self {
            items,
            dragging: None,
            hovering: None,
        }
    }

    /// Replace the working order with a freshly loaded list, dropping drag state
    pub fn reload(&mut self, items: Vec<SetRecord>) {
        self.items = items;
        self.dragging = None;
        self.hovering = None;
    }

    pub fn items(&self) -> &[SetRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn hovering(&self) -> Option<usize> {
        self.hovering
    }

    /// Identifiers in working order
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|s| s.id.clone()).collect()
    }

    /// Begin dragging the item at `index`
    pub fn drag_start(&mut self, index: usize) {
        if index < self.items.len() {
            self.dragging = Some(index);
        }
    }

    /// Pointer is over slot `index`
    pub fn drag_over(&mut self, index: usize) {
        if index < self.items.len() {
            self.hovering = Some(index);
        }
    }

    /// Drop the dragged item onto slot `index`
    ///
    /// Removes the item at the drag source and reinserts it at `index`.
    /// Returns false, leaving the order untouched, if no drag is in progress
    /// or `index` is not a slot on the board.
    pub fn drop_at(&mut self, index: usize) -> bool {
        self.hovering = None;
        let Some(from) = self.dragging else {
            return false;
        };
        if index >= self.items.len() {
            return false;
        }
        self.move_item(from, index)
    }

    /// Drag finished, dropped or not
    pub fn drag_end(&mut self) {
        self.dragging = None;
        self.hovering = None;
    }

    /// Move an item from one position to another (start + drop + end)
    ///
    /// A target past the end moves the item to the last slot.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() {
            return false;
        }
        let moved = self.items.remove(from);
        let to = to.min(self.items.len());
        self.items.insert(to, moved);
        self.dragging = None;
        self.hovering = None;
        true
    }

    /// Batch for a save: position `i` gets `order = i + 1`
    pub fn order_assignments(&self) -> Vec<OrderAssignment> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, s)| OrderAssignment {
                id: s.id.clone(),
                order: i as i64 + 1,
            })
            .collect()
    }

    /// Record that a save succeeded: stored `order` now matches position
    pub fn mark_saved(&mut self) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.order = i as i64 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(id: &str, order: i64) -> SetRecord {
        SetRecord {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            duration: "--".to_string(),
            order,
            image_url: String::new(),
            audio_path: None,
            created_at: 0,
        }
    }

    fn board() -> ReorderBoard {
        ReorderBoard::new(vec![set("A", 1), set("B", 2), set("C", 3), set("D", 4)])
    }

    #[test]
    fn test_drag_index_two_onto_zero() {
        let mut board = board();
        board.drag_start(2);
        board.drag_over(0);
        assert_eq!(board.hovering(), Some(0));
        assert!(board.drop_at(0));
        board.drag_end();

        assert_eq!(board.ids(), vec!["C", "A", "B", "D"]);
        let batch = board.order_assignments();
        let pairs: Vec<(&str, i64)> = batch.iter().map(|a| (a.id.as_str(), a.order)).collect();
        assert_eq!(pairs, vec![("C", 1), ("A", 2), ("B", 3), ("D", 4)]);
    }

    #[test]
    fn test_drag_over_does_not_mutate() {
        let mut board = board();
        board.drag_start(0);
        board.drag_over(3);
        assert_eq!(board.ids(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_drag_end_without_drop_clears_state() {
        let mut board = board();
        board.drag_start(1);
        board.drag_over(2);
        board.drag_end();

        assert_eq!(board.dragging(), None);
        assert_eq!(board.hovering(), None);
        assert_eq!(board.ids(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_drop_without_drag_is_ignored() {
        let mut board = board();
        assert!(!board.drop_at(1));
        assert_eq!(board.ids(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_drop_out_of_range_is_ignored() {
        let mut board = board();
        board.drag_start(0);
        assert!(!board.drop_at(4));
        assert_eq!(board.ids(), vec!["A", "B", "C", "D"]);
        // Drag is still live until drag_end
        assert_eq!(board.dragging(), Some(0));
    }

    #[test]
    fn test_move_past_end_moves_to_last() {
        let mut board = board();
        assert!(board.move_item(0, 99));
        assert_eq!(board.ids(), vec!["B", "C", "D", "A"]);
    }

    #[test]
    fn test_move_out_of_range_source() {
        let mut board = board();
        assert!(!board.move_item(4, 0));
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn test_mark_saved_renumbers() {
        let mut board = board();
        board.move_item(3, 0);
        board.mark_saved();
        let orders: Vec<i64> = board.items().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert_eq!(board.items()[0].id, "D");
    }
}
