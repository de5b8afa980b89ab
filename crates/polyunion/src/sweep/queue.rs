use std::cmp::Ordering;

use super::event::{compare_events, EventId, Events};

/// Binary min-heap of events under [`compare_events`].
///
/// The ordering reads the arena on every comparison (an event's order depends
/// on its partner's point), so the arena is passed in rather than captured.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    heap: Vec<EventId>,
}

impl EventQueue {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self { heap: Vec::with_capacity(n) }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize { self.heap.len() }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool { self.heap.is_empty() }

    pub(crate) fn push(&mut self, id: EventId, evs: &Events) {
        self.heap.push(id);
        self.sift_up(self.heap.len() - 1, evs);
    }

    pub(crate) fn pop(&mut self, evs: &Events) -> Option<EventId> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0, evs);
        }
        Some(top)
    }

    fn less(&self, i: usize, j: usize, evs: &Events) -> bool {
        compare_events(evs, self.heap[i], self.heap[j]) == Ordering::Less
    }

    fn sift_up(&mut self, mut i: usize, evs: &Events) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent, evs) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize, evs: &Events) {
        let n = self.heap.len();
        loop {
            let (l, r) = (2 * i + 1, 2 * i + 2);
            let mut smallest = i;
            if l < n && self.less(l, smallest, evs) {
                smallest = l;
            }
            if r < n && self.less(r, smallest, evs) {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.heap.swap(i, smallest);
            i = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::Coord;

    use super::*;
    use crate::error::Operand;

    #[test]
    fn pops_in_sweep_order() {
        let mut evs = Events::default();
        let mut ids = Vec::new();
        for (a, b) in [
            ((3.0, 1.0), (4.0, 0.0)),
            ((0.0, 2.0), (1.0, 5.0)),
            ((0.0, 1.0), (2.0, 1.0)),
        ] {
            let (l, r) = evs.push_edge(
                Coord { x: a.0, y: a.1 },
                Coord { x: b.0, y: b.1 },
                Operand::Left,
                0,
            );
            ids.extend([l, r]);
        }

        let mut queue = EventQueue::default();
        for &id in &ids {
            queue.push(id, &evs);
        }
        assert_eq!(queue.len(), 6);

        let mut points = Vec::new();
        while let Some(id) = queue.pop(&evs) {
            points.push((evs[id].point.x, evs[id].point.y));
        }
        assert_eq!(
            points,
            vec![(0.0, 1.0), (0.0, 2.0), (1.0, 5.0), (2.0, 1.0), (3.0, 1.0), (4.0, 0.0)]
        );
        assert!(queue.is_empty());
    }
}
