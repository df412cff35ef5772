//! Layer-ordered element storage
//!
//! Every element drawn on a canvas lives in one [`ElementContainer`]. The
//! container's lock is the canvas-wide mutation domain: element setters,
//! animation updates, and rendering all run under it, so a frame never sees
//! a half-applied change.
//!
//! The lock has two levels. A reentrant batch gate is taken first and may be
//! held across many edits ([`ElementContainer::batch`]); the element map
//! itself is only locked for the length of one edit. Other threads wait at
//! the gate while a batch is open.
//!
//! Render order is ascending layer, ties broken by insertion order. Sorting
//! is lazy: adds, removals, and layer changes only mark the order dirty and
//! the next iteration pays for one stable sort.

use easel_core::{Drawable, EaselError, ElementId, Result};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use slotmap::SlotMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// One stored element
pub struct ElementEntry {
    drawable: Box<dyn Drawable>,
    layer: i32,
    visible: bool,
    attached: bool,
}

impl ElementEntry {
    pub fn drawable(&self) -> &dyn Drawable {
        self.drawable.as_ref()
    }

    pub fn drawable_mut(&mut self) -> &mut dyn Drawable {
        self.drawable.as_mut()
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// The element set, reachable only through the container's lock
#[derive(Default)]
pub struct Elements {
    entries: SlotMap<ElementId, ElementEntry>,
    /// Attached elements, insertion order until sorted
    order: Vec<ElementId>,
    dirty: bool,
}

impl Elements {
    /// Store a drawable; detached elements are kept but never rendered
    pub fn insert(&mut self, drawable: Box<dyn Drawable>, attached: bool) -> ElementId {
        let id = self.entries.insert(ElementEntry {
            drawable,
            layer: 0,
            visible: true,
            attached,
        });
        if attached {
            self.order.push(id);
            self.dirty = true;
        }
        id
    }

    pub fn add(&mut self, drawable: Box<dyn Drawable>) -> ElementId {
        self.insert(drawable, true)
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Box<dyn Drawable>> {
        let entry = self.entries.remove(id)?;
        if entry.attached {
            self.order.retain(|other| *other != id);
            self.dirty = true;
        }
        Some(entry.drawable)
    }

    pub fn attach(&mut self, id: ElementId) -> Result<()> {
        let entry = self.entry_mut(id)?;
        if !entry.attached {
            entry.attached = true;
            self.order.push(id);
            self.dirty = true;
        }
        Ok(())
    }

    pub fn detach(&mut self, id: ElementId) -> Result<()> {
        let entry = self.entry_mut(id)?;
        if entry.attached {
            entry.attached = false;
            self.order.retain(|other| *other != id);
            self.dirty = true;
        }
        Ok(())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&dyn Drawable> {
        self.entries.get(id).map(ElementEntry::drawable)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut dyn Drawable> {
        self.entries.get_mut(id).map(ElementEntry::drawable_mut)
    }

    pub fn entry(&self, id: ElementId) -> Result<&ElementEntry> {
        self.entries.get(id).ok_or(EaselError::ElementNotFound(id))
    }

    pub fn entry_mut(&mut self, id: ElementId) -> Result<&mut ElementEntry> {
        self.entries
            .get_mut(id)
            .ok_or(EaselError::ElementNotFound(id))
    }

    pub fn layer(&self, id: ElementId) -> Result<i32> {
        Ok(self.entry(id)?.layer)
    }

    pub fn set_layer(&mut self, id: ElementId, layer: i32) -> Result<()> {
        let entry = self.entry_mut(id)?;
        if entry.layer != layer {
            entry.layer = layer;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<()> {
        self.entry_mut(id)?.visible = visible;
        Ok(())
    }

    /// Layer just below everything attached
    pub fn min_layer(&self) -> i32 {
        self.attached().map(|e| e.layer).min().unwrap_or(0) - 1
    }

    /// Layer just above everything attached
    pub fn max_layer(&self) -> i32 {
        self.attached().map(|e| e.layer).max().unwrap_or(0) + 1
    }

    /// Total stored elements, attached or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn attached_len(&self) -> usize {
        self.order.len()
    }

    /// Visit attached elements from the bottom layer up
    pub fn for_each_in_layer_order(&mut self, mut visitor: impl FnMut(ElementId, &ElementEntry)) {
        self.sort_if_dirty();
        for id in &self.order {
            if let Some(entry) = self.entries.get(*id) {
                visitor(*id, entry);
            }
        }
    }

    pub fn ids_in_layer_order(&mut self) -> Vec<ElementId> {
        self.sort_if_dirty();
        self.order.clone()
    }

    fn attached(&self) -> impl Iterator<Item = &ElementEntry> {
        self.order.iter().filter_map(|id| self.entries.get(*id))
    }

    fn sort_if_dirty(&mut self) {
        if !self.dirty {
            return;
        }
        let entries = &self.entries;
        self.order
            .sort_by_key(|id| entries.get(*id).map_or(i32::MAX, |e| e.layer));
        self.dirty = false;
    }
}

/// Exclusive access to the element map
pub struct ElementsGuard<'a> {
    elements: MutexGuard<'a, Elements>,
    _batch: ReentrantMutexGuard<'a, ()>,
}

impl Deref for ElementsGuard<'_> {
    type Target = Elements;

    fn deref(&self) -> &Elements {
        &self.elements
    }
}

impl DerefMut for ElementsGuard<'_> {
    fn deref_mut(&mut self) -> &mut Elements {
        &mut self.elements
    }
}

/// Thread-safe element container
pub struct ElementContainer {
    batch: ReentrantMutex<()>,
    elements: Mutex<Elements>,
}

impl Default for ElementContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementContainer {
    pub fn new() -> Self {
        Self {
            batch: ReentrantMutex::new(()),
            elements: Mutex::new(Elements::default()),
        }
    }

    /// Acquire the mutation lock
    ///
    /// Passes the batch gate first, so it waits for another thread's batch
    /// but not for one opened on this thread.
    pub fn lock(&self) -> ElementsGuard<'_> {
        let batch = self.batch.lock();
        ElementsGuard {
            elements: crate::lock(&self.elements),
            _batch: batch,
        }
    }

    /// Keep other threads out until the guard is dropped
    pub fn batch(&self) -> ReentrantMutexGuard<'_, ()> {
        self.batch.lock()
    }

    /// Run `f` with the lock held
    pub fn with<R>(&self, f: impl FnOnce(&mut Elements) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn add(&self, drawable: Box<dyn Drawable>) -> ElementId {
        self.lock().add(drawable)
    }

    pub fn remove(&self, id: ElementId) -> Option<Box<dyn Drawable>> {
        self.lock().remove(id)
    }

    pub fn set_layer(&self, id: ElementId, layer: i32) -> Result<()> {
        self.lock().set_layer(id, layer)
    }

    pub fn for_each_in_layer_order(&self, visitor: impl FnMut(ElementId, &ElementEntry)) {
        self.lock().for_each_in_layer_order(visitor);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn min_layer(&self) -> i32 {
        self.lock().min_layer()
    }

    pub fn max_layer(&self) -> i32 {
        self.lock().max_layer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Ellipse, Rectangle};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn rect() -> Box<dyn Drawable> {
        Box::new(Rectangle::new(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn test_layer_ordering() {
        let container = ElementContainer::new();
        let mut ids = Vec::new();
        for layer in [2, -1, 0] {
            let id = container.add(rect());
            container.set_layer(id, layer).unwrap();
            ids.push(id);
        }

        let mut visited = Vec::new();
        container.for_each_in_layer_order(|id, _| visited.push(id));
        assert_eq!(visited, vec![ids[1], ids[2], ids[0]]);

        container.set_layer(ids[2], -5).unwrap();
        let mut visited = Vec::new();
        container.for_each_in_layer_order(|id, entry| visited.push((id, entry.layer())));
        assert_eq!(visited[0], (ids[2], -5));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let container = ElementContainer::new();
        let a = container.add(rect());
        let b = container.add(Box::new(Ellipse::circle(0.0, 0.0, 1.0)));
        let c = container.add(rect());
        assert_eq!(container.lock().ids_in_layer_order(), vec![a, b, c]);
    }

    #[test]
    fn test_min_max_layer() {
        let container = ElementContainer::new();
        assert_eq!(container.min_layer(), -1);
        assert_eq!(container.max_layer(), 1);

        let a = container.add(rect());
        let b = container.add(rect());
        container.set_layer(a, 4).unwrap();
        container.set_layer(b, -2).unwrap();
        assert_eq!(container.max_layer(), 5);
        assert_eq!(container.min_layer(), -3);
    }

    #[test]
    fn test_detached_elements_are_not_visited() {
        let container = ElementContainer::new();
        let id = container.with(|elements| elements.insert(rect(), false));

        let mut count = 0;
        container.for_each_in_layer_order(|_, _| count += 1);
        assert_eq!(count, 0);
        assert_eq!(container.len(), 1);

        container.with(|elements| elements.attach(id)).unwrap();
        container.for_each_in_layer_order(|_, _| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_missing_element_errors() {
        let container = ElementContainer::new();
        let id = container.add(rect());
        assert!(container.remove(id).is_some());
        assert!(container.remove(id).is_none());
        assert_eq!(
            container.set_layer(id, 3),
            Err(EaselError::ElementNotFound(id))
        );
    }

    #[test]
    fn test_batch_is_reentrant_and_exclusive() {
        let container = Arc::new(ElementContainer::new());
        let batch = container.batch();
        let id = container.add(rect());
        container.set_layer(id, 2).unwrap();

        let other = {
            let container = Arc::clone(&container);
            thread::spawn(move || container.lock().layer(id).unwrap())
        };
        thread::sleep(std::time::Duration::from_millis(50));
        assert!(!other.is_finished());

        container.set_layer(id, 7).unwrap();
        drop(batch);
        assert_eq!(other.join().unwrap(), 7);
    }

    #[test]
    fn test_concurrent_add_remove() {
        let container = Arc::new(ElementContainer::new());

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let container = Arc::clone(&container);
                thread::spawn(move || {
                    // 500 calls per thread: two adds and one remove per round
                    let mut kept = Vec::new();
                    for round in 0..167 {
                        let a = container.add(rect());
                        let b = container.add(rect());
                        if round < 166 {
                            assert!(container.remove(a).is_some());
                            kept.push(b);
                        } else {
                            kept.push(a);
                            kept.push(b);
                        }
                    }
                    kept
                })
            })
            .collect();

        let mut expected = HashSet::new();
        for worker in workers {
            expected.extend(worker.join().unwrap());
        }

        let mut elements = container.lock();
        let order = elements.ids_in_layer_order();
        let unique: HashSet<_> = order.iter().copied().collect();
        assert_eq!(order.len(), unique.len());
        assert_eq!(unique, expected);
        assert_eq!(elements.len(), expected.len());
        assert!(order.iter().all(|id| elements.contains(*id)));
    }
}
