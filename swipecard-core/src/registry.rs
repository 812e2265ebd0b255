//! Slide registry: logical index ↔ rendering order.
//!
//! Slides live in an arena addressed by their logical index, which never
//! changes. Rendering order is a separate vector of logical indices that
//! shrinks when conditional cards are pruned and rotates when the loop
//! engine relocates boundary slides. Nothing in here infers order from the
//! rendered tree.

use swipecard_model::{CardKind, CardSpec, LogicalIndex};

/// A rendered wrapper around one child panel. Owns the panel; dropping the
/// slide destroys it.
#[derive(Debug)]
pub struct Slide<P> {
    logical_index: LogicalIndex,
    kind: CardKind,
    panel: P,
}

impl<P> Slide<P> {
    /// Configured position of the card.
    pub fn logical_index(&self) -> LogicalIndex {
        self.logical_index
    }

    /// Card discriminator.
    pub fn kind(&self) -> &CardKind {
        &self.kind
    }

    /// Only conditional slides are ever pruned.
    pub fn is_conditional(&self) -> bool {
        self.kind.is_conditional()
    }

    /// The host panel.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// The host panel, mutably.
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}

/// Slides addressed by logical index, plus their rendering order.
#[derive(Debug)]
pub struct SlideRegistry<P> {
    slots: Vec<Option<Slide<P>>>,
    order: Vec<LogicalIndex>,
}

impl<P> Default for SlideRegistry<P> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
        }
    }
}

impl<P> SlideRegistry<P> {
    /// One slide per card spec, in logical order.
    pub fn build<E, F>(specs: &[CardSpec], mut make_panel: F) -> Result<Self, E>
    where
        F: FnMut(&CardSpec) -> Result<P, E>,
    {
        let mut slots = Vec::with_capacity(specs.len());
        let mut order = Vec::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            debug_assert_eq!(spec.logical_index.get(), position);
            let panel = make_panel(spec)?;
            slots.push(Some(Slide {
                logical_index: LogicalIndex(position),
                kind: spec.kind.clone(),
                panel,
            }));
            order.push(LogicalIndex(position));
        }
        Ok(Self { slots, order })
    }

    /// Number of visible slides.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// No slide is visible.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of cards the registry was built from, including pruned ones.
    pub fn configured_len(&self) -> usize {
        self.slots.len()
    }

    /// Logical indices in current rendering order.
    pub fn order(&self) -> &[LogicalIndex] {
        &self.order
    }

    /// Live slides in rendering order.
    pub fn visible(&self) -> impl Iterator<Item = &Slide<P>> {
        self.order
            .iter()
            .filter_map(|index| self.slots.get(index.get())?.as_ref())
    }

    /// Visible slide by logical index.
    pub fn get(&self, index: LogicalIndex) -> Option<&Slide<P>> {
        self.slots.get(index.get())?.as_ref()
    }

    /// Visible slide by logical index, mutably.
    pub fn get_mut(&mut self, index: LogicalIndex) -> Option<&mut Slide<P>> {
        self.slots.get_mut(index.get())?.as_mut()
    }

    /// Whether the slide is still visible.
    pub fn contains(&self, index: LogicalIndex) -> bool {
        self.get(index).is_some()
    }

    /// Rendering position of a slide.
    pub fn position_of(&self, index: LogicalIndex) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == index)
    }

    /// Slide at a rendering position.
    pub fn at_position(&self, position: usize) -> Option<LogicalIndex> {
        self.order.get(position).copied()
    }

    /// First slide in rendering order.
    pub fn first(&self) -> Option<LogicalIndex> {
        self.order.first().copied()
    }

    /// Last slide in rendering order.
    pub fn last(&self) -> Option<LogicalIndex> {
        self.order.last().copied()
    }

    /// Smallest surviving logical index, regardless of rendering order.
    pub fn lowest_logical(&self) -> Option<LogicalIndex> {
        self.order.iter().min().copied()
    }

    /// Surviving slide closest to `index` in logical order; ties go to the
    /// lower index.
    pub fn nearest_logical(&self, index: LogicalIndex) -> Option<LogicalIndex> {
        self.order
            .iter()
            .copied()
            .min_by_key(|candidate| (candidate.distance(index), *candidate))
    }

    /// Remove every slide matching `predicate`, dropping its panel. Returns
    /// the removed logical indices in rendering order; empty when nothing
    /// matched.
    pub fn remove_slides<F>(&mut self, mut predicate: F) -> Vec<LogicalIndex>
    where
        F: FnMut(&Slide<P>) -> bool,
    {
        let mut removed = Vec::new();
        let slots = &mut self.slots;
        self.order.retain(|index| {
            let Some(slot) = slots.get_mut(index.get()) else {
                return false;
            };
            let remove = match slot {
                Some(slide) => predicate(slide),
                None => return false,
            };
            if remove {
                *slot = None;
                removed.push(*index);
            }
            !remove
        });
        removed
    }

    /// Move the first slide in rendering order to the end.
    pub fn rotate_first_to_end(&mut self) -> Option<LogicalIndex> {
        if self.order.len() < 2 {
            return None;
        }
        self.order.rotate_left(1);
        self.order.last().copied()
    }

    /// Move the last slide in rendering order to the start.
    pub fn rotate_last_to_start(&mut self) -> Option<LogicalIndex> {
        if self.order.len() < 2 {
            return None;
        }
        self.order.rotate_right(1);
        self.order.first().copied()
    }

    /// Panels of live slides in logical order.
    pub fn panels_mut(&mut self) -> impl Iterator<Item = &mut P> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.as_mut().map(|slide| &mut slide.panel))
    }
}
