//! Pagination indicators, prev/next stepping and remote index requests.
//!
//! Everything here resolves to a logical index; the carousel owns the single
//! navigation entry point that turns it into a scroll.

use swipecard_model::LogicalIndex;

/// Step direction for the prev/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the start of the track.
    Prev,
    /// Towards the end of the track.
    Next,
}

impl Direction {
    /// Position change for one step.
    pub fn delta(self) -> isize {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

/// Target of a prev/next step.
///
/// Steps move over rendering positions, not logical indices; the two
/// diverge once slides are pruned or rotated. An unknown `current`
/// counts as position 0. With `wrap` the position wraps around; otherwise it
/// is clamped to the ends.
pub fn step_target(
    order: &[LogicalIndex],
    current: LogicalIndex,
    direction: Direction,
    wrap: bool,
) -> Option<LogicalIndex> {
    if order.is_empty() {
        return None;
    }
    let count = order.len() as isize;
    let position = order
        .iter()
        .position(|candidate| *candidate == current)
        .unwrap_or(0) as isize;
    let stepped = position + direction.delta();
    let next = if wrap {
        stepped.rem_euclid(count)
    } else {
        stepped.clamp(0, count - 1)
    };
    Some(order[next as usize])
}

/// Logical index requested by a 1-based remote signal, clamped to the
/// configured card range. `None` for the neutral value 0, for non-finite
/// signals, and when there are no cards.
pub fn remote_target(signal: f64, configured: usize) -> Option<LogicalIndex> {
    if !signal.is_finite() || signal == 0.0 || configured == 0 {
        return None;
    }
    let requested = signal.round() - 1.0;
    let max = (configured - 1) as f64;
    Some(LogicalIndex(requested.clamp(0.0, max) as usize))
}

/// One pagination indicator, keyed by the logical index it navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationBullet {
    /// Slide the indicator navigates to.
    pub logical_index: LogicalIndex,
    /// Position among the indicators.
    pub position: usize,
    /// Accessible label, `Go to slide <n>`.
    pub label: String,
    /// Rendered with `aria-current`.
    pub active: bool,
}

/// Indicator set for the currently visible slides.
#[derive(Debug, Default, Clone)]
pub struct Pagination {
    bullets: Vec<PaginationBullet>,
}

impl Pagination {
    /// Empty indicator set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild one indicator per visible slide and highlight `current`.
    ///
    /// Indicators follow logical order, so they stay put while the loop
    /// engine rotates the track.
    pub fn rebuild(&mut self, visible: &[LogicalIndex], current: LogicalIndex) {
        let mut indices = visible.to_vec();
        indices.sort_unstable();
        self.bullets = indices
            .into_iter()
            .enumerate()
            .map(|(position, index)| PaginationBullet {
                logical_index: index,
                position,
                label: format!("Go to slide {}", position + 1),
                active: index == current,
            })
            .collect();
    }

    /// Mark the indicator whose logical index equals `current`. Returns
    /// whether anything changed.
    pub fn highlight(&mut self, current: LogicalIndex) -> bool {
        let mut changed = false;
        for bullet in &mut self.bullets {
            let active = bullet.logical_index == current;
            changed |= bullet.active != active;
            bullet.active = active;
        }
        changed
    }

    /// Drop every indicator.
    pub fn clear(&mut self) {
        self.bullets.clear();
    }

    /// Indicators in logical order.
    pub fn bullets(&self) -> &[PaginationBullet] {
        &self.bullets
    }

    /// No indicators are built.
    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }

    /// Logical index of the highlighted indicator.
    pub fn active(&self) -> Option<LogicalIndex> {
        self.bullets
            .iter()
            .find(|bullet| bullet.active)
            .map(|bullet| bullet.logical_index)
    }

    /// Number of highlighted indicators; at most one.
    pub fn active_count(&self) -> usize {
        self.bullets.iter().filter(|bullet| bullet.active).count()
    }
}
