//! In-memory page model — the pane tree the demo document is built from.
//!
//! Panes are stored in a flat arena (`Vec` + index links), which avoids
//! recursive `Box` ownership and keeps traversal cheap.  Layout is a single
//! pass that stacks leaf panes vertically and assigns every pane its top
//! edge in page coordinates; containers take the combined height of their
//! children.

// ───────────────────────────────────────── pane ──────────────

/// Index into [`Page::panes`].
pub type PaneId = usize;

/// How a pane treats content that overflows it.  Only `Scroll` and `Auto`
/// panes can act as a scroll container for their descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Auto,
    Scroll,
}

/// What a pane holds.
#[derive(Debug, Clone)]
pub enum PaneKind {
    /// Structural node with no content of its own.
    Container,
    /// Pre-wrapped text lines, rendered one per terminal row.
    Text(Vec<String>),
    /// Blank vertical gap.
    Spacer,
    /// The parallax backdrop pane.
    Backdrop,
}

/// A single pane in the arena.
#[derive(Debug, Clone)]
pub struct Pane {
    pub kind: PaneKind,
    pub overflow: Overflow,
    /// Height in pixels.  Intrinsic for leaves; computed for containers
    /// during [`Page::perform_layout`].
    pub height: f64,
    /// Top edge in page coordinates.  Set by [`Page::perform_layout`].
    pub top: f64,
    pub parent: Option<PaneId>,
    pub children: Vec<PaneId>,
}

// ───────────────────────────────────────── page ──────────────

/// Vertical pixels per terminal row (half-block rendering).
pub const PX_PER_ROW: f64 = 2.0;

/// Arena-backed pane tree.
#[derive(Debug, Clone)]
pub struct Page {
    pub panes: Vec<Pane>,
    pub root: PaneId,
}

impl Page {
    /// Create a page whose root is the scroll container.
    pub fn new() -> Self {
        let root = Pane {
            kind: PaneKind::Container,
            overflow: Overflow::Scroll,
            height: 0.0,
            top: 0.0,
            parent: None,
            children: Vec::new(),
        };
        Self {
            panes: vec![root],
            root: 0,
        }
    }

    fn push(&mut self, parent: PaneId, pane: Pane) -> PaneId {
        let id = self.panes.len();
        self.panes.push(pane);
        self.panes[parent].children.push(id);
        id
    }

    /// Add a structural container under `parent`.
    pub fn add_container(&mut self, parent: PaneId, overflow: Overflow) -> PaneId {
        self.push(
            parent,
            Pane {
                kind: PaneKind::Container,
                overflow,
                height: 0.0,
                top: 0.0,
                parent: Some(parent),
                children: Vec::new(),
            },
        )
    }

    /// Add a text pane; its height follows from the line count.
    pub fn add_text(&mut self, parent: PaneId, lines: Vec<String>) -> PaneId {
        let height = lines.len() as f64 * PX_PER_ROW;
        self.push(
            parent,
            Pane {
                kind: PaneKind::Text(lines),
                overflow: Overflow::Visible,
                height,
                top: 0.0,
                parent: Some(parent),
                children: Vec::new(),
            },
        )
    }

    /// Add a blank gap of `height` pixels.
    pub fn add_spacer(&mut self, parent: PaneId, height: f64) -> PaneId {
        self.push(
            parent,
            Pane {
                kind: PaneKind::Spacer,
                overflow: Overflow::Visible,
                height,
                top: 0.0,
                parent: Some(parent),
                children: Vec::new(),
            },
        )
    }

    /// Add the backdrop pane of `height` pixels.
    pub fn add_backdrop(&mut self, parent: PaneId, height: f64) -> PaneId {
        self.push(
            parent,
            Pane {
                kind: PaneKind::Backdrop,
                overflow: Overflow::Visible,
                height,
                top: 0.0,
                parent: Some(parent),
                children: Vec::new(),
            },
        )
    }

    pub fn get(&self, id: PaneId) -> &Pane {
        &self.panes[id]
    }

    /// Stack all panes vertically: assign tops in page coordinates and give
    /// containers the combined height of their children.  Explicit-stack
    /// walk, so layout shares the no-recursion property of
    /// [`scroll_parent`](Self::scroll_parent).
    pub fn perform_layout(&mut self) {
        let mut cursor = 0.0;
        // (id, entered): the second visit closes the container's height.
        let mut stack = vec![(self.root, false)];
        while let Some((id, entered)) = stack.pop() {
            if entered {
                self.panes[id].height = cursor - self.panes[id].top;
                continue;
            }
            self.panes[id].top = cursor;
            if self.panes[id].children.is_empty() {
                cursor += self.panes[id].height;
            } else {
                stack.push((id, true));
                for &child in self.panes[id].children.iter().rev() {
                    stack.push((child, false));
                }
            }
        }
    }

    /// Top edge of a pane in page coordinates (after layout).
    pub fn pane_top(&self, id: PaneId) -> f64 {
        self.panes[id].top
    }

    /// Total scrollable content height.
    pub fn content_height(&self) -> f64 {
        self.panes[self.root].height
    }

    /// Nearest ancestor that can scroll its content.
    ///
    /// A plain upward walk over parent links — no recursion, so arbitrarily
    /// deep trees cannot overflow the stack.  Falls back to the root when
    /// no ancestor declares `Scroll`/`Auto` overflow.
    pub fn scroll_parent(&self, id: PaneId) -> PaneId {
        let mut cursor = self.panes[id].parent;
        while let Some(pid) = cursor {
            match self.panes[pid].overflow {
                Overflow::Scroll | Overflow::Auto => return pid,
                Overflow::Visible => cursor = self.panes[pid].parent,
            }
        }
        self.root
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn layout_stacks_leaves_and_sizes_containers() {
        let mut page = Page::new();
        let body = page.add_container(page.root, Overflow::Visible);
        page.add_text(body, lines(3)); // 6 px
        let banner = page.add_backdrop(body, 24.0);
        let tail = page.add_text(body, lines(5)); // 10 px
        page.perform_layout();

        assert_eq!(page.pane_top(banner), 6.0);
        assert_eq!(page.pane_top(tail), 30.0);
        assert_eq!(page.get(body).height, 40.0);
        assert_eq!(page.content_height(), 40.0);
    }

    #[test]
    fn spacer_shifts_following_panes() {
        let mut page = Page::new();
        page.add_spacer(page.root, 8.0);
        let banner = page.add_backdrop(page.root, 24.0);
        page.perform_layout();
        assert_eq!(page.pane_top(banner), 8.0);
    }

    #[test]
    fn scroll_parent_skips_visible_ancestors() {
        let mut page = Page::new();
        let body = page.add_container(page.root, Overflow::Visible);
        let section = page.add_container(body, Overflow::Visible);
        let banner = page.add_backdrop(section, 24.0);
        assert_eq!(page.scroll_parent(banner), page.root);
    }

    #[test]
    fn scroll_parent_finds_nearest_auto_ancestor() {
        let mut page = Page::new();
        let body = page.add_container(page.root, Overflow::Visible);
        let scroller = page.add_container(body, Overflow::Auto);
        let section = page.add_container(scroller, Overflow::Visible);
        let banner = page.add_backdrop(section, 24.0);
        assert_eq!(page.scroll_parent(banner), scroller);
    }

    #[test]
    fn scroll_parent_of_root_is_root() {
        let page = Page::new();
        assert_eq!(page.scroll_parent(page.root), page.root);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let mut page = Page::new();
        let mut parent = page.add_container(page.root, Overflow::Visible);
        for _ in 0..50_000 {
            parent = page.add_container(parent, Overflow::Visible);
        }
        let banner = page.add_backdrop(parent, 24.0);
        assert_eq!(page.scroll_parent(banner), page.root);
    }
}
