//! Responsive masonry grid for variable-height cards.
//!
//! ## Usage
//!
//! Show feeds and boards of mixed-height cards in height-balanced columns
//! whose count follows the viewport width.
use std::{sync::Arc, time::Duration};

use derive_setters::Setters;
use refresh_ui::{Px, PxSize, State, Subscription, ViewportSignal};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::item::{DEFAULT_ITEM_HEIGHT, MasonryItem};

pub mod balance;
pub mod columns;
pub mod render;
pub mod virtualize;

pub use balance::{Column, ColumnEntry, distribute_columns, distribute_columns_with_fallback};
pub use columns::{ColumnSpec, ResolvedColumns};
pub use render::{ColumnNode, GridNode, RenderedItem};
pub use virtualize::{ContainerHeight, VirtualizationMode};

use balance::tallest_column_height;
use columns::resolve_tracks;
use virtualize::{VisibleWindow, max_scroll_offset};

/// Virtualization settings of a masonry grid.
#[derive(Clone, Debug, PartialEq, Setters, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualizationArgs {
    /// When the grid virtualizes.
    pub mode: VirtualizationMode,
    /// Container height enforced while virtualized.
    pub height: ContainerHeight,
    /// Extra distance above and below the visible window that stays mounted.
    pub overscan: Px,
}

impl Default for VirtualizationArgs {
    fn default() -> Self {
        Self {
            mode: VirtualizationMode::Disabled,
            height: ContainerHeight::default(),
            overscan: Px(400),
        }
    }
}

/// Arguments of [`masonry_grid`] and [`MasonryGrid`].
#[derive(Clone, Debug, PartialEq, Setters, Serialize, Deserialize)]
#[serde(default)]
pub struct MasonryGridArgs {
    /// How the column count is chosen.
    pub columns: ColumnSpec,
    /// Space between items in a column and between columns.
    pub gap: Px,
    /// Height used for items with a missing or non-positive height.
    pub fallback_item_height: Px,
    /// Virtualization settings.
    pub virtualization: VirtualizationArgs,
    /// Quiet interval for viewport signals created from these arguments.
    pub resize_debounce_ms: u64,
}

impl Default for MasonryGridArgs {
    fn default() -> Self {
        Self {
            columns: ColumnSpec::default(),
            gap: Px(16),
            fallback_item_height: DEFAULT_ITEM_HEIGHT,
            virtualization: VirtualizationArgs::default(),
            resize_debounce_ms: 150,
        }
    }
}

impl MasonryGridArgs {
    /// Returns the resize quiet interval.
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Creates a viewport signal using [`resize_debounce`](Self::resize_debounce).
    pub fn viewport_signal(&self) -> ViewportSignal {
        ViewportSignal::with_debounce(self.resize_debounce())
    }

    fn estimated_item_height(&self) -> Px {
        self.fallback_item_height.positive_or(DEFAULT_ITEM_HEIGHT)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LayoutKey {
    items: Vec<(String, Px)>,
    column_count: usize,
    gap: Px,
}

impl LayoutKey {
    fn matches<T>(&self, items: &[MasonryItem<T>], column_count: usize, gap: Px, fallback: Px) -> bool {
        self.column_count == column_count
            && self.gap == gap
            && self.items.len() == items.len()
            && self
                .items
                .iter()
                .zip(items)
                .all(|((id, height), item)| *id == item.id && *height == item.effective_height(fallback))
    }
}

struct LayoutCache {
    key: LayoutKey,
    columns: Arc<[Column]>,
}

/// Persistent state of a masonry grid across renders.
///
/// Holds the last column assignment, the last observed viewport and the scroll
/// position of a virtualized grid.
pub struct MasonryGridController {
    cache: Option<LayoutCache>,
    column_spec: Option<(ColumnSpec, Px)>,
    viewport: Option<PxSize>,
    resolved_columns: Option<usize>,
    relayout_pending: bool,
    scroll_offset: Px,
    max_scroll: Px,
    layout_passes: usize,
}

impl Default for MasonryGridController {
    fn default() -> Self {
        Self::new()
    }
}

impl MasonryGridController {
    /// Creates a controller with no layout yet.
    pub fn new() -> Self {
        Self {
            cache: None,
            column_spec: None,
            viewport: None,
            resolved_columns: None,
            relayout_pending: true,
            scroll_offset: Px::ZERO,
            max_scroll: Px::ZERO,
            layout_passes: 0,
        }
    }

    /// Number of times columns were computed from scratch.
    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    /// Returns `true` if the grid must render again to reflect the latest
    /// viewport or arguments.
    pub fn needs_relayout(&self) -> bool {
        self.relayout_pending
    }

    /// Returns the last observed viewport size.
    pub fn viewport(&self) -> Option<PxSize> {
        self.viewport
    }

    /// Returns the column count used by the last render.
    pub fn resolved_columns(&self) -> Option<usize> {
        self.resolved_columns
    }

    /// Returns the scroll offset of a virtualized grid.
    pub fn scroll_offset(&self) -> Px {
        self.scroll_offset
    }

    /// Returns the largest scroll offset allowed by the last render.
    pub fn max_scroll(&self) -> Px {
        self.max_scroll
    }

    /// Scrolls to `offset`, clamped to the scrollable range.
    pub fn scroll_to(&mut self, offset: Px) {
        self.scroll_offset = offset.min(self.max_scroll).max(Px::ZERO);
    }

    /// Scrolls by `delta`, clamped to the scrollable range.
    pub fn scroll_by(&mut self, delta: Px) {
        self.scroll_to(self.scroll_offset.saturating_add(delta));
    }

    /// Drops the cached column assignment.
    pub fn invalidate(&mut self) {
        self.cache = None;
        self.relayout_pending = true;
    }

    /// Records a settled viewport size.
    ///
    /// Flags a relayout when the size resolves to a different column count
    /// than the last render used.
    pub fn observe_viewport(&mut self, size: PxSize) {
        self.viewport = Some(size);
        let Some((spec, gap)) = &self.column_spec else {
            self.relayout_pending = true;
            return;
        };
        let resolved = spec.resolve(size.width, *gap).count;
        if self.resolved_columns != Some(resolved) {
            debug!(
                width = size.width.raw(),
                from = ?self.resolved_columns,
                to = resolved,
                "Masonry column count changed"
            );
            self.relayout_pending = true;
        }
    }

    fn columns_for<T>(
        &mut self,
        items: &[MasonryItem<T>],
        column_count: usize,
        gap: Px,
        fallback: Px,
    ) -> Arc<[Column]> {
        if let Some(cache) = &self.cache
            && cache.key.matches(items, column_count, gap, fallback)
        {
            return cache.columns.clone();
        }

        let columns: Arc<[Column]> =
            distribute_columns_with_fallback(items, column_count, gap, fallback).into();
        self.layout_passes += 1;
        debug!(
            items = items.len(),
            columns = column_count,
            gap = gap.raw(),
            tallest = tallest_column_height(&columns).raw(),
            "Masonry layout computed"
        );
        self.cache = Some(LayoutCache {
            key: LayoutKey {
                items: items
                    .iter()
                    .map(|item| (item.id.clone(), item.effective_height(fallback)))
                    .collect(),
                column_count,
                gap,
            },
            columns: columns.clone(),
        });
        columns
    }
}

struct RenderPlan {
    columns: Arc<[Column]>,
    resolved: ResolvedColumns,
    content_height: Px,
    container_height: Option<Px>,
    scroll_offset: Px,
}

/// # masonry_grid
///
/// Lays out items in height-balanced columns and renders each mounted item.
///
/// ## Usage
///
/// Render card feeds whose column count follows the viewport width.
///
/// ## Parameters
///
/// - `args` - column selection, gap and virtualization; see
///   [`MasonryGridArgs`].
/// - `controller` - a [`MasonryGridController`] holding the cached layout and
///   scroll position.
/// - `viewport` - the settled viewport size, or `None` while unmeasured, which
///   resolves like a zero width.
/// - `items` - items in priority order.
/// - `render_item` - maps a mounted item to its rendered content.
///
/// ## Examples
///
/// ```
/// use refresh_components::{
///     item::MasonryItem,
///     masonry_grid::{ColumnSpec, MasonryGridArgs, MasonryGridController, masonry_grid},
/// };
/// use refresh_ui::{BreakpointTable, Px, PxSize, State};
///
/// let controller = State::new(MasonryGridController::new());
/// let args = MasonryGridArgs::default()
///     .columns(ColumnSpec::breakpoints(BreakpointTable::new([(0, 1), (800, 2), (1600, 4)])))
///     .gap(Px(12));
/// let items: Vec<_> = (0..6)
///     .map(|i| MasonryItem::new(format!("card-{i}"), Px(100 + i * 20), i))
///     .collect();
///
/// let grid = masonry_grid(
///     &args,
///     &controller,
///     Some(PxSize::new(Px(1000), Px(800))),
///     &items,
///     |item| format!("Card #{}", item.payload),
/// );
/// assert_eq!(grid.column_count, 2);
/// assert_eq!(grid.rendered_item_count(), 6);
/// ```
pub fn masonry_grid<T, R, F>(
    args: &MasonryGridArgs,
    controller: &State<MasonryGridController>,
    viewport: Option<PxSize>,
    items: &[MasonryItem<T>],
    mut render_item: F,
) -> GridNode<R>
where
    F: FnMut(&MasonryItem<T>) -> R,
{
    let viewport_size = viewport.unwrap_or(PxSize::ZERO);
    let gap = args.gap.max(Px::ZERO);
    let resolved = args.columns.resolve(viewport_size.width, gap);
    let virtualized = args.virtualization.mode.applies_to(items.len());

    let plan = controller.with_mut(|c| {
        c.column_spec = Some((args.columns.clone(), gap));
        if viewport.is_some() {
            c.viewport = viewport;
        }
        c.resolved_columns = Some(resolved.count);
        c.relayout_pending = false;

        let columns = c.columns_for(items, resolved.count, gap, args.fallback_item_height);
        let content_height = tallest_column_height(&columns);
        let container_height = virtualized.then(|| {
            args.virtualization
                .height
                .resolve_or_estimate(viewport_size.height, args.estimated_item_height())
        });
        c.max_scroll = container_height
            .map(|height| max_scroll_offset(content_height, height))
            .unwrap_or(Px::ZERO);
        c.scroll_to(c.scroll_offset);

        RenderPlan {
            columns,
            resolved,
            content_height,
            container_height,
            scroll_offset: c.scroll_offset,
        }
    });

    let window = plan
        .container_height
        .map(|height| VisibleWindow::new(plan.scroll_offset, height, args.virtualization.overscan));
    let tracks = resolve_tracks(viewport_size.width, plan.resolved.count, gap);

    let mut column_nodes = Vec::with_capacity(plan.columns.len());
    for column in plan.columns.iter() {
        let mut rendered = Vec::new();
        for entry in &column.items {
            if let Some(window) = &window
                && !window.intersects(entry.offset, entry.height)
            {
                continue;
            }
            let Some(item) = items.get(entry.source_index) else {
                continue;
            };
            rendered.push(RenderedItem {
                id: entry.id.clone(),
                source_index: entry.source_index,
                offset: entry.offset,
                height: entry.height,
                content: render_item(item),
            });
        }
        column_nodes.push(ColumnNode {
            index: column.index,
            x: tracks.positions.get(column.index).copied().unwrap_or(Px::ZERO),
            width: tracks.widths.get(column.index).copied().unwrap_or(Px::ZERO),
            total_height: column.total_height,
            assigned_count: column.len(),
            items: rendered,
        });
    }

    let node = GridNode {
        column_count: plan.resolved.count,
        active_breakpoint: plan.resolved.active_breakpoint,
        virtualized,
        container_height: plan.container_height,
        content_height: plan.content_height,
        scroll_offset: plan.scroll_offset,
        gap,
        columns: column_nodes,
    };
    trace!(
        columns = node.column_count,
        mounted = node.rendered_item_count(),
        total = items.len(),
        virtualized,
        "Masonry grid rendered"
    );
    node
}

/// A masonry grid bound to a viewport signal.
///
/// Mounting subscribes the grid's controller to settled viewport changes;
/// dropping the grid (or calling [`MasonryGrid::unmount`]) releases the
/// listener.
pub struct MasonryGrid {
    args: MasonryGridArgs,
    controller: State<MasonryGridController>,
    viewport: Option<ViewportSignal>,
    subscription: Option<Subscription>,
}

impl MasonryGrid {
    /// Creates a grid that is not bound to a viewport.
    ///
    /// Breakpoint-driven columns resolve as for a zero-width viewport.
    pub fn new(args: MasonryGridArgs) -> Self {
        Self::with_controller(args, State::default(), None)
    }

    /// Creates a grid bound to `viewport`.
    pub fn mount(args: MasonryGridArgs, viewport: &ViewportSignal) -> Self {
        Self::with_controller(args, State::default(), Some(viewport))
    }

    /// Creates a grid with an external controller, preserving its scroll
    /// position and layout cache across remounts.
    pub fn with_controller(
        args: MasonryGridArgs,
        controller: State<MasonryGridController>,
        viewport: Option<&ViewportSignal>,
    ) -> Self {
        let subscription = viewport.map(|signal| {
            let weak = controller.downgrade();
            signal.subscribe(move |size| {
                if let Some(controller) = weak.upgrade() {
                    controller.with_mut(|c| c.observe_viewport(size));
                }
            })
        });
        if let Some(size) = viewport.and_then(ViewportSignal::size) {
            controller.with_mut(|c| c.observe_viewport(size));
        }
        Self {
            args,
            controller,
            viewport: viewport.cloned(),
            subscription,
        }
    }

    /// Returns the grid arguments.
    pub fn args(&self) -> &MasonryGridArgs {
        &self.args
    }

    /// Replaces the grid arguments, flagging a relayout if they changed.
    pub fn set_args(&mut self, args: MasonryGridArgs) {
        if self.args != args {
            self.args = args;
            self.controller.with_mut(|c| c.relayout_pending = true);
        }
    }

    /// Returns a handle to the grid's controller.
    pub fn controller(&self) -> State<MasonryGridController> {
        self.controller.clone()
    }

    /// Returns `true` while the grid listens to a viewport signal.
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Returns `true` if a viewport or argument change has not been rendered.
    pub fn needs_relayout(&self) -> bool {
        self.controller.with(MasonryGridController::needs_relayout)
    }

    /// Scrolls a virtualized grid to `offset`.
    pub fn scroll_to(&self, offset: Px) {
        self.controller.with_mut(|c| c.scroll_to(offset));
    }

    /// Scrolls a virtualized grid by `delta`.
    pub fn scroll_by(&self, delta: Px) {
        self.controller.with_mut(|c| c.scroll_by(delta));
    }

    /// Lays out and renders `items` for the current viewport.
    pub fn render<T, R, F>(&self, items: &[MasonryItem<T>], render_item: F) -> GridNode<R>
    where
        F: FnMut(&MasonryItem<T>) -> R,
    {
        let viewport = self.viewport.as_ref().and_then(ViewportSignal::size);
        masonry_grid(&self.args, &self.controller, viewport, items, render_item)
    }

    /// Releases the viewport listener and drops the grid.
    pub fn unmount(mut self) {
        if self.subscription.take().is_some() {
            debug!("Masonry grid unmounted");
        }
    }
}
