//! The slide canvas engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use slide_core::layering;
use slide_core::{
    paint_order, CanvasAction, Clipboard, DisplayCapabilities, Element, ElementId, ElementPatch,
    GuidanceStore, InputEvent, MemoryGuidanceStore, PointerPhase, ResolutionPlanner,
    ResolutionProfile, Selection, ShapeKind, ShortcutDispatcher, SlideChange, SlideId, SlideStore,
    StoreError, SubscriptionId,
};
use slide_renderer::{Frame, FrameStats, PipelineState, RenderPipeline, Surface};

use crate::config::EngineConfig;
use crate::defaults;

/// An in-progress pointer drag of the selected element.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    id: ElementId,
    /// Pointer position relative to the element origin at press time.
    grab: (f32, f32),
}

/// One canvas instance bound to a slide of an injected store.
///
/// The store is the single source of truth. The canvas keeps a snapshot of
/// the slide's elements that is refreshed whenever the store reports a change
/// for this slide; each refresh marks the canvas dirty and
/// [`repaint_if_dirty`](Self::repaint_if_dirty) paints the next frame.
///
/// Every action is synchronous and contains its own failures: store errors
/// are logged and reported as "nothing happened", render errors become the
/// [`error`](Self::error) status.
pub struct SlideCanvas<S: SlideStore> {
    store: Arc<S>,
    slide_id: SlideId,
    config: EngineConfig,
    planner: ResolutionPlanner,
    capabilities: DisplayCapabilities,
    container: Option<(f64, f64)>,
    profile: Option<ResolutionProfile>,
    pipeline: RenderPipeline,
    elements: Vec<Element>,
    selection: Selection,
    clipboard: Clipboard,
    focused: bool,
    drag: Option<Drag>,
    store_changed: Arc<AtomicBool>,
    needs_paint: bool,
    subscription: SubscriptionId,
    guidance: Box<dyn GuidanceStore>,
    guidance_seen: bool,
}

impl<S: SlideStore> std::fmt::Debug for SlideCanvas<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideCanvas")
            .field("slide_id", &self.slide_id)
            .field("config", &self.config)
            .field("profile", &self.profile)
            .field("elements", &self.elements.len())
            .field("selection", &self.selection)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl<S: SlideStore> SlideCanvas<S> {
    /// Mount a canvas on `slide_id`.
    ///
    /// The canvas stays initializing until the first successful
    /// [`resize`](Self::resize).
    pub fn new(
        store: Arc<S>,
        slide_id: SlideId,
        config: EngineConfig,
        capabilities: DisplayCapabilities,
    ) -> Self {
        let store_changed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&store_changed);
        let subscription = store.subscribe(Arc::new(move |change: &SlideChange| {
            if change.slide_id() == slide_id {
                flag.store(true, Ordering::SeqCst);
            }
        }));

        let elements = store.elements(slide_id).unwrap_or_else(|e| {
            tracing::warn!("Failed to load slide {slide_id}: {e}");
            Vec::new()
        });

        let guidance: Box<dyn GuidanceStore> = Box::new(MemoryGuidanceStore::new());
        let guidance_seen = guidance.is_shown(&config.guidance_key);

        tracing::info!(
            "Mounted canvas on slide {slide_id} ({} elements, editable={}, tier={:?})",
            elements.len(),
            config.editable,
            capabilities.tier()
        );

        Self {
            planner: ResolutionPlanner::new(config.planner),
            pipeline: RenderPipeline::new(config.renderer.clone()),
            store,
            slide_id,
            config,
            capabilities,
            container: None,
            profile: None,
            elements,
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            focused: false,
            drag: None,
            store_changed,
            needs_paint: true,
            subscription,
            guidance,
            guidance_seen,
        }
    }

    /// Use `guidance` for the first-use flag and read it.
    #[must_use]
    pub fn with_guidance_store(mut self, guidance: Box<dyn GuidanceStore>) -> Self {
        self.guidance_seen = guidance.is_shown(&self.config.guidance_key);
        self.guidance = guidance;
        self
    }

    // ---- status signals ----

    /// The slide this canvas is bound to.
    #[must_use]
    pub fn slide_id(&self) -> SlideId {
        self.slide_id
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the pipeline has a surface and no pending error.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pipeline.is_ready()
    }

    /// Message of the last render failure, while in the error state.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.pipeline.error()
    }

    /// Pipeline lifecycle state.
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        self.pipeline.state()
    }

    /// Whether the slide has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether the clipboard holds an entry.
    #[must_use]
    pub fn has_clipboard(&self) -> bool {
        self.clipboard.has_entry()
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        let id = self.selection.selected()?;
        self.elements.iter().find(|e| e.id == id)
    }

    /// Snapshot of the slide's elements, in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Current resolution profile, once a container size is known.
    #[must_use]
    pub fn profile(&self) -> Option<&ResolutionProfile> {
        self.profile.as_ref()
    }

    /// Display capabilities in use.
    #[must_use]
    pub fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    /// Render surface handle, once allocated.
    #[must_use]
    pub fn surface(&self) -> Option<&Surface> {
        self.pipeline.surface()
    }

    /// Stats of the last painted frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<FrameStats> {
        self.pipeline.last_frame()
    }

    /// Whether the canvas has logical focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether the first-use guidance should be shown now.
    #[must_use]
    pub fn should_show_guidance(&self) -> bool {
        self.config.editable && !self.guidance_seen
    }

    /// Record that the first-use guidance was shown. Writes at most once.
    pub fn mark_guidance_shown(&mut self) {
        if self.guidance_seen {
            return;
        }
        self.guidance_seen = true;
        if let Err(e) = self.guidance.mark_shown(&self.config.guidance_key) {
            tracing::warn!("Failed to persist guidance flag: {e}");
        }
    }

    // ---- environment ----

    /// Adopt a new container size and replan the resolution.
    ///
    /// Returns `false` if the container is degenerate or the surface cannot
    /// be allocated; the canvas keeps its previous profile in that case.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.container = Some((width, height));
        self.replan()
    }

    /// Adopt new display capabilities and replan if a container is known.
    pub fn set_capabilities(&mut self, capabilities: DisplayCapabilities) -> bool {
        self.capabilities = capabilities;
        self.replan()
    }

    fn replan(&mut self) -> bool {
        let Some((width, height)) = self.container else {
            return false;
        };
        let profile = match self.planner.plan(width, height, &self.capabilities) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::debug!("Resolution not planned: {e}");
                return false;
            }
        };
        if let Err(e) = self.pipeline.set_profile(&profile) {
            tracing::warn!("Surface allocation failed: {e}");
            return false;
        }
        self.profile = Some(profile);
        self.needs_paint = true;
        true
    }

    /// Switch between editable and read-only.
    ///
    /// Leaving edit mode clears the selection and any drag.
    pub fn set_editable(&mut self, editable: bool) {
        if self.config.editable == editable {
            return;
        }
        self.config.editable = editable;
        if !editable {
            self.selection.clear();
            self.drag = None;
        }
        self.needs_paint = true;
    }

    /// Give or take logical focus. Shortcuts only reach a focused canvas.
    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.drag = None;
        }
    }

    // ---- painting ----

    /// Paint a frame if anything changed since the last one.
    pub fn repaint_if_dirty(&mut self) -> Option<FrameStats> {
        self.sync();
        if !self.needs_paint {
            return None;
        }
        self.paint()
    }

    /// Paint a frame unconditionally.
    pub fn render(&mut self) -> Option<FrameStats> {
        self.sync();
        self.paint()
    }

    /// Re-run the render after a failure.
    pub fn retry(&mut self) -> Option<FrameStats> {
        self.sync();
        let frame = Frame {
            elements: &self.elements,
            selected: self.selection.selected(),
            editable: self.config.editable,
        };
        let stats = self.pipeline.retry(&frame);
        if stats.is_some() {
            self.needs_paint = false;
        }
        stats
    }

    /// Delete every element of the slide and repaint a blank background.
    ///
    /// The next frame shows the empty state. Returns `false`, leaving the
    /// slide untouched, if the canvas has no surface yet.
    pub fn reset(&mut self) -> bool {
        if self.pipeline.surface().is_none() {
            tracing::debug!("Reset ignored, canvas on slide {} not ready", self.slide_id);
            return false;
        }
        self.sync();
        for element in std::mem::take(&mut self.elements) {
            if let Err(e) = self.store.delete_element(self.slide_id, element.id) {
                tracing::warn!("Reset could not delete {}: {e}", element.id);
            }
        }
        self.selection.clear();
        self.drag = None;
        self.store_changed.store(true, Ordering::SeqCst);
        self.sync();

        let painted = self.pipeline.reset().is_some();
        tracing::info!("Canvas on slide {} reset", self.slide_id);
        self.needs_paint = true;
        painted
    }

    fn paint(&mut self) -> Option<FrameStats> {
        let frame = Frame {
            elements: &self.elements,
            selected: self.selection.selected(),
            editable: self.config.editable,
        };
        let stats = self.pipeline.render(&frame);
        if stats.is_some() {
            self.needs_paint = false;
        }
        stats
    }

    /// Pull the store's state if it reported a change for this slide.
    fn sync(&mut self) {
        if !self.store_changed.swap(false, Ordering::SeqCst) {
            return;
        }
        match self.store.elements(self.slide_id) {
            Ok(elements) => {
                self.elements = elements;
                if self.selection.retain_existing(&self.elements) {
                    self.drag = None;
                }
                self.needs_paint = true;
            }
            Err(e) => tracing::warn!("Failed to refresh slide {}: {e}", self.slide_id),
        }
    }

    // ---- selection ----

    /// Select an element, or clear the selection with `None`.
    ///
    /// Returns `false` if `id` is not on the slide; the selection is then
    /// left unchanged.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        self.sync();
        if let Some(id) = id {
            if !self.elements.iter().any(|e| e.id == id) {
                return false;
            }
        }
        if self.selection.selected() != id {
            self.needs_paint = true;
        }
        self.selection.select(id);
        true
    }

    /// Select the topmost element under a point in base coordinates.
    ///
    /// Clears the selection if nothing is hit.
    pub fn select_at(&mut self, x: f32, y: f32) -> Option<ElementId> {
        self.sync();
        let hit = paint_order(&self.elements)
            .into_iter()
            .rev()
            .find(|e| e.contains_point(x, y))
            .map(|e| e.id);
        self.select(hit);
        hit
    }

    // ---- input ----

    /// Handle one input event.
    ///
    /// Pointer presses focus the canvas and select the hit element; dragging
    /// moves the selected element when editable. Keys go through the
    /// shortcut dispatcher. Returns the action a key resolved to.
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<CanvasAction> {
        match event {
            InputEvent::Pointer { phase, x, y } => {
                self.handle_pointer(*phase, *x, *y);
                None
            }
            InputEvent::Key(key) => {
                let action = ShortcutDispatcher::dispatch(key, self.config.editable, self.focused)?;
                self.perform(action);
                Some(action)
            }
            InputEvent::Focus(focused) => {
                self.set_focus(*focused);
                None
            }
        }
    }

    fn handle_pointer(&mut self, phase: PointerPhase, x: f32, y: f32) {
        match phase {
            PointerPhase::Down => {
                self.focused = true;
                self.drag = self.select_at(x, y).and_then(|id| {
                    let element = self.elements.iter().find(|e| e.id == id)?;
                    self.config.editable.then_some(Drag {
                        id,
                        grab: (x - element.transform.x, y - element.transform.y),
                    })
                });
            }
            PointerPhase::Move => {
                if let Some(drag) = self.drag {
                    let patch = ElementPatch::position(x - drag.grab.0, y - drag.grab.1);
                    if !self.update_element(drag.id, &patch) {
                        self.drag = None;
                    }
                }
            }
            PointerPhase::Up => self.drag = None,
        }
    }

    /// Run a resolved shortcut action.
    pub fn perform(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::AddText => {
                self.add_text();
            }
            CanvasAction::AddShape(kind) => {
                self.add_shape(kind);
            }
            CanvasAction::Copy => {
                self.copy_selected();
            }
            CanvasAction::Paste => {
                self.paste();
            }
            CanvasAction::Duplicate => {
                self.duplicate();
            }
            CanvasAction::DeleteSelected => {
                self.delete_selected();
            }
            CanvasAction::Nudge { dx, dy } => {
                self.nudge_selected(dx, dy);
            }
        }
    }

    // ---- actions ----

    /// Add a default text element and select it.
    pub fn add_text(&mut self) -> Option<ElementId> {
        let z = self.next_z_index()?;
        self.add(defaults::text(z))
    }

    /// Add a default shape element and select it.
    pub fn add_shape(&mut self, kind: ShapeKind) -> Option<ElementId> {
        let z = self.next_z_index()?;
        self.add(defaults::shape(kind, z))
    }

    /// Add an image placeholder and select it.
    pub fn add_image(&mut self) -> Option<ElementId> {
        self.add_image_from("", "")
    }

    /// Add an image with a source reference and select it.
    pub fn add_image_from(&mut self, src: &str, alt: &str) -> Option<ElementId> {
        let z = self.next_z_index()?;
        self.add(defaults::image(src, alt, z))
    }

    /// Add an arbitrary element on top of the others and select it.
    ///
    /// The element's `z_index` is replaced so it paints last.
    pub fn add_element(&mut self, element: Element) -> Option<ElementId> {
        let z = self.next_z_index()?;
        self.add(element.with_z_index(z))
    }

    /// Copy the selected element. No-op without a selection.
    pub fn copy_selected(&mut self) -> bool {
        self.sync();
        match self.selected_element() {
            Some(element) => {
                let element = element.clone();
                self.clipboard.copy(&element);
                true
            }
            None => false,
        }
    }

    /// Paste the clipboard on top of every element and select the copy.
    /// No-op with an empty clipboard.
    pub fn paste(&mut self) -> Option<ElementId> {
        let z = self.next_z_index()?;
        let element = self.clipboard.paste(z)?;
        self.add(element)
    }

    /// Copy the selected element and paste it in one step.
    pub fn duplicate(&mut self) -> Option<ElementId> {
        if !self.editable() || !self.copy_selected() {
            return None;
        }
        self.paste()
    }

    /// Delete the selected element and clear the selection.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.editable_selection() else {
            return false;
        };
        match self.store.delete_element(self.slide_id, id) {
            Ok(()) => {
                self.selection.clear();
                self.drag = None;
                self.sync();
                true
            }
            Err(e) => self.store_failed("delete", &e),
        }
    }

    /// Raise the selected element above every other. Returns its new `z_index`.
    pub fn bring_to_front(&mut self) -> Option<i64> {
        let id = self.editable_selection()?;
        let z = layering::bring_to_front(&self.elements, id)?;
        self.update_element(id, &ElementPatch::z_index(z)).then_some(z)
    }

    /// Lower the selected element below every other. Returns its new `z_index`.
    pub fn send_to_back(&mut self) -> Option<i64> {
        let id = self.editable_selection()?;
        let z = layering::send_to_back(&self.elements, id)?;
        self.update_element(id, &ElementPatch::z_index(z)).then_some(z)
    }

    /// Rotate the selected element by one step. Returns its new angle.
    pub fn rotate_selected(&mut self) -> Option<f32> {
        let id = self.editable_selection()?;
        let current = self.elements.iter().find(|e| e.id == id)?.transform.angle;
        let angle = layering::rotate(current);
        self.update_element(id, &ElementPatch::angle(angle))
            .then_some(angle)
    }

    /// Move the selected element by (`dx`, `dy`) base units.
    pub fn nudge_selected(&mut self, dx: f32, dy: f32) -> bool {
        let Some(id) = self.editable_selection() else {
            return false;
        };
        let Some(t) = self.elements.iter().find(|e| e.id == id).map(|e| e.transform) else {
            return false;
        };
        self.update_element(id, &ElementPatch::position(t.x + dx, t.y + dy))
    }

    /// Apply a partial update to an element.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        if !self.editable() {
            return false;
        }
        match self.store.update_element(self.slide_id, id, patch) {
            Ok(()) => {
                self.sync();
                true
            }
            Err(e) => self.store_failed("update", &e),
        }
    }

    /// Thumbnail of the slide as a PNG `data:` URI, `width` pixels wide.
    #[cfg(feature = "export")]
    pub fn thumbnail_data_uri(&mut self, width: u32) -> Option<String> {
        self.sync();
        let (base_width, base_height) = self.base_size();
        let exporter = self.exporter(width);
        exporter
            .thumbnail_data_uri(&self.elements, base_width, base_height)
            .map_err(|e| tracing::warn!("Thumbnail failed: {e}"))
            .ok()
    }

    /// Export the slide, `width` pixels wide.
    #[cfg(feature = "export")]
    pub fn export(&mut self, format: slide_renderer::ExportFormat, width: u32) -> Option<Vec<u8>> {
        self.sync();
        let (base_width, base_height) = self.base_size();
        self.exporter(width)
            .export(&self.elements, base_width, base_height, format)
            .map_err(|e| tracing::warn!("Export failed: {e}"))
            .ok()
    }

    #[cfg(feature = "export")]
    fn exporter(&self, width: u32) -> slide_renderer::SlideExporter {
        slide_renderer::SlideExporter::new(slide_renderer::ExportConfig {
            width: Some(width),
            renderer: self.config.renderer.clone(),
            ..slide_renderer::ExportConfig::default()
        })
    }

    /// Base size of the current profile, or the planner's size for the
    /// default 1280-wide slide before the first resize.
    #[cfg(feature = "export")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn base_size(&self) -> (u32, u32) {
        self.profile.map_or_else(
            || {
                let height = (1280.0 / self.planner.config().aspect_ratio).round().max(1.0);
                (1280, height as u32)
            },
            |p| (p.base_width, p.base_height),
        )
    }

    // ---- helpers ----

    fn editable(&self) -> bool {
        if !self.config.editable {
            tracing::debug!("Ignored edit on read-only canvas");
        }
        self.config.editable
    }

    fn editable_selection(&mut self) -> Option<ElementId> {
        self.sync();
        if !self.editable() {
            return None;
        }
        self.selection.selected()
    }

    fn next_z_index(&mut self) -> Option<i64> {
        self.sync();
        self.editable()
            .then(|| layering::next_z_index(&self.elements))
    }

    fn add(&mut self, element: Element) -> Option<ElementId> {
        let kind = element.kind.type_name().to_string();
        match self.store.add_element(self.slide_id, element) {
            Ok(id) => {
                tracing::debug!("Added {kind} element {id}");
                self.sync();
                self.select(Some(id));
                Some(id)
            }
            Err(e) => {
                self.store_failed("add", &e);
                None
            }
        }
    }

    fn store_failed(&self, op: &str, error: &StoreError) -> bool {
        tracing::warn!("Store {op} on slide {} failed: {error}", self.slide_id);
        false
    }
}

impl<S: SlideStore> Drop for SlideCanvas<S> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
