//! Layers and the layer stack.
//!
//! An application is a stack of [`Layer`]s. Regular layers sit below
//! overlays; updates run bottom-up and events travel top-down until a layer
//! consumes them.

use std::sync::Arc;

use arcane_render::{RenderBackend, Renderer, Renderer2D, Result};
use arcane_winit::FrameTime;
use arcane_winit::event::{Event, HandleStatus};
use arcane_winit::input::InputState;

/// The renderers shared by every layer.
pub struct Graphics {
    pub backend: Arc<dyn RenderBackend>,
    pub renderer: Renderer,
    pub renderer2d: Renderer2D,
}

impl Graphics {
    pub fn new(backend: Arc<dyn RenderBackend>) -> Result<Self> {
        let renderer = Renderer::new(backend.clone());
        let renderer2d = Renderer2D::new(backend.clone())?;
        Ok(Self {
            backend,
            renderer,
            renderer2d,
        })
    }
}

/// What a layer can reach while it updates.
pub struct LayerContext<'a> {
    pub graphics: &'a mut Graphics,
    pub input: &'a InputState,
}

pub trait Layer {
    /// Name used in logs.
    fn name(&self) -> &str {
        "Layer"
    }

    /// Called once when the layer is pushed. Create GPU resources here.
    #[allow(unused_variables)]
    fn on_attach(&mut self, graphics: &mut Graphics) {}

    /// Called once when the layer is popped or the application exits.
    fn on_detach(&mut self) {}

    /// Called every frame the window is not minimized.
    #[allow(unused_variables)]
    fn on_update(&mut self, ctx: &mut LayerContext, time: &FrameTime) {}

    /// Return [`HandleStatus::consumed`] to stop the event reaching lower layers.
    #[allow(unused_variables)]
    fn on_event(&mut self, event: &Event) -> HandleStatus {
        HandleStatus::ignored()
    }
}

/// Identifies a pushed layer so it can be popped later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

struct Entry {
    id: LayerId,
    layer: Box<dyn Layer>,
}

/// Ordered layers, regular layers first and overlays after them.
#[derive(Default)]
pub struct LayerStack {
    entries: Vec<Entry>,
    insert_index: usize,
    next_id: u64,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `layer` above the other layers but below every overlay.
    pub fn push_layer(&mut self, layer: Box<dyn Layer>) -> LayerId {
        let id = self.allocate_id();
        tracing::debug!("Pushing layer '{}'", layer.name());
        self.entries.insert(self.insert_index, Entry { id, layer });
        self.insert_index += 1;
        id
    }

    /// Place `overlay` on top of everything.
    pub fn push_overlay(&mut self, overlay: Box<dyn Layer>) -> LayerId {
        let id = self.allocate_id();
        tracing::debug!("Pushing overlay '{}'", overlay.name());
        self.entries.push(Entry { id, layer: overlay });
        id
    }

    /// Remove a regular layer. Overlays are not searched.
    pub fn pop_layer(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let index = self.entries[..self.insert_index]
            .iter()
            .position(|entry| entry.id == id)?;
        self.insert_index -= 1;
        Some(self.entries.remove(index).layer)
    }

    /// Remove an overlay. Regular layers are not searched.
    pub fn pop_overlay(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let index = self.entries[self.insert_index..]
            .iter()
            .position(|entry| entry.id == id)?;
        Some(self.entries.remove(self.insert_index + index).layer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of regular layers, which all sit below the overlays.
    pub fn layer_count(&self) -> usize {
        self.insert_index
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &dyn Layer> {
        self.entries.iter().map(|entry| entry.layer.as_ref())
    }

    /// Bottom to top.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Box<dyn Layer>> {
        self.entries.iter_mut().map(|entry| &mut entry.layer)
    }

    /// Offer `event` to each layer from the top down, stopping at the first
    /// one that consumes it.
    pub fn dispatch_event(&mut self, event: &Event) -> HandleStatus {
        for layer in self.iter_mut().rev() {
            let status = layer.on_event(event);
            if status.is_consumed() {
                tracing::trace!("'{}' consumed {:?}", layer.name(), event);
                return status;
            }
        }
        HandleStatus::ignored()
    }

    /// Update every layer from the bottom up.
    pub fn update(&mut self, ctx: &mut LayerContext, time: &FrameTime) {
        for layer in self.iter_mut() {
            layer.on_update(ctx, time);
        }
    }

    /// Detach and drop every layer, top first.
    pub fn clear(&mut self) {
        while let Some(mut entry) = self.entries.pop() {
            entry.layer.on_detach();
        }
        self.insert_index = 0;
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Drop for LayerStack {
    fn drop(&mut self) {
        self.clear();
    }
}
