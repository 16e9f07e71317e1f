use std::sync::Arc;

/// Where a texture landed in the slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotLookup {
    /// Already bound in this batch.
    Existing(u32),
    /// Took the next free slot.
    Assigned(u32),
    /// Every slot is taken. The batch must be flushed and the table reset.
    Full,
}

/// Texture units used by the current batch.
///
/// Slot 0 permanently holds the white texture. Slots `1..next` hold distinct
/// textures in the order they were first drawn.
pub(crate) struct TextureSlots<T> {
    slots: Vec<Arc<T>>,
    capacity: usize,
}

impl<T: PartialEq> TextureSlots<T> {
    pub fn new(white: Arc<T>, capacity: u32) -> Self {
        let capacity = capacity as usize;
        let mut slots = Vec::with_capacity(capacity);
        slots.push(white);
        Self { slots, capacity }
    }

    /// Find `texture` among the occupied slots, or assign it the next free one.
    pub fn lookup_or_assign(&mut self, texture: &Arc<T>) -> SlotLookup {
        if let Some(slot) = self.slots[1..]
            .iter()
            .position(|bound| Arc::ptr_eq(bound, texture) || **bound == **texture)
        {
            return SlotLookup::Existing(slot as u32 + 1);
        }

        if self.slots.len() >= self.capacity {
            return SlotLookup::Full;
        }

        self.slots.push(Arc::clone(texture));
        SlotLookup::Assigned(self.slots.len() as u32 - 1)
    }

    /// Index of the next free slot.
    pub fn next_index(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Release every slot except the white texture.
    pub fn reset(&mut self) {
        self.slots.truncate(1);
    }

    /// Occupied slots, white texture first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Arc<T>)> {
        self.slots.iter().enumerate().map(|(i, t)| (i as u32, t))
    }
}
