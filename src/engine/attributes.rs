use crate::grammar::Symbol;

// A synthesized value attached to a matched terminal or an action result
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Attribute {
    pub value: String,
    pub ty: String,
    pub extra: String,
}

impl Attribute {
    pub fn new(value: impl Into<String>) -> Self {
        Attribute {
            value: value.into(),
            ty: String::new(),
            extra: String::new(),
        }
    }
}

// One expanded production's attribute record. The slots mirror the
// production's right-hand side one for one; `inherited` carries the value
// of the slot preceding this expansion in its parent, which is how a
// chain of operator productions passes its running result along.
#[derive(Debug)]
pub(crate) struct Frame<'g> {
    pub rhs: &'g [Symbol],
    pub inherited: Option<Attribute>,
    pub slots: Vec<Option<Attribute>>,
    dest: Option<(usize, usize)>,
    remaining: usize,
}

impl Frame<'_> {
    pub fn slot(&self, index: usize) -> Option<Attribute> {
        self.slots.get(index).cloned().flatten()
    }
}

// The attribute stack of one parse: a frame per expanded production, each
// writing its synthesized value through to the slot it grew out of.
#[derive(Debug)]
pub(crate) struct FrameStack<'g> {
    frames: Vec<Frame<'g>>,
}

impl<'g> FrameStack<'g> {
    // Frame 0 holds the single slot the start symbol grows out of
    pub fn root() -> Self {
        FrameStack {
            frames: vec![Frame {
                rhs: &[],
                inherited: None,
                slots: vec![None],
                dest: None,
                remaining: 1,
            }],
        }
    }

    pub fn frame_mut(&mut self, index: usize) -> &mut Frame<'g> {
        &mut self.frames[index]
    }

    // Opens a frame for a production expanded at `(parent, slot)`
    pub fn expand(&mut self, parent: usize, slot: usize, rhs: &'g [Symbol]) -> usize {
        let inherited = if slot > 0 {
            self.frames[parent].slot(slot - 1)
        } else {
            None
        };

        let index = self.frames.len();
        self.frames.push(Frame {
            rhs,
            inherited,
            slots: vec![None; rhs.len()],
            dest: Some((parent, slot)),
            remaining: rhs.len(),
        });

        // a production with no symbols at all is done the moment it opens
        if rhs.is_empty() {
            self.complete(index);
        }

        return index;
    }

    pub fn write(&mut self, frame: usize, slot: usize, value: Attribute) {
        self.frames[frame].slots[slot] = Some(value);
    }

    // Marks one slot of a frame as done (matched, executed, or skipped)
    pub fn finish_slot(&mut self, index: usize) {
        self.frames[index].remaining -= 1;
        if self.frames[index].remaining == 0 {
            self.complete(index);
        }
    }

    // A finished frame writes its synthesized value (the final slot when
    // written, the inherited value otherwise) into its parent slot; that
    // may in turn finish the parent, so the cascade walks upward.
    fn complete(&mut self, mut index: usize) {
        loop {
            let frame = &self.frames[index];
            let synthesized = frame
                .slots
                .last()
                .cloned()
                .flatten()
                .or_else(|| frame.inherited.clone());

            let Some((parent, slot)) = frame.dest else {
                return;
            };
            if let Some(value) = synthesized {
                self.frames[parent].slots[slot] = Some(value);
            }

            let parent_frame = &mut self.frames[parent];
            parent_frame.remaining -= 1;
            if parent_frame.remaining > 0 {
                return;
            }
            index = parent;
        }
    }

    #[cfg(test)]
    pub fn slot(&self, frame: usize, slot: usize) -> Option<Attribute> {
        self.frames[frame].slot(slot)
    }
}
