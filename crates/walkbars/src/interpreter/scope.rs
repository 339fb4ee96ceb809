//! Scoped frame acquisition.
//!
//! [`FrameScope`] borrows the evaluator, remembers every frame it pushes
//! and every boundary it marks, and undoes all of it on drop. Frames pushed
//! around a helper call therefore unwind on error returns as well as on
//! success.

use std::ops::{Deref, DerefMut};

use crate::interpreter::context::{Frame, PartialBlockFrame};
use crate::interpreter::{Evaluator, RenderError};
use crate::types::Value;

#[derive(Debug, Clone, Copy)]
enum Stack {
    Contexts,
    BlockParams,
}

/// Guard over the evaluator's frame stacks.
pub struct FrameScope<'g, 'r> {
    evaluator: &'g mut Evaluator<'r>,
    contexts: usize,
    block_params: usize,
    partial_blocks: usize,
    /// Boundary flags to put back: (stack, index, previous value).
    marks: Vec<(Stack, usize, bool)>,
    hidden: Option<PartialBlockFrame>,
}

impl Drop for FrameScope<'_, '_> {
    fn drop(&mut self) {
        let frames = &mut self.evaluator.frames;
        for &(stack, index, previous) in self.marks.iter().rev() {
            let stack = match stack {
                Stack::Contexts => &mut frames.contexts,
                Stack::BlockParams => &mut frames.block_params,
            };
            if let Some(frame) = stack.get_mut(index) {
                frame.boundary = previous;
            }
        }
        truncate_by(&mut frames.contexts, self.contexts);
        truncate_by(&mut frames.block_params, self.block_params);
        truncate_by(&mut frames.partial_blocks, self.partial_blocks);
        if let Some(hidden) = self.hidden.take() {
            frames.partial_blocks.push(hidden);
        }
    }
}

fn truncate_by<T>(stack: &mut Vec<T>, count: usize) {
    let len = stack.len().saturating_sub(count);
    stack.truncate(len);
}

impl<'r> Deref for FrameScope<'_, 'r> {
    type Target = Evaluator<'r>;

    fn deref(&self) -> &Self::Target {
        self.evaluator
    }
}

impl DerefMut for FrameScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.evaluator
    }
}

impl<'g, 'r> FrameScope<'g, 'r> {
    pub(crate) fn new(evaluator: &'g mut Evaluator<'r>) -> FrameScope<'g, 'r> {
        FrameScope {
            evaluator,
            contexts: 0,
            block_params: 0,
            partial_blocks: 0,
            marks: Vec::new(),
            hidden: None,
        }
    }

    /// Pushes a context frame. Undefined context or data become `{}`.
    pub fn push_context(&mut self, context: Value, data: Value) -> Result<(), RenderError> {
        let limit = self.evaluator.options.max_depth;
        if self.evaluator.frames.depth() >= limit {
            return Err(RenderError::MaxDepthExceeded { limit });
        }
        self.evaluator.frames.contexts.push(Frame::new(context, data));
        self.contexts += 1;
        Ok(())
    }

    pub(crate) fn push_block_params(&mut self, frame: Frame) {
        self.evaluator.frames.block_params.push(frame);
        self.block_params += 1;
    }

    pub(crate) fn push_partial_block(&mut self, frame: PartialBlockFrame) {
        self.evaluator.frames.partial_blocks.push(frame);
        self.partial_blocks += 1;
    }

    /// Marks the innermost context and block-parameter frames as boundaries
    /// until this scope ends.
    pub(crate) fn mark_boundary(&mut self) {
        let frames = &mut self.evaluator.frames;
        if let Some(index) = frames.contexts.len().checked_sub(1) {
            self.marks.push((Stack::Contexts, index, frames.contexts[index].boundary));
            frames.contexts[index].boundary = true;
        }
        if let Some(index) = frames.block_params.len().checked_sub(1) {
            self.marks.push((Stack::BlockParams, index, frames.block_params[index].boundary));
            frames.block_params[index].boundary = true;
        }
    }

    /// Removes the innermost partial-block frame until this scope ends, so
    /// `{{> @partial-block}}` inside a re-rendered body reaches the
    /// enclosing block.
    pub(crate) fn hide_partial_block(&mut self) {
        if self.partial_blocks == 0 && self.hidden.is_none() {
            self.hidden = self.evaluator.frames.partial_blocks.pop();
        }
    }
}

impl<'r> Evaluator<'r> {
    /// Opens a scope whose frames are popped when the returned guard drops.
    pub fn scope(&mut self) -> FrameScope<'_, 'r> {
        FrameScope::new(self)
    }

    /// Runs `f` inside a fresh scope.
    pub(crate) fn with_scope<T>(
        &mut self,
        f: impl FnOnce(&mut FrameScope<'_, 'r>) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        let mut scope = self.scope();
        f(&mut scope)
    }
}
