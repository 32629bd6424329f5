//! A simulated GPU back end (§4.11, §6).
//!
//! The original engine's GPU path dispatches OpenCL kernels
//! (`examples/original_source/OpenCL`, `holefillpatchmatchopencl.cpp`)
//! against device-resident double-buffered allocations. No crate in
//! this workspace's dependency stack offers a real GPU binding without
//! fabricating one, so this module preserves the plan-queue contract
//! exactly — the tag vocabulary, the state machine, the "no consecutive
//! Blend" and "must end in Blend" rules — and executes each tag against
//! the same CPU primitives the synchronous driver uses. This is a
//! documented simulation, not a second numerical back end: see
//! DESIGN.md for the tradeoff.

use crate::color::Rgb;
use crate::cpu::HoleFillCore;
use crate::error::{HoleFillError, Result};
use crate::image::Image;

/// A queued operation, corresponding to one device kernel dispatch in
/// the original GPU driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlanStep {
    NextPyramid,
    Search,
    Propagate,
    Blend,
}

/// The queue's coarse lifecycle state. `Idle` before the first
/// `plan_step` and after every `execute_steps`; `PlanOpen` while steps
/// are being accumulated; `Executing` only for the duration of
/// `execute_steps` itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    PlanOpen,
    Executing,
}

/// The GPU-simulated plan queue. Owns a [`HoleFillCore`] standing in
/// for the device-resident buffers (§4.11 lists: original-size source
/// mask and target mask; current-level source, target, masks; the
/// double-buffered anchor-weight field; double-buffered NNF; a
/// per-pixel random-seed buffer — all of which the CPU driver already
/// owns in equivalent form).
pub struct GpuPlan {
    core: HoleFillCore,
    queue: Vec<PlanStep>,
    state: QueueState,
    first_next_pyramid_done: bool,
    inject_failure: bool,
}

impl GpuPlan {
    /// `init(target, targetMask, numPyramidLevels, patchWidth)` per §6.
    /// The hole-fill GPU driver has no separate source image parameter:
    /// the source is the target image itself, since hole filling
    /// repaints the same image it reads from (matching
    /// `HoleFillPatchMatchOpenCL::init`).
    pub fn init(target: Image<Rgb>, target_mask: Image<bool>, num_pyramid_levels: i32, patch_width: i32) -> Result<Self> {
        let mut core = HoleFillCore::new(patch_width, target.clone(), target, target_mask, num_pyramid_levels)?;
        // §4.9: the GPU back end bounds the initial hole-fill diffusion
        // to a safety limit of 100 iterations, since a device-side
        // kernel loop needs a fixed dispatch count (unlike the CPU
        // driver, which runs to convergence).
        core.set_initial_fill_max_iterations(Some(100));
        Ok(GpuPlan {
            core,
            queue: Vec::new(),
            state: QueueState::Idle,
            first_next_pyramid_done: false,
            inject_failure: false,
        })
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    /// For testing the `ResourceExhausted` path: the next `execute_steps`
    /// call fails as though a device allocation or kernel build failed,
    /// without touching the queue's step-validity rules.
    pub fn inject_resource_exhaustion_on_next_execute(&mut self) {
        self.inject_failure = true;
    }

    /// Appends `tag` to the open plan. Two consecutive `Blend` tags are
    /// rejected with `InvalidInput`, since a blend with no intervening
    /// search/propagate/pyramid-move cannot do anything the previous
    /// blend didn't already do.
    pub fn plan_step(&mut self, tag: PlanStep) -> Result<()> {
        if tag == PlanStep::Blend && self.queue.last() == Some(&PlanStep::Blend) {
            return Err(HoleFillError::invalid_input("consecutive Blend steps are not allowed"));
        }
        self.queue.push(tag);
        self.state = QueueState::PlanOpen;
        Ok(())
    }

    /// Drains the queue, dispatching each tag's equivalent CPU primitive
    /// in order, then reads back the current-level target image.
    /// `InvalidState` if the last queued tag is not `Blend`.
    pub fn execute_steps(&mut self) -> Result<Image<Rgb>> {
        if self.queue.last() != Some(&PlanStep::Blend) {
            return Err(HoleFillError::invalid_state("queued steps must end in a Blend"));
        }

        self.state = QueueState::Executing;

        if self.inject_failure {
            self.inject_failure = false;
            self.queue.clear();
            self.state = QueueState::Idle;
            return Err(HoleFillError::resource_exhausted("simulated device allocation failure"));
        }

        for tag in self.queue.drain(..) {
            match tag {
                PlanStep::NextPyramid => {
                    if !self.first_next_pyramid_done {
                        self.core.initialize();
                        self.first_next_pyramid_done = true;
                    } else {
                        self.core.move_to_next_pyramid_level();
                    }
                }
                PlanStep::Search => self.core.search(),
                PlanStep::Propagate => self.core.propagate(),
                PlanStep::Blend => {
                    self.core.blend();
                    // §4.7/§4.11: a Blend step always triggers an
                    // internal cost-recompute pass, so a later Search or
                    // Propagate in the same (or a later) plan sees
                    // accurate costs rather than stale pre-blend ones.
                    self.core.refresh_costs();
                }
            }
        }

        self.state = QueueState::Idle;
        Ok(self.core.get_target_image_pyramid_size())
    }
}
