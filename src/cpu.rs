use crate::blend;
use crate::color::Rgb;
use crate::coord::IntCoord;
use crate::error::{HoleFillError, Result};
use crate::holefill;
use crate::image::Image;
use crate::nnf::{self, Nnf};
use crate::patchcost::patch_cost;
use crate::propagate::{self, Propagation};
use crate::pyramid::{self, patch_width_valid};
use crate::resample;
use crate::rng::DEFAULT_SEED;
use crate::search;
use crate::sourcemask;
use crate::weights::anchor_weight_field;

/// The level-dependent working set: everything that gets rebuilt (or
/// upsampled) on every `moveToNextPyramidLevel`. `None` until the first
/// primitive call forces lazy initialization, mirroring the teacher's
/// `_initialized` guard in `PatchMatch::Implementation`.
struct LevelState {
    source_pyramid_size: Image<Rgb>,
    target_pyramid_size: Image<Rgb>,
    target_mask_pyramid_size: Image<bool>,
    source_mask_pyramid_size: Image<bool>,
    anchor_weights_pyramid_size: Image<f64>,
    nnf: Nnf,
}

/// The CPU back end of the hole-filling engine (§4.10, §6): a
/// one-step-at-a-time driver over a coarse-to-fine image pyramid,
/// exposing `search`/`propagate`/`blend` as primitives plus
/// `moveToNextPyramidLevel` so a caller can step interactively or run
/// the recommended automatic schedule.
pub struct HoleFillCore {
    patch_width: i32,
    num_pyramid_levels: i32,
    pyramid_level: i32,
    initialized: bool,
    propagation: Propagation,
    initial_fill_max_iterations: Option<u32>,

    target_original: Image<Rgb>,
    source_original: Image<Rgb>,
    target_mask_original: Image<bool>,

    level: Option<LevelState>,
}

impl HoleFillCore {
    /// Constructs the engine at the coarsest pyramid level (not yet
    /// materialized; the first primitive call triggers that). Fails with
    /// `InvalidInput` if `patch_width` is not an odd integer in `[3, 50]`,
    /// if any image dimension is smaller than `patch_width`, if
    /// `target_image` and `target_mask` differ in size, or if
    /// `num_pyramid_levels < 1`.
    pub fn new(
        patch_width: i32,
        source_image: Image<Rgb>,
        target_image: Image<Rgb>,
        target_mask: Image<bool>,
        num_pyramid_levels: i32,
    ) -> Result<Self> {
        if !patch_width_valid(patch_width) {
            return Err(HoleFillError::invalid_input("patch width must be an odd integer in [3, 50]"));
        }
        if target_image.width() < patch_width
            || target_image.height() < patch_width
            || source_image.width() < patch_width
            || source_image.height() < patch_width
        {
            return Err(HoleFillError::invalid_input("source and/or target image too small for the given patch width"));
        }
        if target_image.width() != target_mask.width() || target_image.height() != target_mask.height() {
            return Err(HoleFillError::invalid_input("targetMask and targetImage must have the same size"));
        }
        if num_pyramid_levels < 1 {
            return Err(HoleFillError::invalid_input("numPyramidLevels must be >= 1"));
        }

        Ok(HoleFillCore {
            patch_width,
            num_pyramid_levels,
            pyramid_level: num_pyramid_levels - 1,
            initialized: false,
            propagation: Propagation::default(),
            initial_fill_max_iterations: None,
            target_original: target_image,
            source_original: source_image,
            target_mask_original: target_mask,
            level: None,
        })
    }

    pub fn patch_width(&self) -> i32 {
        self.patch_width
    }

    /// Does not force initialization: mirrors the teacher's `const`
    /// accessor, which simply reads the level set at construction time.
    pub fn current_pyramid_level(&self) -> i32 {
        self.pyramid_level
    }

    pub fn set_propagation_scheme(&mut self, scheme: Propagation) {
        self.propagation = scheme;
    }

    /// Bounds the initial hole-fill diffusion (§4.9) to at most `max`
    /// iterations instead of running to convergence. The synchronous CPU
    /// driver runs unbounded (`None`) by default; the GPU-simulated
    /// driver sets this to `Some(100)`, matching the spec's "safety
    /// bound of 100 iterations on the GPU back end" (a device-side
    /// kernel loop needs a fixed dispatch count). Has no effect once the
    /// coarsest level has already been initialized.
    pub fn set_initial_fill_max_iterations(&mut self, max: Option<u32>) {
        self.initial_fill_max_iterations = max;
    }

    /// Improves the NNF via exponentially-shrinking random search (§4.5).
    pub fn search(&mut self) {
        self.ensure_initialized();
        let patch_width = self.patch_width;
        let state = self.level.as_mut().expect("initialized above");
        let LevelState {
            ref mut nnf,
            ref target_mask_pyramid_size,
            ref source_mask_pyramid_size,
            ref source_pyramid_size,
            ref target_pyramid_size,
            ref anchor_weights_pyramid_size,
        } = *state;
        search::search(
            nnf,
            target_mask_pyramid_size,
            source_mask_pyramid_size,
            source_pyramid_size,
            target_pyramid_size,
            anchor_weights_pyramid_size,
            patch_width,
            DEFAULT_SEED,
        );
    }

    /// Improves the NNF by propagating matches between neighbors, using
    /// whichever scheme [`set_propagation_scheme`] last selected (§4.6).
    pub fn propagate(&mut self) {
        self.ensure_initialized();
        let patch_width = self.patch_width;
        let scheme = self.propagation;
        let state = self.level.as_mut().expect("initialized above");
        let LevelState {
            ref mut nnf,
            ref target_mask_pyramid_size,
            ref source_mask_pyramid_size,
            ref source_pyramid_size,
            ref target_pyramid_size,
            ref anchor_weights_pyramid_size,
        } = *state;
        propagate::propagate(
            nnf,
            target_mask_pyramid_size,
            source_mask_pyramid_size,
            source_pyramid_size,
            target_pyramid_size,
            anchor_weights_pyramid_size,
            patch_width,
            scheme,
        );
    }

    /// Recomposes the current-level target image from the NNF (§4.7).
    pub fn blend(&mut self) {
        self.ensure_initialized();
        let patch_width = self.patch_width;
        let state = self.level.as_mut().expect("initialized above");
        let new_target = blend::blend(
            &state.nnf,
            &state.target_mask_pyramid_size,
            &state.source_mask_pyramid_size,
            &state.source_pyramid_size,
            &state.target_pyramid_size,
            &state.anchor_weights_pyramid_size,
            patch_width,
        );
        state.target_pyramid_size = new_target;
    }

    /// If already at level 0, a no-op returning 0. Otherwise advances one
    /// level finer, rebuilding every level-dependent buffer, and returns
    /// the new level.
    pub fn move_to_next_pyramid_level(&mut self) -> i32 {
        self.ensure_initialized();
        self.setup_next_pyramid_level();
        self.pyramid_level
    }

    pub fn get_target_image_pyramid_size(&mut self) -> Image<Rgb> {
        self.ensure_initialized();
        self.level.as_ref().expect("initialized above").target_pyramid_size.clone()
    }

    pub fn get_source_image_pyramid_size(&mut self) -> Image<Rgb> {
        self.ensure_initialized();
        self.level.as_ref().expect("initialized above").source_pyramid_size.clone()
    }

    /// Runs the recommended automatic-fill schedule (§6): 8 rounds of
    /// 5×(search, propagate)+blend at the coarsest level, then 4 rounds
    /// of 3×(search, propagate)+blend at every subsequently finer level
    /// down to and including level 0.
    pub fn run_automatic_schedule(&mut self) {
        self.ensure_initialized();
        self.run_rounds(8, 5);
        while self.current_pyramid_level() != 0 {
            self.move_to_next_pyramid_level();
            self.run_rounds(4, 3);
        }
    }

    fn run_rounds(&mut self, rounds: u32, pairs_per_round: u32) {
        for _ in 0..rounds {
            for _ in 0..pairs_per_round {
                self.search();
                self.propagate();
            }
            self.blend();
        }
    }

    /// Forces lazy initialization (creating the coarsest pyramid level's
    /// buffers and running the initial diffusion fill) without running
    /// any primitive. Exposed for collaborators, such as the simulated
    /// GPU plan queue, that need to distinguish "first NextPyramid tag"
    /// from "advance one level" without tripping the CPU driver's
    /// ensure-then-advance double-step (see [`Self::move_to_next_pyramid_level`]).
    pub fn initialize(&mut self) {
        self.ensure_initialized();
    }

    fn ensure_initialized(&mut self) {
        if !self.initialized {
            self.setup_next_pyramid_level();
            self.initialized = true;
        }
    }

    /// Rebuilds every level-dependent buffer for `self.pyramid_level`
    /// (set by the caller prior to this call), grounded directly on
    /// `PatchMatch::Implementation::setUpNextPyramidLevel`.
    fn setup_next_pyramid_level(&mut self) {
        if self.initialized {
            if self.pyramid_level == 0 {
                return;
            }
            self.pyramid_level -= 1;
        } else {
            self.pyramid_level = self.num_pyramid_levels - 1;
        }

        let (target_size, source_size) = pyramid::pyramid_level_sizes(
            self.pyramid_level,
            self.num_pyramid_levels,
            self.patch_width,
            self.target_original.size(),
            self.source_original.size(),
        )
        .expect("dimensions validated at construction");

        tracing::trace!(
            target: "holefill.cpu",
            level = self.pyramid_level,
            target_w = target_size.x(),
            target_h = target_size.y(),
            "pyramid_level_setup"
        );

        let source_pyramid_size = resample::downsample(&self.source_original, source_size);
        let target_mask_pyramid_size = resample::downsample_boolean(&self.target_mask_original, target_size, true);
        let anchor_weights_pyramid_size = anchor_weight_field(&target_mask_pyramid_size, self.patch_width);
        let source_mask_pyramid_size = sourcemask::source_mask(&target_mask_pyramid_size, self.patch_width)
            .expect("patch-width structuring element is always odd-dimensioned");

        match self.level.take() {
            None => {
                let downsampled_target = resample::downsample(&self.target_original, target_size);
                let target_pyramid_size = holefill::initial_fill(
                    &downsampled_target,
                    &target_mask_pyramid_size,
                    self.initial_fill_max_iterations,
                );

                let mut nnf = Nnf::init(target_size.x(), target_size.y());
                nnf::initial_random_fill(
                    &mut nnf,
                    &target_mask_pyramid_size,
                    &source_mask_pyramid_size,
                    &source_pyramid_size,
                    &target_pyramid_size,
                    &anchor_weights_pyramid_size,
                    self.patch_width,
                    DEFAULT_SEED,
                );

                self.level = Some(LevelState {
                    source_pyramid_size,
                    target_pyramid_size,
                    target_mask_pyramid_size,
                    source_mask_pyramid_size,
                    anchor_weights_pyramid_size,
                    nnf,
                });
            }
            Some(prev) => {
                let prev_source_size = prev.source_pyramid_size.size();
                let next_nnf = nnf::upsample(
                    &prev.nnf,
                    &prev.target_mask_pyramid_size,
                    prev_source_size,
                    &target_mask_pyramid_size,
                    &source_mask_pyramid_size,
                    target_size,
                    source_size,
                    self.patch_width,
                    DEFAULT_SEED,
                );

                // Masked-out pixels must have sensible color before the
                // re-blend below; for hole filling, source and target
                // share the same spatial domain, so the source image at
                // this level is the natural stand-in (matching
                // `HoleFillPatchMatch::initMaskedOutPartsOfTargetPyramidSize`).
                let mut target_pyramid_size = Image::new(target_size.x(), target_size.y(), Rgb::BLACK);
                if source_size == target_size {
                    for (coord, &color) in source_pyramid_size.iter_coords() {
                        target_pyramid_size.set(coord, color);
                    }
                }

                self.level = Some(LevelState {
                    source_pyramid_size,
                    target_pyramid_size,
                    target_mask_pyramid_size,
                    source_mask_pyramid_size,
                    anchor_weights_pyramid_size,
                    nnf: next_nnf,
                });

                self.blend();
                self.refresh_costs();
            }
        }
    }

    /// Recomputes real patch costs across the NNF against the current
    /// target image. Called internally after an upsample (whose entries
    /// all carry the `+inf` sentinel until the finer target image
    /// exists, built immediately above by `blend`); also exposed so the
    /// GPU-simulated plan queue can run it after every `Blend` step
    /// (§4.7, §4.11: "a Blend step is always followed by an internal
    /// cost-recompute pass so that subsequent Search and Propagate steps
    /// see accurate costs"), since the CPU driver otherwise only
    /// refreshes costs on pyramid-level advance.
    pub fn refresh_costs(&mut self) {
        let patch_width = self.patch_width;
        let half = patch_width / 2;
        let state = self.level.as_mut().expect("initialized above");
        let width = state.target_pyramid_size.width();
        let height = state.target_pyramid_size.height();

        for y in half..(height - half) {
            for x in half..(width - half) {
                let t = IntCoord::new(x, y);
                if !*state.target_mask_pyramid_size.get(t) {
                    continue;
                }
                let s = state.nnf.get_source(t);
                let cost = patch_cost(
                    s,
                    t,
                    patch_width,
                    &state.source_pyramid_size,
                    &state.target_pyramid_size,
                    &state.anchor_weights_pyramid_size,
                    f64::MAX,
                );
                state.nnf.set(t, s, cost);
            }
        }
    }
}
