//! A PatchMatch-based image hole-filling engine.
//!
//! Given a source image, a target image and a boolean mask marking the
//! "hole" to repaint, the engine builds a coarse-to-fine nearest-neighbor
//! field between target and source patches and iteratively refines it
//! (random search, propagation, blend) until the masked region is filled
//! with plausible content drawn from the rest of the image. [`cpu::HoleFillCore`]
//! drives this synchronously; [`gpu::GpuPlan`] exposes the same primitives
//! behind a queued plan-step API for a device-simulated back end.

pub mod blend;
pub mod color;
pub mod coord;
pub mod cpu;
pub mod dilate;
pub mod distance;
pub mod error;
pub mod gpu;
pub mod holefill;
pub mod image;
pub mod nnf;
pub mod parallel;
pub mod patchcost;
pub mod propagate;
pub mod pyramid;
pub mod resample;
pub mod rng;
pub mod search;
pub mod serialize;
pub mod sourcemask;
pub mod weights;

pub use self::color::Rgb;
pub use self::coord::IntCoord;
pub use self::cpu::HoleFillCore;
pub use self::error::{HoleFillError, Result};
pub use self::gpu::{GpuPlan, PlanStep};
pub use self::image::Image;
pub use self::nnf::Nnf;
pub use self::propagate::Propagation;
