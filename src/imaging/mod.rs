//! Image processing — pure Rust, built on the `image` crate.
//!
//! | Stage | Module |
//! |---|---|
//! | **Load + normalize to RGBA8** | [`source`], [`rust_backend`] |
//! | **Content bounds** | [`bounds`] |
//! | **Per-pixel classification** | [`classify`] |
//! | **Opening / closing / hole fill** | [`morphology`] |
//! | **Alpha compositing** | [`composite`] |
//! | **Encode → PNG** | [`rust_backend`] |
//!
//! The module is split into:
//! - **Parameters**: data describing what the classifier accepts ([`params`])
//! - **Pixel stages**: pure functions over [`Mask`] and `RgbaImage`
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//!
//! The coverage check and fallback pass that tie the stages together live in
//! [`crate::process`].

pub mod backend;
pub mod bounds;
pub mod classify;
pub mod composite;
pub mod mask;
pub mod morphology;
pub mod params;
pub mod rust_backend;
pub mod source;

pub use backend::{BackendError, ImageBackend};
pub use bounds::ContentBounds;
pub use classify::classify;
pub use composite::composite;
pub use mask::Mask;
pub use morphology::refine;
pub use params::{
    Anchor, ClassificationParams, CoverageBasis, CoverageRule, InteriorReach, Method, Profile,
    RefineParams,
};
pub use rust_backend::RustBackend;
pub use source::ImageSource;
