//! Parameter types for the extraction pipeline.
//!
//! These structs describe *what* the pipeline should accept, not *how* it
//! evaluates pixels. The classifier, refiner, and coverage check read them;
//! [`crate::config`] loads and validates them from `cutout.toml`.
//!
//! ## Types
//!
//! - [`ClassificationParams`] — per-pixel acceptance thresholds. Four presets:
//!   [`strict`](ClassificationParams::strict), [`relaxed`](ClassificationParams::relaxed),
//!   [`basic`](ClassificationParams::basic), [`basic_relaxed`](ClassificationParams::basic_relaxed).
//! - [`RefineParams`] — structuring-element sizes for opening and closing.
//! - [`CoverageRule`] — when a mask counts as under-covered.
//! - [`Profile`] — primary params, fallback params, refine and coverage rules together.
//! - [`Method`] — selects the `advanced` or `basic` profile.

use serde::{Deserialize, Serialize};

/// Which centroid and radius the proximity test measures against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Bounding box of the opaque pixels.
    Content,
    /// Canvas center with radius `min(h, w) / 3`.
    Canvas,
}

/// How far from the centroid a non-edge pixel may sit and still be accepted
/// without any other evidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteriorReach {
    /// No interior tier.
    Off,
    /// Accept non-edge pixels closer than `radius × multiplier`.
    Within(f64),
    /// Accept every non-edge pixel.
    Anywhere,
}

impl InteriorReach {
    pub fn admits(self, distance: f64, radius: f64) -> bool {
        match self {
            InteriorReach::Off => false,
            InteriorReach::Within(multiplier) => distance < radius * multiplier,
            InteriorReach::Anywhere => true,
        }
    }
}

/// Thresholds for one classification pass.
///
/// A pixel is subject when it is opaque, not whitish, passes the texture floor
/// (if any), and is either inside the core radius, saturated off the edge
/// band, or admitted by the interior reach off the edge band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationParams {
    /// A pixel with every channel above this value is whitish.
    pub white_cutoff: u8,
    /// A pixel whose mean channel value exceeds this is whitish too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_mean_cutoff: Option<f64>,
    /// Minimum local color variance (11×11 window) for a subject pixel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_texture_variance: Option<f64>,
    /// `(max − min) / max` above which a pixel counts as colorful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation_cutoff: Option<f64>,
    /// Fraction of width/height treated as the border band on each side.
    pub edge_band: f64,
    /// Pixels closer than `radius × core_radius` are accepted anywhere.
    pub core_radius: f64,
    pub interior: InteriorReach,
    pub anchor: Anchor,
}

impl ClassificationParams {
    /// The advanced heuristic: strict whiteness, saturation and two distance tiers.
    pub fn strict() -> Self {
        Self {
            white_cutoff: 240,
            light_mean_cutoff: Some(235.0),
            min_texture_variance: None,
            saturation_cutoff: Some(0.15),
            edge_band: 0.05,
            core_radius: 1.2,
            interior: InteriorReach::Within(1.5),
            anchor: Anchor::Content,
        }
    }

    /// Fallback for [`strict`](Self::strict): anything non-white that is near
    /// the subject or off the edge band.
    pub fn relaxed() -> Self {
        Self {
            white_cutoff: 240,
            light_mean_cutoff: None,
            min_texture_variance: None,
            saturation_cutoff: None,
            edge_band: 0.05,
            core_radius: 1.5,
            interior: InteriorReach::Anywhere,
            anchor: Anchor::Content,
        }
    }

    /// The basic heuristic: textured, non-white, near the canvas center.
    pub fn basic() -> Self {
        Self {
            white_cutoff: 220,
            light_mean_cutoff: None,
            min_texture_variance: Some(100.0),
            saturation_cutoff: None,
            edge_band: 0.05,
            core_radius: 1.5,
            interior: InteriorReach::Off,
            anchor: Anchor::Canvas,
        }
    }

    /// Fallback for [`basic`](Self::basic): drops the texture floor, widens the radius.
    pub fn basic_relaxed() -> Self {
        Self {
            white_cutoff: 220,
            light_mean_cutoff: None,
            min_texture_variance: None,
            saturation_cutoff: None,
            edge_band: 0.05,
            core_radius: 2.0,
            interior: InteriorReach::Off,
            anchor: Anchor::Canvas,
        }
    }
}

impl Default for ClassificationParams {
    fn default() -> Self {
        Self::strict()
    }
}

/// Structuring-element sizes (square, `k × k`) for mask cleanup.
///
/// A size of 0 or 1 skips that step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefineParams {
    pub open: u32,
    pub close: u32,
    pub fill_holes: bool,
}

impl RefineParams {
    pub fn advanced() -> Self {
        Self {
            open: 2,
            close: 3,
            fill_holes: true,
        }
    }

    pub fn basic() -> Self {
        Self {
            open: 3,
            close: 5,
            fill_holes: true,
        }
    }
}

/// Denominator of the coverage ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageBasis {
    /// Fraction of the originally opaque pixels.
    Opaque,
    /// Fraction of the whole canvas.
    Canvas,
}

/// A mask covering less than `min_ratio` of the basis is under-covered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageRule {
    pub min_ratio: f64,
    pub basis: CoverageBasis,
}

impl CoverageRule {
    /// Coverage of `subject_pixels` given the opaque count and canvas area.
    pub fn ratio(&self, subject_pixels: usize, opaque_pixels: usize, area: usize) -> f64 {
        let denominator = match self.basis {
            CoverageBasis::Opaque => opaque_pixels,
            CoverageBasis::Canvas => area,
        };
        if denominator == 0 {
            0.0
        } else {
            subject_pixels as f64 / denominator as f64
        }
    }

    pub fn is_undercovered(&self, subject_pixels: usize, opaque_pixels: usize, area: usize) -> bool {
        self.ratio(subject_pixels, opaque_pixels, area) < self.min_ratio
    }
}

/// Everything one extraction method needs: two passes' worth of thresholds,
/// the cleanup sizes, and the rule that decides whether the second pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub primary: ClassificationParams,
    pub fallback: ClassificationParams,
    pub refine: RefineParams,
    pub coverage: CoverageRule,
}

impl Profile {
    pub fn advanced() -> Self {
        Self {
            primary: ClassificationParams::strict(),
            fallback: ClassificationParams::relaxed(),
            refine: RefineParams::advanced(),
            coverage: CoverageRule {
                min_ratio: 0.3,
                basis: CoverageBasis::Opaque,
            },
        }
    }

    pub fn basic() -> Self {
        Self {
            primary: ClassificationParams::basic(),
            fallback: ClassificationParams::basic_relaxed(),
            refine: RefineParams::basic(),
            coverage: CoverageRule {
                min_ratio: 0.1,
                basis: CoverageBasis::Canvas,
            },
        }
    }
}

/// Extraction method selector.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    #[default]
    Advanced,
    Basic,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Advanced => f.write_str("advanced"),
            Method::Basic => f.write_str("basic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_reach_tiers() {
        assert!(!InteriorReach::Off.admits(0.0, 10.0));
        assert!(InteriorReach::Within(1.5).admits(14.9, 10.0));
        assert!(!InteriorReach::Within(1.5).admits(15.0, 10.0));
        assert!(InteriorReach::Anywhere.admits(1e9, 1.0));
    }

    #[test]
    fn coverage_ratio_by_basis() {
        let opaque_rule = CoverageRule {
            min_ratio: 0.3,
            basis: CoverageBasis::Opaque,
        };
        assert_eq!(opaque_rule.ratio(30, 60, 100), 0.5);
        assert!(!opaque_rule.is_undercovered(30, 60, 100));
        assert!(opaque_rule.is_undercovered(17, 60, 100));

        let canvas_rule = CoverageRule {
            min_ratio: 0.1,
            basis: CoverageBasis::Canvas,
        };
        assert_eq!(canvas_rule.ratio(30, 60, 100), 0.3);
        assert!(canvas_rule.is_undercovered(9, 60, 100));
    }

    #[test]
    fn coverage_of_empty_basis_is_zero() {
        let rule = Profile::advanced().coverage;
        assert_eq!(rule.ratio(0, 0, 0), 0.0);
        assert!(rule.is_undercovered(0, 0, 0));
    }

    #[test]
    fn presets_match_tuned_values() {
        let strict = ClassificationParams::strict();
        assert_eq!(strict.white_cutoff, 240);
        assert_eq!(strict.saturation_cutoff, Some(0.15));
        assert_eq!(strict.interior, InteriorReach::Within(1.5));

        let basic = ClassificationParams::basic();
        assert_eq!(basic.white_cutoff, 220);
        assert_eq!(basic.min_texture_variance, Some(100.0));
        assert_eq!(basic.anchor, Anchor::Canvas);
    }

    #[test]
    fn profiles_pair_presets() {
        let advanced = Profile::advanced();
        assert_eq!(advanced.fallback, ClassificationParams::relaxed());
        assert_eq!(advanced.refine, RefineParams::advanced());

        let basic = Profile::basic();
        assert_eq!(basic.fallback, ClassificationParams::basic_relaxed());
        assert_eq!(basic.coverage.basis, CoverageBasis::Canvas);
    }
}
