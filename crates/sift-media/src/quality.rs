//! Dimension classifier: scores a `width x height` pair against the target
//! aspect-ratio catalog.

use sift_core::{AspectRatio, PipelineConfig, PixelSize, QualityAssessment, QualityTier};

/// Fraction of `min_resolution` the longer side must reach.
const SOFT_FLOOR: f64 = 0.8;

const PERFECT_BASE: u8 = 80;
const CROPPABLE_BASE: u8 = 60;
const PERFECT_PREFERRED: u8 = 100;
const CROPPABLE_PREFERRED: u8 = 85;

/// One target ratio and the tier it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub ratio: AspectRatio,
    pub tier: QualityTier,
}

#[derive(Debug, Clone)]
pub struct QualityClassifier {
    catalog: Vec<CatalogEntry>,
    min_resolution: u32,
    preferred: Vec<PixelSize>,
    tolerance: f64,
}

impl QualityClassifier {
    /// `catalog` order is the tie-break order.
    #[must_use]
    pub fn new(
        catalog: Vec<CatalogEntry>,
        min_resolution: u32,
        preferred: Vec<PixelSize>,
        tolerance: f64,
    ) -> Self {
        Self {
            catalog,
            min_resolution,
            preferred,
            tolerance,
        }
    }

    /// Perfect ratios first, then croppable ones, each in listed order.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        let ratios = &config.target_aspect_ratios;
        let catalog = ratios
            .perfect
            .iter()
            .map(|&ratio| CatalogEntry {
                ratio,
                tier: QualityTier::Perfect,
            })
            .chain(ratios.croppable.iter().map(|&ratio| CatalogEntry {
                ratio,
                tier: QualityTier::Croppable,
            }))
            .collect();

        Self::new(
            catalog,
            config.min_resolution,
            config.preferred_dimensions.clone(),
            config.aspect_tolerance,
        )
    }

    #[must_use]
    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Classify a pixel size.
    ///
    /// Every catalog ratio within tolerance of `width / height` is scored;
    /// the highest score wins and ties keep the earlier catalog entry.
    /// Zero dimensions, a longer side below 80% of the floor, or no ratio
    /// within tolerance yield a rejected assessment.
    ///
    /// Preferred exact sizes take a fixed score, so a larger non-preferred
    /// size of the same ratio can score lower than a preferred one.
    #[must_use]
    pub fn classify(&self, width: u32, height: u32) -> QualityAssessment {
        if width == 0 || height == 0 {
            return QualityAssessment::rejected(width, height);
        }

        let long_side = width.max(height);
        if f64::from(long_side) < f64::from(self.min_resolution) * SOFT_FLOOR {
            return QualityAssessment::rejected(width, height);
        }

        let ratio = f64::from(width) / f64::from(height);
        let mut best: Option<(CatalogEntry, u8)> = None;

        for entry in &self.catalog {
            if (ratio - entry.ratio.decimal()).abs() > self.tolerance {
                continue;
            }
            let score = self.score(*entry, width, height);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((*entry, score));
            }
        }

        match best {
            Some((entry, score)) => QualityAssessment {
                width,
                height,
                matched_ratio: Some(entry.ratio),
                tier: entry.tier,
                score,
            },
            None => QualityAssessment::rejected(width, height),
        }
    }

    fn score(&self, entry: CatalogEntry, width: u32, height: u32) -> u8 {
        let preferred = self
            .preferred
            .iter()
            .any(|p| p.matches_either_way(width, height));

        match (entry.tier, preferred) {
            (QualityTier::Perfect, true) => PERFECT_PREFERRED,
            (QualityTier::Croppable, true) => CROPPABLE_PREFERRED,
            (QualityTier::Perfect, false) => {
                PERFECT_BASE.saturating_add(resolution_bonus(width, height)).min(100)
            }
            (QualityTier::Croppable, false) => {
                CROPPABLE_BASE.saturating_add(resolution_bonus(width, height)).min(100)
            }
            (QualityTier::Rejected, _) => 0,
        }
    }
}

impl Default for QualityClassifier {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

fn resolution_bonus(width: u32, height: u32) -> u8 {
    let short_side = width.min(height);
    let long_side = width.max(height);

    let short_bonus = if short_side >= 1080 {
        15
    } else if short_side >= 720 {
        10
    } else {
        0
    };
    let long_bonus = if long_side >= 1920 {
        5
    } else if long_side >= 1440 {
        3
    } else {
        0
    };

    short_bonus + long_bonus
}
