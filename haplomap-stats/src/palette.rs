//! Map colouring: frequency buckets and confidence-driven opacity.

/// One of the six fill colours of the heatmap, darkest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColorBucket {
    /// ≥ 70%
    VeryHigh,
    /// ≥ 50%
    High,
    /// ≥ 30%
    Moderate,
    /// ≥ 15%
    Low,
    /// ≥ 5%
    VeryLow,
    /// < 5%
    Trace,
}

/// Opacity never drops below this, however wide the interval.
pub const MIN_OPACITY: f64 = 0.3;

impl ColorBucket {
    /// All buckets, darkest (highest frequency) first. Legend order.
    pub const ALL: [ColorBucket; 6] = [
        ColorBucket::VeryHigh,
        ColorBucket::High,
        ColorBucket::Moderate,
        ColorBucket::Low,
        ColorBucket::VeryLow,
        ColorBucket::Trace,
    ];

    /// Bucket for a (shrunk) frequency. NaN falls into [`ColorBucket::Trace`].
    pub fn from_frequency(frequency: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|b| frequency >= b.lower_bound())
            .unwrap_or(ColorBucket::Trace)
    }

    /// Smallest frequency that maps to this bucket.
    pub fn lower_bound(self) -> f64 {
        match self {
            ColorBucket::VeryHigh => 0.70,
            ColorBucket::High => 0.50,
            ColorBucket::Moderate => 0.30,
            ColorBucket::Low => 0.15,
            ColorBucket::VeryLow => 0.05,
            ColorBucket::Trace => 0.0,
        }
    }

    /// Fill colour as a CSS hex string.
    pub fn hex(self) -> &'static str {
        match self {
            ColorBucket::VeryHigh => "#800026",
            ColorBucket::High => "#BD0026",
            ColorBucket::Moderate => "#E31A1C",
            ColorBucket::Low => "#FC4E2A",
            ColorBucket::VeryLow => "#FD8D3C",
            ColorBucket::Trace => "#FEB24C",
        }
    }

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            ColorBucket::VeryHigh => "≥70%",
            ColorBucket::High => "50–70%",
            ColorBucket::Moderate => "30–50%",
            ColorBucket::Low => "15–30%",
            ColorBucket::VeryLow => "5–15%",
            ColorBucket::Trace => "<5%",
        }
    }
}

/// `max(0.3, 1 − uncertainty)`; wide intervals render more transparent.
pub fn opacity(uncertainty: f64) -> f64 {
    if uncertainty.is_nan() {
        return MIN_OPACITY;
    }
    (1.0 - uncertainty).max(MIN_OPACITY)
}

/// Everything the map layer needs to fill one region.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Shading {
    pub bucket: ColorBucket,
    pub color: &'static str,
    pub opacity: f64,
}

impl Shading {
    /// Shading for a frequency and its interval width.
    pub fn new(frequency: f64, uncertainty: f64) -> Self {
        let bucket = ColorBucket::from_frequency(frequency);
        Self {
            bucket,
            color: bucket.hex(),
            opacity: opacity(uncertainty),
        }
    }
}
