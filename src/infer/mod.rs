//! Guesses how a tabular text file is laid out and where its locations are.
//!
//! The pipeline is strictly ordered: geometry literals are neutralized, the
//! structural format is detected, the sample is split into cells and the
//! location match-makers run on those cells.

use serde::Serialize;
use std::sync::Arc;
use tracing::{Level, event};

use self::confidence::{Confidence, ValueWithConfidence};
use self::format::StructuralFormat;
use self::format_detector::DetectorOptions;
use self::geo::{LocationDecider, LocationResults};
use self::sample::Sample;
use self::sampler::CellSampler;
use crate::error::SniffError;

pub mod confidence;
pub mod format;
pub mod format_detector;
pub mod geo;
pub mod is_header;
pub mod neutralize;
pub mod parsing;
pub mod sample;
pub mod sampler;

#[derive(Debug, Clone, PartialEq)]
pub struct SnifferOptions {
    pub detector: DetectorOptions,
    /// Location candidates below this confidence are not reported.
    pub min_location_confidence: f64,
}

impl Default for SnifferOptions {
    fn default() -> Self {
        Self {
            detector: DetectorOptions::default(),
            min_location_confidence: geo::DEFAULT_MIN_CONFIDENCE,
        }
    }
}

/// Everything the sniffer found in a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub format: ValueWithConfidence<StructuralFormat>,
    pub locations: ValueWithConfidence<LocationResults>,
}

fn prepare(
    sample: &Sample,
    options: &SnifferOptions,
) -> (ValueWithConfidence<StructuralFormat>, CellSampler, LocationDecider) {
    let format = format_detector::detect_with(sample, &options.detector);
    let sampler =
        CellSampler::with_max_junk_lines(sample, &format.value, options.detector.max_junk_lines);
    let decider = LocationDecider::new(Confidence::new(options.min_location_confidence));
    (format, sampler, decider)
}

/// Detects the structural format of a sample, then its location columns.
pub fn sniff(sample: &Sample, options: &SnifferOptions) -> Detection {
    let (format, sampler, decider) = prepare(sample, options);
    let locations = decider.decide(&sampler);
    event!(
        Level::DEBUG,
        "Sniffed {} lines: format confidence {}, location confidence {}",
        sample.len(),
        format.confidence,
        locations.confidence
    );
    Detection { format, locations }
}

/// Same as [`sniff`], running the location match-makers concurrently.
pub async fn sniff_concurrently(
    sample: &Sample,
    options: &SnifferOptions,
) -> Result<Detection, SniffError> {
    let (format, sampler, decider) = prepare(sample, options);
    let locations = decider.decide_concurrently(Arc::new(sampler)).await?;
    event!(
        Level::DEBUG,
        "Sniffed {} lines concurrently: format confidence {}, location confidence {}",
        sample.len(),
        format.confidence,
        locations.confidence
    );
    Ok(Detection { format, locations })
}
