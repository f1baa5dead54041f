use super::{
    DEFAULT_MIN_CONFIDENCE, DecimalLatLonMatchMaker, DmsLatLonMatchMaker, LatLonColumnResults,
    LocationMatchMaker, LocationResults, MgrsMatchMaker, PositionMatchMaker,
    PotentialLocationColumn, WktMatchMaker,
};
use crate::error::SniffError;
use crate::infer::confidence::{Confidence, ValueWithConfidence};
use crate::infer::sampler::CellSampler;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::{Level, debug, event};

/// Runs every location match-maker on a sample and merges their findings.
#[derive(Clone)]
pub struct LocationDecider {
    match_makers: Vec<Arc<dyn LocationMatchMaker>>,
}

impl Default for LocationDecider {
    fn default() -> Self {
        Self::new(Confidence::new(DEFAULT_MIN_CONFIDENCE))
    }
}

impl LocationDecider {
    pub fn new(min_confidence: Confidence) -> Self {
        let match_makers: Vec<Arc<dyn LocationMatchMaker>> = vec![
            Arc::new(DecimalLatLonMatchMaker { min_confidence }),
            Arc::new(DmsLatLonMatchMaker { min_confidence }),
            Arc::new(MgrsMatchMaker { min_confidence }),
            Arc::new(PositionMatchMaker { min_confidence }),
            Arc::new(WktMatchMaker { min_confidence }),
        ];
        Self { match_makers }
    }

    pub fn match_maker_names(&self) -> Vec<&'static str> {
        self.match_makers.iter().map(|m| m.name()).collect()
    }

    pub fn decide(&self, sampler: &CellSampler) -> ValueWithConfidence<LocationResults> {
        let results = self
            .match_makers
            .iter()
            .map(|match_maker| run_match_maker(match_maker.as_ref(), sampler))
            .collect::<Vec<_>>();
        merge_results(results)
    }

    /// Same as [`LocationDecider::decide`], with one blocking task per
    /// match-maker.
    pub async fn decide_concurrently(
        &self,
        sampler: Arc<CellSampler>,
    ) -> Result<ValueWithConfidence<LocationResults>, SniffError> {
        let tasks = self.match_makers.iter().map(|match_maker| {
            let match_maker = Arc::clone(match_maker);
            let sampler = Arc::clone(&sampler);
            spawn_blocking(move || run_match_maker(match_maker.as_ref(), &sampler))
        });
        let results = futures::future::join_all(tasks)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(merge_results(results))
    }
}

fn run_match_maker(match_maker: &dyn LocationMatchMaker, sampler: &CellSampler) -> LocationResults {
    let result = match_maker.detect(sampler);
    debug!(
        "Match-maker {}: {} pairs, {} columns, confidence {}",
        match_maker.name(),
        result.value.lat_lon_pairs.len(),
        result.value.standalone_columns.len(),
        result.confidence
    );
    result.value
}

/// Merges results, keeping the most confident interpretation of every
/// latitude/longitude pair and of every standalone column. On equal
/// confidence the earlier result wins.
pub fn merge_results(
    results: impl IntoIterator<Item = LocationResults>,
) -> ValueWithConfidence<LocationResults> {
    let mut pairs: BTreeMap<(u32, u32), LatLonColumnResults> = BTreeMap::new();
    let mut columns: BTreeMap<u32, PotentialLocationColumn> = BTreeMap::new();

    for result in results {
        for pair in result.lat_lon_pairs {
            match pairs.entry(pair.column_indexes()) {
                Entry::Vacant(entry) => {
                    entry.insert(pair);
                }
                Entry::Occupied(mut entry) => {
                    if pair.confidence > entry.get().confidence {
                        entry.insert(pair);
                    }
                }
            }
        }
        for column in result.standalone_columns {
            match columns.entry(column.column_index) {
                Entry::Vacant(entry) => {
                    entry.insert(column);
                }
                Entry::Occupied(mut entry) => {
                    if column.confidence > entry.get().confidence {
                        entry.insert(column);
                    }
                }
            }
        }
    }

    let merged = LocationResults::new(
        pairs.into_values().collect(),
        columns.into_values().collect(),
    );
    event!(
        Level::DEBUG,
        "Merged {} pairs and {} columns, overall confidence {}",
        merged.lat_lon_pairs.len(),
        merged.standalone_columns.len(),
        merged.overall_confidence
    );
    merged.into_ranked()
}
