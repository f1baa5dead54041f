use anyhow::Error;
use confique::Config;
use std::sync::{Arc, OnceLock};

use crate::error::SniffError;
use crate::infer::SnifferOptions;
use crate::infer::format_detector::DetectorOptions;

#[derive(Debug, Config)]
pub struct SnifferConfig {
    /// Lines read from the file to build the sample.
    #[config(env = "GEOSNIFF_SAMPLE_LINES", default = 50)]
    pub sample_lines: usize,

    /// Lines skipped at the top of the file before sampling.
    #[config(env = "GEOSNIFF_SKIP_LINES", default = 0)]
    pub skip_lines: usize,

    #[config(env = "GEOSNIFF_MAX_JUNK_LINES", default = 5)]
    pub max_junk_lines: usize,

    /// Candidate delimiters, `\t` stands for a tab.
    #[config(env = "GEOSNIFF_DELIMITERS", default = ",\t ;|")]
    pub delimiters: String,

    #[config(env = "GEOSNIFF_QUOTES", default = "\"'")]
    pub quotes: String,

    #[config(env = "GEOSNIFF_MIN_DELIMITER_SCORE", default = 0.5)]
    pub min_delimiter_score: f64,

    #[config(env = "GEOSNIFF_MIN_LOCATION_CONFIDENCE", default = 0.2)]
    pub min_location_confidence: f64,

    /// Run the location match-makers on separate tasks.
    #[config(env = "GEOSNIFF_CONCURRENT", default = false)]
    pub concurrent: bool,
}

impl SnifferConfig {
    pub fn load() -> Result<SnifferConfig, Error> {
        let c = SnifferConfig::builder()
            .env()
            .file("geosniff.toml")
            .load()?;

        Ok(c)
    }

    /// Validated detection options.
    pub fn options(&self) -> Result<SnifferOptions, SniffError> {
        let delimiters = parse_characters(&self.delimiters);
        if delimiters.is_empty() {
            return Err(SniffError::invalid_option(
                "delimiters",
                "at least one delimiter is required",
            ));
        }
        let quotes = parse_characters(&self.quotes);
        if let Some(quote) = quotes.iter().find(|quote| delimiters.contains(quote)) {
            return Err(SniffError::invalid_option(
                "quotes",
                format!("{quote:?} is also a delimiter"),
            ));
        }
        check_score("min_delimiter_score", self.min_delimiter_score)?;
        check_score("min_location_confidence", self.min_location_confidence)?;
        if self.sample_lines == 0 {
            return Err(SniffError::invalid_option(
                "sample_lines",
                "the sample must have at least one line",
            ));
        }

        Ok(SnifferOptions {
            detector: DetectorOptions {
                delimiters,
                quotes,
                max_junk_lines: self.max_junk_lines,
                min_delimiter_score: self.min_delimiter_score,
            },
            min_location_confidence: self.min_location_confidence,
        })
    }
}

/// Characters of an option, without duplicates. A literal `\t` is a tab.
fn parse_characters(value: &str) -> Vec<char> {
    let mut characters = Vec::new();
    for c in value.replace("\\t", "\t").chars() {
        if !characters.contains(&c) {
            characters.push(c);
        }
    }
    characters
}

fn check_score(name: &str, value: f64) -> Result<(), SniffError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SniffError::invalid_option(
            name,
            format!("{value} is not between 0 and 1"),
        ))
    }
}

static GEOSNIFF_CONFIG: OnceLock<Arc<SnifferConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<SnifferConfig>, Error> {
    GEOSNIFF_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    // Check if the configuration has already been loaded
    if GEOSNIFF_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = SnifferConfig::load()?;
    GEOSNIFF_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}
