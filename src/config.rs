use anyhow::Result;
use serde::Deserialize;

/// Tunables for the capture subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Minimum selection width/height in viewport units. Rects at or below
    /// this threshold are geometrically valid but rejected at commit.
    pub min_selection_dim: f64,

    /// Interval of the elapsed-seconds tick in milliseconds.
    pub timer_tick_ms: u64,

    /// Interval of chunk emission in milliseconds. Small fixed slices, not
    /// once-at-end, so a crash mid-recording does not lose all data.
    pub chunk_slice_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_selection_dim: 10.0, // matches the selection overlay hint
            timer_tick_ms: 1000,     // elapsed counter ticks once per second
            chunk_slice_ms: 250,     // 4 chunk drains per second
        }
    }
}

impl CaptureConfig {
    /// Load configuration, falling back to defaults for anything the file
    /// does not set. The file itself is optional.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("min_selection_dim", 10.0)?
            .set_default("timer_tick_ms", 1000i64)?
            .set_default("chunk_slice_ms", 250i64)?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
