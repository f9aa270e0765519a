use std::{fmt, str::FromStr};

use crate::parallel::ParallelError;

/// Default edge length of a square tile in pixels.
pub const DEFAULT_TILE_SIZE: usize = 64;

/// Strategy used to distribute a range of rows (or tiles) among workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Schedule {
    /// Equal contiguous blocks (or chunk-sized blocks dealt round-robin)
    /// assigned to each worker up front.
    #[default]
    Static,

    /// Chunk-sized blocks claimed one at a time, in order, from a shared queue.
    Dynamic,

    /// Blocks proportional to the remaining work divided by the worker count,
    /// shrinking towards the chunk size, claimed from a shared queue.
    Guided,
}

impl Schedule {
    /// All the available schedules.
    pub const ALL: [Schedule; 3] = [Schedule::Static, Schedule::Dynamic, Schedule::Guided];

    /// The lowercase name of the schedule.
    pub fn as_str(&self) -> &'static str {
        match self {
            Schedule::Static => "static",
            Schedule::Dynamic => "dynamic",
            Schedule::Guided => "guided",
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Schedule {
    type Err = ParallelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Schedule::Static),
            "dynamic" => Ok(Schedule::Dynamic),
            "guided" => Ok(Schedule::Guided),
            _ => Err(ParallelError::UnknownSchedule(s.to_string())),
        }
    }
}

/// Options controlling how a filter or reduction is executed in parallel.
///
/// The configuration is passed explicitly to every parallel call; nothing is
/// stored globally.
///
/// # Example
///
/// ```
/// use parfilter_imgproc::config::{FilterConfig, Schedule};
///
/// let config = FilterConfig::new()
///     .with_num_threads(4)
///     .with_schedule(Schedule::Dynamic)
///     .with_chunk_size(8);
///
/// assert_eq!(config.num_threads, 4);
/// assert!(!config.tiled);
/// assert_eq!(config.tile_size, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FilterConfig {
    /// Number of worker threads; `0` uses the global rayon pool.
    pub num_threads: usize,
    /// How rows are distributed among workers.
    pub schedule: Schedule,
    /// Block size hint in rows (in samples for reductions); `0` selects the
    /// schedule default.
    pub chunk_size: usize,
    /// Process the output plane as square tiles instead of rows.
    pub tiled: bool,
    /// Edge length of the tiles in pixels.
    pub tile_size: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            schedule: Schedule::Static,
            chunk_size: 0,
            tiled: false,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl FilterConfig {
    /// Create a configuration with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Set the scheduling policy.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the chunk size hint.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enable tiling with the given tile edge length.
    pub fn with_tiling(mut self, tile_size: usize) -> Self {
        self.tiled = true;
        self.tile_size = tile_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_from_str() -> Result<(), ParallelError> {
        assert_eq!("static".parse::<Schedule>()?, Schedule::Static);
        assert_eq!("Dynamic".parse::<Schedule>()?, Schedule::Dynamic);
        assert_eq!("GUIDED".parse::<Schedule>()?, Schedule::Guided);
        assert_eq!(
            "auto".parse::<Schedule>(),
            Err(ParallelError::UnknownSchedule("auto".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_schedule_display_roundtrip() -> Result<(), ParallelError> {
        for schedule in Schedule::ALL {
            assert_eq!(schedule.to_string().parse::<Schedule>()?, schedule);
        }
        Ok(())
    }

    #[test]
    fn test_filter_config_default() {
        let config = FilterConfig::default();
        assert_eq!(config.num_threads, 0);
        assert_eq!(config.schedule, Schedule::Static);
        assert_eq!(config.chunk_size, 0);
        assert!(!config.tiled);
        assert_eq!(config.tile_size, DEFAULT_TILE_SIZE);
    }

    #[test]
    fn test_filter_config_with_tiling() {
        let config = FilterConfig::new().with_tiling(16);
        assert!(config.tiled);
        assert_eq!(config.tile_size, 16);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_filter_config_from_json() -> Result<(), serde_json::Error> {
        let config: FilterConfig =
            serde_json::from_str(r#"{ "num_threads": 2, "schedule": "guided" }"#)?;
        assert_eq!(config.num_threads, 2);
        assert_eq!(config.schedule, Schedule::Guided);
        assert_eq!(config.tile_size, DEFAULT_TILE_SIZE);
        Ok(())
    }
}
