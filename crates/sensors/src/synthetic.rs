//! Synthetic sensor implementation
//!
//! Generates one record-shaped line per fetch with no external I/O.
//! Used for testing and demos without hardware.

use chrono::{Local, NaiveDateTime};
use contracts::{SensorKind, SensorSource, SyntheticConfig, SyntheticShape};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Station identifier stamped into generated GPS sentences
const STATION_ID: &str = "525";

/// Reference position the generated GPS fixes jitter around
const BASE_LATITUDE: f64 = 53.389080;
const BASE_LONGITUDE: f64 = -1.437518;

/// Clock used to stamp generated lines
pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send>;

/// Synthetic sensor
pub struct SyntheticSensor {
    shape: SyntheticShape,
    rng: StdRng,
    sequence: u64,
    clock: Clock,
}

impl SyntheticSensor {
    /// Create synthetic sensor stamped with local wall-clock time
    pub fn new(config: &SyntheticConfig) -> Self {
        Self::with_clock(config, Box::new(|| Local::now().naive_local()))
    }

    /// Create synthetic sensor with a custom clock
    pub fn with_clock(config: &SyntheticConfig, clock: Clock) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            shape: config.shape,
            rng,
            sequence: 0,
            clock,
        }
    }

    pub fn shape(&self) -> SyntheticShape {
        self.shape
    }

    /// `<iso-datetime>,<temperature>,<altitude>`
    fn climate_line(&mut self, now: NaiveDateTime) -> String {
        let temperature: i64 = self.rng.random_range(-40..=40);
        let altitude: i64 = self.rng.random_range(0..=30_000);
        format!(
            "{},{temperature},{altitude}",
            now.format("%Y-%m-%dT%H:%M:%S%.6f")
        )
    }

    /// `$$SIS-<id>,<seq>,<d-m-yy>,<H:MM:SS>,...`
    ///
    /// Odd sequence numbers carry a fix, even ones report no lock.
    fn gps_sentence(&mut self, now: NaiveDateTime) -> String {
        let prefix = format!(
            "$$SIS-{STATION_ID},{},{},{}",
            self.sequence,
            now.format("%-d-%-m-%y"),
            now.format("%-H:%M:%S")
        );

        if self.sequence % 2 == 0 {
            return format!("{prefix},[NO GPS LOCK AVAILABLE]");
        }

        let latitude = BASE_LATITUDE + self.rng.random_range(-0.01..0.01);
        let longitude = BASE_LONGITUDE + self.rng.random_range(-0.01..0.01);
        let satellites: u32 = self.rng.random_range(4..=12);
        let altitude: i64 = self.rng.random_range(0..=30_000);
        let checksum: u32 = self.rng.random_range(0..10_000);

        format!("{prefix},{latitude:.6},{longitude:.6},{satellites},{altitude},0*{checksum:04}")
    }
}

impl SensorSource for SyntheticSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Synthetic
    }

    fn fetch(&mut self) -> String {
        self.sequence += 1;
        let now = (self.clock)();

        let line = match self.shape {
            SyntheticShape::Climate => self.climate_line(now),
            SyntheticShape::GpsSentence => self.gps_sentence(now),
        };

        trace!(sequence = self.sequence, line = %line, "synthetic line generated");

        line + "\n"
    }
}
