use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Politeness delay inserted between consecutive fetches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Throttle {
    #[default]
    None,
    Fixed(Duration),
    /// Uniformly random delay within `[min, max]`
    Range(Duration, Duration),
}

impl Throttle {
    /// Build from CLI-style seconds. `max` only matters when it exceeds `min`.
    ///
    /// Negative, NaN and unrepresentable values count as zero.
    pub fn from_secs(min: f64, max: Option<f64>) -> Self {
        let min = secs_to_duration(min);
        match max.map(secs_to_duration) {
            Some(max) if max > min => Throttle::Range(min, max),
            _ if min.is_zero() => Throttle::None,
            _ => Throttle::Fixed(min),
        }
    }

    pub fn next_delay(&self) -> Duration {
        match *self {
            Throttle::None => Duration::ZERO,
            Throttle::Fixed(delay) => delay,
            Throttle::Range(min, max) => {
                let millis = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
                Duration::from_millis(millis as u64)
            }
        }
    }

    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            debug!("Throttling for {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::ZERO)
}
