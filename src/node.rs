//! # Playback node
//!
//! Drives a [`TrajectoryPlayer`] from a periodic timer. The first tick fires one period after
//! [`PlaybackNode::spin`] starts, then every `1 / publish_freq` seconds until the last row has
//! been emitted or the shutdown future resolves.
//!
//! Ticks are serialized: a slow publisher delays the following ticks
//! ([`MissedTickBehavior::Delay`]) instead of bursting to catch up.
use std::{future::Future, time::Duration};

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::{
    gal_orbits_errors::GalOrbitsError,
    player::{TickOutcome, TrajectoryPlayer},
    publisher::Publisher,
};

/// How [`PlaybackNode::spin`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every row of the table was emitted
    Completed { emitted: usize },
    /// The shutdown future resolved first
    Cancelled { emitted: usize },
}

impl PlaybackOutcome {
    pub fn emitted(&self) -> usize {
        match self {
            PlaybackOutcome::Completed { emitted } | PlaybackOutcome::Cancelled { emitted } => {
                *emitted
            }
        }
    }
}

pub struct PlaybackNode {
    player: TrajectoryPlayer,
    publisher: Box<dyn Publisher + Send>,
    period: Duration,
}

impl PlaybackNode {
    /// Build a node publishing at `publish_freq` Hz.
    ///
    /// Errors
    /// ------
    /// * [`GalOrbitsError::InvalidConfig`] if `publish_freq` is not a positive finite number or
    ///   its period is not representable.
    pub fn new(
        player: TrajectoryPlayer,
        publisher: Box<dyn Publisher + Send>,
        publish_freq: f64,
    ) -> Result<Self, GalOrbitsError> {
        if !(publish_freq.is_finite() && publish_freq > 0.0) {
            return Err(GalOrbitsError::InvalidConfig(format!(
                "publish_freq must be positive, got {publish_freq}"
            )));
        }
        let period = Duration::try_from_secs_f64(1.0 / publish_freq).map_err(|e| {
            GalOrbitsError::InvalidConfig(format!("publish_freq {publish_freq}: {e}"))
        })?;
        if period.is_zero() {
            return Err(GalOrbitsError::InvalidConfig(format!(
                "publish_freq {publish_freq} is too high"
            )));
        }

        Ok(PlaybackNode {
            player,
            publisher,
            period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn player(&self) -> &TrajectoryPlayer {
        &self.player
    }

    /// Run the timer loop until completion or until `shutdown` resolves.
    ///
    /// An already finished player (empty table) completes immediately without waiting for a
    /// tick. A tick error (transport failure) stops the loop and is returned.
    pub async fn spin<F>(mut self, shutdown: F) -> Result<PlaybackOutcome, GalOrbitsError>
    where
        F: Future<Output = ()>,
    {
        if self.player.is_done() {
            return Ok(PlaybackOutcome::Completed { emitted: 0 });
        }

        info!(
            topic = self.publisher.topic(),
            rows = self.player.len(),
            period_ms = self.period.as_secs_f64() * 1e3,
            "starting playback"
        );

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    let emitted = self.player.cursor();
                    debug!(emitted, "playback interrupted");
                    return Ok(PlaybackOutcome::Cancelled { emitted });
                }
                _ = ticker.tick() => {
                    let outcome = self.player.tick(self.publisher.as_mut())?;
                    if let TickOutcome::Completed { index } = outcome {
                        return Ok(PlaybackOutcome::Completed { emitted: index + 1 });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod node_test {
    use std::future::pending;

    use tokio::time::sleep;

    use super::*;
    use crate::{
        publisher::{ChannelPublisher, Float64MultiArray},
        trajectories::{TimeDirection, TrajectoryRow, TrajectoryTable},
    };

    fn player(n: usize) -> TrajectoryPlayer {
        let rows = (0..n)
            .map(|i| {
                let t = i as f64 * 0.5;
                TrajectoryRow::from([t, 8.0, 0.0, 0.0, 230.0, 0.0, 0.0, -1e5, 1886.0, 8.2, 0.0])
            })
            .collect();
        TrajectoryPlayer::new(TrajectoryTable::new(rows, TimeDirection::Forward).unwrap())
    }

    #[test]
    fn test_invalid_frequency() {
        let (publisher, _rx) = ChannelPublisher::channel("/t");
        for freq in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let res = PlaybackNode::new(player(1), Box::new(publisher.clone()), freq);
            assert!(matches!(res, Err(GalOrbitsError::InvalidConfig(_))), "{freq}");
        }
        let node = PlaybackNode::new(player(1), Box::new(publisher), 4.0).unwrap();
        assert_eq!(node.period(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rows_emitted_at_cadence() {
        let (publisher, mut rx) = ChannelPublisher::channel("/gal_orbits");
        let node = PlaybackNode::new(player(3), Box::new(publisher), 10.0).unwrap();

        let start = Instant::now();
        let receiver = tokio::spawn(async move {
            let mut arrivals = Vec::new();
            while let Some(msg) = rx.recv().await {
                arrivals.push((start.elapsed(), msg));
            }
            arrivals
        });

        let outcome = node.spin(pending()).await.unwrap();
        assert_eq!(outcome, PlaybackOutcome::Completed { emitted: 3 });
        assert_eq!(start.elapsed(), Duration::from_millis(300));

        let arrivals = receiver.await.unwrap();
        let times: Vec<Duration> = arrivals.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            times,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300)
            ]
        );
        let first: &Float64MultiArray = &arrivals[0].1;
        assert_eq!(first.data.len(), 11);
        assert_eq!(first.data[0], 0.0);
        assert_eq!(arrivals[2].1.data[0], 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_table_completes_immediately() {
        let (publisher, mut rx) = ChannelPublisher::channel("/gal_orbits");
        let empty = TrajectoryPlayer::new(TrajectoryTable::empty(TimeDirection::Backward));
        let node = PlaybackNode::new(empty, Box::new(publisher), 10.0).unwrap();

        let start = Instant::now();
        let outcome = node.spin(pending()).await.unwrap();
        assert_eq!(outcome, PlaybackOutcome::Completed { emitted: 0 });
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_playback() {
        let (publisher, mut rx) = ChannelPublisher::channel("/gal_orbits");
        let node = PlaybackNode::new(player(10), Box::new(publisher), 10.0).unwrap();

        let outcome = node.spin(sleep(Duration::from_millis(250))).await.unwrap();
        assert_eq!(outcome, PlaybackOutcome::Cancelled { emitted: 2 });
        assert_eq!(outcome.emitted(), 2);

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_stops_loop() {
        let (publisher, rx) = ChannelPublisher::channel("/gal_orbits");
        drop(rx);
        let node = PlaybackNode::new(player(3), Box::new(publisher), 10.0).unwrap();

        let res = node.spin(pending()).await;
        assert!(matches!(res, Err(GalOrbitsError::Transport(_))));
    }
}
