use chrono::Utc;
use skyway_core::countdown::CountdownDisplay;
use skyway_core::FlightCountdown;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub const TICK: Duration = Duration::from_secs(1);

/// Drive a countdown on a timer, publishing each display.
///
/// The task stops after the tick that completes the countdown, or once every
/// receiver has been dropped.
pub fn spawn_countdown(
    mut countdown: FlightCountdown,
    period: Duration,
) -> (watch::Receiver<CountdownDisplay>, JoinHandle<()>) {
    let initial = countdown.tick(Utc::now());
    let landed = initial.just_completed;
    let (tx, rx) = watch::channel(initial.display);

    let task = tokio::spawn(async move {
        if landed {
            return;
        }
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            interval.tick().await;
            let tick = countdown.tick(Utc::now());
            if tx.send(tick.display).is_err() {
                debug!("Countdown has no viewers left");
                return;
            }
            if tick.just_completed {
                debug!("Countdown reached arrival {}", countdown.arrival());
                return;
            }
        }
    });

    (rx, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_runs_until_landing_and_completes_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let arrival = Utc::now() + chrono::Duration::milliseconds(250);
        let countdown = FlightCountdown::new(arrival).on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (display, task) = spawn_countdown(countdown, Duration::from_millis(50));
        assert!(matches!(*display.borrow(), CountdownDisplay::Remaining { .. }));

        tokio::time::timeout(Duration::from_secs(3), task).await.unwrap().unwrap();
        assert_eq!(*display.borrow(), CountdownDisplay::LandingSoon);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_landed_flight_finishes_immediately() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let landed_at = Utc::now() - chrono::Duration::minutes(5);
        let countdown = FlightCountdown::new(landed_at).on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (display, task) = spawn_countdown(countdown, TICK);
        task.await.unwrap();
        assert_eq!(display.borrow().to_string(), "Landing soon");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
