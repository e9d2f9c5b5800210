// File: followme-core/src/sim/joints.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use followme_common::Error;
use followme_common::traits::{ConnectionProbe, JointGroup};

#[derive(Debug)]
struct Motion {
    from: Vec<f64>,
    to: Vec<f64>,
    started: Instant,
    duration: Duration,
}

impl Motion {
    fn at_rest(positions: Vec<f64>) -> Self {
        Self {
            from: positions.clone(),
            to: positions,
            started: Instant::now(),
            duration: Duration::ZERO,
        }
    }

    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.started.elapsed().as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn current(&self) -> Vec<f64> {
        let p = self.progress();
        self.from
            .iter()
            .zip(&self.to)
            .map(|(a, b)| a + (b - a) * p)
            .collect()
    }
}

#[derive(Debug)]
struct SimState {
    position_mode: bool,
    ref_speed: f64,
    motion: Motion,
}

/// Joint group whose motions take `distance / ref_speed` seconds, scaled
/// by `time_scale` (0.5 runs twice as fast).
pub struct SimJointGroup {
    name: String,
    time_scale: f64,
    state: Mutex<SimState>,
    connected: AtomicBool,
}

impl SimJointGroup {
    pub fn new(name: &str, axes: usize, time_scale: f64) -> Self {
        Self {
            name: name.to_string(),
            time_scale: time_scale.max(0.0),
            state: Mutex::new(SimState {
                position_mode: false,
                ref_speed: 30.0,
                motion: Motion::at_rest(vec![0.0; axes]),
            }),
            connected: AtomicBool::new(true),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    fn ensure_connected(&self) -> Result<(), Error> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::NotConnected(self.name.clone()))
        }
    }

    async fn start_motion(&self, target_of: impl Fn(&[f64]) -> Vec<f64>) -> Result<(), Error> {
        self.ensure_connected()?;
        let mut st = self.state.lock().await;
        if !st.position_mode {
            return Err(Error::Device(format!("{} is not in position mode", self.name)));
        }

        let from = st.motion.current();
        let to = target_of(&from);
        let distance = from
            .iter()
            .zip(&to)
            .map(|(a, b)| (b - a).abs())
            .fold(0.0, f64::max);
        let secs = if st.ref_speed > 0.0 { distance / st.ref_speed } else { 0.0 };
        let duration = Duration::from_secs_f64(secs * self.time_scale);

        debug!("{} moving {:?} -> {:?} over {:?}", self.name, from, to, duration);
        st.motion = Motion {
            from,
            to,
            started: Instant::now(),
            duration,
        };
        Ok(())
    }
}

#[async_trait]
impl JointGroup for SimJointGroup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_position_mode(&self) -> Result<(), Error> {
        self.ensure_connected()?;
        self.state.lock().await.position_mode = true;
        Ok(())
    }

    async fn set_ref_speeds(&self, speed: f64) -> Result<(), Error> {
        self.ensure_connected()?;
        self.state.lock().await.ref_speed = speed;
        Ok(())
    }

    async fn set_ref_accelerations(&self, _acceleration: f64) -> Result<(), Error> {
        self.ensure_connected()
    }

    async fn position_move(&self, targets: &[f64]) -> Result<(), Error> {
        self.start_motion(|from| {
            from.iter()
                .enumerate()
                .map(|(i, cur)| targets.get(i).copied().unwrap_or(*cur))
                .collect()
        })
        .await
    }

    async fn relative_move(&self, deltas: &[f64]) -> Result<(), Error> {
        self.start_motion(|from| {
            from.iter()
                .enumerate()
                .map(|(i, cur)| cur + deltas.get(i).copied().unwrap_or(0.0))
                .collect()
        })
        .await
    }

    async fn check_motion_done(&self) -> Result<bool, Error> {
        self.ensure_connected()?;
        Ok(self.state.lock().await.motion.progress() >= 1.0)
    }

    async fn stop(&self) -> Result<(), Error> {
        self.ensure_connected()?;
        let mut st = self.state.lock().await;
        let here = st.motion.current();
        st.motion = Motion::at_rest(here);
        Ok(())
    }

    async fn encoder(&self, axis: usize) -> Result<f64, Error> {
        self.ensure_connected()?;
        let st = self.state.lock().await;
        st.motion
            .current()
            .get(axis)
            .copied()
            .ok_or_else(|| Error::Device(format!("{} has no axis {}", self.name, axis)))
    }
}

#[async_trait]
impl ConnectionProbe for SimJointGroup {
    fn port_name(&self) -> String {
        format!("/teo/{}", self.name)
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
