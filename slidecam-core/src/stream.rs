//! Camera stream lifecycle
//!
//! [`LiveStream`] owns at most one acquired camera stream and binds it to
//! the shared video element. Acquisition, device enumeration and the
//! wait for host readiness run as tasks on the runtime the stream was
//! created on; the public operations only update state and spawn, so
//! they return immediately.
//!
//! Every acquisition and deferred bind is tagged with the session
//! generation at the time it was issued. `stop()`, `next()` and new
//! acquisitions bump the generation, and a completion whose tag no
//! longer matches is dropped (releasing any stream it delivered).

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Result, SlidecamError};
use crate::media::{MediaDevices, MediaStream};
use crate::output::VideoElement;
use crate::presentation::Readiness;
use crate::types::{DeviceId, MediaConstraints, SessionStatus};

/// Mutable session state, guarded by the stream's mutex
#[derive(Default)]
struct SessionState {
    status: SessionStatus,
    /// The owned device handle
    stream: Option<Arc<dyn MediaStream>>,
    current_device: Option<DeviceId>,
    /// Known cameras, `None` until the first enumeration is issued
    devices: Option<Vec<DeviceId>>,
    generation: u64,
    acquisitions: u64,
    last_error: Option<String>,
    /// Generation of the bind waiting for host readiness
    deferred_bind: Option<u64>,
    /// Whether a readiness waiter task is running
    bind_waiter: bool,
}

struct Inner {
    media: Arc<dyn MediaDevices>,
    video: Arc<dyn VideoElement>,
    readiness: Readiness,
    runtime: Handle,
    persistent: bool,
    state: Mutex<SessionState>,
    status_tx: watch::Sender<SessionStatus>,
}

/// Camera stream lifecycle manager
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct LiveStream {
    inner: Arc<Inner>,
}

impl LiveStream {
    /// Create a disabled session.
    ///
    /// Must be called from within a Tokio runtime; background work is
    /// spawned onto that runtime.
    pub fn new(
        media: Arc<dyn MediaDevices>,
        video: Arc<dyn VideoElement>,
        readiness: Readiness,
        persistent: bool,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| SlidecamError::NoRuntime)?;
        let (status_tx, _) = watch::channel(SessionStatus::Disabled);

        debug!(persistent, "Creating camera stream session");

        Ok(Self {
            inner: Arc::new(Inner {
                media,
                video,
                readiness,
                runtime,
                persistent,
                state: Mutex::new(SessionState::default()),
                status_tx,
            }),
        })
    }

    /// Start streaming: rebind a kept stream, or acquire a new one.
    ///
    /// Only acts when the session is disabled.
    pub fn start(&self) {
        let mut state = self.inner.state.lock();
        if state.status != SessionStatus::Disabled {
            trace!(status = %state.status, "start() ignored");
            return;
        }

        if state.stream.is_some() {
            debug!("Reusing kept camera stream");
            state.generation += 1;
            let generation = state.generation;
            self.inner.enable(&mut state, generation);
        } else {
            self.inner.create(&mut state);
        }
    }

    /// Stop streaming and hide the video.
    ///
    /// An active session is unbound from the video element and, unless
    /// persistent, its stream is released. A pending session has its
    /// in-flight request cancelled.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        match state.status {
            SessionStatus::Active => self.inner.destroy(&mut state),
            SessionStatus::Pending => {
                state.generation += 1;
                if !self.inner.persistent {
                    release(&mut state);
                }
                self.inner.set_status(&mut state, SessionStatus::Disabled);
                info!("Cancelled pending camera request");
            }
            _ => trace!(status = %state.status, "stop() ignored"),
        }
    }

    /// Switch to the next known camera.
    ///
    /// Selection does not wrap: on the last camera this is a no-op. With
    /// no current camera the first one is chosen. Needs at least two
    /// known cameras.
    pub fn next(&self) {
        let mut state = self.inner.state.lock();

        let candidate = {
            let Some(devices) = state.devices.as_ref().filter(|list| list.len() > 1) else {
                debug!("Fewer than two cameras known, not switching");
                return;
            };

            match state.current_device.as_ref() {
                None => devices[0].clone(),
                Some(current) => match devices.iter().position(|id| id == current) {
                    Some(index) if index + 1 < devices.len() => devices[index + 1].clone(),
                    Some(_) => {
                        debug!(device = %current, "Already on the last camera");
                        return;
                    }
                    None => devices[0].clone(),
                },
            }
        };

        if state.current_device.as_ref() == Some(&candidate) {
            return;
        }

        info!(device = %candidate, "Switching camera");
        state.current_device = Some(candidate);
        release(&mut state);

        match state.status {
            SessionStatus::Active | SessionStatus::Pending => self.inner.create(&mut state),
            _ => state.generation += 1,
        }
    }

    /// Clear an error so the next `start()` retries from scratch.
    ///
    /// Returns `true` if the session was in the error state.
    pub fn reset(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.status != SessionStatus::Error {
            return false;
        }
        state.last_error = None;
        self.inner.set_status(&mut state, SessionStatus::Disabled);
        info!("Camera error cleared");
        true
    }

    /// Enumerate devices again, appending cameras not yet known
    pub fn refresh_devices(&self) {
        let mut state = self.inner.state.lock();
        state.devices.get_or_insert_with(Vec::new);
        self.inner.enumerate();
    }

    /// Whether the stream is bound and playing
    pub fn is_active(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    /// Whether a request is in flight
    pub fn is_pending(&self) -> bool {
        self.status() == SessionStatus::Pending
    }

    /// Current session status
    pub fn status(&self) -> SessionStatus {
        self.inner.state.lock().status
    }

    /// Camera in use, or selected for the next acquisition
    pub fn current_device(&self) -> Option<DeviceId> {
        self.inner.state.lock().current_device.clone()
    }

    /// Known cameras, `None` before the first enumeration
    pub fn devices(&self) -> Option<Vec<DeviceId>> {
        self.inner.state.lock().devices.clone()
    }

    /// Whether a device handle is currently owned
    pub fn has_stream(&self) -> bool {
        self.inner.state.lock().stream.is_some()
    }

    /// Message of the last acquisition failure
    pub fn last_error(&self) -> Option<String> {
        self.inner.state.lock().last_error.clone()
    }

    /// Number of acquisition requests issued so far
    pub fn acquisition_count(&self) -> u64 {
        self.inner.state.lock().acquisitions
    }

    /// Whether the stream is kept across `stop()`
    pub fn is_persistent(&self) -> bool {
        self.inner.persistent
    }

    /// Watch status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Wait until no request is in flight and return the resulting status
    pub async fn settled(&self) -> SessionStatus {
        let mut rx = self.subscribe_status();
        match rx.wait_for(|status| *status != SessionStatus::Pending).await {
            Ok(status) => *status,
            Err(_) => self.status(),
        }
    }
}

impl std::fmt::Debug for LiveStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("LiveStream")
            .field("status", &state.status)
            .field("current_device", &state.current_device)
            .field("stream", &state.stream.as_ref().map(|s| s.id().to_string()))
            .field("persistent", &self.inner.persistent)
            .finish()
    }
}

impl Inner {
    fn set_status(&self, state: &mut SessionState, status: SessionStatus) {
        state.status = status;
        self.status_tx.send_replace(status);
    }

    /// Issue an acquisition request (and the first enumeration)
    fn create(self: &Arc<Self>, state: &mut SessionState) {
        state.generation += 1;
        state.acquisitions += 1;
        let generation = state.generation;
        self.set_status(state, SessionStatus::Pending);

        if state.devices.is_none() {
            state.devices = Some(Vec::new());
            self.enumerate();
        }

        let constraints = MediaConstraints::for_device(state.current_device.as_ref());
        info!(%constraints, "Requesting camera");

        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            let result = inner.media.get_user_media(&constraints).await;
            inner.complete_acquisition(generation, result);
        });
    }

    fn complete_acquisition(
        self: &Arc<Self>,
        generation: u64,
        result: Result<Arc<dyn MediaStream>>,
    ) {
        let mut state = self.state.lock();

        if state.generation != generation {
            match result {
                Ok(stream) => {
                    warn!(stream = stream.id(), "Discarding stream from cancelled request");
                    stream.stop_tracks();
                }
                Err(err) => debug!(error = %err, "Cancelled request failed"),
            }
            return;
        }

        match result {
            Ok(stream) => {
                if let Some(device) = stream.video_device_id() {
                    state.current_device = Some(device);
                }
                if let Some(previous) = state.stream.replace(stream) {
                    previous.stop_tracks();
                }
                state.last_error = None;
                self.enable(&mut state, generation);
            }
            Err(err) => {
                error!(error = %err, hint = err.user_hint().unwrap_or(""), "getUserMedia error");
                state.last_error = Some(err.to_string());
                self.set_status(&mut state, SessionStatus::Error);
            }
        }
    }

    /// Bind the owned stream to the video element once the host is ready
    fn enable(self: &Arc<Self>, state: &mut SessionState, generation: u64) {
        if !self.readiness.is_ready() {
            if state.status != SessionStatus::Pending {
                self.set_status(state, SessionStatus::Pending);
            }
            debug!("Presentation not ready, deferring video bind");
            state.deferred_bind = Some(generation);
            if !state.bind_waiter {
                state.bind_waiter = true;
                self.wait_for_ready();
            }
            return;
        }

        let Some(stream) = state.stream.clone() else {
            return;
        };

        if self.video.source_id().as_deref() != Some(stream.id()) {
            self.video.pause();
            self.video.set_source(Some(Arc::clone(&stream)));
        }
        self.video.set_enabled(true);
        if !self.video.is_playing() {
            self.video.play();
        }
        self.set_status(state, SessionStatus::Active);

        info!(
            stream = stream.id(),
            device = state.current_device.as_ref().map(DeviceId::as_str).unwrap_or("unknown"),
            "Camera active"
        );
    }

    /// Run the latest deferred bind once the host is ready
    fn wait_for_ready(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            let ready = inner.readiness.wait().await;
            let mut state = inner.state.lock();
            state.bind_waiter = false;
            let Some(generation) = state.deferred_bind.take() else {
                return;
            };
            if !ready {
                warn!("Presentation closed before becoming ready");
            } else if state.generation == generation {
                inner.enable(&mut state, generation);
            } else {
                trace!(generation, "Dropping deferred bind from a cancelled attempt");
            }
        });
    }

    /// Unbind the video element and drop back to disabled
    fn destroy(&self, state: &mut SessionState) {
        if self.video.is_playing() {
            self.video.pause();
        }
        self.video.set_source(None);
        self.video.set_enabled(false);
        self.video.reload();

        if !self.persistent {
            release(state);
        }
        state.generation += 1;
        self.set_status(state, SessionStatus::Disabled);
        info!(kept = state.stream.is_some(), "Camera stopped");
    }

    /// Collect camera ids into the device list without blocking acquisition
    fn enumerate(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            match inner.media.enumerate_devices().await {
                Ok(found) => {
                    let mut state = inner.state.lock();
                    let devices = state.devices.get_or_insert_with(Vec::new);
                    for device in found.into_iter().filter(|d| d.is_video_input()) {
                        if !devices.contains(&device.id) {
                            devices.push(device.id);
                        }
                    }
                    debug!(count = devices.len(), "Cameras enumerated");
                }
                Err(err) => warn!(error = %err, "Device enumeration failed"),
            }
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        release(self.state.get_mut());
    }
}

/// Stop and forget the owned stream
fn release(state: &mut SessionState) {
    if let Some(stream) = state.stream.take() {
        debug!(stream = stream.id(), "Releasing camera stream");
        stream.stop_tracks();
    }
}
