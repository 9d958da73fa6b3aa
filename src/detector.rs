//! Hand keypoints and the background hand detector.
//!
//! The detector is an external landmark model driven as a subprocess. It runs on
//! its own thread, so results arrive at whatever rate the model manages; the main
//! loop only ever reads the most recent result through a [`LandmarkSlot`].
//!
//! # Subprocess protocol
//!
//! 1. The child prints `READY` on its first stdout line.
//! 2. Per frame the host writes three little-endian `u32`s (width, height,
//!    channels = 3) followed by the raw RGB bytes.
//! 3. The child answers with one JSON line:
//!    `{"hands":[{"handedness":"Left","score":0.9,"landmarks":[{"x":..,"y":..,"z":..}, ...]}]}`
//!    where coordinates are normalized to the frame (0.0 to 1.0).

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::types::FrameBuffer;
use parking_lot::Mutex;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Hand landmark indices (21-point hand model convention)
pub mod landmarks {
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const COUNT: usize = 21;
}

/// One detected hand, keypoints in camera pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub keypoints: Vec<Point>,
    pub score: f32,
    pub handedness: String,
}

impl Hand {
    pub fn keypoint(&self, index: usize) -> Option<Point> {
        self.keypoints.get(index).copied()
    }

    /// A hand with only thumb and index tips placed; everything else at the origin.
    #[cfg(test)]
    pub fn from_tips(thumb_tip: Point, index_tip: Point) -> Self {
        let mut keypoints = vec![Point::default(); landmarks::COUNT];
        keypoints[landmarks::THUMB_TIP] = thumb_tip;
        keypoints[landmarks::INDEX_FINGER_TIP] = index_tip;
        Self { keypoints, score: 1.0, handedness: "Right".into() }
    }
}

/// The two fingertips that span the viewfinder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSample {
    pub thumb_tip: Point,
    pub index_tip: Point,
}

impl GestureSample {
    pub fn from_hand(hand: &Hand) -> Option<Self> {
        Some(Self {
            thumb_tip: hand.keypoint(landmarks::THUMB_TIP)?,
            index_tip: hand.keypoint(landmarks::INDEX_FINGER_TIP)?,
        })
    }
}

/// Single-slot "latest value" mailbox between the detector thread and the frame loop.
/// Each publish replaces the whole hand list, so a reader never sees half an update.
#[derive(Clone, Default)]
pub struct LandmarkSlot {
    inner: Arc<Mutex<Vec<Hand>>>,
}

impl LandmarkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, hands: Vec<Hand>) {
        *self.inner.lock() = hands;
    }

    /// Copy of the most recent detection (empty when no hand is visible).
    pub fn snapshot(&self) -> Vec<Hand> {
        self.inner.lock().clone()
    }
}

/* ---------- JSON answer from the model ---------- */

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
    #[allow(dead_code)]
    #[serde(default)]
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one answer line into pixel-space hands.
/// Hands under `min_score` or without the full landmark set are dropped.
pub fn parse_detection(line: &str, width: usize, height: usize, min_score: f32) -> Result<Vec<Hand>> {
    let result: DetectionResult = serde_json::from_str(line.trim())
        .map_err(|e| Error::detector(format!("bad answer {:?}: {e}", line.trim())))?;

    if let Some(msg) = result.error {
        warn!("detector reported: {}", msg);
        return Ok(Vec::new());
    }

    let (w, h) = (width as f32, height as f32);
    let hands = result
        .hands
        .into_iter()
        .filter(|hand| hand.score >= min_score)
        .filter(|hand| {
            let ok = hand.landmarks.len() == landmarks::COUNT;
            if !ok {
                warn!("expected {} landmarks, got {}", landmarks::COUNT, hand.landmarks.len());
            }
            ok
        })
        .map(|hand| Hand {
            keypoints: hand.landmarks.iter().map(|lm| Point::new(lm.x * w, lm.y * h)).collect(),
            score: hand.score,
            handedness: hand.handedness,
        })
        .filter(|hand| {
            let ok = hand.keypoints.iter().all(|p| p.x.is_finite() && p.y.is_finite());
            if !ok {
                warn!("dropping hand with non-finite landmarks");
            }
            ok
        })
        .collect();
    Ok(hands)
}

/// Configuration for the detector subprocess.
#[derive(Clone, Debug)]
pub struct DetectorOptions {
    pub command: Vec<String>,
    pub confidence_threshold: f32,
}

/// Owns the subprocess and its thread. Dropping it kills the child and joins the thread.
pub struct HandDetector {
    child: Child,
    frames: Option<SyncSender<Arc<FrameBuffer>>>,
    worker: Option<JoinHandle<()>>,
    slot: LandmarkSlot,
}

impl HandDetector {
    /// Start the model and wait for its READY line.
    pub fn spawn(options: &DetectorOptions, slot: LandmarkSlot) -> Result<Self> {
        let (program, args) = options
            .command
            .split_first()
            .ok_or_else(|| Error::detector("empty detector command"))?;

        info!("Starting hand detector: {}", options.command.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::detector(format!("spawn {program}: {e}")))?;

        let stdin = child.stdin.take().ok_or_else(|| Error::detector("no stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| Error::detector("no stdout"))?;
        let mut reader = BufReader::new(stdout);

        let mut ready = String::new();
        reader.read_line(&mut ready)?;
        if ready.trim() != "READY" {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::detector(format!("expected READY, got {:?}", ready.trim())));
        }
        info!("Hand detector ready");

        // Capacity 1: if the model is still busy, the newest frame is simply not offered.
        let (tx, rx) = mpsc::sync_channel::<Arc<FrameBuffer>>(1);
        let worker_slot = slot.clone();
        let min_score = options.confidence_threshold;
        let worker = thread::Builder::new()
            .name("hand-detector".into())
            .spawn(move || run_worker(stdin, reader, rx, worker_slot, min_score));
        let worker = match worker {
            Ok(worker) => worker,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        };

        Ok(Self { child, frames: Some(tx), worker: Some(worker), slot })
    }

    /// Offer a frame to the model. Returns false if it was dropped (busy or dead).
    pub fn offer(&self, frame: &Arc<FrameBuffer>) -> bool {
        let Some(tx) = &self.frames else { return false };
        tx.try_send(Arc::clone(frame)).is_ok()
    }

    pub fn slot(&self) -> &LandmarkSlot {
        &self.slot
    }

    pub fn is_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
}

impl Drop for HandDetector {
    fn drop(&mut self) {
        self.frames.take();
        // A model stuck mid-answer keeps the worker in `read_line` until its stdout closes.
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(
    mut stdin: ChildStdin,
    mut reader: BufReader<ChildStdout>,
    frames: Receiver<Arc<FrameBuffer>>,
    slot: LandmarkSlot,
    min_score: f32,
) {
    for frame in frames {
        match detect_once(&mut stdin, &mut reader, &frame, min_score) {
            Ok(hands) => {
                if let Some(hand) = hands.first() {
                    debug!(count = hands.len(), hand = %hand.handedness, score = hand.score, "hands detected");
                }
                slot.publish(hands);
            }
            Err(e) => {
                warn!("hand detector stopped: {}", e);
                slot.publish(Vec::new());
                break;
            }
        }
    }
}

fn detect_once(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    frame: &FrameBuffer,
    min_score: f32,
) -> Result<Vec<Hand>> {
    stdin.write_all(&encode_frame(frame))?;
    stdin.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(Error::detector("detector closed its output"));
    }
    parse_detection(&line, frame.width, frame.height, min_score)
}

/// Header (width, height, channels as LE u32) + packed RGB bytes.
fn encode_frame(frame: &FrameBuffer) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + frame.pixels.len() * 3);
    out.extend_from_slice(&(frame.width as u32).to_le_bytes());
    out.extend_from_slice(&(frame.height as u32).to_le_bytes());
    out.extend_from_slice(&3u32.to_le_bytes());
    for px in &frame.pixels {
        out.push(((px >> 16) & 0xFF) as u8);
        out.push(((px >> 8) & 0xFF) as u8);
        out.push((px & 0xFF) as u8);
    }
    out
}
