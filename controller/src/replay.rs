//! Recorded skeleton streams.
//!
//! A recording holds one sensor frame per line as an s-expression:
//!
//! ```text
//! (:t 33 :skeletons ((:tracking tracked
//!                     :joints ((head 0.0 0.9 2.0 tracked)
//!                              (shoulder-center 0.0 0.5 2.0 tracked)))))
//! ```
//!
//! Lines starting with `;` and blank lines are skipped. Joints absent
//! from a skeleton stay untracked at the origin.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use lexpr::Value;
use tracing::warn;

use crate::sexp::{as_number, atom_string, get_int, get_keyword, get_value, list_items};
use crate::skeleton::{Frame, Joint, SensorFrame, Skeleton, SkeletonTracking, TrackingQuality};

/// Anything that yields sensor frames in delivery order.
pub trait FrameSource {
    /// Next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> anyhow::Result<Option<SensorFrame>>;
}

/// Frames read from a recording, one s-expression per line.
pub struct ReplaySource<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
    /// Lines skipped because they failed to parse.
    pub malformed: u64,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening recording {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            malformed: 0,
        }
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    fn next_frame(&mut self) -> anyhow::Result<Option<SensorFrame>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line.with_context(|| format!("reading recording line {}", self.line_no))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }
            match parse_frame_line(trimmed) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    warn!("Skipping recording line {}: {:#}", self.line_no, e);
                    self.malformed += 1;
                }
            }
        }
        Ok(None)
    }
}

/// Parse one recording line into a sensor frame.
pub fn parse_frame_line(line: &str) -> anyhow::Result<SensorFrame> {
    let value = lexpr::from_str(line).map_err(|e| anyhow!("parse error: {}", e))?;

    let t = get_int(&value, "t").ok_or_else(|| anyhow!("missing :t"))?;
    let timestamp_ms = u64::try_from(t).map_err(|_| anyhow!("negative timestamp {}", t))?;

    let skeletons = match get_value(&value, "skeletons") {
        Some(list) => list_items(list)
            .ok_or_else(|| anyhow!(":skeletons is not a list"))?
            .into_iter()
            .map(parse_skeleton)
            .collect::<anyhow::Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(SensorFrame {
        timestamp_ms,
        skeletons,
    })
}

fn parse_skeleton(value: &Value) -> anyhow::Result<Skeleton> {
    let tracking = match get_keyword(value, "tracking") {
        Some(name) => SkeletonTracking::from_name(&name)
            .ok_or_else(|| anyhow!("unknown skeleton tracking {:?}", name))?,
        None => SkeletonTracking::Tracked,
    };

    let mut frame = Frame::new();
    if let Some(joints) = get_value(value, "joints") {
        let joints = list_items(joints).ok_or_else(|| anyhow!(":joints is not a list"))?;
        for entry in joints {
            parse_joint(entry, &mut frame)?;
        }
    }
    Ok(Skeleton { tracking, frame })
}

/// `(name x y z [quality])`; quality defaults to tracked.
fn parse_joint(value: &Value, frame: &mut Frame) -> anyhow::Result<()> {
    let items = list_items(value).ok_or_else(|| anyhow!("joint entry is not a list"))?;
    if items.len() != 4 && items.len() != 5 {
        bail!("joint entry needs 4 or 5 elements, got {}", items.len());
    }

    let name = atom_string(items[0]);
    let joint = Joint::from_name(&name).ok_or_else(|| anyhow!("unknown joint {:?}", name))?;

    let mut position = [0.0f32; 3];
    for (axis, item) in position.iter_mut().zip(&items[1..4]) {
        *axis = as_number(item)
            .ok_or_else(|| anyhow!("non-numeric coordinate for {}", name))? as f32;
    }

    let quality = match items.get(4) {
        Some(q) => {
            let q = atom_string(q);
            TrackingQuality::from_name(&q).ok_or_else(|| anyhow!("unknown quality {:?}", q))?
        }
        None => TrackingQuality::Tracked,
    };

    frame.set(joint, position, quality);
    Ok(())
}
