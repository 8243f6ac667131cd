//! Binary ring snapshot streams.
//!
//! A stream is a sequence of snapshots, each made of seven Fortran
//! unformatted sequential records:
//!
//! ```text
//! [t] [Nbin] [r; Nbin] [G*sigma; Nbin] [nu; Nbin] [Nseeds] [a; Nseeds] [G*m; Nseeds]
//! ```
//!
//! Every record is framed by a native-endian `i32` byte count written before
//! and after the payload. Reals are `f64`, counts are `i32`.
//!
//! Reading stops cleanly only when the stream ends exactly on a snapshot
//! boundary. Anything else (short payload, mismatched markers, counts that
//! disagree with the arrays) is reported as [`Error::MalformedSnapshot`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};

const MARKER_BYTES: usize = std::mem::size_of::<i32>();

/// One output of the ring model: the binned ring plus the embedded seeds
#[derive(Debug, Clone, PartialEq)]
pub struct RingSnapshot {
    pub time: f64,
    pub radius: Vec<f64>,  // bin centers
    pub gsigma: Vec<f64>,  // G * surface density
    pub nu: Vec<f64>,      // viscosity
    pub seed_a: Vec<f64>,  // seed semi-major axes
    pub seed_gm: Vec<f64>, // G * seed mass
}

impl RingSnapshot {
    pub fn bin_count(&self) -> usize {
        self.radius.len()
    }

    pub fn seed_count(&self) -> usize {
        self.seed_a.len()
    }
}

/// Snapshots keyed by output step, `round(time / output_interval)`
#[derive(Debug, Clone, Default)]
pub struct SnapshotSeries {
    entries: BTreeMap<i64, RingSnapshot>,
}

impl SnapshotSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot under `step`; a step can only be filled once
    pub fn insert(&mut self, step: i64, snapshot: RingSnapshot) -> Result<()> {
        if let Some(existing) = self.entries.get(&step) {
            return Err(Error::DuplicateStep {
                step,
                time: existing.time,
            });
        }
        self.entries.insert(step, snapshot);
        Ok(())
    }

    pub fn get(&self, step: i64) -> Option<&RingSnapshot> {
        self.entries.get(&step)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &RingSnapshot)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (i64, &mut RingSnapshot)> {
        self.entries.iter_mut().map(|(k, v)| (*k, v))
    }
}

/// Output step for a record time
pub fn step_index(time: f64, output_interval: f64) -> i64 {
    (time / output_interval).round() as i64
}

/// Pulls snapshots one at a time out of a record-framed stream
pub struct SnapshotReader<R> {
    inner: R,
    index: usize, // snapshots read so far
}

impl<R: Read> SnapshotReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, index: 0 }
    }

    /// Read the next snapshot.
    ///
    /// Returns `Ok(None)` when the stream is exhausted at a snapshot boundary.
    pub fn read_snapshot(&mut self) -> Result<Option<RingSnapshot>> {
        let time = match self.read_record()? {
            Some(payload) => self.single_real(&payload, "time")?,
            None => return Ok(None),
        };
        if !time.is_finite() {
            return Err(self.malformed(format!("record time {time} is not finite")));
        }

        let nbin = self.count_record("bin count")?;
        let radius = self.real_record("radius", nbin)?;
        let gsigma = self.real_record("surface density", nbin)?;
        let nu = self.real_record("viscosity", nbin)?;

        let nseeds = self.count_record("seed count")?;
        let seed_a = self.real_record("seed semi-major axis", nseeds)?;
        let seed_gm = self.real_record("seed mass", nseeds)?;

        self.index += 1;
        Ok(Some(RingSnapshot {
            time,
            radius,
            gsigma,
            nu,
            seed_a,
            seed_gm,
        }))
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::MalformedSnapshot {
            index: self.index,
            reason: reason.into(),
        }
    }

    /// Fill `buf` completely; returns the number of bytes read before EOF
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn read_marker(&mut self) -> Result<Option<i32>> {
        let mut bytes = [0u8; MARKER_BYTES];
        match self.fill(&mut bytes)? {
            0 => Ok(None),
            MARKER_BYTES => Ok(Some(i32::from_ne_bytes(bytes))),
            n => Err(self.malformed(format!("record marker cut short after {n} bytes"))),
        }
    }

    /// Read one framed record; `None` only if the stream ends before its marker
    fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(head) = self.read_marker()? else {
            return Ok(None);
        };
        let len = usize::try_from(head)
            .map_err(|_| self.malformed(format!("negative record length {head}")))?;

        // Grow only with bytes that arrive; the marker may be garbage
        let mut payload = Vec::new();
        let got = (&mut self.inner).take(len as u64).read_to_end(&mut payload)?;
        if got != len {
            return Err(self.malformed(format!("record payload has {got} of {len} bytes")));
        }

        match self.read_marker()? {
            Some(tail) if tail == head => Ok(Some(payload)),
            Some(tail) => Err(self.malformed(format!(
                "record markers disagree ({head} before, {tail} after)"
            ))),
            None => Err(self.malformed("stream ended before trailing record marker")),
        }
    }

    fn required_record(&mut self, what: &str) -> Result<Vec<u8>> {
        self.read_record()?
            .ok_or_else(|| self.malformed(format!("stream ended before {what} record")))
    }

    fn reals(&self, payload: &[u8], what: &str) -> Result<Vec<f64>> {
        if payload.len() % std::mem::size_of::<f64>() != 0 {
            return Err(self.malformed(format!(
                "{what} record of {} bytes is not a whole number of f64 values",
                payload.len()
            )));
        }
        Ok(bytemuck::pod_collect_to_vec::<u8, f64>(payload))
    }

    fn single_real(&self, payload: &[u8], what: &str) -> Result<f64> {
        match self.reals(payload, what)?.as_slice() {
            [value] => Ok(*value),
            values => Err(self.malformed(format!(
                "{what} record holds {} values, expected 1",
                values.len()
            ))),
        }
    }

    fn count_record(&mut self, what: &str) -> Result<usize> {
        let payload = self.required_record(what)?;
        if payload.len() != MARKER_BYTES {
            return Err(self.malformed(format!(
                "{what} record has {} bytes, expected one i32",
                payload.len()
            )));
        }
        let count: i32 = bytemuck::pod_read_unaligned(&payload);
        usize::try_from(count).map_err(|_| self.malformed(format!("negative {what} {count}")))
    }

    fn real_record(&mut self, what: &str, expected: usize) -> Result<Vec<f64>> {
        let payload = self.required_record(what)?;
        let values = self.reals(&payload, what)?;
        if values.len() != expected {
            return Err(self.malformed(format!(
                "{what} record holds {} values, count says {expected}",
                values.len()
            )));
        }
        Ok(values)
    }
}

/// Writes snapshots in the same framing [`SnapshotReader`] consumes
pub struct SnapshotWriter<W: Write> {
    inner: W,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_snapshot(&mut self, snap: &RingSnapshot) -> Result<()> {
        let nbin = snap.bin_count();
        if snap.gsigma.len() != nbin || snap.nu.len() != nbin {
            return Err(Error::InvalidParameter {
                name: "snapshot",
                reason: "ring arrays differ in length".to_string(),
            });
        }
        if snap.seed_gm.len() != snap.seed_count() {
            return Err(Error::InvalidParameter {
                name: "snapshot",
                reason: "seed arrays differ in length".to_string(),
            });
        }

        self.write_record(bytemuck::bytes_of(&snap.time))?;
        self.write_count(nbin)?;
        self.write_record(bytemuck::cast_slice(&snap.radius))?;
        self.write_record(bytemuck::cast_slice(&snap.gsigma))?;
        self.write_record(bytemuck::cast_slice(&snap.nu))?;
        self.write_count(snap.seed_count())?;
        self.write_record(bytemuck::cast_slice(&snap.seed_a))?;
        self.write_record(bytemuck::cast_slice(&snap.seed_gm))?;
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = i32::try_from(count).map_err(|_| Error::InvalidParameter {
            name: "snapshot",
            reason: format!("count {count} does not fit in an i32"),
        })?;
        self.write_record(bytemuck::bytes_of(&count))
    }

    fn write_record(&mut self, payload: &[u8]) -> Result<()> {
        let marker = i32::try_from(payload.len()).map_err(|_| Error::InvalidParameter {
            name: "snapshot",
            reason: format!("record of {} bytes is too large", payload.len()),
        })?;
        self.inner.write_all(&marker.to_ne_bytes())?;
        self.inner.write_all(payload)?;
        self.inner.write_all(&marker.to_ne_bytes())?;
        Ok(())
    }
}

/// Read every snapshot from `reader`, keyed by output step
pub fn read_series<R: Read>(reader: R, output_interval: f64) -> Result<SnapshotSeries> {
    if !(output_interval.is_finite() && output_interval > 0.0) {
        return Err(Error::InvalidParameter {
            name: "output_interval",
            reason: format!("must be positive and finite, got {output_interval}"),
        });
    }

    let mut reader = SnapshotReader::new(reader);
    let mut series = SnapshotSeries::new();
    let mut last_time = f64::NEG_INFINITY;

    while let Some(snap) = reader.read_snapshot()? {
        if snap.time <= last_time {
            warn!("snapshot time {:e} does not increase (previous {:e})", snap.time, last_time);
        }
        last_time = snap.time;
        series.insert(step_index(snap.time, output_interval), snap)?;
    }
    Ok(series)
}

/// Load a snapshot file from disk
pub fn load_snapshots(path: &Path, output_interval: f64) -> Result<SnapshotSeries> {
    let file = File::open(path)?;
    let series = read_series(BufReader::new(file), output_interval)?;
    info!("loaded {} snapshots from {}", series.len(), path.display());
    Ok(series)
}

/// Write a whole series to disk, in step order
pub fn save_snapshots(path: &Path, series: &SnapshotSeries) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = SnapshotWriter::new(BufWriter::new(file));
    for (_, snap) in series.iter() {
        writer.write_snapshot(snap)?;
    }
    writer.into_inner()?;
    Ok(())
}
