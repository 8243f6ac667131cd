//! Frame sinks: where rendered movie frames go.
//!
//! [`FfmpegEncoder`] streams raw rgb24 frames into an `ffmpeg` child process
//! that writes an H.264 MP4.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use log::info;

use crate::error::{Error, Result};

/// Consumer of fixed-size rgb24 frames
pub trait FrameSink {
    fn write_frame(&mut self, rgb: &[u8]) -> Result<()>;

    /// Flush and close; no frames may follow
    fn finish(&mut self) -> Result<()>;
}

pub struct FfmpegEncoder {
    output: PathBuf,
    frame_bytes: usize,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegEncoder {
    pub fn spawn(ffmpeg: &Path, output: &Path, size: (u32, u32), fps: u32) -> Result<Self> {
        let (w, h) = size;
        let mut child = Command::new(ffmpeg)
            .args(["-y", "-loglevel", "error"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", &format!("{w}x{h}"), "-r", &fps.to_string()])
            .args(["-i", "-"])
            .args(["-vcodec", "libx264", "-pix_fmt", "yuv420p"])
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| Error::Encoder {
                path: output.to_path_buf(),
                reason: format!("could not start {}: {e}", ffmpeg.display()),
            })?;
        let stdin = child.stdin.take();

        Ok(Self {
            output: output.to_path_buf(),
            frame_bytes: (w as usize) * (h as usize) * 3,
            child: Some(child),
            stdin,
        })
    }

    fn fail(&self, reason: impl Into<String>) -> Error {
        Error::Encoder {
            path: self.output.clone(),
            reason: reason.into(),
        }
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, rgb: &[u8]) -> Result<()> {
        if rgb.len() != self.frame_bytes {
            return Err(self.fail(format!(
                "frame has {} bytes, expected {}",
                rgb.len(),
                self.frame_bytes
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(self.fail("encoder already finished"));
        };
        stdin
            .write_all(rgb)
            .map_err(|e| Error::Encoder {
                path: self.output.clone(),
                reason: format!("writing frame: {e}"),
            })
    }

    fn finish(&mut self) -> Result<()> {
        // Closing stdin tells ffmpeg the stream is over
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait()?;
        if !status.success() {
            return Err(self.fail(format!("ffmpeg exited with {status}")));
        }
        info!("finished writing {}", self.output.display());
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
