use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::export::encoder::{EncoderConfig, VideoEncoder};
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{SimvisError, SimvisResult};
use crate::foundation::math::flatten_premul_over_bg;

/// Highest `-crf` libx264 accepts; quality values above it are clamped.
pub const MAX_CRF: u8 = 51;

/// Options for [`FfmpegEncoder`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegEncoderOpts {
    /// Output MP4 path; parent directories are created on `begin`.
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Background used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

impl FfmpegEncoderOpts {
    /// Options for `out_path`, overwriting, flattened over white.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [255, 255, 255, 255],
        }
    }
}

/// Encoder that spawns the system `ffmpeg` and streams raw RGBA frames to its stdin.
pub struct FfmpegEncoder {
    opts: FfmpegEncoderOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<EncoderConfig>,
    last_ts: Option<u64>,
}

impl FfmpegEncoder {
    /// Create an encoder. `ffmpeg` is spawned on `begin`.
    pub fn new(opts: FfmpegEncoderOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_ts: None,
        }
    }

    /// Output path the encoder writes to.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }
}

/// ffmpeg arguments for `cfg`, without the program name.
pub(crate) fn ffmpeg_args(cfg: &EncoderConfig, opts: &FfmpegEncoderOpts) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    args.push(if opts.overwrite { "-y" } else { "-n" }.to_string());
    args.extend(
        [
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
        ]
        .map(String::from),
    );
    args.push(format!("{}x{}", cfg.width, cfg.height));
    // Input rate goes before `-i` for rawvideo.
    args.push("-r".to_string());
    args.push(format!("1000/{}", cfg.frame_duration_ms));
    args.extend(["-i", "pipe:0", "-an", "-c:v", "libx264", "-crf"].map(String::from));
    args.push(cfg.quality.min(MAX_CRF).to_string());
    args.extend(["-pix_fmt", "yuv420p", "-movflags", "+faststart"].map(String::from));
    args.push(opts.out_path.display().to_string());
    args
}

impl VideoEncoder for FfmpegEncoder {
    fn begin(&mut self, cfg: EncoderConfig) -> SimvisResult<()> {
        if cfg.frame_duration_ms == 0 {
            return Err(SimvisError::validation("frame duration must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SimvisError::validation(
                "ffmpeg encoder width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(SimvisError::validation(
                "ffmpeg encoder width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(self.out_path())?;
        if !self.opts.overwrite && self.out_path().exists() {
            return Err(SimvisError::validation(format!(
                "output file '{}' already exists",
                self.out_path().display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(SimvisError::resource(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(ffmpeg_args(&cfg, &self.opts));

        let mut child = cmd.spawn().map_err(|e| {
            SimvisError::resource(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SimvisError::resource("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SimvisError::resource("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.out_path().display(),
            width = cfg.width,
            height = cfg.height,
            crf = cfg.quality.min(MAX_CRF),
            "ffmpeg started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_ts = None;
        Ok(())
    }

    fn encode_frame(&mut self, frame: &FrameRGBA, timestamp_ms: u64) -> SimvisResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SimvisError::encode("ffmpeg encoder not started"))?;
        if let Some(last) = self.last_ts
            && timestamp_ms <= last
        {
            return Err(SimvisError::encode(format!(
                "timestamp {timestamp_ms} ms does not increase past {last} ms"
            )));
        }

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SimvisError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(SimvisError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba);
        } else {
            let mut premul = frame.data.clone();
            crate::foundation::math::premultiply_rgba8_in_place(&mut premul);
            flatten_premul_over_bg(&mut self.scratch, &premul, self.opts.bg_rgba);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SimvisError::encode("ffmpeg encoder is already closed"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            SimvisError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.last_ts = Some(timestamp_ms);
        Ok(())
    }

    fn close(&mut self) -> SimvisResult<()> {
        drop(self.stdin.take());
        self.cfg = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let status = child
            .wait()
            .map_err(|e| SimvisError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SimvisError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| SimvisError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SimvisError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        tracing::debug!(out = %self.out_path().display(), "ffmpeg finished");
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            tracing::warn!(out = %self.out_path().display(), "ffmpeg encoder dropped before close");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SimvisResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
