use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MagicMoveError, MagicMoveResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "magic-move.webm";

/// Output container, picked from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// VP9 in WebM.
    WebM,
    /// H.264 in MP4.
    Mp4,
}

impl Container {
    /// `.mp4` selects MP4; everything else is WebM.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("mp4") => Self::Mp4,
            _ => Self::WebM,
        }
    }

    fn codec_args(self) -> &'static [&'static str] {
        match self {
            Self::WebM => &[
                "-c:v",
                "libvpx-vp9",
                "-pix_fmt",
                "yuv420p",
                "-b:v",
                "0",
                "-crf",
                "32",
                "-row-mt",
                "1",
            ],
            Self::Mp4 => &[
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ],
        }
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite an existing file.
    pub overwrite: bool,
    /// Colour used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Options for writing to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Container chosen for `out_path`.
    pub fn container(&self) -> Container {
        Container::from_path(&self.out_path)
    }
}

/// Command line for encoding `cfg`-shaped raw RGBA frames read from stdin.
pub(crate) fn encoder_args(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(s.into());
    push(if opts.overwrite { "-y" } else { "-n" });
    for a in ["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"] {
        push(a);
    }
    push("-s");
    push(format!("{}x{}", cfg.width, cfg.height).as_str());
    // rawvideo has no header: the rate must precede the input.
    push("-r");
    push(format!("{}/{}", cfg.fps.num, cfg.fps.den).as_str());
    for a in ["-i", "pipe:0", "-an"] {
        push(a);
    }
    for a in opts.container().codec_args() {
        push(*a);
    }
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// A running `ffmpeg` process.
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    log: JoinHandle<std::io::Result<String>>,
}

impl Encoder {
    fn spawn(args: Vec<OsString>) -> MagicMoveResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MagicMoveError::export(format!("could not start ffmpeg: {e}")))?;

        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            return Err(MagicMoveError::export("ffmpeg pipes unavailable"));
        };
        // stderr is read concurrently with frame writes.
        let log = std::thread::spawn(move || {
            let mut text = String::new();
            stderr.read_to_string(&mut text)?;
            Ok(text)
        });
        Ok(Self { child, stdin, log })
    }

    fn write(&mut self, bytes: &[u8]) -> MagicMoveResult<()> {
        self.stdin
            .write_all(bytes)
            .map_err(|e| MagicMoveError::export(format!("ffmpeg stopped accepting frames: {e}")))
    }

    fn finish(self) -> MagicMoveResult<()> {
        let Self {
            mut child,
            stdin,
            log,
        } = self;
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| MagicMoveError::export(format!("waiting on ffmpeg: {e}")))?;
        let log = collect_log(log);
        if status.success() {
            return Ok(());
        }
        Err(MagicMoveError::export(format!(
            "ffmpeg failed ({status}): {}",
            log.trim()
        )))
    }

    fn kill(self) {
        let Self {
            mut child,
            stdin,
            log,
        } = self;
        drop(stdin);
        if let Err(e) = child.kill() {
            tracing::debug!("ffmpeg already gone: {e}");
        }
        let _ = child.wait();
        let _ = collect_log(log);
    }
}

fn collect_log(log: JoinHandle<std::io::Result<String>>) -> String {
    match log.join() {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => format!("<stderr unreadable: {e}>"),
        Err(_) => "<stderr reader panicked>".to_owned(),
    }
}

struct Session {
    encoder: Encoder,
    cfg: SinkConfig,
    last: Option<FrameIndex>,
    opaque: Vec<u8>,
}

/// Sink that pipes frames into the system `ffmpeg`.
///
/// Frames arrive premultiplied and are flattened over `bg_rgba` before being written, since the
/// rawvideo input has no premultiplied pixel format.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    session: Option<Session>,
}

impl FfmpegSink {
    /// Sink writing to `opts.out_path`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            session: None,
        }
    }

    /// Output path.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn discard_output(&self) {
        let out = &self.opts.out_path;
        if out.exists()
            && let Err(e) = std::fs::remove_file(out)
        {
            tracing::warn!(out = %out.display(), "partial video left behind: {e}");
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> MagicMoveResult<()> {
        if self.session.is_some() {
            return Err(MagicMoveError::export("encoder already running"));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(MagicMoveError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(MagicMoveError::validation("video size must be non-zero"));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(MagicMoveError::validation(format!(
                "video size {}x{} must be even for yuv420p",
                cfg.width, cfg.height
            )));
        }
        let out = &self.opts.out_path;
        ensure_parent_dir(out)?;
        if !self.opts.overwrite && out.exists() {
            return Err(MagicMoveError::validation(format!(
                "'{}' exists and overwriting is off",
                out.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(MagicMoveError::export(
                "video export needs `ffmpeg` on PATH",
            ));
        }

        let encoder = Encoder::spawn(encoder_args(&self.opts, &cfg))?;
        tracing::debug!(
            out = %out.display(),
            container = ?self.opts.container(),
            w = cfg.width,
            h = cfg.height,
            "encoder started"
        );
        self.session = Some(Session {
            encoder,
            opaque: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            last: None,
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MagicMoveResult<()> {
        let s = self
            .session
            .as_mut()
            .ok_or_else(|| MagicMoveError::export("frame pushed before begin()"))?;
        if s.last.is_some_and(|last| idx.0 <= last.0) {
            return Err(MagicMoveError::export(format!(
                "frame {} arrived after frame {}",
                idx.0,
                s.last.map_or(0, |l| l.0)
            )));
        }
        if (frame.width, frame.height) != (s.cfg.width, s.cfg.height)
            || frame.data.len() != s.opaque.len()
        {
            return Err(MagicMoveError::export(format!(
                "frame is {}x{} ({} bytes), encoder expects {}x{}",
                frame.width,
                frame.height,
                frame.data.len(),
                s.cfg.width,
                s.cfg.height
            )));
        }
        s.last = Some(idx);
        flatten_onto(&mut s.opaque, &frame.data, self.opts.bg_rgba);
        s.encoder.write(&s.opaque)
    }

    fn end(&mut self) -> MagicMoveResult<()> {
        let s = self
            .session
            .take()
            .ok_or_else(|| MagicMoveError::export("end() without begin()"))?;
        s.encoder.finish()
    }

    fn abort(&mut self) {
        if let Some(s) = self.session.take() {
            s.encoder.kill();
        }
        self.discard_output();
    }
}

/// Composite premultiplied RGBA8 `src` over an opaque `bg` into `dst`.
fn flatten_onto(dst: &mut [u8], src: &[u8], bg: [u8; 4]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let inv = 255 - u16::from(s[3]);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(u16::from(bg[c]), inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MagicMoveResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
