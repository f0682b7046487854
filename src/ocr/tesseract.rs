use super::recognizer::TextRecognizer;
use crate::locator::{LocatorError, LocatorResult, WordDetection};
use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

const DETECTOR: &str = "tesseract";

/// Tesseract level for word rows in TSV output
const WORD_LEVEL: u32 = 5;

/// OCR through the `tesseract` command-line engine.
///
/// Frames are piped as PNG on stdin, so nothing touches the filesystem.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
    language: Option<String>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            language: None,
        }
    }
}

impl TesseractCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific executable instead of `tesseract` from PATH.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Recognition language(s), passed as `-l`, e.g. `eng+chi_sim`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Probe the executable so a missing install fails early with guidance.
    pub fn ensure_available(&self) -> LocatorResult<()> {
        match Command::new(&self.program).arg("--version").output() {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(LocatorError::detector(
                DETECTOR,
                format!("'{}' returned non-zero ({})", self.program.display(), out.status),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LocatorError::detector(
                DETECTOR,
                format!(
                    "'{}' binary not found in PATH. Install Tesseract OCR or point to it with --tesseract=<path>.",
                    self.program.display()
                ),
            )),
            Err(e) => Err(LocatorError::detector(
                DETECTOR,
                format!("Failed to invoke '{}': {e}", self.program.display()),
            )),
        }
    }

    fn run(&self, frame: &DynamicImage, ocr_config: &str, output: Option<&str>) -> LocatorResult<String> {
        let mut png = Vec::new();
        frame
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| LocatorError::detector(DETECTOR, format!("Failed to encode frame: {e}")))?;

        let mut command = Command::new(&self.program);
        command.arg("stdin").arg("stdout");
        if let Some(language) = &self.language {
            command.arg("-l").arg(language);
        }
        command.args(ocr_config.split_whitespace());
        if let Some(output) = output {
            command.arg(output);
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                LocatorError::detector(DETECTOR, format!("Failed to run '{}': {e}", self.program.display()))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .map_err(|e| LocatorError::detector(DETECTOR, format!("Failed to send frame: {e}")))?;
        }

        let out = child
            .wait_with_output()
            .map_err(|e| LocatorError::detector(DETECTOR, format!("Failed to read output: {e}")))?;
        if !out.status.success() {
            return Err(LocatorError::detector(
                DETECTOR,
                format!("exited with {}: {}", out.status, String::from_utf8_lossy(&out.stderr).trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, frame: &DynamicImage, ocr_config: &str) -> LocatorResult<Vec<WordDetection>> {
        let tsv = self.run(frame, ocr_config, Some("tsv"))?;
        parse_tsv(&tsv)
    }

    fn read_text(&self, frame: &DynamicImage, ocr_config: &str) -> LocatorResult<String> {
        self.run(frame, ocr_config, None)
    }
}

/// Parse Tesseract TSV output into word detections.
///
/// Only word-level rows with text are kept. Confidence is reported by the
/// engine as a float and truncated to the integer OCR scale.
pub fn parse_tsv(tsv: &str) -> LocatorResult<Vec<WordDetection>> {
    let mut lines = tsv.lines();
    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| LocatorError::detector(DETECTOR, "empty TSV output"))?
        .split('\t')
        .collect();

    let column = |name: &str| {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| LocatorError::detector(DETECTOR, format!("TSV output has no '{name}' column")))
    };
    let level = column("level")?;
    let block = column("block_num")?;
    let left = column("left")?;
    let top = column("top")?;
    let width = column("width")?;
    let height = column("height")?;
    let conf = column("conf")?;
    let text = column("text")?;

    let mut words = Vec::new();
    for (row, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let field = |idx: usize| fields.get(idx).copied().unwrap_or("");
        let number = |idx: usize| {
            field(idx).trim().parse::<i32>().map_err(|_| {
                LocatorError::detector(DETECTOR, format!("bad number '{}' in TSV row {}", field(idx), row + 1))
            })
        };

        if number(level)? != WORD_LEVEL as i32 {
            continue;
        }
        let word = field(text).trim();
        if word.is_empty() {
            continue;
        }
        let confidence = field(conf).trim().parse::<f32>().map_err(|_| {
            LocatorError::detector(DETECTOR, format!("bad confidence '{}' in TSV row {}", field(conf), row + 1))
        })?;

        words.push(WordDetection {
            text: word.to_string(),
            block_num: number(block)?.max(0) as u32,
            confidence: confidence as i32,
            left: number(left)?,
            top: number(top)?,
            width: number(width)?,
            height: number(height)?,
        });
    }

    Ok(words)
}
