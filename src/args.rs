use bot_click::locator::{Target, duration_from_secs};
use bot_click::ocr::Preprocess;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub enum Command {
    Run(Args),
    Help,
    Version,
}

#[derive(Debug)]
pub struct Args {
    pub frame: PathBuf,
    pub target: Target,
    pub confidence: Option<f32>,
    pub timeout: Option<Duration>,
    pub interval: Option<Duration>,
    pub ocr_config: Option<String>,
    pub preprocess: Option<Preprocess>,
    pub tesseract: Option<PathBuf>,
    pub language: Option<String>,
    pub screenshot_folder: Option<PathBuf>,
    pub click: bool,
    pub json: bool,
    pub debug_mode: bool,
}

impl Args {
    /// Parse the process arguments. `Ok(None)` means help or version was
    /// printed and nothing is left to do; `Err` carries a usage error.
    pub fn parse() -> Result<Option<Self>, String> {
        Self::parse_args(std::env::args().skip(1))
    }

    pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Option<Self>, String> {
        match Self::parse_from(args)? {
            Command::Run(args) => Ok(Some(args)),
            Command::Help => {
                print_help();
                Ok(None)
            }
            Command::Version => {
                println!("bot-click v{}", env!("CARGO_PKG_VERSION"));
                Ok(None)
            }
        }
    }

    /// Parse arguments without the program name. Flags that take a value
    /// accept both `--flag=value` and `--flag value`.
    pub fn parse_from<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
        let mut args = args.into_iter();

        let mut frame: Option<PathBuf> = None;
        let mut target: Option<Target> = None;
        let mut confidence: Option<f32> = None;
        let mut timeout: Option<Duration> = None;
        let mut interval: Option<Duration> = None;
        let mut ocr_config: Option<String> = None;
        let mut preprocess: Option<Preprocess> = None;
        let mut tesseract: Option<PathBuf> = None;
        let mut language: Option<String> = None;
        let mut screenshot_folder: Option<PathBuf> = None;
        let mut click = false;
        let mut json = false;
        let mut debug_mode = false;

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str| -> Result<String, String> {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| format!("Missing value for {}", name))
            };

            match flag.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-v" => return Ok(Command::Version),
                "--debug" => debug_mode = true,
                "--click" => click = true,
                "--json" => json = true,
                "--frame" => frame = Some(PathBuf::from(value("--frame")?)),
                "--image" => set_target(&mut target, Target::Image(PathBuf::from(value("--image")?)))?,
                "--word" => set_target(&mut target, Target::Word(value("--word")?))?,
                "--confidence" => {
                    let raw = value("--confidence")?;
                    let parsed = raw
                        .parse::<f32>()
                        .ok()
                        .filter(|c| (0.0..=1.0).contains(c))
                        .ok_or_else(|| format!("Invalid confidence value: {} (expected 0.0 to 1.0)", raw))?;
                    confidence = Some(parsed);
                }
                "--timeout" => timeout = Some(seconds("--timeout", &value("--timeout")?)?),
                "--interval" => interval = Some(seconds("--interval", &value("--interval")?)?),
                "--ocr-config" => ocr_config = Some(value("--ocr-config")?),
                "--preprocess" => {
                    let raw = value("--preprocess")?;
                    preprocess = Some(
                        Preprocess::parse(&raw).ok_or_else(|| format!("Unknown preprocess '{}'", raw))?,
                    );
                }
                "--tesseract" => tesseract = Some(PathBuf::from(value("--tesseract")?)),
                "--lang" => language = Some(value("--lang")?),
                "--screenshot-folder" => screenshot_folder = Some(PathBuf::from(value("--screenshot-folder")?)),
                _ => return Err(format!("Unknown argument: {}", arg)),
            }
        }

        let frame = frame.ok_or("Missing --frame <png>")?;
        let target = target.ok_or("One of --image <png> or --word <text> is required")?;

        Ok(Command::Run(Args {
            frame,
            target,
            confidence,
            timeout,
            interval,
            ocr_config,
            preprocess,
            tesseract,
            language,
            screenshot_folder,
            click,
            json,
            debug_mode,
        }))
    }
}

fn set_target(slot: &mut Option<Target>, target: Target) -> Result<(), String> {
    if slot.is_some() {
        return Err("Only one of --image or --word may be given".to_string());
    }
    *slot = Some(target);
    Ok(())
}

fn seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid {} value: {}", name, raw))?;
    duration_from_secs(name, secs).map_err(|e| e.to_string())
}

pub fn print_help() {
    println!("🤖 bot-click: locate an image or a phrase on a screen frame");
    println!();
    println!("USAGE:");
    println!("    bot-click --frame <png> (--image <png> | --word <text>) [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --frame <png>           Screenshot to search (re-read on every attempt)");
    println!("    --image <png>           Needle image to template match");
    println!("    --word <text>           Whitespace separated phrase to find by OCR");
    println!("    --confidence=F          Match threshold 0.0-1.0 (default 0.7)");
    println!("    --timeout=S             Give up after S seconds (default $DEFAULT_TIMEOUT or 60)");
    println!("    --interval=S            Seconds between attempts (default 5)");
    println!("    --ocr-config=<args>     Extra tesseract arguments, e.g. '--psm 6'");
    println!("    --preprocess=<p>        gray | threshold:N | adaptive:R");
    println!("    --tesseract=<path>      Tesseract executable (default: from PATH)");
    println!("    --lang=<langs>          Tesseract languages, e.g. eng+chi_sim");
    println!("    --screenshot-folder=D   Save a crosshair screenshot before clicking");
    println!("    --click                 Dry-run a click at the located point");
    println!("    --json                  Print the result as JSON");
    println!("    --debug                 Enable debug logging");
    println!("    --help, -h              Show this help message");
    println!("    --version, -v           Show version information");
    println!();
    println!("EXIT CODES:");
    println!("    0 found, 1 error, 2 not found before the timeout");
    println!();
    println!("EXAMPLES:");
    println!("    bot-click --frame screen.png --image img/login.png --confidence=0.9");
    println!("    bot-click --frame screen.png --word 'Save password?' --preprocess=threshold:200");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        Args::parse_from(args.iter().map(|a| a.to_string()))
    }

    fn run(args: &[&str]) -> Args {
        match parse(args) {
            Ok(Command::Run(args)) => args,
            other => panic!("Expected runnable args, got {:?}", other),
        }
    }

    #[test]
    fn test_word_query_with_all_options() {
        let args = run(&[
            "--frame",
            "screen.png",
            "--word",
            "Save password?",
            "--confidence=0.8",
            "--timeout=10",
            "--interval=0.5",
            "--ocr-config=--psm 6",
            "--preprocess=threshold:200",
            "--click",
            "--json",
        ]);

        assert_eq!(args.frame, PathBuf::from("screen.png"));
        assert_eq!(args.target, Target::Word("Save password?".to_string()));
        assert_eq!(args.confidence, Some(0.8));
        assert_eq!(args.timeout, Some(Duration::from_secs(10)));
        assert_eq!(args.interval, Some(Duration::from_millis(500)));
        assert_eq!(args.ocr_config.as_deref(), Some("--psm 6"));
        assert_eq!(args.preprocess.as_ref().map(|p| p.name()), Some("threshold:200"));
        assert!(args.click && args.json && !args.debug_mode);
    }

    #[test]
    fn test_image_query_with_inline_values() {
        let args = run(&["--frame=screen.png", "--image=img/login.png"]);
        assert_eq!(args.target, Target::Image(PathBuf::from("img/login.png")));
        assert!(args.confidence.is_none());
        assert!(args.timeout.is_none());
    }

    #[test]
    fn test_help_and_version() {
        assert!(matches!(parse(&["--help"]), Ok(Command::Help)));
        assert!(matches!(parse(&["-v"]), Ok(Command::Version)));
    }

    #[test]
    fn test_usage_error_is_not_a_clean_exit() {
        let outcome = Args::parse_args(
            ["--frame", "a.png", "--word", "x", "--confidence=1.5"].map(String::from),
        );
        let message = outcome.expect_err("usage errors must not look like success");
        assert!(message.contains("Invalid confidence value"), "got: {message}");

        assert!(matches!(Args::parse_args(["--version".to_string()]), Ok(None)));
        assert!(matches!(
            Args::parse_args(["--frame", "a.png", "--word", "x"].map(String::from)),
            Ok(Some(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(parse(&["--word", "x"]).is_err(), "frame is required");
        assert!(parse(&["--frame", "a.png"]).is_err(), "target is required");
        assert!(parse(&["--frame", "a.png", "--word", "x", "--image", "b.png"]).is_err());
        assert!(parse(&["--frame", "a.png", "--word", "x", "--confidence=1.5"]).is_err());
        assert!(parse(&["--frame", "a.png", "--word", "x", "--timeout=-1"]).is_err());
        assert!(parse(&["--frame", "a.png", "--word", "x", "--preprocess=blur"]).is_err());
        assert!(parse(&["--frame", "a.png", "--word"]).is_err(), "value is required");
        assert!(parse(&["--frame", "a.png", "--word", "x", "--gui"]).is_err());
    }
}
