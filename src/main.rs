mod args;

use args::Args;
use bot_click::capture::ImageFileSource;
use bot_click::client::{BotClient, DEFAULT_CLICK_DURATION};
use bot_click::input::DryRunInput;
use bot_click::locator::{LocateRequest, LocatorConfig, LocatorError, Point, PollingLocator, Target};
use bot_click::ocr::{TesseractCli, enhance_ocr_tips};
use serde::Serialize;
use std::process::ExitCode;

const EXIT_ERROR: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Serialize)]
struct Found<'a> {
    target: String,
    point: Point,
    actions: &'a [bot_click::input::InputAction],
}

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("❌ {}", message);
            args::print_help();
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            if e.is_not_found() {
                if matches!(args.target, Target::Word(_)) {
                    log::info!("{}", enhance_ocr_tips());
                }
                ExitCode::from(EXIT_NOT_FOUND)
            } else {
                ExitCode::from(EXIT_ERROR)
            }
        }
    }
}

fn run(args: &Args) -> Result<(), LocatorError> {
    let config = LocatorConfig::from_env()?;

    let mut ocr = TesseractCli::new();
    if let Some(program) = &args.tesseract {
        ocr = ocr.with_program(program);
    }
    if let Some(language) = &args.language {
        ocr = ocr.with_language(language);
    }
    if matches!(args.target, Target::Word(_)) {
        ocr.ensure_available()?;
    }

    let locator = PollingLocator::new(ImageFileSource::new(&args.frame), ocr, config);
    let mut bot = BotClient::new(locator, DryRunInput::new());
    if let Some(folder) = &args.screenshot_folder {
        bot = bot.with_screenshot_folder(folder);
    }

    let point = if args.click {
        bot.click_by(&request(args), DEFAULT_CLICK_DURATION)?
    } else {
        bot.locate(&request(args))?
    };

    if args.json {
        let actions = bot.input().actions();
        let found = Found {
            target: args.target.describe(),
            point,
            actions: &actions,
        };
        let out = serde_json::to_string(&found).map_err(std::io::Error::from)?;
        println!("{}", out);
    } else {
        println!("{},{}", point.x, point.y);
    }
    Ok(())
}

fn request(args: &Args) -> LocateRequest {
    let mut request = LocateRequest::new(args.target.clone());
    if let Some(confidence) = args.confidence {
        request = request.confidence(confidence);
    }
    if let Some(timeout) = args.timeout {
        request = request.timeout(timeout);
    }
    if let Some(interval) = args.interval {
        request = request.check_interval(interval);
    }
    if let Some(ocr_config) = &args.ocr_config {
        request = request.ocr_config(ocr_config.clone());
    }
    if let Some(preprocess) = &args.preprocess {
        request = request.preprocess(preprocess.clone());
    }
    request
}
