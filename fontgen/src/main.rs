//! Font atlas generator
//!
//! Renders the characters of a font into a PNG texture atlas and writes a
//! `.fnt` description of every glyph next to the font file.

use std::{ffi::OsString, io::Write, path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser};
use glyph_atlas::{FontConverter, RawParams};

const SETTINGS_HELP: &str = "\
Settings:
  font=<path>          font file to convert (required)
  charlist=<path>      UTF-8 text file with the characters to include
  maxchar=<N>          include code points 0..=N [default: 128]
  fontsize=<N>         font size in pixels [default: 32]
  texturesize=<N>      atlas edge in pixels, 64 to 4096 [default: 512]
  output=dff|gf        distance field or graphic font [default: dff]
  scale=<N>            distance field oversampling [default: 16]
  spread=<N>           distance field spread in pixels [default: 2]
  mode=<mode>          generate: use fontsize and texturesize as given
                       adjustfont: find the largest fontsize for texturesize
                       adjusttexture: find the smallest texturesize for fontsize
  charmap=<N>          index of the font charmap to use [default: 0]

Writes <font>.png and <font>.fnt.";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, after_help = SETTINGS_HELP)]
struct Args {
    /// Generation settings
    #[arg(value_name = "KEY=VALUE", value_parser = parse_setting)]
    settings: Vec<Setting>,
}

/// One `key=value` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Setting {
    Font(PathBuf),
    CharList(PathBuf),
    MaxChar(i64),
    Spread(i64),
    Scale(i64),
    Mode(String),
    FontSize(i64),
    TextureSize(i64),
    Charmap(i64),
    Output(String),
}

fn parse_setting(arg: &str) -> Result<Setting, String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, found '{arg}'"))?;
    let number = || {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{key}' expects an integer, found '{value}'"))
    };
    Ok(match key {
        "font" => Setting::Font(value.into()),
        "charlist" => Setting::CharList(value.into()),
        "maxchar" => Setting::MaxChar(number()?),
        "spread" => Setting::Spread(number()?),
        "scale" => Setting::Scale(number()?),
        "mode" => Setting::Mode(value.to_owned()),
        "fontsize" => Setting::FontSize(number()?),
        "texturesize" => Setting::TextureSize(number()?),
        "charmap" => Setting::Charmap(number()?),
        "output" => Setting::Output(value.to_owned()),
        _ => return Err(format!("unknown setting '{key}'")),
    })
}

/// Folds settings into raw parameters; later settings win.
fn raw_params(settings: Vec<Setting>) -> RawParams {
    let mut raw = RawParams::default();
    for setting in settings {
        match setting {
            Setting::Font(path) => raw.font = path,
            Setting::CharList(path) => raw.char_list = Some(path),
            Setting::MaxChar(n) => raw.max_char = Some(n),
            Setting::Spread(n) => raw.spread = Some(n),
            Setting::Scale(n) => raw.scale = Some(n),
            Setting::Mode(mode) => raw.mode = Some(mode),
            Setting::FontSize(n) => raw.font_size = Some(n),
            Setting::TextureSize(n) => raw.texture_size = Some(n),
            Setting::Charmap(n) => raw.charmap = Some(n),
            Setting::Output(output) => raw.output = Some(output),
        }
    }
    raw
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

// -1 as seen by the calling shell
const FAILURE: u8 = 255;

/// The outcome of reading the command line.
#[derive(Debug)]
enum Invocation {
    Convert(RawParams),
    Exit {
        stdout: String,
        stderr: String,
        status: u8,
    },
}

fn usage() -> String {
    Args::command().render_help().to_string()
}

fn invocation<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(args) {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            return Invocation::Exit {
                stdout: e.render().to_string(),
                stderr: String::new(),
                status: 0,
            }
        }
        Err(e) => {
            return Invocation::Exit {
                stdout: usage(),
                stderr: e.render().to_string(),
                status: FAILURE,
            }
        }
    };

    let raw = raw_params(args.settings);
    if raw.font.as_os_str().is_empty() {
        return Invocation::Exit {
            stdout: usage(),
            stderr: String::new(),
            status: FAILURE,
        };
    }
    Invocation::Convert(raw)
}

fn main() -> ExitCode {
    let raw = match invocation(std::env::args_os()) {
        Invocation::Convert(raw) => raw,
        Invocation::Exit {
            stdout,
            stderr,
            status,
        } => {
            eprint!("{stderr}");
            print!("{stdout}");
            return ExitCode::from(status);
        }
    };

    init_logging();
    let params = raw.resolve();
    let result = FontConverter::open(params).and_then(|mut converter| converter.convert());
    match result {
        Ok(conversion) => {
            log::info!(
                "Font size: {}, texture size: {}, {} chars, {} kerning pairs",
                conversion.font_size,
                conversion.texture_size,
                conversion.glyph_count,
                conversion.kerning_pairs
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(FAILURE)
        }
    }
}
