use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::error;
use symphonia::core::errors::Error;
use symphonia_codec_ilbc::Mode;

mod decode;
mod encode;
mod wav;

fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .short('m')
        .value_name("MS")
        .value_parser(["20", "30"])
        .default_value("30")
        .help("Frame duration in milliseconds")
}

fn main() {
    pretty_env_logger::init();

    let args = Command::new("iLBC replay")
        .version("0.1")
        .about("Encode and decode raw iLBC bitstreams")
        .subcommand_required(true)
        .subcommand(
            Command::new("encode")
                .about("Encode 8 kHz mono audio into an iLBC bitstream")
                .arg(mode_arg())
                .arg(
                    Arg::new("INPUT")
                        .help("WAV file, or 16-bit little endian .pcm/.raw samples")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("OUTPUT")
                        .help("Output bitstream")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode an iLBC bitstream into a WAV file")
                .arg(mode_arg())
                .arg(
                    Arg::new("no-enhancer")
                        .long("no-enhancer")
                        .action(ArgAction::SetTrue)
                        .help("Disable the decoder enhancer"),
                )
                .arg(
                    Arg::new("loss")
                        .long("loss")
                        .value_name("PERCENT")
                        .value_parser(value_parser!(f64))
                        .conflicts_with("loss-file")
                        .help("Drop frames at random with this probability"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .value_parser(value_parser!(u64))
                        .default_value("0")
                        .help("Seed of the random frame loss"),
                )
                .arg(
                    Arg::new("loss-file")
                        .long("loss-file")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("Channel file of 16-bit flags, 1 received and 0 lost"),
                )
                .arg(
                    Arg::new("INPUT")
                        .help("Input bitstream")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("OUTPUT")
                        .help("Output WAV file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .index(2),
                ),
        )
        .get_matches();

    // For any error, return an exit code -1. Otherwise return the exit code provided.
    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            -1
        }
    };

    std::process::exit(code)
}

fn run(args: &ArgMatches) -> anyhow::Result<i32> {
    match args.subcommand() {
        Some(("encode", sub)) => encode::encode_file(sub),
        Some(("decode", sub)) => decode::decode_file(sub),
        _ => Ok(0),
    }
}

/// Mode selected with `--mode`.
pub(crate) fn selected_mode(args: &ArgMatches) -> anyhow::Result<Mode> {
    let ms = args.get_one::<String>("mode").map_or("30", String::as_str);
    Ok(Mode::from_ms(ms.parse()?)?)
}

pub(crate) fn ignore_end_of_stream_error(
    result: symphonia::core::errors::Result<()>,
) -> symphonia::core::errors::Result<()> {
    match result {
        Err(Error::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
            // Do not treat "end of stream" as a fatal error. It's the currently only way a
            // format reader can indicate the media is complete.
            Ok(())
        }
        _ => result,
    }
}
