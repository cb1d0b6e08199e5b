use anyhow::{Context, Result};
use clap::Parser;
use image_shade::ShadeConfig;

/// Re-tint the red-dominant pixels of an image and save it as PNG.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Red colour
    #[arg(short = 'r', long, default_value_t = 64, allow_negative_numbers = true)]
    red: i32,

    /// Green colour
    #[arg(short = 'g', long, default_value_t = 64, allow_negative_numbers = true)]
    green: i32,

    /// Blue colour
    #[arg(short = 'b', long, default_value_t = 64, allow_negative_numbers = true)]
    blue: i32,

    /// Input file
    #[arg(short = 'i', long, default_value = "")]
    input: String,

    /// Output file
    #[arg(short = 'o', long, default_value = "")]
    output: String,
}

impl Args {
    fn to_config(&self) -> ShadeConfig {
        ShadeConfig::from_rgb(self.red, self.green, self.blue)
    }
}

/// Sets up a logger format with timestamp, log level, file name, line number
/// and message. Defaults to `info`, overridden by `RUST_LOG`.
fn init_logger() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    init_logger();

    let args = Args::parse();
    let config = args.to_config();
    log::debug!("{args:?}");

    image_shade::shade_image_file(&args.input, &args.output, &config)
        .with_context(|| format!("failed to shade `{}` into `{}`", args.input, args.output))?;

    Ok(())
}
