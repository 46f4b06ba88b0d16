use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use coupongen::{DrawType, ExclusionSet, GenerationRequest, GeneratorConfig, Number};
use std::path::PathBuf;

/// Runtime configuration for the `coupongen` binary.
///
/// All values are parsed from CLI arguments or environment variables, with
/// defaults matching the library's [`GenerationRequest::default`].
#[derive(Parser, Debug, Clone)]
#[command(
    name = "coupongen",
    version,
    about = "Generate a batch of distinct lottery coupons"
)]
pub struct CliArgs {
    /// Game to generate coupons for (`lotto`, `mini-lotto`, `euro-jackpot`).
    ///
    /// Environment variable: `DRAW_TYPE`
    #[arg(long, env = "DRAW_TYPE", default_value_t = DrawType::Lotto)]
    pub draw_type: DrawType,

    /// Number of coupons to generate.
    ///
    /// Environment variable: `COUPON_COUNT`
    #[arg(short, long, env = "COUPON_COUNT", default_value_t = 10)]
    pub count: usize,

    /// Minimum number of values each coupon must have that no earlier coupon
    /// has. `0` only rules out exact repeats.
    ///
    /// Environment variable: `COUPON_DISTANCE`
    #[arg(short, long, env = "COUPON_DISTANCE", default_value_t = 3)]
    pub distance: usize,

    /// Seconds to wait for the model's pools before giving up.
    ///
    /// Environment variable: `MODEL_TIMEOUT_SECS`
    #[arg(long, env = "MODEL_TIMEOUT_SECS", default_value_t = 30.0)]
    pub timeout_secs: f64,

    /// Number of past draws the model considers.
    ///
    /// Environment variable: `HISTORY_DEPTH`
    #[arg(long, env = "HISTORY_DEPTH", default_value_t = 0)]
    pub history_depth: usize,

    /// Factor the model widens its pools by, in standard deviations.
    ///
    /// Environment variable: `STD_DEV_FACTOR`
    #[arg(long, env = "STD_DEV_FACTOR", default_value_t = 0.0)]
    pub std_dev_factor: f64,

    /// Numbers that must never appear, comma separated.
    ///
    /// Merged with the model file's exclusion list, if any.
    ///
    /// Environment variable: `EXCLUDE`
    #[arg(short, long, env = "EXCLUDE", value_delimiter = ',')]
    pub exclude: Vec<Number>,

    /// JSON file with per-position inclusion pools and an exclusion list.
    /// Without it every position may hold any number of the game.
    ///
    /// Environment variable: `MODEL_FILE`
    #[arg(long, env = "MODEL_FILE")]
    pub model_file: Option<PathBuf>,

    /// Milliseconds between two sampling attempts.
    ///
    /// Environment variable: `SAMPLE_CADENCE_MS`
    #[arg(long, env = "SAMPLE_CADENCE_MS", default_value_t = 50)]
    pub cadence_ms: u64,

    /// Sampled coupons buffered between producer and consumer.
    ///
    /// Environment variable: `CHANNEL_CAPACITY`
    #[arg(long, env = "CHANNEL_CAPACITY", default_value_t = 16)]
    pub channel_capacity: usize,

    /// Print the result as JSON instead of one coupon per line.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub draw_type: DrawType,
    pub request: GenerationRequest,
    pub generator: GeneratorConfig,
    pub exclude: ExclusionSet,
    pub model_file: Option<PathBuf>,
    pub json: bool,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.count == 0 {
            bail!("COUPON_COUNT must be greater than 0");
        }

        if !args.timeout_secs.is_finite() || args.timeout_secs <= 0.0 {
            bail!(
                "MODEL_TIMEOUT_SECS must be a positive number, got {}",
                args.timeout_secs
            );
        }

        if args.cadence_ms == 0 {
            bail!("SAMPLE_CADENCE_MS must be greater than 0");
        }

        if args.channel_capacity == 0 {
            bail!("CHANNEL_CAPACITY must be greater than 0");
        }

        let max_number = args.draw_type.max_number();
        if let Some(number) = args
            .exclude
            .iter()
            .find(|&&number| number == 0 || number > max_number)
        {
            bail!(
                "Excluded number {} is outside 1..={} for {}",
                number,
                max_number,
                args.draw_type
            );
        }

        let Ok(timeout) = Duration::try_from_secs_f64(args.timeout_secs) else {
            bail!(
                "MODEL_TIMEOUT_SECS is too large to be a duration, got {}",
                args.timeout_secs
            );
        };

        let request = GenerationRequest::default()
            .with_timeout(timeout)
            .with_distance(args.distance)
            .with_target_count(args.count)
            .with_history_depth(args.history_depth)
            .with_std_dev_factor(args.std_dev_factor);
        request.validate()?;

        let generator = GeneratorConfig::default()
            .with_cadence(Duration::from_millis(args.cadence_ms))
            .with_channel_capacity(args.channel_capacity);

        Ok(Self {
            draw_type: args.draw_type,
            request,
            generator,
            exclude: args.exclude.into_iter().collect(),
            model_file: args.model_file,
            json: args.json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<AppConfig> {
        let args = CliArgs::try_parse_from(std::iter::once("coupongen").chain(args.iter().copied()))?;
        AppConfig::try_from(args)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.draw_type, DrawType::Lotto);
        assert_eq!(config.request, GenerationRequest::default());
        assert_eq!(config.generator, GeneratorConfig::default());
        assert!(config.exclude.is_empty());
        assert!(!config.json);
    }

    #[test]
    fn parses_game_and_exclusions() {
        let config = parse(&[
            "--draw-type",
            "mini-lotto",
            "--count",
            "4",
            "--exclude",
            "7,13,42",
        ])
        .unwrap();
        assert_eq!(config.draw_type, DrawType::MiniLotto);
        assert_eq!(config.request.target_count, 4);
        assert_eq!(config.exclude, [7, 13, 42].into());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["--count", "0"]).is_err());
        assert!(parse(&["--timeout-secs", "0"]).is_err());
        assert!(parse(&["--timeout-secs", "1e300"]).is_err());
        assert!(parse(&["--cadence-ms", "0"]).is_err());
        assert!(parse(&["--draw-type", "mini-lotto", "--exclude", "43"]).is_err());
        assert!(parse(&["--draw-type", "keno"]).is_err());
    }
}
