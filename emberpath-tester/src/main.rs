mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{SeedReport, resolve_seed_inputs, simulate_seed, split_csv};

#[derive(Debug, Parser)]
#[command(name = "emberpath-tester", version = "0.1.0")]
#[command(about = "Seeded campaign simulation and reproducibility checks for Emberpath")]
struct Args {
    /// Seeds to run (comma-separated integers or world codes)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Simulated campaigns per seed
    #[arg(long, default_value_t = 3)]
    campaigns: usize,

    /// Fight limit per campaign
    #[arg(long, default_value_t = 120)]
    max_fights: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;

    let mut reports = Vec::with_capacity(seed_infos.len());
    for info in &seed_infos {
        let report = simulate_seed(info, args.campaigns, args.max_fights)
            .with_context(|| format!("simulation failed for seed {}", info.seed))?;
        if args.verbose {
            announce_seed(&report);
        }
        reports.push(report);
    }

    write_reports(&args, &reports, start_time)?;

    if reports.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🔥 Emberpath Campaign Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn announce_seed(report: &SeedReport) {
    let label = if report.passed {
        report.seed.code.green()
    } else {
        report.seed.code.red()
    };
    println!(
        "🎲 seed {} [{}] - {} campaigns, {} checks",
        report.seed.seed,
        label,
        report.campaigns.len(),
        report.checks.len()
    );
}

fn write_reports(args: &Args, reports: &[SeedReport], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(output_target.writer(), reports)?,
        _ => {
            logic::reports::generate_console_report(
                output_target.writer(),
                reports,
                start_time.elapsed(),
            )?;
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            seeds: "7".to_string(),
            campaigns: 1,
            max_fights: 10,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    #[test]
    fn args_parse_defaults() {
        let args = Args::parse_from(["emberpath-tester"]);
        assert_eq!(args.seeds, "1337");
        assert_eq!(args.campaigns, 3);
        assert_eq!(args.report, "console");
        assert!(args.output.is_none());
    }

    #[test]
    fn unknown_report_format_is_rejected() {
        assert!(Args::try_parse_from(["emberpath-tester", "--report", "csv"]).is_err());
    }

    #[test]
    fn write_reports_to_file() {
        let path = std::env::temp_dir().join(format!(
            "emberpath-main-{}.json",
            std::process::id()
        ));
        let mut args = base_args();
        args.output = Some(path.clone());
        let reports = vec![simulate_seed(&logic::seeds::SeedInfo::from_numeric(7), 1, 10).unwrap()];
        write_reports(&args, &reports, Instant::now()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"passed\": true"));
        let _ = std::fs::remove_file(path);
    }
}
