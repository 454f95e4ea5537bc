//! `logchop scan` command handler

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::info;

use logchop_core::config::LogchopConfig;
use logchop_log_pipeline::{
    OutputFormat, Report, ScanConfig, ScanConfigBuilder, ScanPipelineBuilder, YamlRuleEngine,
    render,
};

use crate::cli::ScanArgs;
use crate::error::CliError;

/// Minimum time between progress redraws.
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Execute the `scan` command.
pub fn execute(args: ScanArgs, config_path: &Path) -> Result<(), CliError> {
    let core = LogchopConfig::load_or_default(config_path)?;
    let config = scan_config(args, &core)?;
    let format = config.output;

    info!(
        target_kind = %config.target,
        rules = %config.rules_dir.display(),
        output = %format,
        "starting scan"
    );

    let report = run(config)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    render(&report, format, &mut handle)?;
    handle.flush()?;
    Ok(())
}

/// Merge CLI flags over the loaded configuration.
fn scan_config(args: ScanArgs, core: &LogchopConfig) -> Result<ScanConfig, CliError> {
    let mut builder = ScanConfigBuilder::from_core(core)?
        .target(args.target.into())
        .file(args.file);
    if let Some(dir) = args.rules {
        builder = builder.rules_dir(dir);
    }
    if let Some(out) = args.out {
        builder = builder.output(out.into());
    }
    if let Some(year) = args.year {
        builder = builder.reference_year(year);
    }
    Ok(builder.build()?)
}

fn run(config: ScanConfig) -> Result<Report, CliError> {
    let show_progress = config.output == OutputFormat::Table && std::io::stderr().is_terminal();
    let pipeline = ScanPipelineBuilder::new().config(config).build()?;

    let mut progress = Progress::new(show_progress, std::io::stderr());
    let result = pipeline.run(&YamlRuleEngine::new(), &mut |n| progress.tick(n));
    progress.finish();
    Ok(result?)
}

/// Progress counter for table output.
///
/// The first event is drawn immediately; later redraws are throttled by
/// [`REDRAW_INTERVAL`]. Write failures are ignored.
struct Progress<W: Write> {
    enabled: bool,
    out: W,
    last_draw: Option<Instant>,
    drawn: bool,
}

impl<W: Write> Progress<W> {
    fn new(enabled: bool, out: W) -> Self {
        Self {
            enabled,
            out,
            last_draw: None,
            drawn: false,
        }
    }

    fn tick(&mut self, processed: u64) {
        if !self.enabled {
            return;
        }
        if self
            .last_draw
            .is_some_and(|at| at.elapsed() < REDRAW_INTERVAL)
        {
            return;
        }
        let _ = write!(self.out, "\rscanning... {processed} events");
        let _ = self.out.flush();
        self.last_draw = Some(Instant::now());
        self.drawn = true;
    }

    fn finish(&mut self) {
        if self.drawn {
            let _ = write!(self.out, "\r\x1b[2K");
            let _ = self.out.flush();
            self.drawn = false;
        }
    }
}
