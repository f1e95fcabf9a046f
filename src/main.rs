use anyhow::Result;
use clap::Parser;
use replaycheck::analyzer::Analyzer;
use replaycheck::cli::{Cli, Commands};
use replaycheck::config::{MarkerConfig, RuleSet};
use replaycheck::io::output;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output: output_path,
            rules,
            ignore,
            include_tests,
            no_fail,
        } => {
            let rules = match rules {
                Some(path) => RuleSet::load(&path)?,
                None => RuleSet::default(),
            };
            let analyzer = Analyzer::new(rules, MarkerConfig::default())
                .with_ignore_patterns(ignore.unwrap_or_default())
                .with_include_tests(include_tests);

            let report = analyzer.analyze_path(&path)?;
            let rendered = output::render(&report, format)?;
            output::write_rendered(&rendered, output_path.as_deref())?;

            if report.has_errors() && !no_fail {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
