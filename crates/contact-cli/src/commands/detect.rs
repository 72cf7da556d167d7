use super::load_trajectory;
use crate::cli::DetectArgs;
use crate::config::{DefaultsConfig, PartialConfig};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use mdcontacts::core::io::table;
use mdcontacts::core::io::traits::TrajectoryProvider;
use mdcontacts::engine::progress::ProgressReporter;
use mdcontacts::workflows;
use std::fs::File;
use std::io::{self, BufWriter};
use tracing::{info, warn};

pub fn run(args: DetectArgs, threads: Option<usize>) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialConfig::from_file(path)?,
        None => PartialConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args, threads, &DefaultsConfig::default())?;

    let trajectory = load_trajectory(&args.input, config.hydrogen_attach_distance)?;
    eprintln!(
        "Loaded {} frame(s) of {} atoms from {}",
        trajectory.frame_count(),
        trajectory.topology().len(),
        args.input.display()
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        workers = config.detection.workers,
        "Invoking the contact detection workflow..."
    );
    let detection = workflows::detect::run(&trajectory, &config.detection, &reporter)?;
    let contacts = detection.aggregate()?;
    info!(contacts = contacts.len(), "Contacts aggregated.");

    let mut contacts = config.pipeline.run(contacts)?;
    if contacts.is_empty() {
        warn!("No contacts remain after the pipeline.");
    }

    match &args.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            table::write_contacts(writer, &mut contacts, config.time)?;
            eprintln!(
                "✓ {} contact(s) written to: {}",
                contacts.len(),
                path.display()
            );
        }
        None => {
            table::write_contacts(io::stdout().lock(), &mut contacts, config.time)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::test_support::three_model_pdb;
    use crate::error::CliError;
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    fn detect_args(args: &[&str]) -> (DetectArgs, Option<usize>) {
        let cli = Cli::parse_from(args);
        match cli.command {
            Commands::Detect(detect) => (detect, cli.threads),
            other => panic!("Expected 'detect' subcommand, got {other:?}"),
        }
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn writes_one_row_per_surviving_contact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("traj.pdb");
        let output = dir.path().join("contacts.csv");
        fs::write(&input, three_model_pdb()).unwrap();

        let (args, threads) = detect_args(&[
            "mdcontacts",
            "-j",
            "2",
            "detect",
            "-i",
            path_str(&input),
            "-o",
            path_str(&output),
            "--sel1",
            "segid A",
            "--sel2",
            "segid B",
            "--ns-per-frame",
            "0.5",
            "--threshold",
            "0.0",
        ]);
        run(args, threads).unwrap();

        let table = fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("segid_a,resname_a,resid_a,atom_a"));
        assert!(lines[1].starts_with("A,LEU,1,CB,B,ILE,50,CB,sc-sc,hydrophobic,"));
        assert!(lines[1].ends_with(",0.0,1.0,0.5,0.5"));
    }

    #[test]
    fn configured_pipeline_is_applied_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("traj.pdb");
        let output = dir.path().join("contacts.csv");
        let config = dir.path().join("contacts.toml");
        fs::write(&input, three_model_pdb()).unwrap();
        fs::write(
            &config,
            r#"
            [detection]
            selection-1 = "segid A"
            selection-2 = "segid B"

            [[pipeline]]
            type = "residue-name"
            a = "ALA"
            b = "all"
            "#,
        )
        .unwrap();

        let (args, threads) = detect_args(&[
            "mdcontacts",
            "detect",
            "-i",
            path_str(&input),
            "-o",
            path_str(&output),
            "-c",
            path_str(&config),
        ]);
        run(args, threads).unwrap();

        let table = fs::read_to_string(&output).unwrap();
        assert_eq!(table.lines().count(), 1);
    }

    #[test]
    fn unreadable_input_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdb");
        fs::write(&input, "ATOM      1  CB\n").unwrap();

        let (args, threads) = detect_args(&[
            "mdcontacts",
            "detect",
            "-i",
            path_str(&input),
            "--sel1",
            "all",
            "--sel2",
            "self",
        ]);
        match run(args, threads) {
            Err(CliError::FileParsing { path, .. }) => assert_eq!(path, input),
            other => panic!("expected a parse failure, got {other:?}"),
        }
    }
}
