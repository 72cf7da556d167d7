use super::load_trajectory;
use crate::cli::SelectArgs;
use crate::error::{CliError, Result};
use mdcontacts::core::io::traits::TrajectoryProvider;
use mdcontacts::core::selection::Selection;
use std::io::{self, Write};
use tracing::{debug, info};

pub fn run(args: SelectArgs) -> Result<()> {
    let trajectory = load_trajectory(&args.input, None)?;
    let stdout = io::stdout();
    write_selection(&mut stdout.lock(), &trajectory, &args)
}

fn write_selection<P, W>(out: &mut W, trajectory: &P, args: &SelectArgs) -> Result<()>
where
    P: TrajectoryProvider,
    W: Write,
{
    let selection = Selection::parse(&args.expression).map_err(|e| {
        CliError::Argument(format!("Invalid selection '{}': {}", args.expression, e))
    })?;
    let positions = trajectory
        .positions(args.frame)
        .map_err(|e| CliError::Argument(format!("Cannot read frame {}: {}", args.frame, e)))?;

    let topology = trajectory.topology();
    let indices = selection
        .evaluate(&topology, positions)
        .map_err(|e| CliError::Argument(e.to_string()))?;
    info!(
        expression = selection.expression(),
        dynamic = selection.is_dynamic(),
        frame = args.frame,
        atoms = indices.len(),
        "Selection evaluated."
    );

    if args.list {
        for &index in &indices {
            let (Some(segment), Some(residue_name), Some(residue_id), Some(name)) = (
                topology.segment_id(index),
                topology.residue_name(index),
                topology.residue_id(index),
                topology.name(index),
            ) else {
                debug!(index, "Selected atom missing from the topology; skipped.");
                continue;
            };
            writeln!(out, "{index:>7} {segment:<4} {residue_name:<4} {residue_id:>5} {name}")?;
        }
    }
    writeln!(
        out,
        "{} atom(s) match '{}' in frame {}",
        indices.len(),
        selection.expression(),
        args.frame
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::three_model_pdb;
    use mdcontacts::core::io::pdb::PdbFile;
    use mdcontacts::core::io::traits::TrajectoryFile;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn args(expression: &str, frame: usize, list: bool) -> SelectArgs {
        SelectArgs {
            input: PathBuf::from("unused.pdb"),
            expression: expression.to_string(),
            frame,
            list,
        }
    }

    fn evaluate(expression: &str, frame: usize, list: bool) -> Result<String> {
        let trajectory = PdbFile::new()
            .read_from(&mut Cursor::new(three_model_pdb()))
            .unwrap();
        let mut out = Vec::new();
        write_selection(&mut out, &trajectory, &args(expression, frame, list))?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn static_selection_reports_count() {
        let output = evaluate("segid A", 0, false).unwrap();
        assert_eq!(output, "2 atom(s) match 'segid A' in frame 0\n");
    }

    #[test]
    fn list_prints_one_line_per_atom() {
        let output = evaluate("segid B", 0, true).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("ILE"));
        assert!(lines[0].trim_start().starts_with('2'));
        assert!(lines[1].contains("VAL"));
        assert!(lines[1].ends_with("CB"));
    }

    #[test]
    fn dynamic_selection_follows_the_frame() {
        let expression = "resname LEU and around 4.0 resname ILE";
        assert!(evaluate(expression, 0, false).unwrap().starts_with("1 atom(s)"));
        assert!(evaluate(expression, 1, false).unwrap().starts_with("0 atom(s)"));
    }

    #[test]
    fn bad_expression_and_frame_are_argument_errors() {
        assert!(matches!(
            evaluate("segid A and", 0, false),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            evaluate("segid A", 3, false),
            Err(CliError::Argument(_))
        ));
    }
}
