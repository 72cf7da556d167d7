pub mod detect;
pub mod select;

use crate::error::{CliError, Result};
use mdcontacts::core::io::memory::InMemoryTrajectory;
use mdcontacts::core::io::pdb::PdbFile;
use mdcontacts::core::io::traits::TrajectoryFile;
use std::path::Path;
use tracing::info;

fn load_trajectory(path: &Path, hydrogen_attach_distance: Option<f64>) -> Result<InMemoryTrajectory> {
    info!("Loading trajectory from {:?}", path);
    let reader = match hydrogen_attach_distance {
        Some(distance) => PdbFile::new().with_guessed_hydrogen_bonds(distance),
        None => PdbFile::new(),
    };
    reader
        .read_from_path(path)
        .map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fmt::Write;

    pub fn atom_line(serial: usize, name: &str, resname: &str, resid: isize, pos: [f64; 3], segid: &str) -> String {
        format!(
            "ATOM  {:>5} {:<4}{:1}{:<4}{:1}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}      {:<4}",
            serial, name, "", resname, "X", resid, pos[0], pos[1], pos[2], 1.0, 0.0, segid
        )
    }

    /// Two segments of two carbons each. Only the first atoms of the segments touch,
    /// and only in models 1 and 3.
    pub fn three_model_pdb() -> String {
        let mut pdb = String::new();
        for (model, partner_x) in [(1, 3.5), (2, 40.0), (3, 3.5)] {
            writeln!(pdb, "MODEL     {model:>4}").unwrap();
            writeln!(pdb, "{}", atom_line(1, "CB", "LEU", 1, [0.0, 0.0, 0.0], "A")).unwrap();
            writeln!(pdb, "{}", atom_line(2, "CB", "ALA", 2, [0.0, 20.0, 0.0], "A")).unwrap();
            writeln!(pdb, "{}", atom_line(3, "CB", "ILE", 50, [partner_x, 0.0, 0.0], "B")).unwrap();
            writeln!(pdb, "{}", atom_line(4, "CB", "VAL", 51, [40.0, 20.0, 0.0], "B")).unwrap();
            writeln!(pdb, "ENDMDL").unwrap();
        }
        pdb.push_str("END\n");
        pdb
    }
}
