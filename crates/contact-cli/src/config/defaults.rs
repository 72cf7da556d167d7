use mdcontacts::core::io::pdb::DEFAULT_HYDROGEN_ATTACH_DISTANCE;
use std::num::NonZeroUsize;

pub struct DefaultsConfig {
    pub cutoff: f64,
    pub hbond_cutoff: f64,
    pub hbond_angle: f64,
    pub workers: usize,
    pub hydrogen_attach_distance: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            cutoff: 5.0,
            hbond_cutoff: 2.5,
            hbond_angle: 120.0,
            workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            hydrogen_attach_distance: DEFAULT_HYDROGEN_ATTACH_DISTANCE,
        }
    }
}
