use crate::core::models::ids::MoleculeId;

#[derive(Debug, Clone)]
pub enum Progress {
    TickStart { molecules: u64 },
    MoleculeStepped { molecule_id: MoleculeId },
    MoleculeSkipped { molecule_id: MoleculeId },
    TickFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
