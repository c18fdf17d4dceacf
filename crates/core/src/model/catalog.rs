use crate::model::{Difficulty, ExerciseKind, ExerciseLevel, LevelParams, ModelError};

/// One exercise and its three-rung ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    kind: ExerciseKind,
    levels: Vec<ExerciseLevel>,
}

impl CatalogEntry {
    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    #[must_use]
    pub fn levels(&self) -> &[ExerciseLevel] {
        &self.levels
    }

    #[must_use]
    pub fn level(&self, level: u8) -> Option<&ExerciseLevel> {
        self.levels.iter().find(|l| l.level() == level)
    }
}

/// Level configuration for every exercise the engine ships with.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The standard ladder: three rungs per exercise, all with an 80-point target.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in table itself is malformed.
    pub fn standard() -> Result<Self, ModelError> {
        let entries = ExerciseKind::ALL
            .into_iter()
            .map(|kind| {
                let levels = (1..=3)
                    .map(|level| {
                        ExerciseLevel::new(
                            level,
                            Difficulty::for_level(level),
                            standard_params(kind, level),
                            80,
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CatalogEntry { kind, levels })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entry(&self, kind: ExerciseKind) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    #[must_use]
    pub fn level(&self, kind: ExerciseKind, level: u8) -> Option<&ExerciseLevel> {
        self.entry(kind).and_then(|e| e.level(level))
    }
}

fn standard_params(kind: ExerciseKind, level: u8) -> LevelParams {
    let rung = usize::from(level.saturating_sub(1)).min(2);
    match kind {
        ExerciseKind::Reaction => LevelParams {
            base_speed: Some([0.2, 0.4, 0.6][rung]),
            spawn_rate_ms: Some([2000.0, 1500.0, 1000.0][rung]),
            duration_secs: Some([30, 45, 60][rung]),
            ..LevelParams::default()
        },
        ExerciseKind::Search => LevelParams {
            grid_size: Some([12, 20, 30][rung]),
            ..LevelParams::default()
        },
        ExerciseKind::Memory => LevelParams {
            pair_count: Some([4, 6, 8][rung]),
            ..LevelParams::default()
        },
        ExerciseKind::Inhibition => LevelParams {
            duration_secs: Some([30, 45, 60][rung]),
            ..LevelParams::default()
        },
        ExerciseKind::Recall
        | ExerciseKind::Arithmetic
        | ExerciseKind::Sorting
        | ExerciseKind::Pattern => LevelParams::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_three_rungs() {
        let catalog = Catalog::standard().unwrap();
        assert_eq!(catalog.entries().len(), ExerciseKind::ALL.len());
        for entry in catalog.entries() {
            let rungs: Vec<u8> = entry.levels().iter().map(ExerciseLevel::level).collect();
            assert_eq!(rungs, vec![1, 2, 3]);
        }
    }

    #[test]
    fn reaction_ladder_speeds_up() {
        let catalog = Catalog::standard().unwrap();
        let easy = catalog.level(ExerciseKind::Reaction, 1).unwrap();
        let hard = catalog.level(ExerciseKind::Reaction, 3).unwrap();
        assert!(easy.params().base_speed() < hard.params().base_speed());
        assert!(easy.params().spawn_rate_ms() > hard.params().spawn_rate_ms());
        assert_eq!(easy.params().duration_secs, Some(30));
    }

    #[test]
    fn memory_pairs_grow_with_level() {
        let catalog = Catalog::standard().unwrap();
        let pairs: Vec<usize> = catalog
            .entry(ExerciseKind::Memory)
            .unwrap()
            .levels()
            .iter()
            .map(|l| l.params().pair_count())
            .collect();
        assert_eq!(pairs, vec![4, 6, 8]);
    }

    #[test]
    fn missing_level_is_none() {
        let catalog = Catalog::standard().unwrap();
        assert!(catalog.level(ExerciseKind::Pattern, 4).is_none());
    }
}
