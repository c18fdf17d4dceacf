use rand::Rng;
use rand::seq::SliceRandom;

use super::{AnswerError, StepOutcome};

/// The two bins an item can be sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortBin {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub label: String,
    pub bin: SortBin,
}

struct CategorySet {
    left: &'static str,
    right: &'static str,
    left_items: [&'static str; 5],
    right_items: [&'static str; 5],
}

const CATEGORY_SETS: [CategorySet; 3] = [
    CategorySet {
        left: "fruit",
        right: "animals",
        left_items: ["apple", "banana", "grapes", "orange", "peach"],
        right_items: ["puppy", "kitten", "tiger", "cow", "piglet"],
    },
    CategorySet {
        left: "appliances",
        right: "clothes",
        left_items: ["phone", "computer", "television", "camera", "alarm clock"],
        right_items: ["t-shirt", "trousers", "skirt", "coat", "socks"],
    },
    CategorySet {
        left: "in the sky",
        right: "in the water",
        left_items: ["sun", "cloud", "eagle", "airplane", "moon"],
        right_items: ["fish", "crab", "octopus", "whale", "turtle"],
    },
];

/// A queue of items to drop into one of two labelled bins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortingTrial {
    bins: (String, String),
    queue: Vec<SortItem>,
    position: usize,
}

impl SortingTrial {
    /// Labels of the left and right bins.
    #[must_use]
    pub fn bin_labels(&self) -> (&str, &str) {
        (&self.bins.0, &self.bins.1)
    }

    #[must_use]
    pub fn current(&self) -> Option<&SortItem> {
        self.queue.get(self.position)
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn sorted(&self) -> usize {
        self.position
    }

    pub(super) fn place(&mut self, bin: SortBin) -> Result<StepOutcome, AnswerError> {
        let item = self.current().ok_or(AnswerError::TrialComplete)?;
        let correct = item.bin == bin;
        self.position += 1;
        Ok(StepOutcome {
            trial_complete: self.position == self.queue.len(),
            ..StepOutcome::finished(correct)
        })
    }

    pub(super) fn check(&self) -> Option<String> {
        if self.queue.is_empty() {
            return Some("empty sorting queue".to_string());
        }
        let left = self.queue.iter().filter(|i| i.bin == SortBin::Left).count();
        if left * 2 != self.queue.len() {
            return Some(format!("{left} of {} items are left-bin", self.queue.len()));
        }
        None
    }
}

/// Level picks the category set; every item appears twice.
pub(super) fn generate<R: Rng + ?Sized>(level: u8, rng: &mut R) -> SortingTrial {
    let set = &CATEGORY_SETS[usize::from(level.clamp(1, 3) - 1)];
    let once = set
        .left_items
        .iter()
        .map(|label| (label, SortBin::Left))
        .chain(set.right_items.iter().map(|label| (label, SortBin::Right)));

    let mut queue: Vec<SortItem> = once
        .clone()
        .chain(once)
        .map(|(label, bin)| SortItem {
            label: (*label).to_string(),
            bin,
        })
        .collect();
    queue.shuffle(rng);

    SortingTrial {
        bins: (set.left.to_string(), set.right.to_string()),
        queue,
        position: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::Judgement;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn queue_doubles_both_categories() {
        let trial = generate(1, &mut StdRng::seed_from_u64(1));
        assert_eq!(trial.total_items(), 20);
        assert_eq!(trial.bin_labels(), ("fruit", "animals"));
        assert_eq!(trial.check(), None);
    }

    #[test]
    fn level_selects_category_set() {
        let trial = generate(3, &mut StdRng::seed_from_u64(1));
        assert_eq!(trial.bin_labels().1, "in the water");
    }

    #[test]
    fn placing_every_item_completes_the_queue() {
        let mut trial = generate(2, &mut StdRng::seed_from_u64(2));
        let mut last = None;
        while let Some(item) = trial.current() {
            let bin = item.bin;
            let outcome = trial.place(bin).unwrap();
            assert_eq!(outcome.judgement, Judgement::Correct);
            last = Some(outcome);
        }
        assert!(last.unwrap().trial_complete);
        assert_eq!(trial.place(SortBin::Left), Err(AnswerError::TrialComplete));
    }

    #[test]
    fn wrong_bin_still_advances() {
        let mut trial = generate(1, &mut StdRng::seed_from_u64(3));
        let wrong = match trial.current().unwrap().bin {
            SortBin::Left => SortBin::Right,
            SortBin::Right => SortBin::Left,
        };
        let outcome = trial.place(wrong).unwrap();
        assert_eq!(outcome.judgement, Judgement::Incorrect);
        assert_eq!(trial.sorted(), 1);
    }
}
