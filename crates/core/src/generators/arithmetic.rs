use rand::Rng;

use super::StepOutcome;
use crate::model::Difficulty;

/// Narrative shape of an arithmetic problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticTemplate {
    /// `a + b` items in a basket.
    Addition,
    /// Change from a payment: operands are `[total, paid]`.
    ChangeDue,
    /// Price per kilo times kilos.
    UnitPrice,
    /// `a - b` items left over.
    Subtraction,
    /// `a + b - c`.
    ThreeTerm,
    /// Price of each item times item count.
    GroupCount,
    /// Sum of two or three item prices.
    ItemTotal,
}

impl ArithmeticTemplate {
    /// Exact integer result for the given operands.
    #[must_use]
    pub fn evaluate(self, operands: &[i64]) -> Option<i64> {
        match (self, operands) {
            (Self::Addition | Self::ItemTotal, [_, _, ..]) => Some(operands.iter().sum()),
            (Self::ChangeDue, [total, paid]) => Some(paid - total),
            (Self::UnitPrice | Self::GroupCount, [a, b]) => Some(a * b),
            (Self::Subtraction, [a, b]) => Some(a - b),
            (Self::ThreeTerm, [a, b, c]) => Some(a + b - c),
            _ => None,
        }
    }

    fn templates_for(difficulty: Difficulty) -> &'static [ArithmeticTemplate] {
        match difficulty {
            Difficulty::Easy => &[Self::Addition, Self::ChangeDue],
            Difficulty::Medium => &[
                Self::UnitPrice,
                Self::Subtraction,
                Self::ChangeDue,
                Self::ItemTotal,
            ],
            Difficulty::Hard => &[
                Self::UnitPrice,
                Self::ThreeTerm,
                Self::GroupCount,
                Self::ChangeDue,
                Self::ItemTotal,
            ],
        }
    }
}

/// A word problem with an integer answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithmeticTrial {
    template: ArithmeticTemplate,
    operands: Vec<i64>,
    prompt: String,
    answer: i64,
}

impl ArithmeticTrial {
    #[must_use]
    pub fn template(&self) -> ArithmeticTemplate {
        self.template
    }

    #[must_use]
    pub fn operands(&self) -> &[i64] {
        &self.operands
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer_key(&self) -> i64 {
        self.answer
    }

    pub(super) fn answer(&self, value: i64) -> StepOutcome {
        StepOutcome::finished(value == self.answer)
    }

    pub(super) fn check(&self) -> Option<String> {
        match self.template.evaluate(&self.operands) {
            None => return Some(format!("{:?} cannot take {:?}", self.template, self.operands)),
            Some(expected) if expected != self.answer => {
                return Some(format!("answer {} but operands give {expected}", self.answer));
            }
            Some(_) => {}
        }
        if self.answer < 0 {
            return Some(format!("negative answer {}", self.answer));
        }
        if let (ArithmeticTemplate::ChangeDue, [total, paid]) = (self.template, &self.operands[..])
        {
            if paid <= total {
                return Some(format!("payment {paid} does not exceed total {total}"));
            }
        }
        None
    }
}

pub(super) fn generate<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> ArithmeticTrial {
    let templates = ArithmeticTemplate::templates_for(difficulty);
    let template = templates[rng.random_range(0..templates.len())];
    let operands = operands_for(template, difficulty, rng);
    let answer = template.evaluate(&operands).unwrap_or_default();
    ArithmeticTrial {
        template,
        prompt: prompt_for(template, &operands),
        operands,
        answer,
    }
}

fn operands_for<R: Rng + ?Sized>(
    template: ArithmeticTemplate,
    difficulty: Difficulty,
    rng: &mut R,
) -> Vec<i64> {
    use ArithmeticTemplate as T;
    use Difficulty as D;

    match (template, difficulty) {
        (T::Addition, _) => vec![rng.random_range(1..=5), rng.random_range(1..=5)],
        (T::ChangeDue, D::Easy) => {
            let total = rng.random_range(3..=10);
            vec![total, total + rng.random_range(1..=3)]
        }
        (T::ChangeDue, D::Medium) => {
            let total = rng.random_range(10..=29);
            vec![total, total + rng.random_range(1..=10)]
        }
        // Paid with the next round tenner.
        (T::ChangeDue, D::Hard) => {
            let total = rng.random_range(20..=49);
            vec![total, (total / 10 + 1) * 10]
        }
        (T::UnitPrice, D::Hard) => vec![rng.random_range(4..=9), rng.random_range(2..=5)],
        (T::UnitPrice, _) => vec![rng.random_range(3..=7), rng.random_range(2..=4)],
        (T::Subtraction, _) => {
            let a = rng.random_range(5..=14);
            vec![a, rng.random_range(3..=a.min(10))]
        }
        (T::ThreeTerm, _) => vec![
            rng.random_range(10..=24),
            rng.random_range(5..=12),
            rng.random_range(2..=6),
        ],
        (T::GroupCount, _) => vec![rng.random_range(3..=7), rng.random_range(3..=5)],
        (T::ItemTotal, D::Hard) => vec![
            rng.random_range(5..=16),
            rng.random_range(5..=14),
            rng.random_range(3..=10),
        ],
        (T::ItemTotal, _) => vec![rng.random_range(2..=9), rng.random_range(2..=9)],
    }
}

fn prompt_for(template: ArithmeticTemplate, operands: &[i64]) -> String {
    match (template, operands) {
        (ArithmeticTemplate::Addition, [a, b]) => {
            format!("There are {a} apples and {b} carrots in the basket. How many in total?")
        }
        (ArithmeticTemplate::ChangeDue, [total, paid]) => {
            format!("The groceries cost {total} yuan and you pay {paid} yuan. How much change?")
        }
        (ArithmeticTemplate::UnitPrice, [price, kg]) => {
            format!("Pork is {price} yuan per kilo. How much for {kg} kilos?")
        }
        (ArithmeticTemplate::Subtraction, [a, b]) => {
            format!("You bought {a} eggs and used {b}. How many are left?")
        }
        (ArithmeticTemplate::ThreeTerm, [a, b, c]) => {
            format!("You have {a} yuan, earn {b} more, then spend {c}. How much now?")
        }
        (ArithmeticTemplate::GroupCount, [each, count]) => {
            format!("Each bag of rice costs {each} yuan. How much for {count} bags?")
        }
        (ArithmeticTemplate::ItemTotal, items) => {
            let listed = items
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(" + ");
            format!("Items priced {listed} yuan. What is the total?")
        }
        (template, operands) => format!("{template:?} {operands:?}"),
    }
}
