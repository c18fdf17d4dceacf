//! Text rendering of trials and parsing of typed answers.

use std::fmt;
use std::fmt::Write as _;

use train_core::generators::{Answer, InkColor, SortBin, Trial};
use train_core::reaction::{CATCHER_MAX_X, CATCHER_MIN_X, ObjectKind, ReactionField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Empty,
    NotANumber(String),
    OutOfRange { value: usize, max: usize },
    Unrecognised(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => write!(f, "please type an answer"),
            InputError::NotANumber(raw) => write!(f, "{raw:?} is not a number"),
            InputError::OutOfRange { value, max } => {
                write!(f, "{value} is not between 1 and {max}")
            }
            InputError::Unrecognised(raw) => write!(f, "did not understand {raw:?}"),
        }
    }
}

impl std::error::Error for InputError {}

const GRID_COLUMNS: usize = 4;

/// Question text for the active trial.
#[must_use]
pub fn describe(trial: &Trial, level: u8) -> String {
    let mut out = String::new();
    match trial {
        Trial::Pattern(t) => {
            let _ = writeln!(out, "What comes next?  {}  ?", t.sequence().join(" "));
            for (i, option) in t.options().iter().enumerate() {
                let _ = write!(out, "  {}) {option}", i + 1);
            }
        }
        Trial::Arithmetic(t) => {
            let _ = write!(out, "{}", t.prompt());
        }
        Trial::Search(t) => {
            let _ = writeln!(
                out,
                "Find every {} ({} left). Type a cell number.",
                t.target(),
                t.remaining()
            );
            for (i, cell) in t.cells().iter().enumerate() {
                let shown = if t.is_found(i) { "✅" } else { cell.as_str() };
                let _ = write!(out, "{:>3}:{shown} ", i + 1);
                if (i + 1) % GRID_COLUMNS == 0 {
                    out.push('\n');
                }
            }
        }
        Trial::Memory(t) => {
            let _ = writeln!(out, "Turn over two cards, e.g. `1 5`. Moves so far: {}", t.moves());
            for (i, card) in t.cards().iter().enumerate() {
                let shown = if t.is_matched(i) { card.as_str() } else { "🂠" };
                let _ = write!(out, "{:>3}:{shown} ", i + 1);
                if (i + 1) % GRID_COLUMNS == 0 {
                    out.push('\n');
                }
            }
        }
        Trial::Recall(t) => {
            let _ = writeln!(out, "Which items were on your list? Type their numbers, e.g. `1 4 6`.");
            for (i, item) in t.shelf().iter().enumerate() {
                let _ = writeln!(out, "{:>3}) {item}", i + 1);
            }
        }
        Trial::Sorting(t) => {
            let (left, right) = t.bin_labels();
            if let Some(item) = t.current() {
                let _ = write!(out, "{}  ->  [l] {left}   [r] {right}", item.label);
            }
        }
        Trial::Inhibition(t) => {
            let question = if level <= 1 {
                "Which colour does the word name?"
            } else {
                "Which colour is the ink?"
            };
            let [a, b] = t.options();
            let _ = write!(
                out,
                "{} (printed in {} ink)\n{question}  1) {a}  2) {b}",
                t.word().name().to_uppercase(),
                t.ink()
            );
        }
    }
    out
}

/// Faces of the two memory cards just turned over, shown whether or not
/// they matched.
#[must_use]
pub fn reveal_line(trial: &Trial, answer: &Answer) -> Option<String> {
    let (Trial::Memory(t), Answer::Reveal(a, b)) = (trial, answer) else {
        return None;
    };
    let cards = t.cards();
    let (first, second) = (cards.get(*a)?, cards.get(*b)?);
    Some(format!("Card {}: {first}   Card {}: {second}", a + 1, b + 1))
}

/// Read one line of input as an answer for `trial`.
///
/// # Errors
///
/// Returns `InputError` when the text cannot be mapped onto the trial.
pub fn parse_answer(trial: &Trial, input: &str) -> Result<Answer, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    match trial {
        Trial::Pattern(t) => {
            let options = t.options();
            match input.parse::<usize>() {
                Ok(n) => Ok(Answer::Choice(options[pick(n, options.len())?].clone())),
                Err(_) => Ok(Answer::Choice(input.to_string())),
            }
        }
        Trial::Arithmetic(_) => input
            .parse::<i64>()
            .map(Answer::Number)
            .map_err(|_| InputError::NotANumber(input.to_string())),
        Trial::Search(t) => Ok(Answer::Tile(pick(number(input)?, t.cells().len())?)),
        Trial::Memory(t) => {
            let picks = numbers(input)?;
            let [a, b] = picks[..] else {
                return Err(InputError::Unrecognised(input.to_string()));
            };
            let len = t.cards().len();
            Ok(Answer::Reveal(pick(a, len)?, pick(b, len)?))
        }
        Trial::Recall(t) => {
            let shelf = t.shelf();
            let basket = numbers(input)?
                .into_iter()
                .map(|n| pick(n, shelf.len()).map(|i| shelf[i].clone()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Answer::Basket(basket))
        }
        Trial::Sorting(_) => match input.to_lowercase().as_str() {
            "l" | "left" | "1" => Ok(Answer::Sort(SortBin::Left)),
            "r" | "right" | "2" => Ok(Answer::Sort(SortBin::Right)),
            _ => Err(InputError::Unrecognised(input.to_string())),
        },
        Trial::Inhibition(t) => {
            let options = t.options();
            if let Ok(n) = input.parse::<usize>() {
                return Ok(Answer::Color(options[pick(n, options.len())?]));
            }
            InkColor::ALL
                .into_iter()
                .find(|c| c.name().eq_ignore_ascii_case(input))
                .map(Answer::Color)
                .ok_or_else(|| InputError::Unrecognised(input.to_string()))
        }
    }
}

//
// ─── REACTION ──────────────────────────────────────────────────────────────────
//

/// Columns the catcher can stop in.
pub const LANES: usize = 9;
const LANE_WIDTH: f64 = (CATCHER_MAX_X - CATCHER_MIN_X) / (LANES - 1) as f64;

fn lane_of(x: f64) -> usize {
    let lane = ((x - CATCHER_MIN_X) / LANE_WIDTH).round().max(0.0) as usize;
    lane.min(LANES - 1)
}

fn lane_x(lane: usize) -> f64 {
    CATCHER_MIN_X + lane as f64 * LANE_WIDTH
}

/// Lane ruler, the lowest object in each lane and the catcher.
#[must_use]
pub fn field_view(field: &ReactionField) -> String {
    let mut lowest: [Option<(f64, ObjectKind)>; LANES] = [None; LANES];
    for object in field.objects() {
        let slot = &mut lowest[lane_of(object.x())];
        if slot.is_none_or(|(y, _)| object.y() > y) {
            *slot = Some((object.y(), object.kind()));
        }
    }

    let ruler: Vec<String> = (1..=LANES).map(|lane| lane.to_string()).collect();
    let falling: Vec<&str> = lowest
        .iter()
        .map(|slot| match slot {
            Some((_, ObjectKind::Reward)) => "★",
            Some((_, ObjectKind::Hazard)) => "✖",
            None => "·",
        })
        .collect();
    let catcher = lane_of(field.catcher().x());
    let floor: Vec<&str> = (0..LANES)
        .map(|lane| if lane == catcher { "▲" } else { " " })
        .collect();
    format!("{}\n{}\n{}", ruler.join(" "), falling.join(" "), floor.join(" "))
}

/// Catcher position for a typed steering command: a lane number, or
/// `a`/`d` to step one lane left or right of `current_x`.
///
/// # Errors
///
/// Returns `InputError` for anything else.
pub fn parse_steer(input: &str, current_x: f64) -> Result<f64, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    let current = lane_of(current_x);
    match input.to_lowercase().as_str() {
        "a" | "left" => Ok(lane_x(current.saturating_sub(1))),
        "d" | "right" => Ok(lane_x((current + 1).min(LANES - 1))),
        other => match other.parse::<usize>() {
            Ok(lane) => Ok(lane_x(pick(lane, LANES)?)),
            Err(_) => Err(InputError::Unrecognised(input.to_string())),
        },
    }
}

fn number(raw: &str) -> Result<usize, InputError> {
    raw.parse()
        .map_err(|_| InputError::NotANumber(raw.to_string()))
}

fn numbers(raw: &str) -> Result<Vec<usize>, InputError> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(number)
        .collect()
}

/// One-based menu number to zero-based index.
fn pick(value: usize, max: usize) -> Result<usize, InputError> {
    if (1..=max).contains(&value) {
        Ok(value - 1)
    } else {
        Err(InputError::OutOfRange { value, max })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use train_core::generators::generate;
    use train_core::model::{ExerciseKind, ExerciseLevel, LevelParams};

    use super::*;

    fn trial(kind: ExerciseKind) -> Trial {
        let level = ExerciseLevel::standard(1).unwrap();
        generate(kind, &level, &mut StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn numbered_options_map_to_values() {
        let pattern = trial(ExerciseKind::Pattern);
        let Trial::Pattern(t) = &pattern else {
            unreachable!()
        };
        assert_eq!(
            parse_answer(&pattern, "2").unwrap(),
            Answer::Choice(t.options()[1].clone())
        );
        assert_eq!(
            parse_answer(&pattern, "4"),
            Err(InputError::OutOfRange { value: 4, max: 3 })
        );
    }

    #[test]
    fn memory_needs_two_cards() {
        let memory = trial(ExerciseKind::Memory);
        assert_eq!(parse_answer(&memory, "1, 3").unwrap(), Answer::Reveal(0, 2));
        assert!(parse_answer(&memory, "1").is_err());
        assert_eq!(parse_answer(&memory, "  "), Err(InputError::Empty));
    }

    #[test]
    fn sorting_and_colours_accept_words() {
        let sorting = trial(ExerciseKind::Sorting);
        assert_eq!(parse_answer(&sorting, "R").unwrap(), Answer::Sort(SortBin::Right));

        let inhibition = trial(ExerciseKind::Inhibition);
        assert_eq!(
            parse_answer(&inhibition, "Blue").unwrap(),
            Answer::Color(InkColor::Blue)
        );
        assert!(describe(&inhibition, 1).contains("word name"));
    }

    #[test]
    fn mismatched_memory_cards_are_shown() {
        let mut memory = trial(ExerciseKind::Memory);
        let Trial::Memory(t) = &memory else {
            unreachable!()
        };
        let cards = t.cards().to_vec();
        let other = cards.iter().position(|c| *c != cards[0]).unwrap();
        let answer = Answer::Reveal(0, other);

        let line = reveal_line(&memory, &answer).unwrap();
        memory.apply(&answer).unwrap();
        assert!(line.contains(&cards[0]));
        assert!(line.contains(&cards[other]));
        assert!(line.contains(&format!("Card {}", other + 1)));
        assert!(reveal_line(&memory, &Answer::Reveal(0, 99)).is_none());
        assert!(reveal_line(&trial(ExerciseKind::Sorting), &answer).is_none());
    }

    #[test]
    fn steering_moves_between_lanes() {
        assert!((parse_steer("1", 50.0).unwrap() - 10.0).abs() < 1e-9);
        assert!((parse_steer("9", 50.0).unwrap() - 90.0).abs() < 1e-9);
        assert!((parse_steer("a", 50.0).unwrap() - 40.0).abs() < 1e-9);
        assert!((parse_steer("D", 50.0).unwrap() - 60.0).abs() < 1e-9);
        assert!((parse_steer("a", 10.0).unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(
            parse_steer("0", 50.0),
            Err(InputError::OutOfRange { value: 0, max: LANES })
        );
        assert!(parse_steer("jump", 50.0).is_err());
    }

    #[test]
    fn field_view_marks_objects_and_catcher() {
        let mut field = ReactionField::new(&LevelParams::default()).unwrap();
        field.spawn(ObjectKind::Reward, 10.0, 0.3);
        field.spawn(ObjectKind::Hazard, 90.0, 0.3);
        field.pointer_move(50.0);

        let view = field_view(&field);
        let rows: Vec<&str> = view.lines().collect();
        assert_eq!(rows[0], "1 2 3 4 5 6 7 8 9");
        assert_eq!(rows[1], "★ · · · · · · · ✖");
        assert_eq!(rows[2].chars().nth(8), Some('▲'));
    }
}
