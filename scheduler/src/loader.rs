//! Turns textual process descriptions into instruction sequences.
//!
//! Two dialects are understood:
//!
//! * explicit programs such as `c7,i,c5,i`, where `cN` stands for `N`
//!   compute instructions and `i` for one I/O,
//! * generative descriptions `X:Y`, producing `X` instructions that are
//!   each a compute instruction with a `Y` percent chance, an I/O otherwise.
//!
//! Nothing here touches the process table, so a malformed description
//! never leaves a half-loaded process behind.

use rand::Rng;

use crate::{Instruction, SchedulerError};

/// Upper bound on the instructions of a single process.
pub const MAX_INSTRUCTIONS: usize = 1 << 24;

/// A process description in one of the two dialects.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Program<'a> {
    /// An explicit program like `c7,i,c5,i`.
    Explicit(&'a str),

    /// A generative description like `10:80`.
    Generated(&'a str),
}

impl Program<'_> {
    /// Materializes the instructions this description stands for.
    pub fn instructions<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<Instruction>, SchedulerError> {
        match self {
            Program::Explicit(program) => parse_program(program),
            Program::Generated(description) => generate(description, rng),
        }
    }
}

/// Parses an explicit program like `c3,i,c2`.
pub fn parse_program(program: &str) -> Result<Vec<Instruction>, SchedulerError> {
    let mut code = Vec::new();

    for token in program.split(',').map(str::trim) {
        let Some(opcode) = token.chars().next() else {
            continue;
        };

        match opcode {
            'c' => {
                let invalid = || SchedulerError::InvalidCompute(token.to_string());
                let count = token[1..].parse::<usize>().map_err(|_| invalid())?;
                reserve(&mut code, count).ok_or_else(invalid)?;
                code.extend(std::iter::repeat(Instruction::Compute).take(count));
            }
            'i' if token.len() == 1 => {
                reserve(&mut code, 2)
                    .ok_or_else(|| SchedulerError::InvalidCompute(program.to_string()))?;
                push_io(&mut code);
            }
            _ => return Err(SchedulerError::BadOpcode(token.to_string())),
        }
    }

    Ok(code)
}

/// Generates a program from a description like `10:80`.
pub fn generate<R: Rng + ?Sized>(
    description: &str,
    rng: &mut R,
) -> Result<Vec<Instruction>, SchedulerError> {
    let fields: Vec<&str> = description.split(':').collect();
    let [count, chance] = fields.as_slice() else {
        return Err(SchedulerError::BadDescription(description.to_string()));
    };

    let invalid = || SchedulerError::InvalidInstructionCount(count.to_string());
    let count = count.trim().parse::<usize>().map_err(|_| invalid())?;

    let chance = chance
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|chance| (0.0..=100.0).contains(chance))
        .ok_or_else(|| SchedulerError::InvalidCpuChance(chance.to_string()))?
        / 100.0;

    // every instruction may turn into an io/io_done pair
    let mut code = Vec::new();
    reserve(&mut code, count.checked_mul(2).ok_or_else(invalid)?).ok_or_else(invalid)?;
    for _ in 0..count {
        if rng.gen::<f64>() < chance {
            code.push(Instruction::Compute);
        } else {
            push_io(&mut code);
        }
    }

    Ok(code)
}

/// Makes room for `additional` more instructions, or returns `None` when the
/// program would outgrow [`MAX_INSTRUCTIONS`] or the allocation fails.
fn reserve(code: &mut Vec<Instruction>, additional: usize) -> Option<()> {
    let total = code.len().checked_add(additional)?;
    if total > MAX_INSTRUCTIONS {
        return None;
    }
    code.try_reserve(additional).ok()
}

fn push_io(code: &mut Vec<Instruction>) {
    code.push(Instruction::Io);
    code.push(Instruction::IoDone);
}
