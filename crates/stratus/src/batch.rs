//! Competition batch files
//!
//! The external batch driver feeds the prover a batch specification:
//! a configuration header (category, per-problem time limit in
//! milliseconds, question-answering flag) followed by per-problem records
//! pairing a problem file with its output file. On a refutation the worker
//! writes the derivation to the output file followed by the
//! `% SZS problemFinished` sentinel line the driver waits for.

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{digit1, line_ending, not_line_ending, space1},
    combinator::{map, map_res, value},
    multi::many0,
    sequence::{delimited, preceded, separated_pair, terminated},
    branch::alt,
    IResult,
};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// One problem record: input path and output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProblem {
    pub problem: String,
    pub output: String,
}

/// A parsed batch specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSpec {
    pub category: String,
    pub problem_time_limit: Duration,
    pub question_answering: bool,
    pub problems: Vec<BatchProblem>,
}

/// Errors in a batch specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    Malformed { near: String },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Malformed { near } => {
                write!(f, "malformed batch specification near '{}'", near)
            }
        }
    }
}

impl std::error::Error for BatchError {}

impl BatchSpec {
    /// Parse a batch specification from its textual form.
    pub fn parse(input: &str) -> Result<BatchSpec, BatchError> {
        match batch_spec(input) {
            Ok((rest, spec)) if rest.trim().is_empty() => Ok(spec),
            Ok((rest, _)) => Err(BatchError::Malformed {
                near: rest.chars().take(40).collect(),
            }),
            Err(_) => Err(BatchError::Malformed {
                near: input.chars().take(40).collect(),
            }),
        }
    }
}

fn batch_spec(input: &str) -> IResult<&str, BatchSpec> {
    let (input, _) = terminated(tag("% SZS start BatchConfiguration"), line_ending)(input)?;
    let (input, category) = terminated(
        preceded(
            terminated(tag("division.category"), space1),
            map(not_line_ending, str::trim),
        ),
        line_ending,
    )(input)?;
    let (input, millis) = terminated(
        preceded(
            terminated(tag("limit.time.problem.ms"), space1),
            map_res(digit1, str::parse::<u64>),
        ),
        line_ending,
    )(input)?;
    let (input, qa) = terminated(
        preceded(
            terminated(tag("qa"), space1),
            alt((value(true, tag("yes")), value(false, tag("no")))),
        ),
        line_ending,
    )(input)?;
    let (input, _) = terminated(tag("% SZS end BatchConfiguration"), line_ending)(input)?;

    let (input, problems) = delimited(
        terminated(tag("% SZS start BatchProblems"), line_ending),
        many0(problem_record),
        terminated(tag("% SZS end BatchProblems"), many0(line_ending)),
    )(input)?;

    Ok((
        input,
        BatchSpec {
            category: category.to_string(),
            problem_time_limit: Duration::from_millis(millis),
            question_answering: qa,
            problems,
        },
    ))
}

fn problem_record(input: &str) -> IResult<&str, BatchProblem> {
    terminated(
        map(
            separated_pair(path, space1, path),
            |(problem, output): (&str, &str)| BatchProblem {
                problem: problem.to_string(),
                output: output.to_string(),
            },
        ),
        line_ending,
    )(input)
}

fn path(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// Write a solved problem's derivation followed by the sentinel line the
/// batch driver promotes solutions on, and flush.
pub fn write_finished<W: Write>(out: &mut W, derivation: &str, path: &str) -> io::Result<()> {
    out.write_all(derivation.as_bytes())?;
    if !derivation.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    writeln!(out, "% SZS problemFinished {}", path)?;
    out.flush()
}
