// Blocking read-validate-reprompt helpers over any reader/writer pair.

use crate::model::TrackerError;
use crate::parser::cell::parse_price_text;
use std::io::{self, BufRead, Write};

fn read_line<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim().to_string())
}

pub fn validate_integer(raw: &str, min: i64, max: i64) -> Result<i64, TrackerError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| TrackerError::InvalidNumericInput(format!("'{}' is not a whole number", raw.trim())))?;
    if value < min || value > max {
        return Err(TrackerError::InvalidNumericInput(format!(
            "{} is outside the range {}-{}",
            value, min, max
        )));
    }
    Ok(value)
}

pub fn validate_price(raw: &str) -> Result<f64, TrackerError> {
    match parse_price_text(raw) {
        Some(value) if value >= 0.0 => Ok(value),
        Some(_) => Err(TrackerError::InvalidNumericInput("price cannot be negative".into())),
        None => Err(TrackerError::InvalidNumericInput(format!(
            "'{}' is not a valid price",
            raw.trim()
        ))),
    }
}

/// Prompts until an integer within `[min, max]` is entered.
pub fn prompt_validated_integer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    min: i64,
    max: i64,
) -> io::Result<i64> {
    loop {
        write!(output, "{} ({}-{}): ", label, min, max)?;
        output.flush()?;
        match validate_integer(&read_line(input)?, min, max) {
            Ok(value) => return Ok(value),
            Err(e) => writeln!(output, "{}. Please try again.", e)?,
        }
    }
}

/// Prompts until a non-negative price is entered (`€` and separators allowed).
pub fn prompt_price<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<f64> {
    loop {
        write!(output, "{}: ", label)?;
        output.flush()?;
        match validate_price(&read_line(input)?) {
            Ok(value) => return Ok(value),
            Err(e) => writeln!(output, "{}. Please try again.", e)?,
        }
    }
}

pub fn prompt_confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    loop {
        write!(output, "{} (y/n): ", question)?;
        output.flush()?;
        match read_line(input)?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer 'y' or 'n'.")?,
        }
    }
}
