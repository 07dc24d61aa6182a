//! Line-oriented text encoding of model records.
//!
//! The first line carries the six counts (order, state-dictionary size,
//! observation-dictionary size, initial-vector size, transition-entry
//! count, emission-entry count). Each following line is one record, led by
//! a one-letter tag:
//!
//! ```text
//! s <id> <symbol>                                  state dictionary entry
//! o <id> <symbol>                                  observation dictionary entry
//! i <state> <logp> [<bow>]                         initial-vector entry
//! t <ctxlen> <ctx...> <target> <logp> [<bow>]      transition entry
//! e <state> <obs> <logp>                           emission entry
//! ```
//!
//! Floats use Rust's shortest round-trip formatting, so decoding recovers
//! the exact f64 values. Symbols must not contain whitespace; the encoder
//! rejects ones that do.

use crate::io::{EmissionRecord, InitialRecord, ModelRecords, TransitionRecord};
use mt_common::{Error, Result};
use std::fmt::Write as _;

/// Render records as text.
pub fn encode(records: &ModelRecords) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {} {} {}",
        records.order,
        records.states.len(),
        records.observations.len(),
        records.initial.len(),
        records.transitions.len(),
        records.emissions.len()
    );

    for (symbol, id) in &records.states {
        check_symbol(symbol)?;
        let _ = writeln!(out, "s {id} {symbol}");
    }
    for (symbol, id) in &records.observations {
        check_symbol(symbol)?;
        let _ = writeln!(out, "o {id} {symbol}");
    }
    for r in &records.initial {
        match r.log10_backoff {
            Some(bow) => {
                let _ = writeln!(out, "i {} {} {}", r.state, r.log10_prob, bow);
            }
            None => {
                let _ = writeln!(out, "i {} {}", r.state, r.log10_prob);
            }
        }
    }
    for r in &records.transitions {
        let _ = write!(out, "t {}", r.context.len());
        for c in &r.context {
            let _ = write!(out, " {c}");
        }
        let _ = write!(out, " {} {}", r.target, r.log10_prob);
        if let Some(bow) = r.log10_backoff {
            let _ = write!(out, " {bow}");
        }
        out.push('\n');
    }
    for r in &records.emissions {
        let _ = writeln!(out, "e {} {} {}", r.state, r.observation, r.log10_prob);
    }
    Ok(out)
}

/// Parse records from text.
pub fn decode(input: &str) -> Result<ModelRecords> {
    let mut lines = input.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| Error::MalformedRecord("missing header line".into()))?;
    let counts: Vec<usize> = header
        .split_whitespace()
        .map(|f| {
            f.parse::<usize>()
                .map_err(|_| Error::MalformedRecord(format!("bad header field {f:?}")))
        })
        .collect::<Result<_>>()?;
    let [order, n_states, n_obs, n_initial, n_trans, n_emis] = counts.as_slice() else {
        return Err(Error::MalformedRecord(format!(
            "header has {} fields, expected 6",
            counts.len()
        )));
    };

    let mut records = ModelRecords {
        order: *order,
        states: Vec::with_capacity(*n_states),
        observations: Vec::with_capacity(*n_obs),
        initial: Vec::with_capacity(*n_initial),
        transitions: Vec::with_capacity(*n_trans),
        emissions: Vec::with_capacity(*n_emis),
    };

    for line in lines {
        let mut fields = line.split_whitespace();
        let Some(tag) = fields.next() else {
            continue;
        };
        let rest: Vec<&str> = fields.collect();
        match tag {
            "s" | "o" => {
                let [id, symbol] = rest.as_slice() else {
                    return Err(malformed(line));
                };
                let entry = (symbol.to_string(), parse_u32(id, line)?);
                if tag == "s" {
                    records.states.push(entry);
                } else {
                    records.observations.push(entry);
                }
            }
            "i" => {
                let (state, prob, bow) = match rest.as_slice() {
                    [state, prob] => (state, prob, None),
                    [state, prob, bow] => (state, prob, Some(parse_f64(bow, line)?)),
                    _ => return Err(malformed(line)),
                };
                records.initial.push(InitialRecord {
                    state: parse_u32(state, line)?,
                    log10_prob: parse_f64(prob, line)?,
                    log10_backoff: bow,
                });
            }
            "t" => {
                let Some((len_field, tail)) = rest.split_first() else {
                    return Err(malformed(line));
                };
                let ctx_len = parse_u32(len_field, line)? as usize;
                // context ids, target, logp, optional bow
                if tail.len() != ctx_len + 2 && tail.len() != ctx_len + 3 {
                    return Err(malformed(line));
                }
                let context = tail[..ctx_len]
                    .iter()
                    .map(|c| parse_u32(c, line))
                    .collect::<Result<Vec<u32>>>()?;
                let target = parse_u32(tail[ctx_len], line)?;
                let log10_prob = parse_f64(tail[ctx_len + 1], line)?;
                let log10_backoff = if tail.len() == ctx_len + 3 {
                    Some(parse_f64(tail[ctx_len + 2], line)?)
                } else {
                    None
                };
                records.transitions.push(TransitionRecord {
                    context,
                    target,
                    log10_prob,
                    log10_backoff,
                });
            }
            "e" => {
                let [state, obs, prob] = rest.as_slice() else {
                    return Err(malformed(line));
                };
                records.emissions.push(EmissionRecord {
                    state: parse_u32(state, line)?,
                    observation: parse_u32(obs, line)?,
                    log10_prob: parse_f64(prob, line)?,
                });
            }
            _ => return Err(malformed(line)),
        }
    }

    check_count("state", *n_states, records.states.len())?;
    check_count("observation", *n_obs, records.observations.len())?;
    check_count("initial", *n_initial, records.initial.len())?;
    check_count("transition", *n_trans, records.transitions.len())?;
    check_count("emission", *n_emis, records.emissions.len())?;
    Ok(records)
}

fn check_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
        return Err(Error::MalformedRecord(format!(
            "symbol {symbol:?} is empty or contains whitespace"
        )));
    }
    Ok(())
}

fn check_count(kind: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::RecordCountMismatch {
            kind,
            expected,
            found,
        });
    }
    Ok(())
}

fn malformed(line: &str) -> Error {
    Error::MalformedRecord(format!("unparseable line {line:?}"))
}

fn parse_u32(field: &str, line: &str) -> Result<u32> {
    field.parse().map_err(|_| malformed(line))
}

fn parse_f64(field: &str, line: &str) -> Result<f64> {
    field.parse().map_err(|_| malformed(line))
}
