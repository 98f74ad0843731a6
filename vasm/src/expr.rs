//! Evaluator for the parenthesised constant expressions `spec.md` 4.1
//! allows as an operand (`+ − * / % << >> & | ^ ~`). The grammar encodes
//! precedence directly as a tier of rules, so evaluation is a straight
//! recursive walk with no separate precedence-climbing step.

use crate::error::Result;
use crate::int_util::process_number;
use crate::parser::Rule;
use pest::iterators::Pair;

pub fn eval_paren_expr(pair: Pair<Rule>) -> Result<i64> {
    eval_expr(pair.into_inner().next().unwrap())
}

fn eval_expr(pair: Pair<Rule>) -> Result<i64> {
    eval_or(pair.into_inner().next().unwrap())
}

fn eval_or(pair: Pair<Rule>) -> Result<i64> {
    let mut pairs = pair.into_inner();
    let mut value = eval_xor(pairs.next().unwrap())?;
    for rhs in pairs {
        value |= eval_xor(rhs)?;
    }
    Ok(value)
}

fn eval_xor(pair: Pair<Rule>) -> Result<i64> {
    let mut pairs = pair.into_inner();
    let mut value = eval_and(pairs.next().unwrap())?;
    for rhs in pairs {
        value ^= eval_and(rhs)?;
    }
    Ok(value)
}

fn eval_and(pair: Pair<Rule>) -> Result<i64> {
    let mut pairs = pair.into_inner();
    let mut value = eval_shift(pairs.next().unwrap())?;
    for rhs in pairs {
        value &= eval_shift(rhs)?;
    }
    Ok(value)
}

fn eval_shift(pair: Pair<Rule>) -> Result<i64> {
    let mut pairs = pair.into_inner();
    let mut value = eval_add(pairs.next().unwrap())?;
    loop {
        let op = match pairs.next() {
            Some(op) => op,
            None => break,
        };
        let rhs = eval_add(pairs.next().unwrap())?;
        value = match op.as_str() {
            "<<" => value << rhs,
            ">>" => value >> rhs,
            _ => unreachable!(),
        };
    }
    Ok(value)
}

fn eval_add(pair: Pair<Rule>) -> Result<i64> {
    let mut pairs = pair.into_inner();
    let mut value = eval_mul(pairs.next().unwrap())?;
    loop {
        let op = match pairs.next() {
            Some(op) => op,
            None => break,
        };
        let rhs = eval_mul(pairs.next().unwrap())?;
        value = match op.as_str() {
            "+" => value + rhs,
            "-" => value - rhs,
            _ => unreachable!(),
        };
    }
    Ok(value)
}

fn eval_mul(pair: Pair<Rule>) -> Result<i64> {
    let mut pairs = pair.into_inner();
    let mut value = eval_unary(pairs.next().unwrap())?;
    loop {
        let op = match pairs.next() {
            Some(op) => op,
            None => break,
        };
        let rhs = eval_unary(pairs.next().unwrap())?;
        value = match op.as_str() {
            "*" => value * rhs,
            "/" => value / rhs,
            "%" => value % rhs,
            _ => unreachable!(),
        };
    }
    Ok(value)
}

fn eval_unary(pair: Pair<Rule>) -> Result<i64> {
    match pair.as_rule() {
        Rule::unary_expr => {
            let inner = pair.into_inner().next().unwrap();
            match inner.as_rule() {
                Rule::unary_expr => Ok(!eval_unary(inner)?),
                Rule::atom => eval_atom(inner),
                _ => unreachable!(),
            }
        }
        Rule::atom => eval_atom(pair),
        _ => unreachable!(),
    }
}

fn eval_atom(pair: Pair<Rule>) -> Result<i64> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::number => process_number(inner),
        Rule::paren_expr => eval_paren_expr(inner),
        _ => unreachable!(),
    }
}
