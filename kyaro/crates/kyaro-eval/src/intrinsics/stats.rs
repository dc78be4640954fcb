//! Statistical intrinsics over numeric lists.

use kyaro_par::BinOp;
use kyaro_util::{KyaroError, Result};

use super::{check_arity, list, Registry};
use crate::interp::{binary_op, compare_values};
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("mean", |_, args| mean("mean", args));
    registry.add("median", median);
    registry.add("median_low", |_, args| median_edge("median_low", args, false));
    registry.add("median_high", |_, args| median_edge("median_high", args, true));
    registry.add("stdev", |_, args| spread("stdev", args, 1, true));
    registry.add("variance", |_, args| spread("variance", args, 1, false));
    registry.add("pstdev", |_, args| spread("pstdev", args, 0, true));
    registry.add("pvariance", |_, args| spread("pvariance", args, 0, false));
    registry.add("product", product);
    registry.add("cumsum", |_, args| cumulative("cumsum", args, BinOp::Add, Value::Int(0)));
    registry.add("cumprod", |_, args| cumulative("cumprod", args, BinOp::Mul, Value::Int(1)));
    registry.add("diff", diff);
}

/// Extracts a non-empty numeric data list.
fn data_points(name: &str, args: &[Value]) -> Result<Vec<f64>> {
    check_arity(name, args, 1)?;
    let items = list(name, &args[0])?;
    let items = items.borrow();
    let mut data = Vec::with_capacity(items.len());
    for item in items.iter() {
        match item.as_number() {
            Some(x) => data.push(x),
            None => {
                return Err(KyaroError::runtime_plain(format!(
                    "{name}() requires numeric data, got {}",
                    item.type_name()
                )))
            }
        }
    }
    if data.is_empty() {
        return Err(KyaroError::runtime_plain(format!(
            "{name}() requires at least one data point"
        )));
    }
    Ok(data)
}

fn mean(name: &str, args: Vec<Value>) -> Result<Value> {
    let data = data_points(name, &args)?;
    Ok(Value::Float(data.iter().sum::<f64>() / data.len() as f64))
}

/// Sorts the original values so odd-length medians keep their kind.
fn sorted_values(name: &str, args: &[Value]) -> Result<Vec<Value>> {
    check_arity(name, args, 1)?;
    let items = list(name, &args[0])?;
    let mut values = items.borrow().clone();
    if values.is_empty() {
        return Err(KyaroError::runtime_plain(format!(
            "{name}() requires at least one data point"
        )));
    }
    let mut error = None;
    values.sort_by(|a, b| match compare_values(a, b) {
        Ok(ord) => ord,
        Err(e) => {
            error.get_or_insert(e);
            std::cmp::Ordering::Equal
        }
    });
    match error {
        Some(e) => Err(e),
        None => Ok(values),
    }
}

fn median(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    let values = sorted_values("median", &args)?;
    let n = values.len();
    if n % 2 == 1 {
        Ok(values[n / 2].clone())
    } else {
        let lo = values[n / 2 - 1].as_number().ok_or_else(|| {
            KyaroError::runtime_plain("median() requires numeric data")
        })?;
        let hi = values[n / 2].as_number().ok_or_else(|| {
            KyaroError::runtime_plain("median() requires numeric data")
        })?;
        Ok(Value::Float((lo + hi) / 2.0))
    }
}

fn median_edge(name: &str, args: Vec<Value>, high: bool) -> Result<Value> {
    let values = sorted_values(name, &args)?;
    let n = values.len();
    let index = if n % 2 == 1 {
        n / 2
    } else if high {
        n / 2
    } else {
        n / 2 - 1
    };
    Ok(values[index].clone())
}

/// Variance/standard deviation with the given delta degrees of freedom
/// (1 for sample statistics, 0 for population).
fn spread(name: &str, args: Vec<Value>, ddof: usize, take_root: bool) -> Result<Value> {
    let data = data_points(name, &args)?;
    // data_points guarantees at least one point, so this only triggers
    // for the sample statistics.
    if data.len() <= ddof {
        return Err(KyaroError::runtime_plain(format!(
            "{name}() requires at least two data points"
        )));
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    let ss: f64 = data.iter().map(|x| (x - mean) * (x - mean)).sum();
    let variance = ss / (data.len() - ddof) as f64;
    Ok(Value::Float(if take_root {
        variance.sqrt()
    } else {
        variance
    }))
}

/// Multiplies a list together with the `*` operator.
fn product(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("product", &args, 1)?;
    let items = list("product", &args[0])?;
    let items = items.borrow().clone();
    let mut total = Value::Int(1);
    for item in items {
        total = binary_op(BinOp::Mul, total, item)?;
    }
    Ok(total)
}

/// Running fold of a list under `op`, collecting the partial results.
fn cumulative(name: &str, args: Vec<Value>, op: BinOp, start: Value) -> Result<Value> {
    check_arity(name, &args, 1)?;
    let items = list(name, &args[0])?;
    let items = items.borrow().clone();
    let mut acc = start;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        acc = binary_op(op, acc, item)?;
        out.push(acc.clone());
    }
    Ok(Value::list(out))
}

/// Pairwise differences of consecutive elements.
fn diff(_: &mut crate::Interpreter, args: Vec<Value>) -> Result<Value> {
    check_arity("diff", &args, 1)?;
    let items = list("diff", &args[0])?;
    let items = items.borrow().clone();
    let mut out = Vec::new();
    for pair in items.windows(2) {
        out.push(binary_op(BinOp::Sub, pair[1].clone(), pair[0].clone())?);
    }
    Ok(Value::list(out))
}
