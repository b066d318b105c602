use anyhow::Result;
use clap::Args;

use super::bracketed;

#[derive(Args, Debug)]
pub struct LongestArgs {
    /// Candidates
    pub args: Vec<String>,
}

pub fn execute_longest(args: LongestArgs, val: Option<i64>) -> Result<()> {
    let longest = longest(&args.args);
    if let Some(min) = val
        && (longest.len() as i64) < min
    {
        println!("No args are longer than {min}");
        return Ok(());
    }
    println!("longest of {} is {}", bracketed(&args.args), longest);
    Ok(())
}

/// First of the longest candidates (ties keep the earlier one).
fn longest(candidates: &[String]) -> &str {
    let mut best = "";
    for c in candidates {
        if c.len() > best.len() {
            best = c.as_str();
        }
    }
    best
}
