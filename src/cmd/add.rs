use anyhow::Result;
use clap::{ArgAction, Args};

use super::bracketed;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Add 5 to val
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value = "false",
        value_name = "BOOL"
    )]
    pub five: bool,

    /// Add 10 to val
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value = "false",
        value_name = "BOOL"
    )]
    pub ten: bool,

    /// Extra positional arguments (echoed only)
    pub args: Vec<String>,
}

pub fn execute_add(args: AddArgs, val: Option<i64>) -> Result<()> {
    let val = val.unwrap_or(0);
    println!(
        "ADD {} {} {} {}",
        args.five,
        args.ten,
        val,
        bracketed(&args.args)
    );
    println!("{}", sum(&args, val));
    Ok(())
}

fn sum(args: &AddArgs, val: i64) -> i64 {
    let mut total = val;
    if args.five {
        total += 5;
    }
    if args.ten {
        total += 10;
    }
    total
}
