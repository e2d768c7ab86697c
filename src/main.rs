use std::{
    fmt::Display,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};

use aoc2022::{default_input, Solution, ALL_SOLUTIONS};

fn main() -> Result<()> {
    let days = selected_days()?;

    let mut total = Duration::default();
    for (n, day) in days {
        total += execute_day(n, day, default_input)?;
    }
    println!("Total processing time: {}", format_duration(total));
    Ok(())
}

/// Days given on the command line, or every implemented day if there are none.
fn selected_days() -> Result<Vec<(usize, Solution)>> {
    let mut days = Vec::new();
    for arg in std::env::args().skip(1) {
        let n: usize = arg
            .parse()
            .with_context(|| format!("invalid day {:?}", arg))?;
        match ALL_SOLUTIONS.iter().find(|(day, _)| *day == n) {
            Some(&entry) => days.push(entry),
            None => bail!("day {} is not implemented", n),
        }
    }
    if days.is_empty() {
        days.extend_from_slice(ALL_SOLUTIONS);
    }
    Ok(days)
}

fn format_duration(dur: Duration) -> String {
    if dur.as_millis() != 0 {
        format!("{} ms", dur.as_millis())
    } else {
        format!("{} us", dur.as_micros())
    }
}

fn execute_day<I: ?Sized, J: AsRef<I>, S: Display, T: Display>(
    n: usize,
    f: fn(&I) -> Result<(S, T)>,
    input_loader: fn(usize) -> Result<J>,
) -> Result<Duration> {
    println!("Day {}:", n);
    let input = input_loader(n)?;

    let start = Instant::now();
    let (part1, part2) = f(input.as_ref())?;
    let elapsed = start.elapsed();

    println!("  Part 1: {}", part1);
    println!("  Part 2: {}", part2);
    println!("  Finished in {}", format_duration(elapsed));
    println!("---------------------");
    Ok(elapsed)
}
