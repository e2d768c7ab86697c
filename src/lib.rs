pub mod graph;
pub mod solutions;

use anyhow::{Context, Result};

pub type Solution = fn(&str) -> Result<(usize, usize)>;

pub const ALL_SOLUTIONS: &[(usize, Solution)] = &[
    (12, solutions::day12 as Solution),
    (16, solutions::day16 as Solution),
];

pub fn load_input(name: &str) -> Result<String> {
    let path = "inputs/".to_string() + name;
    std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))
}

pub fn default_input(n: usize) -> Result<String> {
    load_input(&format!("{}.txt", n))
}
