use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use memchr::memchr;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::graph::{EdgeCosts, Graph, Node, UNREACHABLE};

pub fn day12(input: &str) -> Result<(usize, usize)> {
    let mut width = 0;
    let mut cells = Vec::with_capacity(input.len());
    for line in input.lines().filter(|l| !l.is_empty()) {
        if width == 0 {
            width = line.len();
        } else if line.len() != width {
            bail!("row {:?} has length {}, expected {}", line, line.len(), width);
        }
        cells.extend_from_slice(line.as_bytes());
    }

    let start = memchr(b'S', &cells).context("no start square")?;
    let goal = memchr(b'E', &cells).context("no goal square")?;
    let elevation = cells
        .iter()
        .map(|&c| match c {
            b'S' => Ok(0),
            b'E' => Ok(25),
            b'a'..=b'z' => Ok(c - b'a'),
            _ => Err(anyhow!("invalid square {:?}", c as char)),
        })
        .collect::<Result<Vec<u8>>>()?;

    // Edges are reversed (p -> q iff one may climb from q to p), so a single pass from the goal
    // yields the distance of every square to it.
    let nodes = (0..cells.len())
        .map(|p| {
            let (x, y) = (p % width, p / width);
            let mut adjacent = Vec::with_capacity(4);
            if x > 0 {
                adjacent.push(p - 1);
            }
            if x + 1 < width {
                adjacent.push(p + 1);
            }
            if y > 0 {
                adjacent.push(p - width);
            }
            if p + width < cells.len() {
                adjacent.push(p + width);
            }
            adjacent.retain(|&q| elevation[p] <= elevation[q] + 1);
            Node::new(p, adjacent)
        })
        .collect();

    let graph = Graph::new(nodes, EdgeCosts::Uniform(1))?;
    let steps = graph.shortest_paths_from(goal);
    if steps[start] == UNREACHABLE {
        bail!("goal can't be reached from the start");
    }

    let part1 = steps[start] as usize;
    let part2 = elevation
        .iter()
        .zip(&steps)
        .filter(|&(&e, _)| e == 0)
        .map(|(_, &s)| s)
        .min()
        .unwrap_or(UNREACHABLE) as usize;

    Ok((part1, part2))
}

/// Valves with a positive flow rate fit into a `u32` bitmask and part 2 keeps one entry per subset.
const MAX_USEFUL_VALVES: usize = 24;

struct Tunnels {
    /// Flow rate of each useful valve.
    rates: Vec<u64>,
    /// Travel time between useful valves; the last row is the start valve.
    dist: Vec<Vec<u32>>,
}

impl Tunnels {
    /// A flowing `AA` is also a target from the start row, at distance 0.
    fn parse(input: &str) -> Result<Self> {
        let re = Regex::new(
            r"^Valve ([A-Z]{2}) has flow rate=([0-9]+); tunnels? leads? to valves? ([A-Z, ]+)$",
        )?;

        let mut valves = IndexMap::new();
        for line in input.lines().filter(|l| !l.is_empty()) {
            let caps = re
                .captures(line)
                .with_context(|| format!("malformed line {:?}", line))?;
            let (_, [name, rate, tunnels]) = caps.extract();
            let rate: u32 = rate
                .parse()
                .with_context(|| format!("flow rate of valve {} out of range", name))?;
            valves.insert(name, (u64::from(rate), tunnels));
        }

        let nodes = valves
            .values()
            .enumerate()
            .map(|(id, (_, tunnels))| -> Result<Node> {
                let adjacent = tunnels
                    .split(", ")
                    .map(|t| {
                        valves
                            .get_index_of(t)
                            .ok_or_else(|| anyhow!("tunnel to unknown valve {}", t))
                    })
                    .collect::<Result<_>>()?;
                Ok(Node::new(id, adjacent))
            })
            .collect::<Result<Vec<_>>>()?;
        let graph = Graph::new(nodes, EdgeCosts::all_but_diagonal(valves.len(), 1))?;
        let distances = graph.find_all_shortest_paths();

        let start = valves.get_index_of("AA").context("no valve AA")?;
        let useful: Vec<_> = valves
            .values()
            .enumerate()
            .filter(|(_, (rate, _))| *rate > 0)
            .map(|(i, _)| i)
            .collect();
        if useful.len() > MAX_USEFUL_VALVES {
            bail!("{} valves with flow, at most {} supported", useful.len(), MAX_USEFUL_VALVES);
        }

        let rates = useful.iter().map(|&i| valves[i].0).collect();
        let dist = useful
            .iter()
            .chain(std::iter::once(&start))
            .map(|&from| useful.iter().map(|&to| distances.raw(from, to)).collect())
            .collect();
        Ok(Self { rates, dist })
    }

    fn start(&self) -> usize {
        self.rates.len()
    }

    /// Valves worth opening from `at` with `time` minutes left, with the time left once opened.
    fn moves(&self, time: u32, at: usize, opened: u32) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.dist[at]
            .iter()
            .enumerate()
            .filter(move |&(target, &d)| {
                opened & (1 << target) == 0 && d != UNREACHABLE && d + 1 < time
            })
            .map(move |(target, &d)| (target, time - d - 1))
    }

    fn find_max(
        &self,
        time: u32,
        at: usize,
        opened: u32,
        memo: &mut FxHashMap<(u32, usize, u32), u64>,
    ) -> u64 {
        if let Some(&released) = memo.get(&(time, at, opened)) {
            return released;
        }

        let mut best = 0;
        for (target, remaining) in self.moves(time, at, opened) {
            let released = self.rates[target] * u64::from(remaining)
                + self.find_max(remaining, target, opened | 1 << target, memo);
            best = best.max(released);
        }

        memo.insert((time, at, opened), best);
        best
    }

    /// Records the most pressure released for every set of valves opened along some path.
    fn explore(&self, time: u32, at: usize, opened: u32, released: u64, best: &mut [u64]) {
        let slot = &mut best[opened as usize];
        *slot = (*slot).max(released);
        for (target, remaining) in self.moves(time, at, opened) {
            let gain = self.rates[target] * u64::from(remaining);
            self.explore(remaining, target, opened | 1 << target, released + gain, best);
        }
    }

    fn find_max_with_elephant(&self, time: u32) -> u64 {
        let k = self.rates.len();
        let full = (1u32 << k) - 1;
        let mut best = vec![0; 1 << k];
        self.explore(time, self.start(), 0, 0, &mut best);

        // Afterwards best[mask] covers every subset of mask.
        for bit in 0..k {
            for mask in 0..=full {
                if mask & (1 << bit) != 0 {
                    best[mask as usize] = best[mask as usize].max(best[(mask ^ (1 << bit)) as usize]);
                }
            }
        }

        (0..=full)
            .map(|mask| best[mask as usize] + best[(full ^ mask) as usize])
            .max()
            .unwrap_or(0)
    }
}

pub fn day16(input: &str) -> Result<(usize, usize)> {
    let tunnels = Tunnels::parse(input)?;

    let part1 = tunnels.find_max(30, tunnels.start(), 0, &mut FxHashMap::default());
    let part2 = tunnels.find_max_with_elephant(26);

    Ok((part1 as usize, part2 as usize))
}
