use crate::libs::interval::Interval;
use itertools::Itertools;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "+"),
            Direction::Reverse => write!(f, "-"),
        }
    }
}

/// One member interval of an MHG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub accession: String,
    pub union: Interval,
    pub homology: Interval,
    pub direction: Direction,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(({},{}),{},{})",
            self.accession, self.union, self.homology, self.direction
        )
    }
}

/// A maximal homologous group, blocks in traversal-discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mhg {
    pub blocks: Vec<Block>,
}

impl fmt::Display for Mhg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.blocks.iter().join(","))
    }
}

fn parse_interval(s: &str) -> anyhow::Result<Interval> {
    let inner = s
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| anyhow::anyhow!("Invalid interval: {}", s))?;
    let (start, end) = inner
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Invalid interval: {}", s))?;
    let start = start.trim().parse::<u64>()?;
    let end = end.trim().parse::<u64>()?;
    if start > end {
        anyhow::bail!("Invalid interval: {}", s);
    }
    Ok(Interval::new(start, end))
}

impl FromStr for Block {
    type Err = anyhow::Error;

    /// ```
    /// use mhg::libs::block::{Block, Direction};
    /// let block: Block = "((A,(10,50)),(12,40),-)".parse().unwrap();
    /// assert_eq!(block.accession, "A");
    /// assert_eq!(block.homology.start, 12);
    /// assert_eq!(block.direction, Direction::Reverse);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| anyhow::anyhow!("Invalid block: {}", s))?;

        let (rest, direction) = inner
            .rsplit_once(',')
            .ok_or_else(|| anyhow::anyhow!("Invalid block: {}", s))?;
        let direction = match direction.trim() {
            "+" => Direction::Forward,
            "-" => Direction::Reverse,
            d => anyhow::bail!("Invalid direction: {}", d),
        };

        let (node, homology) = rest
            .rsplit_once(",(")
            .ok_or_else(|| anyhow::anyhow!("Invalid block: {}", s))?;
        let homology = parse_interval(&format!("({}", homology))?;

        let node = node
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| anyhow::anyhow!("Invalid block: {}", s))?;
        let (accession, union) = node
            .rsplit_once(",(")
            .ok_or_else(|| anyhow::anyhow!("Invalid block: {}", s))?;
        let union = parse_interval(&format!("({}", union))?;

        if accession.is_empty() {
            anyhow::bail!("Invalid block: {}", s);
        }

        Ok(Block {
            accession: accession.to_string(),
            union,
            homology,
            direction,
        })
    }
}

impl FromStr for Mhg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // split on commas outside parentheses
        let mut blocks = vec![];
        let mut depth = 0i32;
        let mut begin = 0;
        for (i, c) in s.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                ',' if depth == 0 => {
                    blocks.push(s[begin..i].parse::<Block>()?);
                    begin = i + 1;
                }
                _ => {}
            }
            if depth < 0 {
                anyhow::bail!("Unbalanced parentheses: {}", s);
            }
        }
        if depth != 0 {
            anyhow::bail!("Unbalanced parentheses: {}", s);
        }
        blocks.push(s[begin..].parse::<Block>()?);

        Ok(Mhg { blocks })
    }
}

/// Writes one MHG per line.
pub fn write_mhgs<W: Write>(writer: &mut W, mhgs: &[Mhg]) -> std::io::Result<()> {
    for mhg in mhgs {
        writeln!(writer, "{}", mhg)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(acc: &str, u: (u64, u64), h: (u64, u64), d: Direction) -> Block {
        Block {
            accession: acc.to_string(),
            union: Interval::new(u.0, u.1),
            homology: Interval::new(h.0, h.1),
            direction: d,
        }
    }

    #[test]
    fn test_format_mhg() {
        let mhg = Mhg {
            blocks: vec![
                block("A", (10, 50), (10, 50), Direction::Forward),
                block("B", (20, 60), (20, 60), Direction::Forward),
            ],
        };
        assert_eq!(
            mhg.to_string(),
            "((A,(10,50)),(10,50),+),((B,(20,60)),(20,60),+)"
        );

        let mut out = vec![];
        write_mhgs(&mut out, &[mhg.clone(), mhg]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_parse_mhg() {
        let line = "((chr1.1,(1,500)),(20,480),+),((NZ_CP0,(300,900)),(310,800),-)";
        let mhg: Mhg = line.parse().unwrap();
        assert_eq!(mhg.blocks.len(), 2);
        assert_eq!(mhg.blocks[0].accession, "chr1.1");
        assert_eq!(mhg.blocks[1].union, Interval::new(300, 900));
        assert_eq!(mhg.blocks[1].direction, Direction::Reverse);
        assert_eq!(mhg.to_string(), line);
    }

    #[test]
    fn test_parse_mhg_errors() {
        assert!("((A,(10,50)),(10,50),*)".parse::<Mhg>().is_err());
        assert!("((A,(10,50)),(10,50),+".parse::<Mhg>().is_err());
        assert!("((A,(50,10)),(10,50),+)".parse::<Mhg>().is_err());
        assert!("(((10,50)),(10,50),+)".parse::<Mhg>().is_err());
    }
}
