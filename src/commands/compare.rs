//! Block comparison command handler

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use peerlog::blocks::{arrival_deltas, comparison_name, earliest_arrivals, summarize_deltas};
use peerlog::report::{read_blocks_file, write_block_deltas_file};
use peerlog::stats::format_seconds;

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Output path for the comparison of `first` with `second`.
pub fn output_path(output_dir: &Path, first: &Path, second: &Path) -> PathBuf {
    output_dir.join(format!(
        "{}.csv",
        comparison_name(&file_stem(first), &file_stem(second))
    ))
}

/// One comparison to run: indices of the two inputs and the output file.
#[derive(Debug, PartialEq, Eq)]
pub struct Comparison {
    pub first: usize,
    pub second: usize,
    pub output: PathBuf,
}

/// Every pair of inputs once, in argument order.
///
/// Fails when two pairs would write the same output file, which happens
/// when inputs in different directories share a file stem.
pub fn plan_comparisons(files: &[PathBuf], output_dir: &Path) -> Result<Vec<Comparison>> {
    let mut plan = Vec::new();
    let mut seen: HashMap<PathBuf, (usize, usize)> = HashMap::new();

    for first in 0..files.len() {
        for second in (first + 1)..files.len() {
            let output = output_path(output_dir, &files[first], &files[second]);
            if let Some(&(a, b)) = seen.get(&output) {
                bail!(
                    "Comparisons of {:?} with {:?} and of {:?} with {:?} would both write {:?}; \
                     rename the inputs so their file names differ",
                    files[a],
                    files[b],
                    files[first],
                    files[second],
                    output
                );
            }
            seen.insert(output.clone(), (first, second));
            plan.push(Comparison {
                first,
                second,
                output,
            });
        }
    }

    Ok(plan)
}

/// Handle the compare-blocks command.
///
/// Every pair of inputs is compared once, in argument order.
#[cfg(not(tarpaulin_include))]
pub fn handle(files: &[PathBuf], output_dir: &Path) -> Result<()> {
    let plan = plan_comparisons(files, output_dir)?;
    let arrivals = files
        .iter()
        .map(|path| read_blocks_file(path).map(|blocks| earliest_arrivals(&blocks)))
        .collect::<Result<Vec<_>>>()?;

    for Comparison {
        first,
        second,
        output,
    } in plan
    {
        let deltas = arrival_deltas(&arrivals[first], &arrivals[second]);
        write_block_deltas_file(&output, &deltas)?;

        let name = comparison_name(&file_stem(&files[first]), &file_stem(&files[second]));
        match summarize_deltas(&deltas) {
            Some(summary) => println!(
                "{}: {} blocks, min {}, max {}, mean {}",
                name,
                summary.count,
                format_seconds(summary.min),
                format_seconds(summary.max),
                format_seconds(summary.mean)
            ),
            None => println!("{}: no block heights in common", name),
        }
    }
    Ok(())
}
