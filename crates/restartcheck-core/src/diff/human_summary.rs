//! Human-readable verdict lines for reports.

/// Closing line of a per-pair report
pub fn render_pair_verdict(differs: bool) -> &'static str {
    if differs {
        "The files are different.\n"
    } else {
        "The files are similar.\n"
    }
}

/// Closing summary of a run.
///
/// `differing` lists `(target, baseline)` paths of the differing pairs in pair
/// order.
pub fn render_run_summary(n_pairs: usize, differing: &[(String, String)]) -> String {
    if differing.is_empty() {
        return format!(
            "\nThe root files and the {} pairs of files compared are similar.\n",
            n_pairs
        );
    }

    let verb = if differing.len() == 1 { "is" } else { "are" };
    let mut out = format!(
        "\nCompared {} pairs of files of which {} {} different.\n",
        n_pairs,
        differing.len(),
        verb
    );
    for (target, baseline) in differing {
        out.push_str(&format!("\t{} and {}\n", target, baseline));
    }
    out
}
