//! Cluster a vocabulary from a bigram file and print `bits<TAB>word` lines.
//!
//! ```text
//! cargo run --example brown_clusters -- vocab.txt bigrams.txt 50
//! ```
//!
//! Without arguments a small built-in corpus is clustered instead.

use std::fs::File;
use std::io::{self, BufReader};

use miclass::{ClusterConfig, Clusterer, HealthCheck};

const DEMO_VOCAB: &str = "the\na\nthis\ndog\ncat\nbird\nruns\nsleeps\nsings\n";

fn demo_bigrams() -> String {
    let mut out = String::new();
    for (from, to) in [(0..3, 3..6), (3..6, 6..9), (6..9, 0..3)] {
        for h in from.clone() {
            for f in to.clone() {
                out.push_str(&format!("{h} {f} {}\n", 4 + (h + 2 * f) % 5));
            }
        }
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let clusterer = match args.as_slice() {
        [vocab, bigrams, rest @ ..] => {
            let k = rest.first().map(|k| k.parse()).transpose()?.unwrap_or(50);
            Clusterer::from_readers(
                BufReader::new(File::open(vocab)?),
                BufReader::new(File::open(bigrams)?),
                ClusterConfig::new(k),
            )?
        }
        _ => {
            let bigrams = demo_bigrams();
            Clusterer::from_readers(
                DEMO_VOCAB.as_bytes(),
                bigrams.as_bytes(),
                ClusterConfig::new(3).with_min_class_size(0),
            )?
        }
    };

    let output = clusterer.cluster()?;
    let report = output.tree().health_check();
    if !report.is_healthy() {
        eprintln!("{report}");
    }
    output.write_bits(&mut io::stdout().lock())?;
    Ok(())
}
