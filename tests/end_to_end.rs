//! End-to-end runs through the `Clusterer` facade.

use miclass::{ClusterConfig, Clusterer, Error, HealthCheck};

/// Vocabulary and bigram streams for a toy corpus with two word families:
/// determiners are followed by nouns, nouns by verbs, verbs by determiners.
fn corpus() -> (String, String) {
    let words = [
        "the", "a", "this", "dog", "cat", "bird", "runs", "sleeps", "sings",
    ];
    let vocab = words.join("\n") + "\n";
    let mut bigrams = String::from("# history future count\n");
    for (group_h, group_f) in [(0..3, 3..6), (3..6, 6..9), (6..9, 0..3)] {
        for h in group_h.clone() {
            for f in group_f.clone() {
                let count = 5 + (h * 3 + f) % 4;
                bigrams.push_str(&format!("{h} {f} {count}\n"));
            }
        }
    }
    (vocab, bigrams)
}

fn run(config: ClusterConfig) -> String {
    let (vocab, bigrams) = corpus();
    let clusterer = Clusterer::from_readers(vocab.as_bytes(), bigrams.as_bytes(), config).unwrap();
    let output = clusterer.cluster().unwrap();
    let mut out = Vec::new();
    output.write_bits(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn two_cliques_are_separated() {
    let vocab = "a\nb\nc\nd\n";
    let bigrams = "0 1 10\n1 0 10\n2 3 10\n3 2 10\n";
    let config = ClusterConfig::new(2).with_min_class_size(0);
    let mut clusterer = Clusterer::from_readers(vocab.as_bytes(), bigrams.as_bytes(), config).unwrap();
    clusterer.build_classes().unwrap();

    let mut classes = clusterer.engine().classes();
    for c in &mut classes {
        c.sort_unstable();
    }
    classes.sort();
    assert_eq!(classes, vec![vec![0, 1], vec![2, 3]]);
    assert!((clusterer.engine().average_mutual_information() - 1.0).abs() < 1e-9);

    let output = clusterer.cluster().unwrap();
    let tree = output.tree();
    assert_eq!(tree.dendrogram().n_merges(), 1);
    let bits = output.bit_strings();
    assert_eq!(bits[0][..1], bits[1][..1]);
    assert_ne!(bits[0][..1], bits[2][..1]);
}

#[test]
fn word_families_become_classes() {
    let (vocab, bigrams) = corpus();
    let config = ClusterConfig::new(3).with_min_class_size(0);
    let mut clusterer = Clusterer::from_readers(vocab.as_bytes(), bigrams.as_bytes(), config).unwrap();
    clusterer.build_classes().unwrap();

    let mut classes = clusterer.engine().classes();
    for c in &mut classes {
        c.sort_unstable();
    }
    classes.sort();
    assert_eq!(classes, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]]);

    // knowing a word's family fixes the next word's family
    let output = clusterer.cluster().unwrap();
    let bits = output.bit_strings();
    for family in [[0, 1, 2], [3, 4, 5], [6, 7, 8]] {
        let first: Vec<char> = family.iter().filter_map(|&w| bits[w].chars().next()).collect();
        assert!(first.windows(2).all(|p| p[0] == p[1]), "{family:?}: {bits:?}");
    }
}

#[test]
fn output_is_deterministic() {
    for config in [
        ClusterConfig::new(3),
        ClusterConfig::new(4).with_min_class_size(0),
        ClusterConfig::new(2).with_max_split_ratio(1.0),
    ] {
        assert_eq!(run(config.clone()), run(config));
    }
}

#[test]
fn every_word_gets_a_distinct_path() {
    let text = run(ClusterConfig::new(3).with_min_class_size(0));
    let mut paths: Vec<&str> = text.lines().filter_map(|l| l.split('\t').next()).collect();
    assert_eq!(paths.len(), 9);
    paths.sort_unstable();
    paths.dedup();
    assert_eq!(paths.len(), 9);
}

#[test]
fn finished_tree_is_healthy() {
    let (vocab, bigrams) = corpus();
    let clusterer =
        Clusterer::from_readers(vocab.as_bytes(), bigrams.as_bytes(), ClusterConfig::new(4)).unwrap();
    let output = clusterer.cluster().unwrap();
    let report = output.tree().health_check();
    assert!(report.is_healthy(), "{report}");
    assert_eq!(report.leaf_count, 9);
}

#[test]
fn bad_inputs_are_reported() {
    let (vocab, _) = corpus();
    let err = Clusterer::from_readers(vocab.as_bytes(), "0 99 1\n".as_bytes(), ClusterConfig::new(2))
        .unwrap_err();
    assert!(matches!(err, Error::WordOutOfRange { id: 99, vocab_size: 9 }));

    let err = Clusterer::from_readers(vocab.as_bytes(), "0 1\n".as_bytes(), ClusterConfig::new(2))
        .unwrap_err();
    assert!(matches!(err, Error::Parse { line: 1, .. }));

    let err = Clusterer::from_readers(vocab.as_bytes(), "".as_bytes(), ClusterConfig::new(10))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidClusterCount { requested: 10, n_items: 9 }));

    let empty = Clusterer::from_readers(vocab.as_bytes(), "".as_bytes(), ClusterConfig::new(2)).unwrap();
    assert!(matches!(empty.cluster(), Err(Error::EmptyInput)));
}
